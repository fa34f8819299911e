//! Explicit frame scheduling
//!
//! The host (a window's redraw callback, or a test) calls `tick` once per
//! displayed frame. The loop decides whether the simulation advances and by
//! how much. Stopping is explicit, so a paused simulation is bit-for-bit
//! stable until it is resumed or single-stepped.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running,
    Paused,
}

#[derive(Debug, Clone)]
pub struct FrameLoop {
    state: LoopState,
    step_requested: bool,
    /// When set, every advancing tick uses this timestep instead of the frame time
    fixed_dt: Option<f32>,
    /// Timestep used for single steps while paused without a fixed dt
    single_step_dt: f32,
    frames: u64,
    steps: u64,
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameLoop {
    pub fn new() -> Self {
        Self {
            state: LoopState::Stopped,
            step_requested: false,
            fixed_dt: None,
            single_step_dt: 1.0 / 60.0,
            frames: 0,
            steps: 0,
        }
    }

    pub fn with_fixed_dt(mut self, dt: f32) -> Self {
        self.fixed_dt = Some(dt.max(0.0));
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// True until `stop` is called (paused loops are still running)
    pub fn is_running(&self) -> bool {
        self.state != LoopState::Stopped
    }

    pub fn is_paused(&self) -> bool {
        self.state == LoopState::Paused
    }

    pub fn start(&mut self) {
        self.state = LoopState::Running;
    }

    pub fn stop(&mut self) {
        self.state = LoopState::Stopped;
        self.step_requested = false;
    }

    pub fn pause(&mut self) {
        if self.state == LoopState::Running {
            self.state = LoopState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == LoopState::Paused {
            self.state = LoopState::Running;
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.state {
            LoopState::Running => self.pause(),
            LoopState::Paused => self.resume(),
            LoopState::Stopped => {}
        }
    }

    /// Advance exactly one step on the next tick while paused
    pub fn request_step(&mut self) {
        if self.state == LoopState::Paused {
            self.step_requested = true;
        }
    }

    /// Frames seen by `tick`
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Ticks that returned a timestep
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Called once per frame. Returns the timestep to simulate, or `None` if
    /// the simulation should not advance this frame.
    pub fn tick(&mut self, frame_dt: f32) -> Option<f32> {
        if self.state == LoopState::Stopped {
            return None;
        }
        self.frames += 1;

        let frame_dt = if frame_dt.is_finite() {
            frame_dt.max(0.0)
        } else {
            0.0
        };

        let dt = match self.state {
            LoopState::Running => self.fixed_dt.unwrap_or(frame_dt),
            LoopState::Paused if self.step_requested => {
                self.step_requested = false;
                self.fixed_dt.unwrap_or(self.single_step_dt)
            }
            _ => return None,
        };

        self.steps += 1;
        Some(dt)
    }

    /// Drive the loop headlessly over a sequence of frame times
    ///
    /// `frame` receives each timestep and returns `false` to stop the loop.
    /// Stops early once the loop is no longer running. Returns the number of
    /// steps taken.
    pub fn run<I, F>(&mut self, frame_times: I, mut frame: F) -> u64
    where
        I: IntoIterator<Item = f32>,
        F: FnMut(&mut Self, f32) -> bool,
    {
        let start = self.steps;
        for frame_dt in frame_times {
            if !self.is_running() {
                break;
            }
            if let Some(dt) = self.tick(frame_dt) {
                if !frame(self, dt) {
                    self.stop();
                }
            }
        }
        self.steps - start
    }
}

//! Keyboard shortcuts and the actions shared with the GUI buttons

use field_simulation::{FieldConfig, Preset};
use winit::keyboard::KeyCode;

const COUNT_FACTOR: f32 = 1.25;
pub const MAX_COUNT: usize = 200_000;
const REPULSE_STEP: f32 = 0.1;
pub const REPULSE_MAX: f32 = 5.0;
const DAMPING_STEP: f32 = 0.01;
pub const DAMPING_MIN: f32 = 0.5;
pub const DAMPING_MAX: f32 = 0.999;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Preset(Preset),
    MoreParticles,
    FewerParticles,
    RepulseUp,
    RepulseDown,
    DampingUp,
    DampingDown,
    TogglePause,
    ToggleCapture,
    ToggleKnot,
    Step,
    Rebuild,
    ResetCamera,
    Quit,
}

pub fn action_for(key: KeyCode) -> Option<Action> {
    let action = match key {
        KeyCode::Digit1 => Action::Preset(Preset::Starfield),
        KeyCode::Digit2 => Action::Preset(Preset::DriftCloud),
        KeyCode::Digit3 => Action::Preset(Preset::Cluster),
        KeyCode::Digit4 => Action::Preset(Preset::Tunnel),
        KeyCode::Digit5 => Action::Preset(Preset::Atom),
        KeyCode::Equal | KeyCode::NumpadAdd => Action::MoreParticles,
        KeyCode::Minus | KeyCode::NumpadSubtract => Action::FewerParticles,
        KeyCode::BracketRight => Action::RepulseUp,
        KeyCode::BracketLeft => Action::RepulseDown,
        KeyCode::Period => Action::DampingUp,
        KeyCode::Comma => Action::DampingDown,
        KeyCode::Space => Action::TogglePause,
        KeyCode::KeyN => Action::Step,
        KeyCode::KeyK => Action::ToggleKnot,
        KeyCode::KeyR => Action::Rebuild,
        KeyCode::KeyC => Action::ResetCamera,
        KeyCode::Escape => Action::Quit,
        _ => return None,
    };
    Some(action)
}

/// Config produced by a tuning action, or `None` if the action does not touch the config
pub fn apply(action: Action, config: &FieldConfig) -> Option<FieldConfig> {
    let mut next = config.clone();
    match action {
        Action::MoreParticles => {
            let count = FieldConfig::coerce_count(config.count as f32 * COUNT_FACTOR);
            next.count = count.max(config.count + 1).min(MAX_COUNT);
        }
        Action::FewerParticles => {
            next.count = FieldConfig::coerce_count(config.count as f32 / COUNT_FACTOR);
        }
        Action::RepulseUp => {
            next.repulse_strength = (config.repulse_strength + REPULSE_STEP).min(REPULSE_MAX);
        }
        Action::RepulseDown => {
            next.repulse_strength = (config.repulse_strength - REPULSE_STEP).max(0.0);
        }
        Action::DampingUp => {
            next.damping = (config.damping + DAMPING_STEP).clamp(DAMPING_MIN, DAMPING_MAX);
        }
        Action::DampingDown => {
            next.damping = (config.damping - DAMPING_STEP).clamp(DAMPING_MIN, DAMPING_MAX);
        }
        _ => return None,
    }
    Some(next)
}

//! Catppuccin Mocha colors for the presets

use catppuccin::PALETTE;
use field_simulation::{FieldConfig, Preset};
use glam::Vec3;

/// Background of the starfield scene
const STARFIELD_CLEAR: [f64; 3] = [0.06, 0.07, 0.09];

/// sRGB byte triple → linear color, for an sRGB surface
pub fn linear_from_srgb(r: u8, g: u8, b: u8) -> Vec3 {
    fn channel(c: u8) -> f32 {
        let x = c as f32 / 255.0;
        if x <= 0.04045 {
            x / 12.92
        } else {
            ((x + 0.055) / 1.055).powf(2.4)
        }
    }
    Vec3::new(channel(r), channel(g), channel(b))
}

macro_rules! mocha {
    ($name:ident) => {{
        let rgb = PALETTE.mocha.colors.$name.rgb;
        linear_from_srgb(rgb.r, rgb.g, rgb.b)
    }};
}

/// Preset config with its palette applied
pub fn themed(preset: Preset) -> FieldConfig {
    let config = preset.config();
    let (base_color, highlight_color) = match preset {
        // Keeps its own near-white stars
        Preset::Starfield => (config.base_color, mocha!(peach)),
        Preset::DriftCloud => (mocha!(sky), mocha!(peach)),
        Preset::Cluster => (mocha!(mauve), mocha!(yellow)),
        Preset::Tunnel => (mocha!(teal), mocha!(pink)),
        Preset::Atom => (mocha!(blue), mocha!(rosewater)),
    };

    FieldConfig {
        base_color,
        highlight_color,
        ..config
    }
}

pub fn clear_color(preset: Preset) -> wgpu::Color {
    let [r, g, b] = match preset {
        Preset::Starfield => STARFIELD_CLEAR,
        _ => {
            let crust = mocha!(crust);
            [crust.x as f64, crust.y as f64, crust.z as f64]
        }
    };
    wgpu::Color { r, g, b, a: 1.0 }
}

//! Shared palette and material helpers for the model's meshes.

use bevy::prelude::*;

pub const TEAL: u32 = 0x1fb8cd;
pub const PEACH: u32 = 0xffc185;
pub const BRICK: u32 = 0xb4413c;
pub const CREAM: u32 = 0xecebd5;
pub const SLATE: u32 = 0x5d878f;
pub const CORAL: u32 = 0xdb4545;
pub const MUSTARD: u32 = 0xd2ba4c;
pub const RUST: u32 = 0x964325;
pub const PLUM: u32 = 0x944454;
pub const DEEP_TEAL: u32 = 0x13343b;
pub const CYAN: u32 = 0x32b8c6;

pub fn hex_color(hex: u32) -> Color {
    Color::srgb_u8((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

pub fn solid(materials: &mut Assets<StandardMaterial>, hex: u32) -> Handle<StandardMaterial> {
    materials.add(StandardMaterial {
        base_color: hex_color(hex),
        perceptual_roughness: 0.8,
        ..default()
    })
}

pub fn translucent(
    materials: &mut Assets<StandardMaterial>,
    hex: u32,
    opacity: f32,
) -> Handle<StandardMaterial> {
    materials.add(StandardMaterial {
        base_color: hex_color(hex).with_alpha(opacity),
        alpha_mode: AlphaMode::Blend,
        perceptual_roughness: 0.8,
        ..default()
    })
}

/// Unlit, optionally translucent material for line-like geometry.
pub fn line(
    materials: &mut Assets<StandardMaterial>,
    hex: u32,
    opacity: f32,
) -> Handle<StandardMaterial> {
    let alpha_mode = if opacity < 1.0 {
        AlphaMode::Blend
    } else {
        AlphaMode::Opaque
    };
    materials.add(StandardMaterial {
        base_color: hex_color(hex).with_alpha(opacity),
        unlit: true,
        alpha_mode,
        ..default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_color_splits_channels() {
        let Srgba {
            red, green, blue, ..
        } = hex_color(0x1fb8cd).to_srgba();
        assert!((red - 0x1f as f32 / 255.0).abs() < 1e-6);
        assert!((green - 0xb8 as f32 / 255.0).abs() < 1e-6);
        assert!((blue - 0xcd as f32 / 255.0).abs() < 1e-6);
    }
}

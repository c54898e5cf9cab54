//! Camera, lights and the model itself, spawned once at startup.

use bevy::pbr::{DistanceFog, FogFalloff};
use bevy::prelude::*;

use crate::camera::OrbitController;
use crate::config::ModelConfig;
use crate::render::RendererResource;
use crate::scene::materials::{hex_color, CYAN};
use crate::scene::SceneRegistry;

pub const BACKGROUND: u32 = 0x1a1a1a;
const FOV_DEGREES: f32 = 75.0;
const FOG_START: f32 = 50.0;
const FOG_END: f32 = 200.0;

pub fn setup_scene(mut commands: Commands, controller: Option<Res<OrbitController>>) {
    let eye = controller
        .map(|c| c.position())
        .unwrap_or_else(|| OrbitController::default().position());
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: FOV_DEGREES.to_radians(),
            near: 0.1,
            far: 1000.0,
            ..default()
        }),
        Transform::from_translation(eye).looking_at(Vec3::ZERO, Vec3::Y),
        DistanceFog {
            color: hex_color(BACKGROUND),
            falloff: FogFalloff::Linear {
                start: FOG_START,
                end: FOG_END,
            },
            ..default()
        },
    ));
    commands.insert_resource(AmbientLight {
        color: hex_color(0x404040),
        brightness: 400.0,
    });
    commands.spawn((
        DirectionalLight {
            illuminance: 4_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(10., 10., 5.).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    for (hex, intensity, position) in [
        (CYAN, 500_000.0, Vec3::new(-20., 10., 20.)),
        (0x21808d, 300_000.0, Vec3::new(20., 10., -20.)),
    ] {
        commands.spawn((
            PointLight {
                color: hex_color(hex),
                intensity,
                range: 100.0,
                ..default()
            },
            Transform::from_translation(position),
        ));
    }
}

/// Hands the configured renderer everything it needs to build the model once.
pub fn spawn_model(
    mut commands: Commands,
    renderer: Res<RendererResource>,
    config: Res<ModelConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut registry: ResMut<SceneRegistry>,
) {
    renderer.0.spawn_model(
        &mut commands,
        &mut meshes,
        &mut materials,
        &mut registry,
        &config,
    );
}

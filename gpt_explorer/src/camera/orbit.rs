//! Orbit camera: damped orbit + zoom around the origin, immediate pan, preset cuts.

use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;

use crate::actions::ControlAction;
use crate::camera::{configure_pointer_sets, PointerSet, UiPointerCapture};

pub const ORBIT_SENSITIVITY: f32 = 0.01;
pub const PAN_SENSITIVITY: f32 = 0.05;
pub const ZOOM_SENSITIVITY: f32 = 0.01;
pub const DAMPING: f32 = 0.05;
pub const MIN_DISTANCE: f32 = 5.0;
pub const MAX_DISTANCE: f32 = 100.0;
pub const DEFAULT_DISTANCE: f32 = 25.0;

const ELEVATION_SCALE: f32 = 0.5;
const HEIGHT_OFFSET: f32 = 5.0;
/// Pixels per wheel notch when the platform reports line units.
const WHEEL_LINE_PIXELS: f32 = 100.0;

/// Eased orbit parameters. `mouse_x` is the azimuth, `mouse_y` the elevation.
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct OrbitController {
    pub mouse_x: f32,
    pub mouse_y: f32,
    pub distance: f32,
    pub target_x: f32,
    pub target_y: f32,
    pub target_distance: f32,
    pub pan: Vec2,
}

impl Default for OrbitController {
    fn default() -> Self {
        Self {
            mouse_x: 0.0,
            mouse_y: 0.0,
            distance: DEFAULT_DISTANCE,
            target_x: 0.0,
            target_y: 0.0,
            target_distance: DEFAULT_DISTANCE,
            pan: Vec2::ZERO,
        }
    }
}

impl OrbitController {
    /// Primary-button drag. Targets accumulate without bound.
    pub fn orbit(&mut self, delta: Vec2) {
        self.target_x += delta.x * ORBIT_SENSITIVITY;
        self.target_y += delta.y * ORBIT_SENSITIVITY;
    }

    /// Secondary-button drag. Returns the world offset to apply to the camera right away.
    pub fn pan(&mut self, delta: Vec2) -> Vec3 {
        let offset = Vec2::new(-delta.x * PAN_SENSITIVITY, delta.y * PAN_SENSITIVITY);
        self.pan += offset;
        offset.extend(0.0)
    }

    /// Wheel delta in DOM convention (positive moves away). Clamped on entry.
    pub fn zoom(&mut self, delta: f32) {
        self.target_distance =
            (self.target_distance + delta * ZOOM_SENSITIVITY).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// One frame of easing. The step is per frame, not per second.
    pub fn tick(&mut self) -> Vec3 {
        self.mouse_x += (self.target_x - self.mouse_x) * DAMPING;
        self.mouse_y += (self.target_y - self.mouse_y) * DAMPING;
        self.distance += (self.target_distance - self.distance) * DAMPING;
        self.position()
    }

    pub fn position(&self) -> Vec3 {
        let d = self.distance;
        Vec3::new(
            self.mouse_x.sin() * d,
            self.mouse_y.sin() * d * ELEVATION_SCALE + HEIGHT_OFFSET,
            self.mouse_x.cos() * d,
        ) + self.pan.extend(0.0)
    }

    /// Jumps current and target to the orbit that places the camera at `position`.
    pub fn snap_to(&mut self, position: Vec3) {
        let radius = Vec2::new(position.x, position.z)
            .length()
            .clamp(MIN_DISTANCE, MAX_DISTANCE);
        let azimuth = position.x.atan2(position.z);
        let elevation = ((position.y - HEIGHT_OFFSET) / (radius * ELEVATION_SCALE))
            .clamp(-1.0, 1.0)
            .asin();

        self.mouse_x = azimuth;
        self.target_x = azimuth;
        self.mouse_y = elevation;
        self.target_y = elevation;
        self.distance = radius;
        self.target_distance = radius;
        self.pan = Vec2::ZERO;
    }
}

/// Mouse gesture flags. Any button release clears both.
#[derive(Resource, Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct GestureState {
    pub dragging: bool,
    pub panning: bool,
}

impl GestureState {
    pub fn press(&mut self, button: MouseButton) {
        match button {
            MouseButton::Left => self.dragging = true,
            MouseButton::Right => self.panning = true,
            _ => {}
        }
    }

    pub fn release(&mut self) {
        self.dragging = false;
        self.panning = false;
    }

    pub fn is_idle(&self) -> bool {
        !self.dragging && !self.panning
    }
}

/// Fixed camera poses, all looking at the origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewPreset {
    Overview,
    Attention,
    Layers,
    Flow,
}

impl ViewPreset {
    pub const ALL: [ViewPreset; 4] = [
        ViewPreset::Overview,
        ViewPreset::Attention,
        ViewPreset::Layers,
        ViewPreset::Flow,
    ];

    pub fn position(self) -> Vec3 {
        match self {
            ViewPreset::Overview => Vec3::new(0.0, 15.0, 25.0),
            ViewPreset::Attention => Vec3::new(10.0, 0.0, 10.0),
            ViewPreset::Layers => Vec3::new(0.0, 0.0, 30.0),
            ViewPreset::Flow => Vec3::new(15.0, 5.0, 15.0),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewPreset::Overview => "Overview",
            ViewPreset::Attention => "Attention",
            ViewPreset::Layers => "Layers",
            ViewPreset::Flow => "Data Flow",
        }
    }
}

pub fn orbit_camera_plugin(app: &mut App) {
    configure_pointer_sets(app);
    app.add_event::<ControlAction>()
        .init_resource::<OrbitController>()
        .init_resource::<GestureState>()
        .init_resource::<UiPointerCapture>()
        .add_systems(
            Update,
            (
                orbit_input_system.in_set(PointerSet::Scene),
                view_preset_system,
                orbit_tick_system,
            )
                .chain(),
        );
}

fn orbit_input_system(
    buttons: Res<ButtonInput<MouseButton>>,
    mut motion: EventReader<MouseMotion>,
    mut wheel: EventReader<MouseWheel>,
    capture: Res<UiPointerCapture>,
    mut gestures: ResMut<GestureState>,
    mut controller: ResMut<OrbitController>,
    mut cameras: Query<&mut Transform, With<Camera3d>>,
) {
    if capture.0 && gestures.is_idle() {
        motion.clear();
        wheel.clear();
        return;
    }

    for button in buttons.get_just_pressed() {
        gestures.press(*button);
    }

    let delta: Vec2 = motion.read().map(|ev| ev.delta).sum();
    if delta != Vec2::ZERO {
        if gestures.dragging {
            controller.orbit(delta);
        } else if gestures.panning {
            let offset = controller.pan(delta);
            for mut tf in &mut cameras {
                tf.translation += offset;
            }
        }
    }

    for ev in wheel.read() {
        controller.zoom(wheel_delta(ev));
    }

    // After presses, so a click within one frame ends idle.
    if buttons.get_just_released().next().is_some() {
        gestures.release();
    }
}

/// Converts a wheel event to a DOM-style pixel delta (positive = scroll down = zoom out).
pub fn wheel_delta(ev: &MouseWheel) -> f32 {
    match ev.unit {
        MouseScrollUnit::Line => -ev.y * WHEEL_LINE_PIXELS,
        MouseScrollUnit::Pixel => -ev.y,
    }
}

fn view_preset_system(
    mut actions: EventReader<ControlAction>,
    mut controller: ResMut<OrbitController>,
    mut cameras: Query<&mut Transform, With<Camera3d>>,
) {
    for action in actions.read() {
        let ControlAction::ViewPreset(preset) = *action else {
            continue;
        };
        let position = preset.position();
        controller.snap_to(position);
        for mut tf in &mut cameras {
            *tf = Transform::from_translation(position).looking_at(Vec3::ZERO, Vec3::Y);
        }
        info!("camera: preset {}", preset.label());
    }
}

fn orbit_tick_system(
    mut controller: ResMut<OrbitController>,
    mut cameras: Query<&mut Transform, With<Camera3d>>,
) {
    let position = controller.tick();
    for mut tf in &mut cameras {
        tf.translation = position;
        tf.look_at(Vec3::ZERO, Vec3::Y);
    }
}

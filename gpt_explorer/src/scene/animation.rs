//! Pulse animation: attention blocks spin about Y, feed-forward blocks breathe vertically.

use bevy::prelude::*;

use crate::actions::ControlAction;
use crate::scene::{Category, OriginTransform, SceneRegistry};

const ATTENTION_SPIN_RATE: f32 = 0.5;
const MLP_PULSE_FREQUENCY: f32 = 2.0;
const MLP_PULSE_AMPLITUDE: f32 = 0.1;

/// Play state for the pulse animation.
#[derive(Resource, Debug)]
pub struct AnimationState {
    pub running: bool,
    pub speed: f32,
    elapsed: f32,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self {
            running: false,
            speed: 1.0,
            elapsed: 0.0,
        }
    }
}

impl AnimationState {
    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    /// Advances the clock by `delta_secs` and returns the pulse phase, or
    /// `None` when paused.
    pub fn advance(&mut self, delta_secs: f32) -> Option<f32> {
        if !self.running {
            return None;
        }
        self.elapsed += delta_secs;
        Some(self.elapsed * self.speed)
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

pub fn animation_plugin(app: &mut App) {
    app.add_event::<ControlAction>()
        .init_resource::<AnimationState>()
        .add_systems(Update, (animation_control_system, pulse_system).chain());
}

fn animation_control_system(
    mut actions: EventReader<ControlAction>,
    mut state: ResMut<AnimationState>,
    registry: Res<SceneRegistry>,
    mut nodes: Query<(&mut Transform, Option<&OriginTransform>)>,
) {
    for action in actions.read() {
        match *action {
            ControlAction::Play => {
                state.start();
                info!("animation: play at {:.1}x", state.speed);
            }
            ControlAction::Pause => {
                state.pause();
                info!("animation: paused");
            }
            ControlAction::Reset => {
                state.pause();
                let restored = restore_origins(&registry, &mut nodes);
                info!("animation: reset ({restored} nodes restored)");
            }
            ControlAction::SetSpeed(speed) => state.set_speed(speed),
            _ => {}
        }
    }
}

fn pulse_system(
    time: Res<Time>,
    mut state: ResMut<AnimationState>,
    registry: Res<SceneRegistry>,
    mut transforms: Query<&mut Transform>,
) {
    let Some(t) = state.advance(time.delta_secs()) else {
        return;
    };
    for entity in registry.entities_in(Category::Attention) {
        if let Ok(mut tf) = transforms.get_mut(entity) {
            apply_attention_spin(&mut tf, t);
        }
    }
    for entity in registry.entities_in(Category::Mlp) {
        if let Ok(mut tf) = transforms.get_mut(entity) {
            apply_mlp_pulse(&mut tf, t);
        }
    }
}

/// Absolute set: applying the same `t` twice leaves the same rotation.
pub fn apply_attention_spin(transform: &mut Transform, t: f32) {
    transform.rotation = Quat::from_rotation_y(ATTENTION_SPIN_RATE * t);
}

pub fn apply_mlp_pulse(transform: &mut Transform, t: f32) {
    transform.scale.y = 1.0 + (t * MLP_PULSE_FREQUENCY).sin() * MLP_PULSE_AMPLITUDE;
}

/// Restores nodes that carry an [`OriginTransform`]; others are left as-is.
fn restore_origins(
    registry: &SceneRegistry,
    nodes: &mut Query<(&mut Transform, Option<&OriginTransform>)>,
) -> usize {
    let mut restored = 0;
    for (_, entity) in registry.iter() {
        if let Ok((mut tf, Some(origin))) = nodes.get_mut(entity) {
            *tf = origin.0;
            restored += 1;
        }
    }
    restored
}

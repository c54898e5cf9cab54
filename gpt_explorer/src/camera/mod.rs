//! Camera: orbit controller, view presets and viewport resize handling.

mod orbit;
mod viewport;

use bevy::prelude::*;

pub use orbit::{
    orbit_camera_plugin, wheel_delta, GestureState, OrbitController, ViewPreset, DAMPING,
    MAX_DISTANCE, MIN_DISTANCE,
};
pub use viewport::viewport_plugin;

/// Set while the pointer is over an egui panel; camera and picking input is ignored.
#[derive(Resource, Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct UiPointerCapture(pub bool);

/// Pointer-reading systems. The UI capture flag is written before the scene reads input.
#[derive(SystemSet, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerSet {
    Capture,
    Scene,
}

/// Orders [`PointerSet::Capture`] before [`PointerSet::Scene`]. Safe to call repeatedly.
pub fn configure_pointer_sets(app: &mut App) {
    app.configure_sets(Update, PointerSet::Capture.before(PointerSet::Scene));
}

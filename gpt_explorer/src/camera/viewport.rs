//! Keeps the perspective aspect ratio in step with the window size.

use bevy::prelude::*;
use bevy::window::WindowResized;

pub fn viewport_plugin(app: &mut App) {
    app.add_systems(Update, viewport_resize_system);
}

/// Idempotent; minimized windows (zero height) are ignored.
fn viewport_resize_system(
    mut resized: EventReader<WindowResized>,
    mut projections: Query<&mut Projection, With<Camera>>,
) {
    let Some(last) = resized.read().last() else {
        return;
    };
    if last.width <= 0.0 || last.height <= 0.0 {
        return;
    }
    let aspect = last.width / last.height;
    for mut projection in &mut projections {
        if let Projection::Perspective(ref mut perspective) = *projection {
            perspective.aspect_ratio = aspect;
        }
    }
    debug!("viewport: {}x{} (aspect {aspect:.3})", last.width, last.height);
}

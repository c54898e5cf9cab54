//! Education mode: floating component names next to each scene node.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::actions::ControlAction;
use crate::scene::ComponentInfo;

const CULL_DISTANCE: f32 = 80.0;
const LABEL_COLOR: egui::Color32 = egui::Color32::from_rgba_premultiplied(150, 225, 190, 220);
const LABEL_SIZE: f32 = 12.0;

/// When enabled, every described node shows its name in the viewport.
#[derive(Resource, Default, Debug)]
pub struct EducationMode {
    pub enabled: bool,
}

/// Node-local point the node's label is drawn at.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct LabelAnchor(pub Vec3);

/// Mode toggle only; usable without a render context.
pub fn education_plugin(app: &mut App) {
    app.add_event::<ControlAction>()
        .init_resource::<EducationMode>()
        .add_systems(Update, education_toggle_system);
}

/// Label overlay. Pair with [`education_plugin`] for the toggle.
pub fn labels_plugin(app: &mut App) {
    app.init_resource::<EducationMode>().add_systems(
        Update,
        label_overlay_system
            .after(education_toggle_system)
            .run_if(|mode: Res<EducationMode>| mode.enabled),
    );
}

fn education_toggle_system(mut actions: EventReader<ControlAction>, mut mode: ResMut<EducationMode>) {
    for action in actions.read() {
        if *action == ControlAction::ToggleEducationMode {
            mode.enabled = !mode.enabled;
            info!(
                "labels: education mode {}",
                if mode.enabled { "on" } else { "off" }
            );
        }
    }
}

/// Names to draw and where, for shown nodes within [`CULL_DISTANCE`] of the camera.
pub fn visible_labels<'a>(
    camera: Vec3,
    nodes: impl IntoIterator<Item = (&'a ComponentInfo, Vec3, bool)>,
) -> Vec<(Vec3, &'a str)> {
    nodes
        .into_iter()
        .filter(|(_, at, shown)| *shown && at.distance(camera) <= CULL_DISTANCE)
        .map(|(info, at, _)| (at, info.name.as_str()))
        .collect()
}

fn label_overlay_system(
    mut contexts: EguiContexts,
    cameras: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    nodes: Query<(&ComponentInfo, &LabelAnchor, &GlobalTransform, &Visibility)>,
) {
    let Ok((camera, camera_tf)) = cameras.get_single() else {
        return;
    };
    let candidates = nodes.iter().map(|(info, anchor, tf, visibility)| {
        (
            info,
            tf.transform_point(anchor.0),
            *visibility != Visibility::Hidden,
        )
    });
    let labels = visible_labels(camera_tf.translation(), candidates);

    let painter = contexts
        .ctx_mut()
        .layer_painter(egui::LayerId::background());
    for (at, name) in labels {
        let Ok(screen) = camera.world_to_viewport(camera_tf, at) else {
            continue;
        };
        painter.text(
            egui::pos2(screen.x, screen.y),
            egui::Align2::CENTER_BOTTOM,
            name,
            egui::FontId::monospace(LABEL_SIZE),
            LABEL_COLOR,
        );
    }
}

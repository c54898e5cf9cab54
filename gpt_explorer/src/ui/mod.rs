mod controls;
mod hud;
pub(crate) mod inspector;

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::camera::{configure_pointer_sets, PointerSet, UiPointerCapture};

pub use controls::{controls_plugin, PanelState};
pub use hud::hud_plugin;
pub use inspector::{inspector_plugin, picking_plugin, CursorRay, HoverSelection};

const ACCENT: egui::Color32 = egui::Color32::from_rgb(100, 220, 180);
const TEXT: egui::Color32 = egui::Color32::from_rgb(200, 220, 240);

/// Tracks whether egui owns the pointer so scene input can stand down.
pub fn pointer_capture_plugin(app: &mut App) {
    configure_pointer_sets(app);
    app.init_resource::<UiPointerCapture>()
        .add_systems(Update, pointer_capture_system.in_set(PointerSet::Capture));
}

fn pointer_capture_system(mut contexts: EguiContexts, mut capture: ResMut<UiPointerCapture>) {
    let ctx = contexts.ctx_mut();
    let over_ui = ctx.is_pointer_over_area() || ctx.wants_pointer_input();
    if capture.0 != over_ui {
        capture.0 = over_ui;
    }
}

fn panel_frame() -> egui::Frame {
    egui::Frame::default()
        .fill(egui::Color32::from_rgba_premultiplied(15, 15, 25, 220))
        .inner_margin(egui::Margin::same(14))
}

fn apply_panel_style(ui: &mut egui::Ui) {
    ui.style_mut().override_text_style = Some(egui::TextStyle::Monospace);
    ui.visuals_mut().override_text_color = Some(TEXT);
}

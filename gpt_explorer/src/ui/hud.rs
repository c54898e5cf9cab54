//! HUD overlay: model hyperparameters, node count, pulse state, FPS counter.

use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::config::{format_params, ModelConfig};
use crate::scene::{AnimationState, SceneRegistry};

pub fn hud_plugin(app: &mut App) {
    if !app.is_plugin_added::<FrameTimeDiagnosticsPlugin>() {
        app.add_plugins(FrameTimeDiagnosticsPlugin);
    }
    app.add_systems(Update, hud_overlay_system);
}

/// Static model summary rows, one per line.
fn model_rows(config: &ModelConfig) -> [String; 3] {
    [
        format!(
            "d_model {}  heads {}  layers {}",
            config.embedding_dim, config.num_heads, config.num_layers
        ),
        format!(
            "vocab {}  ctx {}  ff {}",
            config.vocab_size, config.context_length, config.ff_dim
        ),
        format!("Parameters  {}", format_params(config.total_params())),
    ]
}

fn pulse_label(animation: &AnimationState) -> String {
    if animation.running {
        format!("Pulse  {:.1}x", animation.speed)
    } else {
        "Pulse  paused".to_string()
    }
}

fn hud_overlay_system(
    mut contexts: EguiContexts,
    config: Res<ModelConfig>,
    registry: Res<SceneRegistry>,
    animation: Option<Res<AnimationState>>,
    diagnostics: Res<DiagnosticsStore>,
) {
    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|d| d.smoothed())
        .unwrap_or(0.0);

    egui::Window::new("Model")
        .anchor(egui::Align2::LEFT_BOTTOM, [10.0, -10.0])
        .resizable(false)
        .collapsible(false)
        .title_bar(false)
        .frame(super::panel_frame().corner_radius(egui::CornerRadius::same(6)))
        .show(contexts.ctx_mut(), |ui| {
            super::apply_panel_style(ui);

            ui.label(
                egui::RichText::new("GPT Transformer")
                    .size(16.0)
                    .color(super::ACCENT),
            );
            ui.add_space(4.0);
            for row in model_rows(&config) {
                ui.label(row);
            }
            ui.add_space(4.0);

            ui.separator();
            ui.label(format!("Nodes  {}", registry.len()));
            if let Some(animation) = animation {
                ui.label(pulse_label(&animation));
            }
            ui.label(format!("FPS  {fps:.0}"));
        });
}

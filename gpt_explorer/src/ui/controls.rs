//! Control panel: category toggles, pulse playback, view presets, education mode.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::actions::ControlAction;
use crate::camera::ViewPreset;
use crate::scene::{AnimationState, Category, EducationMode};

const SPEED_RANGE: std::ops::RangeInclusive<f32> = 0.1..=3.0;

/// Collapse state of the two panels and the checkbox values.
#[derive(Resource)]
pub struct PanelState {
    pub control_open: bool,
    pub info_open: bool,
    shown: [bool; Category::COUNT],
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            control_open: true,
            info_open: true,
            shown: [true; Category::COUNT],
        }
    }
}

impl PanelState {
    pub fn is_shown(&self, category: Category) -> bool {
        self.shown[category.index()]
    }

    fn set_shown(&mut self, category: Category, shown: bool) {
        self.shown[category.index()] = shown;
    }
}

pub fn controls_plugin(app: &mut App) {
    app.add_event::<ControlAction>()
        .init_resource::<PanelState>()
        .add_systems(Update, (control_panel_system, panel_toggle_system).chain());
}

fn panel_toggle_system(mut actions: EventReader<ControlAction>, mut panels: ResMut<PanelState>) {
    for action in actions.read() {
        match *action {
            ControlAction::ToggleControlPanel => panels.control_open = !panels.control_open,
            ControlAction::ToggleInfoPanel => panels.info_open = !panels.info_open,
            ControlAction::SetCategoryVisible(category, shown) => {
                panels.set_shown(category, shown);
            }
            _ => {}
        }
    }
}

fn control_panel_system(
    mut contexts: EguiContexts,
    panels: Res<PanelState>,
    animation: Res<AnimationState>,
    education: Res<EducationMode>,
    mut actions: EventWriter<ControlAction>,
) {
    egui::Window::new("GPT Architecture")
        .anchor(egui::Align2::LEFT_TOP, [10.0, 10.0])
        .resizable(false)
        .collapsible(false)
        .title_bar(false)
        .frame(
            egui::Frame::default()
                .fill(egui::Color32::from_rgba_premultiplied(15, 15, 25, 210))
                .inner_margin(egui::Margin::same(12))
                .corner_radius(egui::CornerRadius::same(6)),
        )
        .show(contexts.ctx_mut(), |ui| {
            super::apply_panel_style(ui);

            ui.horizontal(|ui| {
                ui.label(
                    egui::RichText::new("GPT Architecture")
                        .size(16.0)
                        .color(super::ACCENT),
                );
                let toggle = if panels.control_open { "-" } else { "+" };
                if ui.small_button(toggle).clicked() {
                    actions.send(ControlAction::ToggleControlPanel);
                }
                let info = if panels.info_open {
                    "Hide info"
                } else {
                    "Show info"
                };
                if ui.small_button(info).clicked() {
                    actions.send(ControlAction::ToggleInfoPanel);
                }
            });

            if !panels.control_open {
                return;
            }
            ui.add_space(6.0);

            ui.label("Components");
            for category in Category::ALL {
                let mut shown = panels.is_shown(category);
                if ui.checkbox(&mut shown, category.toggle_label()).changed() {
                    actions.send(ControlAction::SetCategoryVisible(category, shown));
                }
            }
            ui.separator();

            ui.label("Animation");
            ui.horizontal(|ui| {
                if ui.button("Play").clicked() {
                    actions.send(ControlAction::Play);
                }
                if ui.button("Pause").clicked() {
                    actions.send(ControlAction::Pause);
                }
                if ui.button("Reset").clicked() {
                    actions.send(ControlAction::Reset);
                }
            });
            let mut speed = animation.speed;
            let slider = egui::Slider::new(&mut speed, SPEED_RANGE)
                .step_by(0.1)
                .text("speed");
            if ui.add(slider).changed() {
                actions.send(ControlAction::SetSpeed(speed));
            }
            ui.separator();

            ui.label("Views");
            ui.horizontal_wrapped(|ui| {
                for preset in ViewPreset::ALL {
                    if ui.button(preset.label()).clicked() {
                        actions.send(ControlAction::ViewPreset(preset));
                    }
                }
            });
            ui.separator();

            if ui.button(education_button_label(education.enabled)).clicked() {
                actions.send(ControlAction::ToggleEducationMode);
            }
        });
}

/// The button names the mode it switches to.
fn education_button_label(enabled: bool) -> &'static str {
    if enabled {
        "Expert Mode"
    } else {
        "Educational Mode"
    }
}

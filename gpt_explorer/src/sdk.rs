//! SDK entry points and builder for composing the visualizer app.

use bevy::prelude::*;
use bevy_egui::EguiPlugin;

use crate::camera::{orbit_camera_plugin, viewport_plugin};
use crate::config::{self, ModelConfig};
use crate::render::{LayeredRenderer, ModelRenderer, RendererResource};
use crate::scene::materials::hex_color;
use crate::scene::{
    animation_plugin, education_plugin, labels_plugin, setup_scene, spawn_model,
    visibility_plugin, SceneRegistry, BACKGROUND,
};
use crate::ui::{controls_plugin, hud_plugin, inspector_plugin, pointer_capture_plugin};

/// Builder for constructing a Strata app with customizable plugins.
pub struct VisualizerBuilder {
    config: Option<ModelConfig>,
    renderer: Option<Box<dyn ModelRenderer>>,
    window_title: String,
    window_resolution: (f32, f32),
    clear_color: Color,
    enable_orbit_camera: bool,
    enable_controls: bool,
    enable_inspector: bool,
    enable_hud: bool,
    enable_labels: bool,
}

impl Default for VisualizerBuilder {
    fn default() -> Self {
        Self {
            config: None,
            renderer: None,
            window_title: "Strata".to_string(),
            window_resolution: (1280.0, 720.0),
            clear_color: hex_color(BACKGROUND),
            enable_orbit_camera: true,
            enable_controls: true,
            enable_inspector: true,
            enable_hud: true,
            enable_labels: true,
        }
    }
}

impl VisualizerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit model shape instead of the environment.
    pub fn config(mut self, config: ModelConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Load the model shape from `GPT_*` environment variables.
    pub fn model_config(mut self) -> Self {
        self.config = Some(config::model_config());
        self
    }

    /// Provide a custom model renderer implementation.
    pub fn renderer(mut self, renderer: impl ModelRenderer) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    pub fn window_title(mut self, title: impl Into<String>) -> Self {
        self.window_title = title.into();
        self
    }

    pub fn window_resolution(mut self, width: f32, height: f32) -> Self {
        self.window_resolution = (width, height);
        self
    }

    pub fn clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    pub fn disable_orbit_camera(mut self) -> Self {
        self.enable_orbit_camera = false;
        self
    }

    pub fn disable_controls(mut self) -> Self {
        self.enable_controls = false;
        self
    }

    pub fn disable_inspector(mut self) -> Self {
        self.enable_inspector = false;
        self
    }

    pub fn disable_hud(mut self) -> Self {
        self.enable_hud = false;
        self
    }

    pub fn disable_labels(mut self) -> Self {
        self.enable_labels = false;
        self
    }

    fn uses_egui(&self) -> bool {
        self.enable_controls || self.enable_inspector || self.enable_hud || self.enable_labels
    }

    /// Build the Bevy app with the selected configuration and plugins.
    pub fn build(self) -> App {
        let uses_egui = self.uses_egui();
        let config = self.config.unwrap_or_else(config::model_config);
        let renderer = self
            .renderer
            .unwrap_or_else(|| Box::new(LayeredRenderer::default()));

        let mut app = App::new();
        app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: self.window_title,
                resolution: self.window_resolution.into(),
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(self.clear_color))
        .insert_resource(config)
        .init_resource::<SceneRegistry>()
        .add_plugins((visibility_plugin, animation_plugin, education_plugin))
        .add_plugins(viewport_plugin)
        .add_systems(Startup, (setup_scene, spawn_model));

        renderer.setup(&mut app);
        app.insert_resource(RendererResource(renderer));

        if self.enable_orbit_camera {
            app.add_plugins(orbit_camera_plugin);
        }
        if uses_egui {
            app.add_plugins(EguiPlugin).add_plugins(pointer_capture_plugin);
        }
        if self.enable_controls {
            app.add_plugins(controls_plugin);
        }
        if self.enable_inspector {
            app.add_plugins(inspector_plugin);
        }
        if self.enable_hud {
            app.add_plugins(hud_plugin);
        }
        if self.enable_labels {
            app.add_plugins(labels_plugin);
        }

        info!("visualizer: app assembled");
        app
    }
}

//! Renderer traits and default implementations.

mod layered;

use bevy::prelude::*;

use crate::config::ModelConfig;
use crate::scene::SceneRegistry;

pub use layered::{
    BlockSettings, ConnectionSettings, EmbeddingSettings, LayeredRenderer, LayeredSettings,
    OutputSettings,
};

/// Builds the model's scene nodes. Every top-level node must be registered in
/// `registry` with its category; structural meshes hang off it as children.
pub trait ModelRenderer: Send + Sync + 'static {
    fn setup(&self, _app: &mut App) {}
    fn spawn_model(
        &self,
        commands: &mut Commands,
        meshes: &mut Assets<Mesh>,
        materials: &mut Assets<StandardMaterial>,
        registry: &mut SceneRegistry,
        config: &ModelConfig,
    );
}

#[derive(Resource)]
pub struct RendererResource(pub Box<dyn ModelRenderer>);

impl RendererResource {
    pub fn new(renderer: impl ModelRenderer) -> Self {
        Self(Box::new(renderer))
    }
}

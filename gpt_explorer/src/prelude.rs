//! Minimal prelude for SDK consumers.

pub use crate::actions::ControlAction;
pub use crate::camera::ViewPreset;
pub use crate::config::{model_config, ModelConfig};
pub use crate::render::{LayeredRenderer, LayeredSettings, ModelRenderer};
pub use crate::scene::{Category, ComponentInfo, SceneRegistry};
pub use crate::sdk::VisualizerBuilder;

//! GPT explorer — a GPT-style transformer as a navigable 3D scene.
//!
//! Library root: scene, camera, UI plugins and the SDK builder.

pub mod actions;
pub mod camera;
pub mod config;
pub mod render;
pub mod scene;
pub mod ui;

pub mod prelude;
pub mod sdk;

pub use actions::ControlAction;
pub use config::ModelConfig;
pub use sdk::VisualizerBuilder;

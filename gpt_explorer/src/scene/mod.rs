pub(crate) mod animation;
pub(crate) mod labels;
pub(crate) mod materials;
pub(crate) mod model;
pub(crate) mod registry;
pub(crate) mod visibility;

pub use animation::{animation_plugin, apply_attention_spin, apply_mlp_pulse, AnimationState};
pub use labels::{education_plugin, labels_plugin, visible_labels, EducationMode, LabelAnchor};
pub use model::{setup_scene, spawn_model, BACKGROUND};
pub use registry::{Category, ComponentInfo, OriginTransform, RegistryError, SceneRegistry};
pub use visibility::{set_category_visible, visibility_plugin};

//! Scene registry: stable string ids → scene node entities, plus node metadata.

use std::collections::HashMap;
use std::fmt;

use bevy::prelude::*;
use thiserror::Error;

/// Functional role of a scene node. Drives bulk show/hide and pulse targeting.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Embedding,
    Attention,
    Normalization,
    Mlp,
    Connection,
    Output,
}

impl Category {
    pub const COUNT: usize = 6;

    pub const ALL: [Category; Category::COUNT] = [
        Category::Embedding,
        Category::Attention,
        Category::Normalization,
        Category::Mlp,
        Category::Connection,
        Category::Output,
    ];

    /// Position in [`Category::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Lowercase tag shown in the info panel's "Type" row.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Embedding => "embedding",
            Category::Attention => "attention",
            Category::Normalization => "normalization",
            Category::Mlp => "mlp",
            Category::Connection => "connection",
            Category::Output => "output",
        }
    }

    /// Checkbox label in the control panel.
    pub fn toggle_label(self) -> &'static str {
        match self {
            Category::Embedding => "Embeddings",
            Category::Attention => "Attention",
            Category::Normalization => "Layer Norm",
            Category::Mlp => "Feed Forward",
            Category::Connection => "Connections",
            Category::Output => "Output",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptive metadata carried by a scene node. Entities without it are
/// transparent to hover selection and delegate to their parent.
#[derive(Component, Clone, Debug, PartialEq)]
pub struct ComponentInfo {
    pub name: String,
    pub category: Category,
    pub description: Option<String>,
    pub parameters: Option<String>,
    pub layer: Option<usize>,
}

impl ComponentInfo {
    pub fn new(name: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            category,
            description: None,
            parameters: None,
            layer: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_parameters(mut self, parameters: impl Into<String>) -> Self {
        self.parameters = Some(parameters.into());
        self
    }

    pub fn with_layer(mut self, layer: usize) -> Self {
        self.layer = Some(layer);
        self
    }
}

/// Recorded rest pose restored by the animation reset.
#[derive(Component, Clone, Copy, Debug)]
pub struct OriginTransform(pub Transform);

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("scene node not found: {0}")]
    NotFound(String),
}

/// Id → entity map of every top-level scene node, in insertion order.
#[derive(Resource, Default)]
pub struct SceneRegistry {
    entries: Vec<(String, Entity, Category)>,
    index: HashMap<String, usize>,
    by_category: HashMap<Category, Vec<usize>>,
}

impl SceneRegistry {
    /// Inserts `entity` under `id`. An existing id is overwritten in place and
    /// keeps its original iteration slot.
    pub fn register(&mut self, id: impl Into<String>, entity: Entity, category: Category) {
        let id = id.into();
        if let Some(&slot) = self.index.get(&id) {
            let previous = self.entries[slot].2;
            if previous != category {
                if let Some(members) = self.by_category.get_mut(&previous) {
                    members.retain(|&s| s != slot);
                }
                self.by_category.entry(category).or_default().push(slot);
            }
            self.entries[slot] = (id, entity, category);
            return;
        }
        let slot = self.entries.len();
        self.index.insert(id.clone(), slot);
        self.by_category.entry(category).or_default().push(slot);
        self.entries.push((id, entity, category));
    }

    pub fn get(&self, id: &str) -> Result<Entity, RegistryError> {
        self.index
            .get(id)
            .map(|&slot| self.entries[slot].1)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Entity)> + '_ {
        self.entries
            .iter()
            .map(|(id, entity, _)| (id.as_str(), *entity))
    }

    /// Entities registered under `category`, in insertion order.
    pub fn entities_in(&self, category: Category) -> impl Iterator<Item = Entity> + '_ {
        self.by_category
            .get(&category)
            .into_iter()
            .flatten()
            .map(|&slot| self.entries[slot].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

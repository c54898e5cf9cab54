//! Category visibility filter driven by the control panel checkboxes.

use bevy::prelude::*;

use crate::actions::ControlAction;
use crate::scene::{Category, SceneRegistry};

pub fn visibility_plugin(app: &mut App) {
    app.add_event::<ControlAction>()
        .add_systems(Update, visibility_filter_system);
}

fn visibility_filter_system(
    mut actions: EventReader<ControlAction>,
    registry: Res<SceneRegistry>,
    mut nodes: Query<&mut Visibility>,
) {
    for action in actions.read() {
        if let ControlAction::SetCategoryVisible(category, visible) = *action {
            set_category_visible(&registry, &mut nodes, category, visible);
        }
    }
}

/// Shows or hides every registered node of `category`. Other categories are untouched.
pub fn set_category_visible(
    registry: &SceneRegistry,
    nodes: &mut Query<&mut Visibility>,
    category: Category,
    visible: bool,
) {
    let value = if visible {
        Visibility::Visible
    } else {
        Visibility::Hidden
    };
    let mut changed = 0usize;
    for entity in registry.entities_in(category) {
        if let Ok(mut vis) = nodes.get_mut(entity) {
            *vis = value;
            changed += 1;
        }
    }
    debug!("visibility: {category} -> {visible} ({changed} nodes)");
}

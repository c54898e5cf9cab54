//! Component inspector: hover a part of the model to see what it is.
//!
//! Uses manual ray vs oriented-box intersection instead of Bevy's mesh picking
//! to avoid input absorption conflicts with bevy_egui. The nearest hit walks up
//! the hierarchy to the first entity carrying [`ComponentInfo`]; meshes without
//! metadata only stand in for their owner.

use bevy::prelude::*;
use bevy::render::primitives::Aabb;
use bevy_egui::{egui, EguiContexts};

use crate::camera::{configure_pointer_sets, PointerSet, UiPointerCapture};
use crate::scene::ComponentInfo;
use crate::ui::PanelState;

/// Latest cursor ray, consumed by the resolver. `None` once handled.
#[derive(Resource, Default)]
pub struct CursorRay(pub Option<Ray3d>);

/// The component shown in the info panel. A miss keeps the previous selection.
#[derive(Resource, Default)]
pub struct HoverSelection {
    pub entity: Option<Entity>,
    pub info: Option<ComponentInfo>,
}

impl HoverSelection {
    fn select(&mut self, entity: Entity, info: &ComponentInfo) {
        if self.entity == Some(entity) {
            return;
        }
        debug!("inspector: hovering {}", info.name);
        self.entity = Some(entity);
        self.info = Some(info.clone());
    }
}

/// Cursor ray + resolver, without any panel.
pub fn picking_plugin(app: &mut App) {
    configure_pointer_sets(app);
    app.init_resource::<CursorRay>()
        .init_resource::<HoverSelection>()
        .init_resource::<UiPointerCapture>()
        .add_systems(
            Update,
            (
                cursor_ray_system.in_set(PointerSet::Scene),
                hover_resolve_system,
            )
                .chain(),
        );
}

pub fn inspector_plugin(app: &mut App) {
    app.add_plugins(picking_plugin)
        .init_resource::<PanelState>()
        .add_systems(Update, info_panel_system);
}

fn cursor_ray_system(
    mut moved: EventReader<CursorMoved>,
    capture: Res<UiPointerCapture>,
    cameras: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    mut cursor_ray: ResMut<CursorRay>,
) {
    let Some(event) = moved.read().last() else {
        return;
    };
    if capture.0 {
        return;
    }
    let Ok((camera, cam_transform)) = cameras.get_single() else {
        return;
    };
    cursor_ray.0 = camera.viewport_to_world(cam_transform, event.position).ok();
}

fn hover_resolve_system(
    mut cursor_ray: ResMut<CursorRay>,
    pickables: Query<(Entity, &GlobalTransform, &Aabb)>,
    parents: Query<&Parent>,
    visibility: Query<&Visibility>,
    infos: Query<&ComponentInfo>,
    mut selection: ResMut<HoverSelection>,
) {
    let Some(ray) = cursor_ray.0.take() else {
        return;
    };
    let parent_of = |e: Entity| parents.get(e).ok().map(Parent::get);

    let candidates = pickables
        .iter()
        .filter(|(entity, _, _)| is_shown(*entity, parent_of, |e| visibility.get(e).ok()));
    let Some((hit, _)) = nearest_hit(ray, candidates) else {
        return;
    };
    let Some(owner) = described_ancestor(hit, parent_of, |e| infos.contains(e)) else {
        return;
    };
    if let Ok(info) = infos.get(owner) {
        selection.select(owner, info);
    }
}

/// Nearest entity whose oriented box the ray enters, with its ray parameter.
pub fn nearest_hit<'a>(
    ray: Ray3d,
    candidates: impl Iterator<Item = (Entity, &'a GlobalTransform, &'a Aabb)>,
) -> Option<(Entity, f32)> {
    let mut best_hit: Option<(Entity, f32)> = None;
    for (entity, transform, aabb) in candidates {
        if let Some(dist) = ray_obb_test(ray, transform, aabb) {
            if best_hit.is_none_or(|(_, d)| dist < d) {
                best_hit = Some((entity, dist));
            }
        }
    }
    best_hit
}

/// Walks `start` and its ancestors, returning the first one `is_described` accepts.
pub fn described_ancestor(
    start: Entity,
    parent_of: impl Fn(Entity) -> Option<Entity>,
    is_described: impl Fn(Entity) -> bool,
) -> Option<Entity> {
    let mut current = Some(start);
    while let Some(entity) = current {
        if is_described(entity) {
            return Some(entity);
        }
        current = parent_of(entity);
    }
    None
}

/// False when the entity or any ancestor is explicitly hidden.
fn is_shown<'a>(
    start: Entity,
    parent_of: impl Fn(Entity) -> Option<Entity>,
    visibility_of: impl Fn(Entity) -> Option<&'a Visibility>,
) -> bool {
    let mut current = Some(start);
    while let Some(entity) = current {
        if visibility_of(entity) == Some(&Visibility::Hidden) {
            return false;
        }
        current = parent_of(entity);
    }
    true
}

/// Tests the ray against the box in the entity's local space, so rotated and
/// scaled nodes pick correctly. The returned parameter is along the world ray.
fn ray_obb_test(ray: Ray3d, transform: &GlobalTransform, aabb: &Aabb) -> Option<f32> {
    let inverse = transform.affine().inverse();
    let origin = inverse.transform_point3(ray.origin);
    let dir = inverse.transform_vector3(*ray.direction);
    if !origin.is_finite() || !dir.is_finite() {
        return None;
    }
    let center: Vec3 = aabb.center.into();
    let half: Vec3 = aabb.half_extents.into();
    ray_aabb_intersect(origin, dir, center - half, center + half)
}

fn ray_aabb_intersect(origin: Vec3, dir: Vec3, aabb_min: Vec3, aabb_max: Vec3) -> Option<f32> {
    let inv_dir = 1.0 / dir;
    let t1 = (aabb_min - origin) * inv_dir;
    let t2 = (aabb_max - origin) * inv_dir;
    let t_min = t1.min(t2);
    let t_max = t1.max(t2);
    let t_enter = t_min.x.max(t_min.y).max(t_min.z);
    let t_exit = t_max.x.min(t_max.y).min(t_max.z);
    if t_enter <= t_exit && t_exit > 0.0 {
        Some(t_enter.max(0.0))
    } else {
        None
    }
}

/// Rows of the specs list: parameters, 1-based layer, type.
pub fn spec_rows(info: &ComponentInfo) -> Vec<(&'static str, String)> {
    let mut rows = Vec::with_capacity(3);
    if let Some(ref parameters) = info.parameters {
        rows.push(("Parameters", parameters.clone()));
    }
    if let Some(layer) = info.layer {
        rows.push(("Layer", (layer + 1).to_string()));
    }
    rows.push(("Type", info.category.to_string()));
    rows
}

pub fn display_name(info: &ComponentInfo) -> &str {
    if info.name.is_empty() {
        "Unknown Component"
    } else {
        &info.name
    }
}

pub fn display_description(info: &ComponentInfo) -> &str {
    info.description
        .as_deref()
        .unwrap_or("No description available")
}

fn info_panel_system(
    mut contexts: EguiContexts,
    selection: Res<HoverSelection>,
    panels: Res<PanelState>,
) {
    if !panels.info_open {
        return;
    }

    egui::SidePanel::right("component_info")
        .default_width(280.0)
        .frame(super::panel_frame())
        .show(contexts.ctx_mut(), |ui| {
            super::apply_panel_style(ui);

            let Some(ref info) = selection.info else {
                ui.label(
                    egui::RichText::new("Component Info")
                        .size(18.0)
                        .color(super::ACCENT),
                );
                ui.add_space(8.0);
                ui.label("Hover over a component to see its details.");
                return;
            };

            ui.label(
                egui::RichText::new(display_name(info))
                    .size(18.0)
                    .color(super::ACCENT),
            );
            ui.add_space(8.0);
            ui.label(display_description(info));
            ui.add_space(8.0);
            ui.separator();

            for (label, value) in spec_rows(info) {
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new(format!("{label}:"))
                            .color(egui::Color32::from_rgb(140, 160, 180)),
                    );
                    ui.label(value);
                });
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Category;

    fn ray_down_from(x: f32, z: f32) -> Ray3d {
        Ray3d {
            origin: Vec3::new(x, 50.0, z),
            direction: Dir3::NEG_Y,
        }
    }

    fn mesh(app: &mut App, parent: Entity, at: Vec3) -> Entity {
        app.world_mut()
            .spawn((
                Transform::from_translation(at),
                GlobalTransform::from_translation(at),
                Aabb::from_min_max(Vec3::splat(-0.5), Vec3::splat(0.5)),
            ))
            .set_parent(parent)
            .id()
    }

    fn picking_app() -> App {
        let mut app = App::new();
        app.add_event::<CursorMoved>().add_plugins(picking_plugin);
        app
    }

    fn hover(app: &mut App, ray: Ray3d) {
        app.world_mut().resource_mut::<CursorRay>().0 = Some(ray);
        app.update();
    }

    fn selected_name(app: &App) -> Option<String> {
        app.world()
            .resource::<HoverSelection>()
            .info
            .as_ref()
            .map(|info| info.name.clone())
    }

    #[test]
    fn ray_hits_box_and_misses_beside_it() {
        let tf = GlobalTransform::from_translation(Vec3::new(0.0, 2.0, 0.0));
        let aabb = Aabb::from_min_max(Vec3::splat(-1.0), Vec3::splat(1.0));

        let hit = ray_obb_test(ray_down_from(0.5, 0.5), &tf, &aabb);
        assert_eq!(hit, Some(47.0));
        assert_eq!(ray_obb_test(ray_down_from(3.0, 0.0), &tf, &aabb), None);
    }

    #[test]
    fn rotated_box_is_tested_in_local_space() {
        // A long thin bar along X, spun 90 degrees so it lies along Z.
        let tf = GlobalTransform::from(
            Transform::from_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)),
        );
        let aabb = Aabb::from_min_max(Vec3::new(-4.0, -0.1, -0.1), Vec3::new(4.0, 0.1, 0.1));

        assert!(ray_obb_test(ray_down_from(0.0, 3.0), &tf, &aabb).is_some());
        assert!(ray_obb_test(ray_down_from(3.0, 0.0), &tf, &aabb).is_none());
    }

    #[test]
    fn ancestry_walk_stops_at_first_described_node() {
        let mut world = World::new();
        let root = world.spawn_empty().id();
        let mid = world.spawn_empty().set_parent(root).id();
        let leaf = world.spawn_empty().set_parent(mid).id();
        let parent_of = |e: Entity| world.get::<Parent>(e).map(Parent::get);

        assert_eq!(described_ancestor(leaf, parent_of, |e| e == root), Some(root));
        assert_eq!(described_ancestor(leaf, parent_of, |e| e == mid), Some(mid));
        assert_eq!(described_ancestor(leaf, parent_of, |_| false), None);
    }

    #[test]
    fn descendant_hit_resolves_to_described_root() {
        let mut app = picking_app();
        let root = app
            .world_mut()
            .spawn((
                ComponentInfo::new("Multi-Head Attention Layer 1", Category::Attention)
                    .with_layer(0),
                Visibility::Visible,
            ))
            .id();
        let head = app.world_mut().spawn(Visibility::Inherited).set_parent(root).id();
        mesh(&mut app, head, Vec3::new(4.0, 0.0, 0.0));
        mesh(&mut app, head, Vec3::new(-4.0, 0.0, 0.0));

        hover(&mut app, ray_down_from(-4.0, 0.0));

        let selection = app.world().resource::<HoverSelection>();
        assert_eq!(selection.entity, Some(root));
        assert_eq!(
            selected_name(&app).as_deref(),
            Some("Multi-Head Attention Layer 1")
        );
    }

    #[test]
    fn miss_keeps_previous_selection() {
        let mut app = picking_app();
        let norm = app
            .world_mut()
            .spawn(ComponentInfo::new(
                "Layer Normalization 1",
                Category::Normalization,
            ))
            .id();
        mesh(&mut app, norm, Vec3::ZERO);

        hover(&mut app, ray_down_from(0.0, 0.0));
        assert_eq!(selected_name(&app).as_deref(), Some("Layer Normalization 1"));

        hover(&mut app, ray_down_from(30.0, 30.0));
        assert_eq!(selected_name(&app).as_deref(), Some("Layer Normalization 1"));
    }

    #[test]
    fn undescribed_hit_keeps_previous_selection() {
        let mut app = picking_app();
        let output = app
            .world_mut()
            .spawn(ComponentInfo::new("Output Layer", Category::Output))
            .id();
        mesh(&mut app, output, Vec3::ZERO);
        let orphan = app.world_mut().spawn_empty().id();
        mesh(&mut app, orphan, Vec3::new(10.0, 0.0, 0.0));

        hover(&mut app, ray_down_from(0.0, 0.0));
        hover(&mut app, ray_down_from(10.0, 0.0));

        assert_eq!(selected_name(&app).as_deref(), Some("Output Layer"));
    }

    #[test]
    fn nearest_hit_wins_and_hidden_nodes_are_skipped() {
        let mut app = picking_app();
        let upper = app
            .world_mut()
            .spawn((
                ComponentInfo::new("Feed Forward Layer 1", Category::Mlp),
                Visibility::Visible,
            ))
            .id();
        let lower = app
            .world_mut()
            .spawn((
                ComponentInfo::new("Layer Normalization 1", Category::Normalization),
                Visibility::Visible,
            ))
            .id();
        mesh(&mut app, upper, Vec3::new(0.0, 1.0, 0.0));
        mesh(&mut app, lower, Vec3::new(0.0, -1.0, 0.0));

        hover(&mut app, ray_down_from(0.0, 0.0));
        assert_eq!(selected_name(&app).as_deref(), Some("Feed Forward Layer 1"));

        app.world_mut().entity_mut(upper).insert(Visibility::Hidden);
        hover(&mut app, ray_down_from(0.0, 0.0));
        assert_eq!(selected_name(&app).as_deref(), Some("Layer Normalization 1"));
    }

    #[test]
    fn empty_scene_is_not_an_error() {
        let mut app = picking_app();
        hover(&mut app, ray_down_from(0.0, 0.0));
        assert!(app.world().resource::<HoverSelection>().info.is_none());
    }

    #[test]
    fn spec_rows_show_one_based_layer_and_type() {
        let info = ComponentInfo::new("Feed Forward Layer 3", Category::Mlp).with_layer(2);
        assert_eq!(
            spec_rows(&info),
            vec![("Layer", "3".to_string()), ("Type", "mlp".to_string())]
        );

        let info = ComponentInfo::new("Token Embedding", Category::Embedding)
            .with_parameters("38.6M");
        assert_eq!(
            spec_rows(&info),
            vec![
                ("Parameters", "38.6M".to_string()),
                ("Type", "embedding".to_string())
            ]
        );
    }

    #[test]
    fn missing_text_falls_back() {
        let info = ComponentInfo::new("", Category::Connection);
        assert_eq!(display_name(&info), "Unknown Component");
        assert_eq!(display_description(&info), "No description available");
    }
}

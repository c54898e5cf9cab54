use std::f32::consts::TAU;

use bevy::prelude::*;

use crate::config::{format_params, ModelConfig};
use crate::render::ModelRenderer;
use crate::scene::materials::{
    self, BRICK, CORAL, CREAM, CYAN, DEEP_TEAL, MUSTARD, PEACH, PLUM, RUST, SLATE, TEAL,
};
use crate::scene::{Category, ComponentInfo, LabelAnchor, SceneRegistry};

#[derive(Clone, Debug)]
pub struct EmbeddingSettings {
    pub slab_size: Vec3,
    pub slab_y: f32,
    pub token_count: usize,
    pub token_size: f32,
    pub token_y: f32,
    pub token_spread: Vec2,
    pub ellipse_radii: Vec2,
    pub ellipse_y: f32,
    pub ellipse_segments: usize,
    pub marker_count: usize,
    pub marker_radius: f32,
    pub marker_step: f32,
}

#[derive(Clone, Debug)]
pub struct BlockSettings {
    pub base_y: f32,
    pub layer_spacing: f32,
    pub head_radius: f32,
    pub qkv_size: f32,
    pub norm_offset: f32,
    pub norm_radius: f32,
    pub norm_thickness: f32,
    pub mlp_offset: f32,
    pub mlp_size: Vec3,
    pub expand_size: Vec3,
    pub expand_lift: f32,
    pub residual_x: f32,
}

impl BlockSettings {
    pub fn layer_y(&self, layer: usize) -> f32 {
        self.base_y + layer as f32 * self.layer_spacing
    }
}

#[derive(Clone, Debug)]
pub struct OutputSettings {
    pub y: f32,
    pub size: Vec3,
    pub bar_count: usize,
    pub bar_width: f32,
    pub bar_y: f32,
    pub bar_spacing: f32,
}

#[derive(Clone, Debug)]
pub struct ConnectionSettings {
    pub line_radius: f32,
    pub flow_radius: f32,
}

#[derive(Clone, Debug)]
pub struct LayeredSettings {
    pub embedding: EmbeddingSettings,
    pub block: BlockSettings,
    pub output: OutputSettings,
    pub connections: ConnectionSettings,
}

impl Default for LayeredSettings {
    fn default() -> Self {
        Self {
            embedding: EmbeddingSettings {
                slab_size: Vec3::new(8.0, 1.0, 6.0),
                slab_y: -15.0,
                token_count: 20,
                token_size: 0.3,
                token_y: -13.0,
                token_spread: Vec2::new(10.0, 8.0),
                ellipse_radii: Vec2::new(6.0, 3.0),
                ellipse_y: -12.0,
                ellipse_segments: 50,
                marker_count: 10,
                marker_radius: 0.1,
                marker_step: 0.6,
            },
            block: BlockSettings {
                base_y: -8.0,
                layer_spacing: 3.0,
                head_radius: 4.0,
                qkv_size: 0.5,
                norm_offset: 0.5,
                norm_radius: 2.0,
                norm_thickness: 0.2,
                mlp_offset: 1.0,
                mlp_size: Vec3::new(3.0, 1.0, 2.0),
                expand_size: Vec3::new(4.0, 0.5, 2.5),
                expand_lift: 0.3,
                residual_x: -5.0,
            },
            output: OutputSettings {
                y: 12.0,
                size: Vec3::new(10.0, 2.0, 4.0),
                bar_count: 20,
                bar_width: 0.3,
                bar_y: 14.0,
                bar_spacing: 0.4,
            },
            connections: ConnectionSettings {
                line_radius: 0.04,
                flow_radius: 0.08,
            },
        }
    }
}

/// Embeddings at the bottom, one horizontal band per transformer block, output on top.
#[derive(Default)]
pub struct LayeredRenderer {
    pub settings: LayeredSettings,
}

/// Shared handles so a layer with many heads doesn't allocate per mesh.
struct Palette {
    cube: Handle<Mesh>,
    query: Handle<StandardMaterial>,
    key: Handle<StandardMaterial>,
    value: Handle<StandardMaterial>,
    head_link: Handle<StandardMaterial>,
    norm: Handle<StandardMaterial>,
    mlp: Handle<StandardMaterial>,
    expand: Handle<StandardMaterial>,
    residual: Handle<StandardMaterial>,
}

impl ModelRenderer for LayeredRenderer {
    fn spawn_model(
        &self,
        commands: &mut Commands,
        meshes: &mut Assets<Mesh>,
        materials: &mut Assets<StandardMaterial>,
        registry: &mut SceneRegistry,
        config: &ModelConfig,
    ) {
        let block = &self.settings.block;
        let palette = Palette {
            cube: meshes.add(Cuboid::from_length(block.qkv_size)),
            query: materials::solid(materials, SLATE),
            key: materials::solid(materials, CORAL),
            value: materials::solid(materials, MUSTARD),
            head_link: materials::line(materials, RUST, 0.3),
            norm: materials::translucent(materials, PLUM, 0.7),
            mlp: materials::translucent(materials, DEEP_TEAL, 0.8),
            expand: materials::translucent(materials, TEAL, 0.5),
            residual: materials::line(materials, PEACH, 1.0),
        };

        self.spawn_token_embedding(commands, meshes, materials, registry, config);
        self.spawn_positional_embedding(commands, meshes, materials, registry, config);
        for layer in 0..config.num_layers {
            let y = block.layer_y(layer);
            self.spawn_attention(commands, meshes, &palette, registry, config, layer, y);
            self.spawn_layer_norm(commands, meshes, &palette, registry, config, layer, y);
            self.spawn_feed_forward(commands, meshes, &palette, registry, config, layer, y);
            self.spawn_residual(commands, meshes, &palette, registry, layer, y);
        }
        self.spawn_output(commands, meshes, materials, registry, config);
        self.spawn_data_flow(commands, meshes, materials, registry, config);

        info!(
            "scene: {} nodes for {} layers x {} heads",
            registry.len(),
            config.num_layers,
            config.num_heads
        );
    }
}

impl LayeredRenderer {
    fn spawn_token_embedding(
        &self,
        commands: &mut Commands,
        meshes: &mut Assets<Mesh>,
        materials: &mut Assets<StandardMaterial>,
        registry: &mut SceneRegistry,
        config: &ModelConfig,
    ) {
        let s = &self.settings.embedding;
        let slab_material = materials::translucent(materials, TEAL, 0.8);
        let token_material = materials::solid(materials, PEACH);
        let slab_mesh = meshes.add(Cuboid::from_size(s.slab_size));
        let token_mesh = meshes.add(Cuboid::from_length(s.token_size));

        let info = ComponentInfo::new("Token Embedding", Category::Embedding)
            .with_description("Converts input tokens to dense vector representations")
            .with_parameters(format_params(config.token_embedding_params()));
        let anchor = Vec3::new(0.0, s.slab_y - 1.5, s.slab_size.z / 2.0);
        spawn_node(commands, registry, "token-embedding", info, anchor).with_children(|parent| {
            parent.spawn((
                Mesh3d(slab_mesh),
                MeshMaterial3d(slab_material),
                Transform::from_xyz(0.0, s.slab_y, 0.0),
            ));
            for i in 0..s.token_count {
                let p = scatter(i, s.token_spread);
                parent.spawn((
                    Mesh3d(token_mesh.clone()),
                    MeshMaterial3d(token_material.clone()),
                    Transform::from_xyz(p.x, s.token_y, p.y),
                ));
            }
        });
    }

    fn spawn_positional_embedding(
        &self,
        commands: &mut Commands,
        meshes: &mut Assets<Mesh>,
        materials: &mut Assets<StandardMaterial>,
        registry: &mut SceneRegistry,
        config: &ModelConfig,
    ) {
        let s = &self.settings.embedding;
        let radius = self.settings.connections.line_radius;
        let ring_material = materials::line(materials, BRICK, 1.0);
        let marker_material = materials::solid(materials, CREAM);
        let marker_mesh = meshes.add(Sphere::new(s.marker_radius));
        let ring = ellipse_points(s.ellipse_radii, s.ellipse_y, s.ellipse_segments);

        let info = ComponentInfo::new("Positional Embedding", Category::Embedding)
            .with_description("Adds position information to token embeddings")
            .with_parameters(format_params(config.positional_embedding_params()));
        let anchor = Vec3::new(s.ellipse_radii.x + 1.5, s.ellipse_y, 0.0);
        spawn_node(commands, registry, "positional-embedding", info, anchor).with_children(
            |parent| {
                polyline(parent, meshes, &ring_material, &ring, radius);
                for i in 0..s.marker_count {
                    let angle = i as f32 * s.marker_step;
                    parent.spawn((
                        Mesh3d(marker_mesh.clone()),
                        MeshMaterial3d(marker_material.clone()),
                        Transform::from_xyz(
                            angle.cos() * s.ellipse_radii.x,
                            s.ellipse_y,
                            angle.sin() * s.ellipse_radii.y,
                        ),
                    ));
                }
            },
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn spawn_attention(
        &self,
        commands: &mut Commands,
        meshes: &mut Assets<Mesh>,
        palette: &Palette,
        registry: &mut SceneRegistry,
        config: &ModelConfig,
        layer: usize,
        y: f32,
    ) {
        let s = &self.settings.block;
        let radius = self.settings.connections.line_radius;
        let info = ComponentInfo::new(
            format!("Multi-Head Attention Layer {}", layer + 1),
            Category::Attention,
        )
        .with_description("Parallel attention mechanisms capturing different relationships")
        .with_parameters(format_params(config.attention_params()))
        .with_layer(layer);
        let anchor = Vec3::new(s.head_radius + 2.0, y, 0.0);
        let id = format!("attention-{layer}");

        spawn_node(commands, registry, id, info, anchor).with_children(|parent| {
            for head in 0..config.num_heads {
                let [q, k, v] = head_positions(head, config.num_heads, s.head_radius, y);
                parent
                    .spawn((Transform::default(), Visibility::Inherited))
                    .with_children(|head_group| {
                        for (position, material) in
                            [(q, &palette.query), (k, &palette.key), (v, &palette.value)]
                        {
                            head_group.spawn((
                                Mesh3d(palette.cube.clone()),
                                MeshMaterial3d(material.clone()),
                                Transform::from_translation(position),
                            ));
                        }
                        let center = Vec3::new(0.0, y, 0.0);
                        polyline(
                            head_group,
                            meshes,
                            &palette.head_link,
                            &[center, q, k, v],
                            radius,
                        );
                    });
            }
        });
    }

    #[allow(clippy::too_many_arguments)]
    fn spawn_layer_norm(
        &self,
        commands: &mut Commands,
        meshes: &mut Assets<Mesh>,
        palette: &Palette,
        registry: &mut SceneRegistry,
        config: &ModelConfig,
        layer: usize,
        y: f32,
    ) {
        let s = &self.settings.block;
        let y = y + s.norm_offset;
        let disc = meshes.add(Cylinder::new(s.norm_radius, s.norm_thickness));
        let info = ComponentInfo::new(
            format!("Layer Normalization {}", layer + 1),
            Category::Normalization,
        )
        .with_description("Stabilizes training and improves convergence")
        .with_parameters(format_params(config.layer_norm_params()))
        .with_layer(layer);
        let anchor = Vec3::new(0.0, y, s.norm_radius + 1.0);

        spawn_node(commands, registry, format!("layernorm-{layer}"), info, anchor).with_children(
            |parent| {
                parent.spawn((
                    Mesh3d(disc),
                    MeshMaterial3d(palette.norm.clone()),
                    Transform::from_xyz(0.0, y, 0.0),
                ));
            },
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn spawn_feed_forward(
        &self,
        commands: &mut Commands,
        meshes: &mut Assets<Mesh>,
        palette: &Palette,
        registry: &mut SceneRegistry,
        config: &ModelConfig,
        layer: usize,
        y: f32,
    ) {
        let s = &self.settings.block;
        let y = y + s.mlp_offset;
        let core = meshes.add(Cuboid::from_size(s.mlp_size));
        let expand = meshes.add(Cuboid::from_size(s.expand_size));
        let info = ComponentInfo::new(
            format!("Feed Forward Layer {}", layer + 1),
            Category::Mlp,
        )
        .with_description("Two-layer neural network with GELU activation")
        .with_parameters(format_params(config.feed_forward_params()))
        .with_layer(layer);
        let anchor = Vec3::new(s.expand_size.x / 2.0 + 1.0, y, 0.0);

        spawn_node(commands, registry, format!("feedforward-{layer}"), info, anchor)
            .with_children(|parent| {
                parent.spawn((
                    Mesh3d(core),
                    MeshMaterial3d(palette.mlp.clone()),
                    Transform::from_xyz(0.0, y, 0.0),
                ));
                parent.spawn((
                    Mesh3d(expand),
                    MeshMaterial3d(palette.expand.clone()),
                    Transform::from_xyz(0.0, y + s.expand_lift, 0.0),
                ));
            });
    }

    fn spawn_residual(
        &self,
        commands: &mut Commands,
        meshes: &mut Assets<Mesh>,
        palette: &Palette,
        registry: &mut SceneRegistry,
        layer: usize,
        y: f32,
    ) {
        let s = &self.settings.block;
        let radius = self.settings.connections.line_radius;
        let points = residual_points(s.residual_x, y);
        let info = ComponentInfo::new(
            format!("Residual Connection {}", layer + 1),
            Category::Connection,
        )
        .with_description("Skip connection for gradient flow")
        .with_layer(layer);
        let anchor = Vec3::new(s.residual_x - 2.0, y + 0.75, 0.0);

        spawn_node(commands, registry, format!("residual-{layer}"), info, anchor).with_children(
            |parent| {
                polyline(parent, meshes, &palette.residual, &points, radius);
            },
        );
    }

    fn spawn_output(
        &self,
        commands: &mut Commands,
        meshes: &mut Assets<Mesh>,
        materials: &mut Assets<StandardMaterial>,
        registry: &mut SceneRegistry,
        config: &ModelConfig,
    ) {
        let s = &self.settings.output;
        let body_material = materials::translucent(materials, BRICK, 0.8);
        let bar_material = materials::solid(materials, CREAM);
        let body = meshes.add(Cuboid::from_size(s.size));
        let info = ComponentInfo::new("Output Layer", Category::Output)
            .with_description("Final projection to vocabulary size for token prediction")
            .with_parameters(format_params(config.output_params()));
        let anchor = Vec3::new(s.size.x / 2.0 + 1.5, s.y, 0.0);

        spawn_node(commands, registry, "output-layer", info, anchor).with_children(|parent| {
            parent.spawn((
                Mesh3d(body),
                MeshMaterial3d(body_material),
                Transform::from_xyz(0.0, s.y, 0.0),
            ));
            let half = s.bar_count as f32 / 2.0;
            for i in 0..s.bar_count {
                let height = bar_height(i);
                parent.spawn((
                    Mesh3d(meshes.add(Cuboid::new(s.bar_width, height, s.bar_width))),
                    MeshMaterial3d(bar_material.clone()),
                    Transform::from_xyz((i as f32 - half) * s.bar_spacing, s.bar_y, 0.0),
                ));
            }
        });
    }

    fn spawn_data_flow(
        &self,
        commands: &mut Commands,
        meshes: &mut Assets<Mesh>,
        materials: &mut Assets<StandardMaterial>,
        registry: &mut SceneRegistry,
        config: &ModelConfig,
    ) {
        let radius = self.settings.connections.flow_radius;
        let material = materials::line(materials, CYAN, 0.7);

        for (index, (from, to)) in self.data_flow_segments(config).into_iter().enumerate() {
            let info = ComponentInfo::new(
                format!("Data Flow Connection {}", index + 1),
                Category::Connection,
            );
            let anchor = (from + to) / 2.0 + Vec3::X * 1.5;
            spawn_node(commands, registry, format!("connection-{index}"), info, anchor)
                .with_children(|parent| {
                    segment(parent, meshes, &material, from, to, radius);
                });
        }
    }

    /// Token → positional → first block, and last block → output.
    pub fn data_flow_segments(&self, config: &ModelConfig) -> [(Vec3, Vec3); 3] {
        let embedding = &self.settings.embedding;
        let block = &self.settings.block;
        let last_layer = config.num_layers.saturating_sub(1);
        let at = |y: f32| Vec3::new(0.0, y, 0.0);
        [
            (at(embedding.slab_y), at(embedding.ellipse_y)),
            (at(embedding.ellipse_y), at(block.base_y)),
            (at(block.layer_y(last_layer)), at(self.settings.output.y)),
        ]
    }
}

fn spawn_node<'a>(
    commands: &'a mut Commands,
    registry: &mut SceneRegistry,
    id: impl Into<String>,
    info: ComponentInfo,
    anchor: Vec3,
) -> EntityCommands<'a> {
    let id = id.into();
    let category = info.category;
    let entity = commands.spawn((
        Name::new(id.clone()),
        category,
        info,
        LabelAnchor(anchor),
        Transform::default(),
        Visibility::Visible,
    ));
    registry.register(id, entity.id(), category);
    entity
}

/// A thin cylinder from `from` to `to`. Zero-length spans are skipped.
fn segment(
    parent: &mut ChildBuilder,
    meshes: &mut Assets<Mesh>,
    material: &Handle<StandardMaterial>,
    from: Vec3,
    to: Vec3,
    radius: f32,
) {
    let span = to - from;
    let length = span.length();
    if length <= f32::EPSILON {
        return;
    }
    parent.spawn((
        Mesh3d(meshes.add(Cylinder::new(radius, length))),
        MeshMaterial3d(material.clone()),
        Transform::from_translation(from + span / 2.0)
            .with_rotation(Quat::from_rotation_arc(Vec3::Y, span / length)),
    ));
}

fn polyline(
    parent: &mut ChildBuilder,
    meshes: &mut Assets<Mesh>,
    material: &Handle<StandardMaterial>,
    points: &[Vec3],
    radius: f32,
) {
    for pair in points.windows(2) {
        segment(parent, meshes, material, pair[0], pair[1], radius);
    }
}

/// Q, K and V cube centers for one head on the layer's ring.
pub fn head_positions(head: usize, num_heads: usize, radius: f32, y: f32) -> [Vec3; 3] {
    let angle = head as f32 / num_heads.max(1) as f32 * TAU;
    let on_ring = |a: f32| Vec3::new(a.cos() * radius, y, a.sin() * radius);
    [on_ring(angle), on_ring(angle + 0.5), on_ring(angle + 1.0)]
}

/// Closed ellipse in the XZ plane at height `y`.
pub fn ellipse_points(radii: Vec2, y: f32, segments: usize) -> Vec<Vec3> {
    let segments = segments.max(3);
    (0..=segments)
        .map(|i| {
            let a = i as f32 / segments as f32 * TAU;
            Vec3::new(a.cos() * radii.x, y, a.sin() * radii.y)
        })
        .collect()
}

/// Bracket on the left of a block, from just below it to the next block.
pub fn residual_points(x: f32, y: f32) -> [Vec3; 4] {
    [
        Vec3::new(x, y - 0.5, 0.0),
        Vec3::new(x - 1.0, y, 0.0),
        Vec3::new(x - 1.0, y + 1.5, 0.0),
        Vec3::new(x, y + 2.0, 0.0),
    ]
}

/// Deterministic low-discrepancy scatter over a centered `spread` rectangle.
fn scatter(i: usize, spread: Vec2) -> Vec2 {
    let n = i as f32 + 1.0;
    let u = (n * 0.618_034).fract();
    let v = (n * 0.754_878).fract();
    Vec2::new((u - 0.5) * spread.x, (v - 0.5) * spread.y)
}

/// Softmax bar heights in [0.5, 2.5).
fn bar_height(i: usize) -> f32 {
    0.5 + 2.0 * ((i as f32 + 1.0) * 0.436_21).fract()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RendererResource;
    use crate::scene::spawn_model;

    fn spawn_app(config: ModelConfig) -> App {
        let mut app = App::new();
        app.init_resource::<Assets<Mesh>>()
            .init_resource::<Assets<StandardMaterial>>()
            .init_resource::<SceneRegistry>()
            .insert_resource(config)
            .insert_resource(RendererResource::new(LayeredRenderer::default()))
            .add_systems(Startup, spawn_model);
        app.update();
        app
    }

    fn node(app: &App, id: &str) -> Entity {
        app.world().resource::<SceneRegistry>().get(id).unwrap()
    }

    fn info(app: &App, id: &str) -> ComponentInfo {
        app.world()
            .get::<ComponentInfo>(node(app, id))
            .unwrap()
            .clone()
    }

    fn child_count(app: &App, entity: Entity) -> usize {
        app.world()
            .get::<Children>(entity)
            .map_or(0, |children| children.len())
    }

    #[test]
    fn default_model_registers_every_component_in_order() {
        let app = spawn_app(ModelConfig::default());
        let registry = app.world().resource::<SceneRegistry>();

        assert_eq!(registry.len(), 2 + 6 * 4 + 1 + 3);
        let ids: Vec<&str> = registry.iter().map(|(id, _)| id).collect();
        assert_eq!(
            &ids[..6],
            [
                "token-embedding",
                "positional-embedding",
                "attention-0",
                "layernorm-0",
                "feedforward-0",
                "residual-0"
            ]
        );
        assert_eq!(
            &ids[ids.len() - 4..],
            ["output-layer", "connection-0", "connection-1", "connection-2"]
        );
        assert_eq!(registry.entities_in(Category::Attention).count(), 6);
        assert_eq!(registry.entities_in(Category::Connection).count(), 6 + 3);
    }

    #[test]
    fn attention_has_one_group_per_head() {
        let app = spawn_app(ModelConfig {
            num_heads: 4,
            num_layers: 2,
            ..default()
        });

        let attention = node(&app, "attention-1");
        assert_eq!(child_count(&app, attention), 4);
        let children = app.world().get::<Children>(attention).unwrap();
        // q, k, v cubes + three connector segments
        assert_eq!(child_count(&app, children[0]), 6);
        assert!(app.world().get::<ComponentInfo>(children[0]).is_none());
    }

    #[test]
    fn metadata_follows_the_model() {
        let app = spawn_app(ModelConfig::default());

        let token = info(&app, "token-embedding");
        assert_eq!(token.parameters.as_deref(), Some("38.6M"));
        assert_eq!(token.category, Category::Embedding);

        let ff = info(&app, "feedforward-5");
        assert_eq!(ff.name, "Feed Forward Layer 6");
        assert_eq!(ff.layer, Some(5));
        assert_eq!(ff.category, Category::Mlp);

        let flow = info(&app, "connection-2");
        assert_eq!(flow.name, "Data Flow Connection 3");
        assert!(flow.description.is_none());
    }

    #[test]
    fn data_flow_reaches_top_block() {
        let renderer = LayeredRenderer::default();
        let segments = renderer.data_flow_segments(&ModelConfig::default());
        assert_eq!(segments[2].0, Vec3::new(0.0, 7.0, 0.0));
        assert_eq!(segments[2].1, Vec3::new(0.0, 12.0, 0.0));

        let shallow = renderer.data_flow_segments(&ModelConfig {
            num_layers: 0,
            ..default()
        });
        assert_eq!(shallow[2].0, Vec3::new(0.0, -8.0, 0.0));
    }

    #[test]
    fn heads_are_spread_around_the_ring() {
        let [q0, k0, _] = head_positions(0, 12, 4.0, -8.0);
        assert!(q0.abs_diff_eq(Vec3::new(4.0, -8.0, 0.0), 1e-5));
        assert!((Vec2::new(k0.x, k0.z).length() - 4.0).abs() < 1e-5);

        let [q3, _, _] = head_positions(3, 12, 4.0, -8.0);
        assert!(q3.abs_diff_eq(Vec3::new(0.0, -8.0, 4.0), 1e-5));
    }

    #[test]
    fn scatter_stays_inside_spread() {
        let spread = Vec2::new(10.0, 8.0);
        for i in 0..100 {
            let p = scatter(i, spread);
            assert!(p.x.abs() <= 5.0 && p.y.abs() <= 4.0);
        }
        for i in 0..20 {
            assert!((0.5..2.5).contains(&bar_height(i)));
        }
    }

    #[test]
    fn ellipse_is_closed() {
        let ring = ellipse_points(Vec2::new(6.0, 3.0), -12.0, 50);
        assert_eq!(ring.len(), 51);
        assert!(ring[0].abs_diff_eq(ring[50], 1e-4));
    }
}

use std::time::Duration;

use bevy::prelude::*;
use gpt_explorer::prelude::*;
use gpt_explorer::render::RendererResource;
use gpt_explorer::scene::{
    animation_plugin, education_plugin, spawn_model, visibility_plugin, AnimationState,
    EducationMode,
};

const EPS: f32 = 1e-4;

fn model_app(config: ModelConfig) -> App {
    let mut app = App::new();
    app.init_resource::<Time>()
        .init_resource::<Assets<Mesh>>()
        .init_resource::<Assets<StandardMaterial>>()
        .init_resource::<SceneRegistry>()
        .insert_resource(config)
        .insert_resource(RendererResource::new(LayeredRenderer::default()))
        .add_plugins((visibility_plugin, animation_plugin, education_plugin))
        .add_systems(Startup, spawn_model);
    app.update();
    app
}

fn node(app: &App, id: &str) -> Entity {
    app.world().resource::<SceneRegistry>().get(id).unwrap()
}

fn visibility(app: &App, id: &str) -> Visibility {
    *app.world().get::<Visibility>(node(app, id)).unwrap()
}

fn transform(app: &App, id: &str) -> Transform {
    *app.world().get::<Transform>(node(app, id)).unwrap()
}

fn step(app: &mut App, secs: f32) {
    app.world_mut()
        .resource_mut::<Time>()
        .advance_by(Duration::from_secs_f32(secs));
    app.update();
}

#[test]
fn env_sized_model_builds_every_layer() {
    let app = model_app(ModelConfig {
        num_layers: 3,
        num_heads: 4,
        ..Default::default()
    });
    let registry = app.world().resource::<SceneRegistry>();

    assert_eq!(registry.len(), 2 + 3 * 4 + 1 + 3);
    assert!(registry.get("feedforward-2").is_ok());
    assert!(registry.get("feedforward-3").is_err());
    assert_eq!(registry.entities_in(Category::Mlp).count(), 3);
}

#[test]
fn hiding_a_category_leaves_the_rest_alone() {
    let mut app = model_app(ModelConfig::default());

    app.world_mut()
        .send_event(ControlAction::SetCategoryVisible(Category::Attention, false));
    app.update();

    assert_eq!(visibility(&app, "attention-0"), Visibility::Hidden);
    assert_eq!(visibility(&app, "attention-5"), Visibility::Hidden);
    assert_eq!(visibility(&app, "feedforward-0"), Visibility::Visible);
    assert_eq!(visibility(&app, "token-embedding"), Visibility::Visible);

    app.world_mut()
        .send_event(ControlAction::SetCategoryVisible(Category::Attention, true));
    app.update();
    assert_eq!(visibility(&app, "attention-3"), Visibility::Visible);
}

#[test]
fn pulse_drives_hidden_attention_and_feed_forward() {
    let mut app = model_app(ModelConfig::default());

    app.world_mut()
        .send_event(ControlAction::SetCategoryVisible(Category::Attention, false));
    app.update();

    app.world_mut().send_event(ControlAction::Play);
    step(&mut app, 2.0);

    let (yaw, _, _) = transform(&app, "attention-0").rotation.to_euler(EulerRot::YXZ);
    assert!((yaw - 1.0).abs() < EPS);
    let pulse = transform(&app, "feedforward-4").scale.y;
    assert!((pulse - (1.0 + 4f32.sin() * 0.1)).abs() < EPS);
    assert_eq!(transform(&app, "layernorm-0"), Transform::default());
    assert_eq!(transform(&app, "output-layer"), Transform::default());
}

#[test]
fn reset_pauses_without_moving_unrecorded_nodes() {
    let mut app = model_app(ModelConfig::default());

    app.world_mut().send_event(ControlAction::Play);
    step(&mut app, 1.0);
    let spun = transform(&app, "attention-2");

    app.world_mut().send_event(ControlAction::Reset);
    step(&mut app, 1.0);

    assert!(!app.world().resource::<AnimationState>().running);
    assert_eq!(transform(&app, "attention-2"), spun);
}

#[test]
fn education_mode_toggles_from_the_panel_action() {
    let mut app = model_app(ModelConfig::default());

    app.world_mut().send_event(ControlAction::ToggleEducationMode);
    app.update();

    assert!(app.world().resource::<EducationMode>().enabled);
}

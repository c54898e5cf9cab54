use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy::window::WindowResized;
use gpt_explorer::camera::{
    orbit_camera_plugin, viewport_plugin, OrbitController, UiPointerCapture, MIN_DISTANCE,
};
use gpt_explorer::prelude::*;

const EPS: f32 = 1e-3;

fn camera_app() -> (App, Entity) {
    let mut app = App::new();
    app.add_event::<MouseMotion>()
        .add_event::<MouseWheel>()
        .add_event::<WindowResized>()
        .init_resource::<ButtonInput<MouseButton>>()
        .add_plugins((orbit_camera_plugin, viewport_plugin));
    let camera = app
        .world_mut()
        .spawn((
            Camera3d::default(),
            Projection::Perspective(PerspectiveProjection::default()),
            Transform::default(),
        ))
        .id();
    (app, camera)
}

fn camera_translation(app: &App, camera: Entity) -> Vec3 {
    app.world().get::<Transform>(camera).unwrap().translation
}

#[test]
fn preset_cut_holds_across_frames() {
    let (mut app, camera) = camera_app();
    app.update();

    app.world_mut()
        .send_event(ControlAction::ViewPreset(ViewPreset::Flow));
    app.update();
    for _ in 0..30 {
        app.update();
    }

    let eye = camera_translation(&app, camera);
    assert!(eye.abs_diff_eq(Vec3::new(15.0, 5.0, 15.0), EPS));
    let forward = *app.world().get::<Transform>(camera).unwrap().forward();
    assert!(forward.abs_diff_eq(-eye.normalize(), EPS));
}

#[test]
fn wheel_zoom_is_clamped_and_eased() {
    let (mut app, camera) = camera_app();
    let window = app.world_mut().spawn_empty().id();
    for y in [-50.0, -6_000.0, 10_000.0] {
        app.world_mut().send_event(MouseWheel {
            unit: MouseScrollUnit::Pixel,
            x: 0.0,
            y,
            window,
        });
    }
    app.update();
    assert_eq!(
        app.world().resource::<OrbitController>().target_distance,
        MIN_DISTANCE
    );

    for _ in 0..400 {
        app.update();
    }
    let eye = camera_translation(&app, camera);
    assert!((eye.z - MIN_DISTANCE).abs() < EPS);
}

#[test]
fn panel_hover_blocks_new_gestures() {
    let (mut app, _) = camera_app();
    app.world_mut().resource_mut::<UiPointerCapture>().0 = true;

    app.world_mut()
        .resource_mut::<ButtonInput<MouseButton>>()
        .press(MouseButton::Left);
    app.world_mut().send_event(MouseMotion {
        delta: Vec2::new(200.0, 0.0),
    });
    app.update();

    assert_eq!(app.world().resource::<OrbitController>().target_x, 0.0);
}

#[test]
fn resize_tracks_window_aspect() {
    let (mut app, camera) = camera_app();
    let window = app.world_mut().spawn_empty().id();

    app.world_mut().send_event(WindowResized {
        window,
        width: 1920.0,
        height: 1080.0,
    });
    app.update();

    match app.world().get::<Projection>(camera).unwrap() {
        Projection::Perspective(p) => assert!((p.aspect_ratio - 16.0 / 9.0).abs() < 1e-5),
        _ => panic!("expected a perspective projection"),
    }
}

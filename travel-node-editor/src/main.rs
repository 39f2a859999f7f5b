use bevy::asset::AssetMetaCheck;
use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use bevy::window::PresentMode;
use bevy_common_assets::json::JsonAssetPlugin;
mod engine;
mod rpc;
mod tools;
use engine::{
    camera::viewport_camera::{
        camera_controller, focus_first_node_on_load, handle_camera_keyboard_shortcuts,
        handle_camera_navigation,
    },
    camera::{CameraNavigationEvent, ViewportCamera},
    config::{ConfigLoader, EditorConfig, apply_editor_config, start_config_loading},
    graph::NodeGraphStore,
    render::NodeRenderPlugin,
};
use rpc::web_rpc::WebRpcPlugin;
use tools::node_editor::NodeEditorPlugin;
use tools::tool_manager::ToolManagerPlugin;

fn main() {
    let mut app = create_app();

    #[cfg(target_arch = "wasm32")]
    {
        wasm_bindgen_futures::spawn_local(async move {
            app.run();
        });
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        app.run();
    }
}

/// Create the editor application with config, graph store and tools
fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .add_plugins(FrameTimeDiagnosticsPlugin::default())
        .add_plugins(JsonAssetPlugin::<EditorConfig>::new(&["editor.json"]))
        .add_plugins(NodeRenderPlugin)
        .add_plugins(NodeEditorPlugin)
        .add_plugins(ToolManagerPlugin)
        .add_plugins(WebRpcPlugin);

    app.init_resource::<ConfigLoader>()
        .init_resource::<NodeGraphStore>()
        .add_event::<CameraNavigationEvent>()
        .add_systems(Startup, (setup, start_config_loading))
        .add_systems(
            Update,
            (
                apply_editor_config,
                fps_text_update_system,
                camera_controller,
                focus_first_node_on_load,
                handle_camera_keyboard_shortcuts,
                handle_camera_navigation,
            )
                .chain(),
        );

    app
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}

fn create_window_config() -> Window {
    #[cfg(target_arch = "wasm32")]
    {
        Window {
            title: "Travel Node Editor".into(),
            canvas: Some("#bevy".into()),
            fit_canvas_to_parent: true,
            prevent_default_event_handling: false,
            present_mode: PresentMode::AutoVsync,
            ..default()
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        Window {
            title: "Travel Node Editor".into(),
            present_mode: PresentMode::AutoVsync,
            ..default()
        }
    }
}

#[derive(Component)]
struct FpsText;

fn setup(mut commands: Commands) {
    println!("=== TRAVEL NODE EDITOR ===");
    println!("Modes: 1 Select, 2 Move, 3 Add, 4 Delete, 0 None");
    println!("Camera: right mouse look, WASD/QE fly, G next node, Ctrl+N nearest node");

    spawn_lighting(&mut commands);
    spawn_camera(&mut commands);
    spawn_ui(&mut commands);
}

fn spawn_lighting(commands: &mut Commands) {
    commands.spawn((
        DirectionalLight {
            shadows_enabled: false,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::ZYX,
            0.0,
            1.0,
            -std::f32::consts::FRAC_PI_4,
        )),
    ));
}

fn spawn_camera(commands: &mut Commands) {
    let viewport_camera = ViewportCamera::default();
    commands.spawn((
        Camera3d::default(),
        Transform::from_translation(viewport_camera.focus_point)
            .with_rotation(viewport_camera.rotation()),
    ));
    commands.insert_resource(viewport_camera);
}

fn spawn_ui(commands: &mut Commands) {
    commands.spawn((
        Text::new("FPS: "),
        TextFont {
            font_size: 16.0,
            ..default()
        },
        TextColor(Color::srgb(1., 0., 0.)),
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(12.0),
            right: Val::Px(12.0),
            ..default()
        },
        FpsText,
    ));
}

fn fps_text_update_system(
    diagnostics: Res<DiagnosticsStore>,
    mut query: Query<&mut Text, With<FpsText>>,
) {
    for mut text in &mut query {
        if let Some(fps) = diagnostics.get(&FrameTimeDiagnosticsPlugin::FPS) {
            if let Some(value) = fps.smoothed() {
                text.0 = format!("FPS: {value:.1}");
            }
        }
    }
}

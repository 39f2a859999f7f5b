use super::manipulation::{
    DragModifiers, ManipulationController, ManipulatorMode, new_node_position,
};
use super::selection::SelectableType;
use super::state::{EditorStatus, report_store_error};
use crate::engine::graph::{NodeGraphStore, SelectableRef};
use crate::rpc::web_rpc::WebRpcInterface;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

/// Cursor position and the world ray under it.
fn cursor_ray(
    windows: &Query<&Window, With<PrimaryWindow>>,
    cameras: &Query<(&GlobalTransform, &Camera), With<Camera3d>>,
) -> Option<(Vec2, Vec3, Vec3)> {
    let window = windows.single().ok()?;
    let cursor_pos = window.cursor_position()?;
    let (cam_xf, camera) = cameras.single().ok()?;
    let ray = camera.viewport_to_world(cam_xf, cursor_pos).ok()?;
    Some((cursor_pos, ray.origin, ray.direction.as_vec3()))
}

fn drag_modifiers(keyboard: &ButtonInput<KeyCode>) -> DragModifiers {
    DragModifiers {
        vertical: keyboard.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]),
        fast: keyboard.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]),
        slow: keyboard.any_pressed([KeyCode::AltLeft, KeyCode::AltRight]),
    }
}

// Rebuild the pick index whenever the store reloaded
pub fn sync_controller_with_store(
    store: Res<NodeGraphStore>,
    mut controller: ResMut<ManipulationController>,
) {
    if controller.sync_with_store(&store) {
        debug!("Selection index rebuilt with {} entries", controller.index().len());
    }
}

// Left mouse button does what the active mode says
pub fn handle_editor_mouse(
    buttons: Res<ButtonInput<MouseButton>>,
    keyboard: Res<ButtonInput<KeyCode>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&GlobalTransform, &Camera), With<Camera3d>>,
    mut store: ResMut<NodeGraphStore>,
    mut controller: ResMut<ManipulationController>,
    mut status: ResMut<EditorStatus>,
    mut rpc: ResMut<WebRpcInterface>,
) {
    // Release is handled even when the cursor has left the window.
    if buttons.just_released(MouseButton::Left) && controller.is_dragging() {
        if let Err(e) = controller.stop_dragging(&mut store) {
            report_store_error(&mut status, &mut rpc, "Move", &e);
        }
        return;
    }

    let Some((cursor_pos, origin, direction)) = cursor_ray(&windows, &cameras) else {
        return;
    };

    match controller.mode() {
        ManipulatorMode::None => {}
        ManipulatorMode::Select => {
            if buttons.just_pressed(MouseButton::Left) {
                controller.update_selection(&store, origin, direction);
            }
        }
        ManipulatorMode::Move => {
            if buttons.just_pressed(MouseButton::Left) {
                controller.start_dragging(cursor_pos);
            }
            if buttons.pressed(MouseButton::Left) && controller.is_dragging() {
                let modifiers = drag_modifiers(&keyboard);
                if let Err(e) =
                    controller.update_dragging(&mut store, cursor_pos, origin, direction, modifiers)
                {
                    report_store_error(&mut status, &mut rpc, "Move", &e);
                }
            }
        }
        ManipulatorMode::Add => {
            if !buttons.just_pressed(MouseButton::Left) {
                return;
            }
            let Some(position) = new_node_position(&store, origin, direction) else {
                return;
            };
            match controller.add_new_object(&mut store, position, SelectableType::TravelNode) {
                Ok(true) => {
                    info!("Added travel node at {:?}", position);
                    status.set("Node added");
                }
                Ok(false) => {}
                Err(e) => report_store_error(&mut status, &mut rpc, "Add", &e),
            }
        }
        ManipulatorMode::Delete => {
            if !buttons.just_pressed(MouseButton::Left) {
                return;
            }
            match controller.delete_at(&mut store, origin, direction) {
                Ok(Some(target)) => {
                    info!("Deleted {:?}", target);
                    status.set("Deleted");
                }
                Ok(None) => {}
                Err(e) => report_store_error(&mut status, &mut rpc, "Delete", &e),
            }
        }
    }
}

// Escape drops the selection, Delete removes it
#[cfg(not(target_arch = "wasm32"))]
pub fn handle_editor_keys(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut store: ResMut<NodeGraphStore>,
    mut controller: ResMut<ManipulationController>,
    mut status: ResMut<EditorStatus>,
    mut rpc: ResMut<WebRpcInterface>,
) {
    if keyboard.just_pressed(KeyCode::Escape) && controller.has_selection() {
        controller.clear_selection();
    }

    if keyboard.just_pressed(KeyCode::Delete) {
        match controller.delete_selected(&mut store) {
            Ok(true) => status.set("Deleted"),
            Ok(false) => {}
            Err(e) => report_store_error(&mut status, &mut rpc, "Delete", &e),
        }
    }
}

/// Placeholder system for WASM builds where editing keys come over RPC.
#[cfg(target_arch = "wasm32")]
pub fn handle_editor_keys() {}

#[derive(Default)]
pub struct ObservedEditorState {
    selection: Option<(SelectableRef, String)>,
    generation: Option<u64>,
}

// Push selection and reload changes to the frontend
pub fn notify_editor_changes(
    store: Res<NodeGraphStore>,
    controller: Res<ManipulationController>,
    mut rpc: ResMut<WebRpcInterface>,
    mut observed: Local<ObservedEditorState>,
) {
    if observed.generation != Some(store.generation()) {
        observed.generation = Some(store.generation());
        rpc.send_notification(
            "graph_reloaded",
            serde_json::json!({
                "map_id": store.map_id(),
                "nodes": store.nodes().len(),
                "links": store.links().len(),
                "path_points": store.path_points().len()
            }),
        );
    }

    let selection = controller
        .selected_object()
        .map(|o| (o.target, o.label.clone()));
    if observed.selection != selection {
        rpc.send_notification(
            "selection_changed",
            serde_json::json!({
                "selection": controller.selected_object().map(|o| serde_json::json!({
                    "target": o.target,
                    "type": o.kind().to_string(),
                    "label": o.label
                }))
            }),
        );
        observed.selection = selection;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifiers_follow_held_keys() {
        let mut keyboard = ButtonInput::<KeyCode>::default();
        assert_eq!(drag_modifiers(&keyboard), DragModifiers::default());

        keyboard.press(KeyCode::ControlLeft);
        keyboard.press(KeyCode::AltRight);
        let modifiers = drag_modifiers(&keyboard);

        assert!(modifiers.vertical);
        assert!(!modifiers.fast);
        assert!(modifiers.slow);
    }
}

use crate::engine::camera::CameraNavigationEvent;
use crate::engine::graph::{NodeGraphStore, SelectableRef, StoreError};
use crate::tools::node_editor::selection::SelectableType;
use crate::tools::node_editor::state::{EditorStatus, report_store_error};
use crate::tools::node_editor::{ManipulationController, ManipulatorMode};
use crate::tools::tool_manager::{ModeSelectionEvent, ModeSelectionSource};
use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use constants::coordinate_system::{game_to_viewer_vec3, viewer_to_game_vec3};
use serde::{Deserialize, Serialize};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// JSON-RPC 2.0 request structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

/// JSON-RPC error structure following specification.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Resource managing bidirectional RPC communication between React and Bevy.
/// Handles both request-response patterns and notification broadcasting.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Send notification to React frontend without expecting response.
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    /// Number of notifications waiting for the next flush.
    pub fn pending_notifications(&self) -> usize {
        self.outgoing_notifications.len()
    }

    /// Queue response for transmission to React frontend.
    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }
}

/// Plugin establishing WebRPC communication layer for iframe-based deployment.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .add_event::<IncomingRpcMessage>()
            .add_systems(
                Update,
                (
                    process_incoming_messages,
                    handle_rpc_messages,
                    send_outgoing_messages,
                )
                    .chain(),
            );

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    use std::sync::Arc;
    use std::sync::Mutex;

    // Filled by the JS callback, drained once per frame.
    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();

            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    if let Some(window) = window() {
        if let Err(e) =
            window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
        {
            error!("Failed to register message listener: {:?}", e);
        }
    }

    // Listener lives for the whole page session.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

/// Resource wrapping thread-safe message queue for WASM event handling.
#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

/// Event representing incoming RPC message from React frontend.
#[derive(Event)]
struct IncomingRpcMessage {
    content: String,
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    diagnostics: Res<DiagnosticsStore>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut editor: EditorAccess,
) {
    for event in events.read() {
        debug!("Received RPC: {}", event.content);

        match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => {
                if let Some(response) =
                    handle_rpc_request(&request, &diagnostics, &mut rpc_interface, &mut editor)
                {
                    rpc_interface.queue_response(response);
                }
            }
            Err(parse_error) => {
                rpc_interface.send_notification(
                    "debug_message",
                    serde_json::json!({
                        "message": format!("Parse error: {}", parse_error)
                    }),
                );
            }
        }
    }
}

/// Editor resources and event writers reachable from RPC handlers.
#[derive(SystemParam)]
struct EditorAccess<'w> {
    store: ResMut<'w, NodeGraphStore>,
    controller: ResMut<'w, ManipulationController>,
    status: ResMut<'w, EditorStatus>,
    mode_events: EventWriter<'w, ModeSelectionEvent>,
    camera_events: EventWriter<'w, CameraNavigationEvent>,
}

/// Handle individual RPC request and generate response based on method.
fn handle_rpc_request(
    request: &RpcRequest,
    diagnostics: &DiagnosticsStore,
    rpc_interface: &mut WebRpcInterface,
    editor: &mut EditorAccess,
) -> Option<RpcResponse> {
    // Only generate responses for requests with IDs (notifications have no ID).
    let id = request.id.clone()?;

    let result = match request.method.as_str() {
        "set_mode" => handle_set_mode(&request.params, &mut editor.mode_events),
        "get_selection" => handle_get_selection(&editor.controller, &editor.store),
        "rename_selected" => handle_rename_selected(
            &request.params,
            &mut editor.controller,
            &mut editor.store,
            &mut editor.status,
            rpc_interface,
        ),
        "delete_selected" => handle_delete_selected(
            &mut editor.controller,
            &mut editor.store,
            &mut editor.status,
            rpc_interface,
        ),
        "add_node" => handle_add_node(
            &request.params,
            &mut editor.controller,
            &mut editor.store,
            &mut editor.status,
            rpc_interface,
        ),
        "set_drag_speed" => handle_set_drag_speed(&request.params, &mut editor.controller),
        "list_nodes" => handle_list_nodes(&editor.store),
        "set_map" => handle_set_map(&request.params, &mut editor.store),
        "go_to_node" => handle_go_to_node(&request.params, &editor.store, &mut editor.camera_events),
        "get_fps" => handle_get_fps(diagnostics),
        _ => {
            warn!("Unknown RPC method: {}", request.method);
            return Some(create_error_response(
                id,
                -32601,
                "Method not found",
                Some(serde_json::json!({"method": request.method})),
            ));
        }
    };

    match result {
        Ok(result_value) => Some(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(result_value),
            error: None,
            id: Some(id),
        }),
        Err(error) => Some(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id: Some(id),
        }),
    }
}

/// Surface a failed write and turn it into an RPC error.
fn store_failure(
    action: &str,
    error: &StoreError,
    status: &mut EditorStatus,
    rpc_interface: &mut WebRpcInterface,
) -> RpcError {
    report_store_error(status, rpc_interface, action, error);
    RpcError::internal_error(&format!("{} failed: {}", action, error))
}

/// Handle mode selection with parameter validation and event dispatch.
fn handle_set_mode(
    params: &serde_json::Value,
    mode_events: &mut EventWriter<ModeSelectionEvent>,
) -> Result<serde_json::Value, RpcError> {
    let mode = parse_mode(params)?;

    mode_events.write(ModeSelectionEvent {
        mode,
        source: ModeSelectionSource::Rpc,
    });

    info!("Mode selection event dispatched: {:?}", mode);

    Ok(serde_json::json!({
        "success": true,
        "mode": mode.to_string()
    }))
}

fn parse_mode(params: &serde_json::Value) -> Result<ManipulatorMode, RpcError> {
    #[derive(serde::Deserialize)]
    struct ModeParams {
        mode: String,
    }

    let mode_params = serde_json::from_value::<ModeParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'mode' parameter"))?;

    ManipulatorMode::from_string(&mode_params.mode)
        .ok_or_else(|| RpcError::invalid_params(&format!("Unknown mode: {}", mode_params.mode)))
}

fn handle_get_selection(
    controller: &ManipulationController,
    store: &NodeGraphStore,
) -> Result<serde_json::Value, RpcError> {
    let Some(object) = controller.selected_object() else {
        return Ok(serde_json::json!({ "selection": null }));
    };
    let game = viewer_to_game_vec3(object.position);
    let map_id = match object.target {
        SelectableRef::Node { id } => store.node(id).map(|n| n.map_id),
        SelectableRef::PathPoint { key } => store.path_point(key).map(|p| p.map_id),
    };

    Ok(serde_json::json!({
        "selection": {
            "target": object.target,
            "type": object.kind().to_string(),
            "label": object.label,
            "position": { "x": game.x, "y": game.y, "z": game.z },
            "map_id": map_id
        }
    }))
}

fn handle_rename_selected(
    params: &serde_json::Value,
    controller: &mut ManipulationController,
    store: &mut NodeGraphStore,
    status: &mut EditorStatus,
    rpc_interface: &mut WebRpcInterface,
) -> Result<serde_json::Value, RpcError> {
    #[derive(serde::Deserialize)]
    struct RenameParams {
        name: String,
    }

    let rename = serde_json::from_value::<RenameParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'name' parameter"))?;

    let renamed = controller
        .rename_selected(store, &rename.name)
        .map_err(|e| store_failure("Rename", &e, status, rpc_interface))?;

    Ok(serde_json::json!({
        "success": renamed,
        "name": rename.name
    }))
}

fn handle_delete_selected(
    controller: &mut ManipulationController,
    store: &mut NodeGraphStore,
    status: &mut EditorStatus,
    rpc_interface: &mut WebRpcInterface,
) -> Result<serde_json::Value, RpcError> {
    let deleted = controller
        .delete_selected(store)
        .map_err(|e| store_failure("Delete", &e, status, rpc_interface))?;

    Ok(serde_json::json!({ "success": deleted }))
}

/// Create a node at game coordinates on the active map.
fn handle_add_node(
    params: &serde_json::Value,
    controller: &mut ManipulationController,
    store: &mut NodeGraphStore,
    status: &mut EditorStatus,
    rpc_interface: &mut WebRpcInterface,
) -> Result<serde_json::Value, RpcError> {
    #[derive(serde::Deserialize)]
    struct AddNodeParams {
        x: f32,
        y: f32,
        z: f32,
    }

    let at = serde_json::from_value::<AddNodeParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'x', 'y' and 'z' parameters"))?;

    let position = game_to_viewer_vec3(Vec3::new(at.x, at.y, at.z));
    let added = controller
        .add_new_object(store, position, SelectableType::TravelNode)
        .map_err(|e| store_failure("Add", &e, status, rpc_interface))?;

    Ok(serde_json::json!({
        "success": added,
        "nodes": store.nodes().len()
    }))
}

/// Set the fast drag multiplier. Returns the previous value.
fn handle_set_drag_speed(
    params: &serde_json::Value,
    controller: &mut ManipulationController,
) -> Result<serde_json::Value, RpcError> {
    #[derive(serde::Deserialize)]
    struct SpeedParams {
        speed: f32,
    }

    let speed = serde_json::from_value::<SpeedParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'speed' parameter"))?
        .speed;
    if !speed.is_finite() || speed <= 0.0 {
        return Err(RpcError::invalid_params("Speed must be positive"));
    }

    let previous = controller.drag_speed();
    controller.set_drag_speed(speed);

    Ok(serde_json::json!({
        "speed": speed,
        "previous": previous
    }))
}

fn handle_list_nodes(store: &NodeGraphStore) -> Result<serde_json::Value, RpcError> {
    let nodes: Vec<serde_json::Value> = store
        .nodes()
        .iter()
        .map(|node| {
            serde_json::json!({
                "id": node.id,
                "name": node.name,
                "map_id": node.map_id,
                "linked": node.is_linked(),
                "links": store
                    .outgoing_links(node)
                    .map(|link| serde_json::json!({
                        "to": link.to_node_id,
                        "type": link.link_type.as_u8(),
                        "type_name": link.link_type.to_string(),
                        "object": link.object,
                        "distance": link.distance,
                        "swim_distance": link.swim_distance,
                        "extra_cost": link.extra_cost,
                        "calculated": link.calculated,
                        "max_creature": link.max_creature,
                        "path_points": link.points.len()
                    }))
                    .collect::<Vec<_>>(),
                "position": {
                    "x": node.game_position.x,
                    "y": node.game_position.y,
                    "z": node.game_position.z
                }
            })
        })
        .collect();

    Ok(serde_json::json!({
        "map_id": store.map_id(),
        "nodes": nodes
    }))
}

fn handle_set_map(
    params: &serde_json::Value,
    store: &mut NodeGraphStore,
) -> Result<serde_json::Value, RpcError> {
    #[derive(serde::Deserialize)]
    struct MapParams {
        map_id: u32,
    }

    let map = serde_json::from_value::<MapParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'map_id' parameter"))?;

    store.set_map(map.map_id);

    Ok(serde_json::json!({
        "map_id": store.map_id(),
        "nodes": store.nodes().len()
    }))
}

fn handle_go_to_node(
    params: &serde_json::Value,
    store: &NodeGraphStore,
    camera_events: &mut EventWriter<CameraNavigationEvent>,
) -> Result<serde_json::Value, RpcError> {
    let id = parse_node_id(params, store)?;
    camera_events.write(CameraNavigationEvent::GoToNode(id));

    Ok(serde_json::json!({ "success": true, "id": id }))
}

fn parse_node_id(params: &serde_json::Value, store: &NodeGraphStore) -> Result<u32, RpcError> {
    #[derive(serde::Deserialize)]
    struct NodeParams {
        id: u32,
    }

    let node = serde_json::from_value::<NodeParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'id' parameter"))?;

    store
        .node(node.id)
        .map(|n| n.id)
        .ok_or_else(|| RpcError::invalid_params(&format!("Unknown node: {}", node.id)))
}

/// Handle FPS retrieval with diagnostic system integration.
fn handle_get_fps(diagnostics: &DiagnosticsStore) -> Result<serde_json::Value, RpcError> {
    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|fps_diagnostic| fps_diagnostic.smoothed())
        .unwrap_or(0.0) as f32;

    Ok(serde_json::json!({
        "fps": fps
    }))
}

/// Create standardized error response with optional data payload.
fn create_error_response(
    id: serde_json::Value,
    code: i32,
    message: &str,
    data: Option<serde_json::Value>,
) -> RpcResponse {
    RpcResponse {
        jsonrpc: "2.0".to_string(),
        result: None,
        error: Some(RpcError {
            code,
            message: message.to_string(),
            data,
        }),
        id: Some(id),
    }
}

/// Send queued notifications and responses to React frontend.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    if rpc_interface.pending_notifications() > 0 {
        debug!("Flushing {} notifications", rpc_interface.pending_notifications());
    }

    // Send notifications first.
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }

    // Send responses second to maintain order.
    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

/// Send serialized message to parent window (React frontend).
fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("Failed to send message to parent: {:?}", e);
                        }
                    } else {
                        warn!("No parent window available for message transmission");
                    }
                } else {
                    error!("Window object not available");
                }
            }
            Err(e) => {
                error!("Failed to serialize message: {}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        // No-op for non-WASM targets.
        let _ = message;
    }
}

/// Standard RPC error codes and constructors.
impl RpcError {
    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn internal_error(message: &str) -> Self {
        Self {
            code: -32603,
            message: message.to_string(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use crate::engine::database::MemoryDatabase;
    use crate::engine::database::memory::NodeTables;
    use crate::engine::graph::store::tests::{sample_store, sample_tables};

    fn select_node(controller: &mut ManipulationController, store: &NodeGraphStore, id: u32) {
        controller.set_mode(ManipulatorMode::Select);
        let position = store.node(id).unwrap().position;
        let origin = position + Vec3::new(0.0, 0.0, 50.0);
        let picked = controller.update_selection(store, origin, position - origin);
        assert_eq!(picked, Some(SelectableRef::Node { id }));
    }

    #[test]
    fn modes_parse_from_params() {
        assert_eq!(
            parse_mode(&serde_json::json!({ "mode": "Move" })).unwrap(),
            ManipulatorMode::Move
        );
        assert_eq!(parse_mode(&serde_json::json!({ "mode": "fly" })).unwrap_err().code, -32602);
        assert_eq!(parse_mode(&serde_json::json!({})).unwrap_err().code, -32602);
    }

    #[test]
    fn selection_reports_game_coordinates() {
        let store = sample_store();
        let mut controller = ManipulationController::default();

        let empty = handle_get_selection(&controller, &store).unwrap();
        assert!(empty["selection"].is_null());

        select_node(&mut controller, &store, 1);
        let selected = handle_get_selection(&controller, &store).unwrap();
        assert_eq!(selected["selection"]["label"], "Node 1");
        assert_eq!(selected["selection"]["target"]["kind"], "node");
        let x = selected["selection"]["position"]["x"].as_f64().unwrap();
        assert_abs_diff_eq!(x, 100.0, epsilon = 1e-2);
    }

    #[test]
    fn rename_writes_through_to_the_store() {
        let mut store = sample_store();
        let mut controller = ManipulationController::default();
        let mut status = EditorStatus::default();
        let mut rpc = WebRpcInterface::default();
        select_node(&mut controller, &store, 2);

        let result = handle_rename_selected(
            &serde_json::json!({ "name": "Inn" }),
            &mut controller,
            &mut store,
            &mut status,
            &mut rpc,
        )
        .unwrap();

        assert_eq!(result["success"], true);
        assert_eq!(store.node(2).unwrap().name, "Inn");
        assert_eq!(rpc.pending_notifications(), 0);
    }

    #[test]
    fn failed_writes_become_internal_errors_and_notifications() {
        let mut database = MemoryDatabase::with_tables(sample_tables());
        database.set_read_only(true);
        let mut store = NodeGraphStore::open(Box::new(database), 0);
        let mut controller = ManipulationController::default();
        let mut status = EditorStatus::default();
        let mut rpc = WebRpcInterface::default();
        select_node(&mut controller, &store, 1);

        let error = handle_delete_selected(&mut controller, &mut store, &mut status, &mut rpc)
            .unwrap_err();

        assert_eq!(error.code, -32603);
        assert_eq!(rpc.pending_notifications(), 1);
        assert!(status.message.is_some());
        assert!(store.node(1).is_some());
    }

    #[test]
    fn add_node_converts_from_game_space() {
        let mut store =
            NodeGraphStore::open(Box::new(MemoryDatabase::with_tables(NodeTables::default())), 0);
        let mut controller = ManipulationController::default();
        let mut status = EditorStatus::default();
        let mut rpc = WebRpcInterface::default();

        let result = handle_add_node(
            &serde_json::json!({ "x": 100.0, "y": 200.0, "z": 5.0 }),
            &mut controller,
            &mut store,
            &mut status,
            &mut rpc,
        )
        .unwrap();

        assert_eq!(result["nodes"], 1);
        let node = &store.nodes()[0];
        assert_abs_diff_eq!(node.game_position.x, 100.0, epsilon = 1e-2);
        assert_abs_diff_eq!(node.game_position.y, 200.0, epsilon = 1e-2);
        assert_abs_diff_eq!(node.game_position.z, 5.0, epsilon = 1e-2);
    }

    #[test]
    fn listing_and_map_switching() {
        let mut store = sample_store();

        let listed = handle_list_nodes(&store).unwrap();
        let nodes = listed["nodes"].as_array().unwrap();
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0]["links"][0]["to"], 2);

        let switched = handle_set_map(&serde_json::json!({ "map_id": 1 }), &mut store).unwrap();
        assert_eq!(switched["map_id"], 1);
        assert_eq!(switched["nodes"], 1);
    }

    #[test]
    fn unknown_nodes_are_rejected() {
        let store = sample_store();
        assert_eq!(parse_node_id(&serde_json::json!({ "id": 2 }), &store).unwrap(), 2);
        assert_eq!(
            parse_node_id(&serde_json::json!({ "id": 99 }), &store).unwrap_err().code,
            -32602
        );
    }

    #[test]
    fn drag_speed_must_be_positive() {
        let mut controller = ManipulationController::default();
        let previous = controller.drag_speed();

        let result = handle_set_drag_speed(&serde_json::json!({ "speed": 8.0 }), &mut controller)
            .unwrap();
        assert_eq!(result["previous"], previous as f64);
        assert_eq!(controller.drag_speed(), 8.0);

        assert!(handle_set_drag_speed(&serde_json::json!({ "speed": -1.0 }), &mut controller).is_err());
        assert_eq!(controller.drag_speed(), 8.0);
    }

    #[test]
    fn fps_defaults_to_zero_without_diagnostics() {
        let fps = handle_get_fps(&DiagnosticsStore::default()).unwrap();
        assert_eq!(fps["fps"], 0.0);
    }
}

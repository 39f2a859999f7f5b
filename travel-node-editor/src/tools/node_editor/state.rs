use crate::engine::graph::StoreError;
use crate::rpc::web_rpc::WebRpcInterface;
use bevy::prelude::*;

/// Last message shown in the panel status line.
#[derive(Resource, Default)]
pub struct EditorStatus {
    pub message: Option<String>,
}

impl EditorStatus {
    pub fn set(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }
}

/// Log a failed store write and surface it in the panel and to the frontend.
pub fn report_store_error(
    status: &mut EditorStatus,
    rpc: &mut WebRpcInterface,
    action: &str,
    error: &StoreError,
) {
    warn!("{} failed: {}", action, error);
    status.set(format!("{} failed: {}", action, error));
    rpc.send_notification(
        "write_failed",
        serde_json::json!({
            "action": action,
            "message": error.to_string()
        }),
    );
}

// Components
#[derive(Component)]
pub struct EditorPanelRoot;
#[derive(Component)]
pub struct ModeText;
#[derive(Component)]
pub struct SelectionText;
#[derive(Component)]
pub struct SelectionPositionText;
#[derive(Component)]
pub struct CameraPositionText;
#[derive(Component)]
pub struct StatusText;

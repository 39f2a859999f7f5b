use crate::engine::graph::NodeGraphStore;
use crate::rpc::web_rpc::WebRpcInterface;
use crate::tools::node_editor::state::{EditorStatus, report_store_error};
use crate::tools::node_editor::{ManipulationController, ManipulatorMode};
use bevy::prelude::*;

/// Event fired when the editor mode changes via RPC or keyboard shortcuts.
#[derive(Event)]
pub struct ModeSelectionEvent {
    pub mode: ManipulatorMode,
    pub source: ModeSelectionSource,
}

/// Source of a mode change for logging.
#[derive(Debug, Clone, Copy)]
pub enum ModeSelectionSource {
    Rpc,
    Keyboard,
}

/// System applying mode changes. An active drag is committed before the switch.
pub fn handle_mode_selection_events(
    mut events: EventReader<ModeSelectionEvent>,
    mut controller: ResMut<ManipulationController>,
    mut store: ResMut<NodeGraphStore>,
    mut status: ResMut<EditorStatus>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for event in events.read() {
        if controller.is_dragging() {
            if let Err(e) = controller.stop_dragging(&mut store) {
                report_store_error(&mut status, &mut rpc_interface, "Move", &e);
            }
        }

        if !controller.set_mode(event.mode) {
            continue; // Mode already active.
        }

        info!(
            "Editor mode set to {} via {:?}",
            event.mode.to_string(),
            event.source
        );

        rpc_interface.send_notification(
            "mode_changed",
            serde_json::json!({
                "mode": event.mode.to_string(),
                "has_selection": controller.has_selection()
            }),
        );
    }
}

/// Maps number keys to modes.
pub fn mode_for_key(key: KeyCode) -> Option<ManipulatorMode> {
    match key {
        KeyCode::Digit0 => Some(ManipulatorMode::None),
        KeyCode::Digit1 => Some(ManipulatorMode::Select),
        KeyCode::Digit2 => Some(ManipulatorMode::Move),
        KeyCode::Digit3 => Some(ManipulatorMode::Add),
        KeyCode::Digit4 => Some(ManipulatorMode::Delete),
        _ => None,
    }
}

/// System handling keyboard shortcuts for mode selection (native builds only).
#[cfg(not(target_arch = "wasm32"))]
pub fn handle_mode_keyboard_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut mode_events: EventWriter<ModeSelectionEvent>,
) {
    for key in keyboard.get_just_pressed() {
        if let Some(mode) = mode_for_key(*key) {
            mode_events.write(ModeSelectionEvent {
                mode,
                source: ModeSelectionSource::Keyboard,
            });
        }
    }
}

/// Placeholder system for WASM builds where keyboard shortcuts are disabled.
#[cfg(target_arch = "wasm32")]
pub fn handle_mode_keyboard_shortcuts() {
    // Modes are controlled via RPC only.
}

pub struct ToolManagerPlugin;

impl Plugin for ToolManagerPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ModeSelectionEvent>().add_systems(
            Update,
            (handle_mode_keyboard_shortcuts, handle_mode_selection_events).chain(),
        );
    }
}

//! Travel node editing tool.
//!
//! Picks, drags, adds, renames and deletes travel nodes and path points on
//! top of the `NodeGraphStore`. All edits are written through to the node
//! database immediately.
//!
//! ## Modes
//!
//! | Mode   | Left click                                        |
//! |--------|---------------------------------------------------|
//! | None   | nothing                                           |
//! | Select | pick the closest node or path point under cursor  |
//! | Move   | drag the selection, release to commit             |
//! | Add    | create a node where the ray meets the ground      |
//! | Delete | delete whatever is under the cursor               |
//!
//! While dragging, Ctrl moves on the camera-facing plane instead of the
//! ground plane, Shift speeds up and Alt slows down.
//!
//! ## Frame Order
//!
//! ```text
//! sync_controller_with_store()   rebuild pick index after a reload
//!   └─> handle_editor_keys()     Escape / Delete
//!       └─> handle_editor_mouse()
//!           └─> notify_editor_changes()   selection_changed / graph_reloaded
//!               └─> update_editor_panel()
//! ```
//!
//! Store failures never abort a system. They are logged, shown in the panel
//! status line and sent to the frontend as `write_failed`.

/// Mouse and keyboard systems driving the controller.
pub mod interactions;

/// Mode state machine, drag lifecycle and edit dispatch.
pub mod manipulation;

/// Ray-sphere and ray-plane helpers.
pub mod ray;

/// Flat list of pickable entries built from the store.
pub mod selection;

/// Status line resource and panel marker components.
pub mod state;

/// Info panel spawning and text updates.
pub mod ui;

use bevy::prelude::*;

pub use manipulation::{ManipulationController, ManipulatorMode};
pub use state::EditorStatus;

use interactions::{
    handle_editor_keys, handle_editor_mouse, notify_editor_changes, sync_controller_with_store,
};
use ui::{spawn_editor_panel, update_editor_panel};

pub struct NodeEditorPlugin;

impl Plugin for NodeEditorPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EditorStatus>()
            .init_resource::<ManipulationController>()
            .add_systems(Startup, spawn_editor_panel)
            .add_systems(
                Update,
                (
                    sync_controller_with_store,
                    handle_editor_keys,
                    handle_editor_mouse,
                    notify_editor_changes,
                    update_editor_panel,
                )
                    .chain(),
            );
    }
}

//! Editing tools layered over the travel node graph.
//!
//! ## Mode Selection Flow
//!
//! ```text
//! Keyboard (0-4) / RPC set_mode
//!   └─> ModeSelectionEvent
//!       └─> handle_mode_selection_events()
//!           ├─> Commit an active drag
//!           ├─> ManipulationController::set_mode()
//!           └─> Send mode_changed notification
//! ```
//!
//! Native builds bind modes to number keys. Wasm builds are controlled by the
//! hosting page over RPC only.

/// Node editor: picking, dragging, adding, renaming and deleting.
pub mod node_editor;

/// Mode selection events from keyboard shortcuts and RPC.
pub mod tool_manager;

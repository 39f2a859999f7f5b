//! JSON-RPC 2.0 bridge to a hosting web page.
//!
//! When the editor runs as a wasm build inside an iframe, the parent page
//! drives it through `postMessage`. Native builds compile the same handlers
//! but never receive messages, so outgoing traffic is simply dropped.
//!
//! ## Message Flow
//!
//! ```text
//! Parent page                           Editor (iframe)
//!     │                                       │
//!     ├─ Request (with id) ─────────────────> │ handle_rpc_request()
//!     │ <──────────────── Response (same id) ─┤
//!     │ <──────────── Notification (no id) ───┤ send_notification()
//! ```
//!
//! ## Methods
//!
//! - `set_mode` `{ mode: "none" | "select" | "move" | "add" | "delete" }`
//! - `get_selection`: selected entry with game space position, or null
//! - `rename_selected` `{ name }`: nodes only
//! - `delete_selected`
//! - `add_node` `{ x, y, z }` in game space on the active map
//! - `set_drag_speed` `{ speed }`: multiplier applied while Shift is held
//! - `list_nodes`: nodes of the active map
//! - `set_map` `{ map_id }`: switch map and reload
//! - `go_to_node` `{ id }`: move the camera to a node
//! - `get_fps`
//!
//! ## Notifications
//!
//! - `mode_changed` after a mode switch
//! - `selection_changed` when the selection or its label changes
//! - `graph_reloaded` after every store reload
//! - `write_failed` when the node database rejected a write
//!
//! ## Error Codes
//!
//! - `-32601`: Method not found
//! - `-32602`: Invalid params, including unknown modes and node ids
//! - `-32603`: Internal error, used for failed database writes

/// Request dispatch, notification queue and the wasm message listener.
pub mod web_rpc;

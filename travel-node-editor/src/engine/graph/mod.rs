//! Travel node graph snapshot for the active map.
//!
//! The store owns every node, link and path point of one map in viewer space
//! and keeps them consistent with the database behind it.
//!
//! ## Load Pass
//!
//! ```text
//! query_nodes(map_id) ─┐
//! query_links()       ─┼─> convert game -> viewer
//! query_path_points() ─┘     └─> resolve link endpoints (unresolved: dropped)
//!                                 └─> attach path points per link, sorted by nr
//!                                      └─> generation += 1, dirty = true
//! ```
//!
//! Consumers watch `generation()` to notice reloads and `take_dirty()` to
//! rebuild geometry.

/// Graph entities and the selectable reference type.
pub mod model;

/// Graph store resource with write-through mutations.
pub mod store;

pub use model::{
    PathPointKey, SelectableRef, TravelNode, TravelNodeLink, TravelNodeLinkType,
    TravelNodePathPoint,
};
pub use store::{NodeGraphStore, StoreError};

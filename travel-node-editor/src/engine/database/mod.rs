//! Persistence collaborator for the travel node graph.
//!
//! The graph store never talks to storage directly. It reads rows and issues
//! [`WriteStatement`]s through the [`NodeDatabase`] trait, so the same store
//! runs against the JSON file used by the desktop build and the in-memory
//! tables used on wasm and in tests.
//!
//! ## Tables
//!
//! ```text
//! nodes        id, name, map_id, x, y, z, linked
//! links        from_node_id, to_node_id, type, object, distance,
//!              swim_distance, extra_cost, calculated, max_creature[3]
//! path_points  from_node_id, to_node_id, nr, map_id, x, y, z
//! ```
//!
//! All coordinates are game space. Conversion to viewer space happens in the
//! graph store.

/// Serde-backed file adapter used by native builds.
pub mod json_file;

/// Vec-backed adapter used on wasm, as a fallback and in tests.
pub mod memory;

pub use json_file::JsonFileDatabase;
pub use memory::MemoryDatabase;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRow {
    pub id: u32,
    pub name: String,
    pub map_id: u32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    #[serde(default)]
    pub linked: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRow {
    pub from_node_id: u32,
    pub to_node_id: u32,
    #[serde(rename = "type", default)]
    pub link_type: u8,
    #[serde(default)]
    pub object: u32,
    #[serde(default)]
    pub distance: f32,
    #[serde(default)]
    pub swim_distance: f32,
    #[serde(default)]
    pub extra_cost: f32,
    #[serde(default)]
    pub calculated: bool,
    #[serde(default)]
    pub max_creature: [u8; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathPointRow {
    pub from_node_id: u32,
    pub to_node_id: u32,
    pub nr: u32,
    pub map_id: u32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Parameterised mutation issued by the graph store. Coordinates are game space.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteStatement {
    InsertNode {
        name: String,
        map_id: u32,
        x: f32,
        y: f32,
        z: f32,
        linked: u8,
    },
    RenameNode {
        id: u32,
        name: String,
    },
    MoveNode {
        id: u32,
        x: f32,
        y: f32,
        z: f32,
    },
    DeleteNode {
        id: u32,
    },
    MovePathPoint {
        from_node_id: u32,
        to_node_id: u32,
        nr: u32,
        x: f32,
        y: f32,
        z: f32,
    },
    DeletePathPoint {
        from_node_id: u32,
        to_node_id: u32,
        nr: u32,
    },
}

/// Storage backend for nodes, links and path points.
///
/// Reads return every matching row; an empty vector is a valid result.
/// `execute` either applies the whole statement or nothing.
pub trait NodeDatabase: Send + Sync {
    fn query_nodes(&self, map_id: u32) -> Result<Vec<NodeRow>, DatabaseError>;

    fn query_links(&self) -> Result<Vec<LinkRow>, DatabaseError>;

    /// Rows are ordered by `(from_node_id, to_node_id, nr)`.
    fn query_path_points(&self) -> Result<Vec<PathPointRow>, DatabaseError>;

    fn execute(&mut self, statement: &WriteStatement) -> Result<(), DatabaseError>;

    /// Short description used in log lines.
    fn describe(&self) -> String;
}

/// Error types for database operations.
#[derive(Debug)]
pub enum DatabaseError {
    IoError(std::io::Error),
    JsonError(serde_json::Error),
    RowNotFound(String),
    ReadOnly,
    IdSpaceExhausted,
}

impl From<std::io::Error> for DatabaseError {
    fn from(err: std::io::Error) -> Self {
        DatabaseError::IoError(err)
    }
}

impl From<serde_json::Error> for DatabaseError {
    fn from(err: serde_json::Error) -> Self {
        DatabaseError::JsonError(err)
    }
}

impl std::fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseError::IoError(e) => write!(f, "IO error: {}", e),
            DatabaseError::JsonError(e) => write!(f, "JSON error: {}", e),
            DatabaseError::RowNotFound(what) => write!(f, "No row matches {}", what),
            DatabaseError::ReadOnly => write!(f, "Database is read-only"),
            DatabaseError::IdSpaceExhausted => write!(f, "No free travel node id left"),
        }
    }
}

impl std::error::Error for DatabaseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DatabaseError::IoError(e) => Some(e),
            DatabaseError::JsonError(e) => Some(e),
            _ => None,
        }
    }
}

use bevy::prelude::*;
use constants::coordinate_system::Position;
use serde::{Deserialize, Serialize};

/// Way-point of the travel graph.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelNode {
    pub id: u32,
    pub name: String,
    pub map_id: u32,
    /// As stored, game space.
    pub game_position: Position,
    /// Viewer space, derived on load and never written back directly.
    pub position: Vec3,
    /// 0 means not linked. Other values are kept as read.
    pub linked: u8,
    /// Indices into the store's link list. Outgoing links only.
    pub links: Vec<usize>,
}

impl TravelNode {
    pub fn is_linked(&self) -> bool {
        self.linked != 0
    }

    /// Label used by the overlay, e.g. `[12] Crossroads`.
    pub fn label(&self) -> String {
        format!("[{}] {}", self.id, self.name)
    }
}

/// How a link is travelled. Unknown stored values are kept in `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TravelNodeLinkType {
    None,
    Walk,
    Portal,
    Transport,
    FlightPath,
    TeleportSpell,
    StaticPortal,
    Other(u8),
}

impl TravelNodeLinkType {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::None,
            1 => Self::Walk,
            2 => Self::Portal,
            3 => Self::Transport,
            4 => Self::FlightPath,
            5 => Self::TeleportSpell,
            6 => Self::StaticPortal,
            other => Self::Other(other),
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Walk => 1,
            Self::Portal => 2,
            Self::Transport => 3,
            Self::FlightPath => 4,
            Self::TeleportSpell => 5,
            Self::StaticPortal => 6,
            Self::Other(value) => value,
        }
    }

    pub fn to_string(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Walk => "walk",
            Self::Portal => "portal",
            Self::Transport => "transport",
            Self::FlightPath => "flight path",
            Self::TeleportSpell => "teleport spell",
            Self::StaticPortal => "static portal",
            Self::Other(_) => "other",
        }
    }
}

/// Directed edge between two nodes of the active map.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelNodeLink {
    pub from_node_id: u32,
    pub to_node_id: u32,
    pub link_type: TravelNodeLinkType,
    pub object: u32,
    pub distance: f32,
    pub swim_distance: f32,
    pub extra_cost: f32,
    pub calculated: bool,
    pub max_creature: [u8; 3],
    /// Indices into the store's path point list, ordered by `nr`.
    pub points: Vec<usize>,
}

/// Composite key of a path point row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PathPointKey {
    pub from_node_id: u32,
    pub to_node_id: u32,
    pub nr: u32,
}

impl PathPointKey {
    pub fn new(from_node_id: u32, to_node_id: u32, nr: u32) -> Self {
        Self {
            from_node_id,
            to_node_id,
            nr,
        }
    }
}

/// Intermediate routing point on a link.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelNodePathPoint {
    pub key: PathPointKey,
    pub map_id: u32,
    pub game_position: Position,
    pub position: Vec3,
}

impl TravelNodePathPoint {
    pub fn label(&self) -> String {
        format!("Path Point {}", self.key.nr)
    }
}

/// Stable reference to something the editor can select. Resolved against the
/// store at the moment of use, so it stays valid across in-place moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectableRef {
    Node { id: u32 },
    PathPoint { key: PathPointKey },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_type_keeps_unknown_values() {
        for value in 0..=6u8 {
            assert_eq!(TravelNodeLinkType::from_u8(value).as_u8(), value);
        }
        assert_eq!(
            TravelNodeLinkType::from_u8(42),
            TravelNodeLinkType::Other(42)
        );
        assert_eq!(TravelNodeLinkType::Other(42).as_u8(), 42);
        assert_eq!(TravelNodeLinkType::from_u8(4).to_string(), "flight path");
    }

    #[test]
    fn node_label_shows_id_and_name() {
        let node = TravelNode {
            id: 12,
            name: "Crossroads".into(),
            map_id: 1,
            game_position: Position::default(),
            position: Vec3::ZERO,
            linked: 2,
            links: Vec::new(),
        };
        assert_eq!(node.label(), "[12] Crossroads");
        assert!(node.is_linked());
    }

    #[test]
    fn selectable_ref_serialises_with_kind_tag() {
        let node = serde_json::to_value(SelectableRef::Node { id: 3 }).unwrap();
        assert_eq!(node["kind"], "node");
        assert_eq!(node["id"], 3);

        let point = serde_json::to_value(SelectableRef::PathPoint {
            key: PathPointKey::new(1, 2, 4),
        })
        .unwrap();
        assert_eq!(point["kind"], "path_point");
        assert_eq!(point["key"]["nr"], 4);
    }
}

use super::model::{
    PathPointKey, SelectableRef, TravelNode, TravelNodeLink, TravelNodeLinkType,
    TravelNodePathPoint,
};
use crate::engine::database::{
    DatabaseError, MemoryDatabase, NodeDatabase, PathPointRow, WriteStatement,
};
use bevy::prelude::*;
use constants::coordinate_system::{Position, game_to_viewer, viewer_to_game};
use constants::render_settings::{DEFAULT_MAP_ID, DEFAULT_NODE_NAME};
use std::collections::{HashMap, HashSet};

/// Error types for graph store mutations.
#[derive(Debug)]
pub enum StoreError {
    Database(DatabaseError),
    UnknownNode(u32),
    UnknownPathPoint(PathPointKey),
    Unsupported(&'static str),
}

impl From<DatabaseError> for StoreError {
    fn from(err: DatabaseError) -> Self {
        StoreError::Database(err)
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Database(e) => write!(f, "Database write failed: {}", e),
            StoreError::UnknownNode(id) => write!(f, "Unknown node {}", id),
            StoreError::UnknownPathPoint(key) => write!(
                f,
                "Unknown path point {}->{} #{}",
                key.from_node_id, key.to_node_id, key.nr
            ),
            StoreError::Unsupported(what) => write!(f, "Unsupported operation: {}", what),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Database(e) => Some(e),
            _ => None,
        }
    }
}

/// In-memory snapshot of the travel graph for one map, written through to a
/// [`NodeDatabase`].
///
/// Structural changes (add, delete) reload the whole snapshot and bump the
/// generation. Moves and renames patch the snapshot in place after the write
/// succeeds. Every change that affects geometry raises the dirty flag.
#[derive(Resource)]
pub struct NodeGraphStore {
    database: Box<dyn NodeDatabase>,
    map_id: u32,
    nodes: Vec<TravelNode>,
    links: Vec<TravelNodeLink>,
    path_points: Vec<TravelNodePathPoint>,
    node_lookup: HashMap<u32, usize>,
    point_lookup: HashMap<PathPointKey, usize>,
    generation: u64,
    dirty: bool,
}

impl Default for NodeGraphStore {
    fn default() -> Self {
        Self::new(Box::new(MemoryDatabase::new()), DEFAULT_MAP_ID)
    }
}

impl NodeGraphStore {
    /// Create an empty store. Call [`load_from_source`](Self::load_from_source)
    /// to read the snapshot.
    pub fn new(database: Box<dyn NodeDatabase>, map_id: u32) -> Self {
        Self {
            database,
            map_id,
            nodes: Vec::new(),
            links: Vec::new(),
            path_points: Vec::new(),
            node_lookup: HashMap::new(),
            point_lookup: HashMap::new(),
            generation: 0,
            dirty: false,
        }
    }

    /// Create a store and load its first snapshot.
    pub fn open(database: Box<dyn NodeDatabase>, map_id: u32) -> Self {
        let mut store = Self::new(database, map_id);
        store.load_from_source();
        store
    }

    /// Replace the snapshot with a fresh read of the database.
    pub fn load_from_source(&mut self) {
        self.nodes.clear();
        self.links.clear();
        self.path_points.clear();
        self.node_lookup.clear();
        self.point_lookup.clear();

        let node_rows = self.database.query_nodes(self.map_id).unwrap_or_else(|e| {
            warn!("Failed to read travel nodes for map {}: {}", self.map_id, e);
            Vec::new()
        });
        let link_rows = self.database.query_links().unwrap_or_else(|e| {
            warn!("Failed to read travel node links: {}", e);
            Vec::new()
        });
        let point_rows = self.database.query_path_points().unwrap_or_else(|e| {
            warn!("Failed to read travel node path points: {}", e);
            Vec::new()
        });

        for row in node_rows {
            let game_position = Position::new(row.x, row.y, row.z, 0.0);
            self.node_lookup.insert(row.id, self.nodes.len());
            self.nodes.push(TravelNode {
                id: row.id,
                name: row.name,
                map_id: row.map_id,
                game_position,
                position: game_to_viewer(game_position).to_vec3(),
                linked: row.linked,
                links: Vec::new(),
            });
        }

        let mut points_by_link: HashMap<(u32, u32), Vec<PathPointRow>> = HashMap::new();
        for row in point_rows {
            points_by_link
                .entry((row.from_node_id, row.to_node_id))
                .or_default()
                .push(row);
        }

        let mut dropped_links = 0usize;
        let mut duplicate_links = 0usize;
        let mut seen_links = HashSet::new();
        for row in link_rows {
            let (Some(&from_index), true) = (
                self.node_lookup.get(&row.from_node_id),
                self.node_lookup.contains_key(&row.to_node_id),
            ) else {
                dropped_links += 1;
                continue;
            };

            // First row per (from, to) wins. Path point keys would collide otherwise.
            if !seen_links.insert((row.from_node_id, row.to_node_id)) {
                duplicate_links += 1;
                continue;
            }

            let mut rows = points_by_link
                .remove(&(row.from_node_id, row.to_node_id))
                .unwrap_or_default();
            rows.sort_by_key(|p| p.nr);
            rows.dedup_by_key(|p| p.nr);

            let mut points = Vec::with_capacity(rows.len());
            for point in rows {
                let key = PathPointKey::new(point.from_node_id, point.to_node_id, point.nr);
                let game_position = Position::new(point.x, point.y, point.z, 0.0);
                self.point_lookup.insert(key, self.path_points.len());
                points.push(self.path_points.len());
                self.path_points.push(TravelNodePathPoint {
                    key,
                    map_id: point.map_id,
                    game_position,
                    position: game_to_viewer(game_position).to_vec3(),
                });
            }

            self.nodes[from_index].links.push(self.links.len());
            self.links.push(TravelNodeLink {
                from_node_id: row.from_node_id,
                to_node_id: row.to_node_id,
                link_type: TravelNodeLinkType::from_u8(row.link_type),
                object: row.object,
                distance: row.distance,
                swim_distance: row.swim_distance,
                extra_cost: row.extra_cost,
                calculated: row.calculated,
                max_creature: row.max_creature,
                points,
            });
        }

        if dropped_links > 0 {
            debug!(
                "Dropped {} travel node links with endpoints outside map {}",
                dropped_links, self.map_id
            );
        }
        if duplicate_links > 0 {
            warn!(
                "Ignored {} duplicate travel node links on map {}",
                duplicate_links, self.map_id
            );
        }

        self.generation += 1;
        self.dirty = true;

        info!(
            "Loaded travel graph for map {} from {}: {} nodes, {} links, {} path points",
            self.map_id,
            self.database.describe(),
            self.nodes.len(),
            self.links.len(),
            self.path_points.len()
        );
    }

    /// Switch the active map and reload.
    pub fn set_map(&mut self, map_id: u32) {
        self.map_id = map_id;
        self.load_from_source();
    }

    /// Swap the persistence collaborator and reload.
    pub fn replace_database(&mut self, database: Box<dyn NodeDatabase>, map_id: u32) {
        self.database = database;
        self.map_id = map_id;
        self.load_from_source();
    }

    /// Insert a default node at a viewer space position, then reload.
    pub fn add_node(&mut self, position: Vec3) -> Result<(), StoreError> {
        let game = viewer_to_game(Position::from_vec3(position));
        self.database.execute(&WriteStatement::InsertNode {
            name: DEFAULT_NODE_NAME.to_string(),
            map_id: self.map_id,
            x: game.x,
            y: game.y,
            z: game.z,
            linked: 0,
        })?;
        self.load_from_source();
        Ok(())
    }

    pub fn rename_node(&mut self, id: u32, name: &str) -> Result<(), StoreError> {
        let index = self.node_index(id)?;
        self.database.execute(&WriteStatement::RenameNode {
            id,
            name: name.to_string(),
        })?;
        self.nodes[index].name = name.to_string();
        Ok(())
    }

    pub fn move_node(&mut self, id: u32, position: Vec3) -> Result<(), StoreError> {
        let index = self.node_index(id)?;
        let orientation = self.nodes[index].game_position.o;
        let game = viewer_to_game(Position::from_vec3_with_orientation(position, orientation));
        self.database.execute(&WriteStatement::MoveNode {
            id,
            x: game.x,
            y: game.y,
            z: game.z,
        })?;

        let node = &mut self.nodes[index];
        node.game_position = game;
        node.position = position;
        self.dirty = true;
        Ok(())
    }

    pub fn delete_node(&mut self, id: u32) -> Result<(), StoreError> {
        self.node_index(id)?;
        self.database.execute(&WriteStatement::DeleteNode { id })?;
        self.load_from_source();
        Ok(())
    }

    pub fn move_path_point(&mut self, key: PathPointKey, position: Vec3) -> Result<(), StoreError> {
        let index = self.path_point_index(key)?;
        let orientation = self.path_points[index].game_position.o;
        let game = viewer_to_game(Position::from_vec3_with_orientation(position, orientation));
        self.database.execute(&WriteStatement::MovePathPoint {
            from_node_id: key.from_node_id,
            to_node_id: key.to_node_id,
            nr: key.nr,
            x: game.x,
            y: game.y,
            z: game.z,
        })?;

        let point = &mut self.path_points[index];
        point.game_position = game;
        point.position = position;
        self.dirty = true;
        Ok(())
    }

    pub fn delete_path_point(&mut self, key: PathPointKey) -> Result<(), StoreError> {
        self.path_point_index(key)?;
        self.database.execute(&WriteStatement::DeletePathPoint {
            from_node_id: key.from_node_id,
            to_node_id: key.to_node_id,
            nr: key.nr,
        })?;
        self.load_from_source();
        Ok(())
    }

    pub fn move_entity(&mut self, target: SelectableRef, position: Vec3) -> Result<(), StoreError> {
        match target {
            SelectableRef::Node { id } => self.move_node(id, position),
            SelectableRef::PathPoint { key } => self.move_path_point(key, position),
        }
    }

    pub fn delete_entity(&mut self, target: SelectableRef) -> Result<(), StoreError> {
        match target {
            SelectableRef::Node { id } => self.delete_node(id),
            SelectableRef::PathPoint { key } => self.delete_path_point(key),
        }
    }

    pub fn rename_entity(&mut self, target: SelectableRef, name: &str) -> Result<(), StoreError> {
        match target {
            SelectableRef::Node { id } => self.rename_node(id, name),
            SelectableRef::PathPoint { .. } => {
                Err(StoreError::Unsupported("path points have no name"))
            }
        }
    }

    pub fn nodes(&self) -> &[TravelNode] {
        &self.nodes
    }

    pub fn links(&self) -> &[TravelNodeLink] {
        &self.links
    }

    pub fn path_points(&self) -> &[TravelNodePathPoint] {
        &self.path_points
    }

    pub fn node(&self, id: u32) -> Option<&TravelNode> {
        self.node_lookup.get(&id).map(|&i| &self.nodes[i])
    }

    pub fn path_point(&self, key: PathPointKey) -> Option<&TravelNodePathPoint> {
        self.point_lookup.get(&key).map(|&i| &self.path_points[i])
    }

    /// Path points of a link in traversal order.
    pub fn link_points<'a>(
        &'a self,
        link: &'a TravelNodeLink,
    ) -> impl Iterator<Item = &'a TravelNodePathPoint> + 'a {
        link.points.iter().map(move |&i| &self.path_points[i])
    }

    pub fn outgoing_links<'a>(
        &'a self,
        node: &'a TravelNode,
    ) -> impl Iterator<Item = &'a TravelNodeLink> + 'a {
        node.links.iter().map(move |&i| &self.links[i])
    }

    pub fn nearest_node(&self, position: Vec3) -> Option<&TravelNode> {
        self.nodes.iter().min_by(|a, b| {
            a.position
                .distance_squared(position)
                .total_cmp(&b.position.distance_squared(position))
        })
    }

    pub fn map_id(&self) -> u32 {
        self.map_id
    }

    /// Incremented by every reload.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Read and clear the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn database_description(&self) -> String {
        self.database.describe()
    }

    fn node_index(&self, id: u32) -> Result<usize, StoreError> {
        self.node_lookup
            .get(&id)
            .copied()
            .ok_or(StoreError::UnknownNode(id))
    }

    fn path_point_index(&self, key: PathPointKey) -> Result<usize, StoreError> {
        self.point_lookup
            .get(&key)
            .copied()
            .ok_or(StoreError::UnknownPathPoint(key))
    }
}

use super::{DatabaseError, LinkRow, NodeDatabase, NodeRow, PathPointRow, WriteStatement};
use serde::{Deserialize, Serialize};

/// The three travel node tables. Mirrors the JSON document layout exactly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeTables {
    #[serde(default)]
    pub nodes: Vec<NodeRow>,
    #[serde(default)]
    pub links: Vec<LinkRow>,
    #[serde(default)]
    pub path_points: Vec<PathPointRow>,
}

impl NodeTables {
    /// Apply one statement. Nothing is modified when an error is returned.
    pub fn apply(&mut self, statement: &WriteStatement) -> Result<(), DatabaseError> {
        match statement {
            WriteStatement::InsertNode {
                name,
                map_id,
                x,
                y,
                z,
                linked,
            } => {
                let id = match self.nodes.iter().map(|n| n.id).max() {
                    Some(max) => max.checked_add(1).ok_or(DatabaseError::IdSpaceExhausted)?,
                    None => 1,
                };
                self.nodes.push(NodeRow {
                    id,
                    name: name.clone(),
                    map_id: *map_id,
                    x: *x,
                    y: *y,
                    z: *z,
                    linked: *linked,
                });
            }
            WriteStatement::RenameNode { id, name } => {
                self.node_mut(*id)?.name = name.clone();
            }
            WriteStatement::MoveNode { id, x, y, z } => {
                let node = self.node_mut(*id)?;
                node.x = *x;
                node.y = *y;
                node.z = *z;
            }
            WriteStatement::DeleteNode { id } => {
                let before = self.nodes.len();
                self.nodes.retain(|n| n.id != *id);
                if self.nodes.len() == before {
                    return Err(DatabaseError::RowNotFound(format!("node {}", id)));
                }
            }
            WriteStatement::MovePathPoint {
                from_node_id,
                to_node_id,
                nr,
                x,
                y,
                z,
            } => {
                let point = self
                    .path_points
                    .iter_mut()
                    .find(|p| {
                        p.from_node_id == *from_node_id && p.to_node_id == *to_node_id && p.nr == *nr
                    })
                    .ok_or_else(|| {
                        DatabaseError::RowNotFound(format!(
                            "path point {}->{} #{}",
                            from_node_id, to_node_id, nr
                        ))
                    })?;
                point.x = *x;
                point.y = *y;
                point.z = *z;
            }
            WriteStatement::DeletePathPoint {
                from_node_id,
                to_node_id,
                nr,
            } => {
                let before = self.path_points.len();
                self.path_points.retain(|p| {
                    !(p.from_node_id == *from_node_id && p.to_node_id == *to_node_id && p.nr == *nr)
                });
                if self.path_points.len() == before {
                    return Err(DatabaseError::RowNotFound(format!(
                        "path point {}->{} #{}",
                        from_node_id, to_node_id, nr
                    )));
                }
            }
        }
        Ok(())
    }

    fn node_mut(&mut self, id: u32) -> Result<&mut NodeRow, DatabaseError> {
        self.nodes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| DatabaseError::RowNotFound(format!("node {}", id)))
    }

    pub fn nodes_on_map(&self, map_id: u32) -> Vec<NodeRow> {
        let mut rows: Vec<NodeRow> = self
            .nodes
            .iter()
            .filter(|n| n.map_id == map_id)
            .cloned()
            .collect();
        rows.sort_by_key(|n| n.id);
        rows
    }

    pub fn ordered_path_points(&self) -> Vec<PathPointRow> {
        let mut rows = self.path_points.clone();
        rows.sort_by_key(|p| (p.from_node_id, p.to_node_id, p.nr));
        rows
    }
}

/// In-process database. Writes can be switched off to exercise failure paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    tables: NodeTables,
    read_only: bool,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::with_tables(NodeTables::default())
    }

    pub fn with_tables(tables: NodeTables) -> Self {
        Self {
            tables,
            read_only: false,
        }
    }

    /// When set, every `execute` fails with [`DatabaseError::ReadOnly`].
    #[cfg(test)]
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    #[cfg(test)]
    pub fn tables(&self) -> &NodeTables {
        &self.tables
    }
}

impl NodeDatabase for MemoryDatabase {
    fn query_nodes(&self, map_id: u32) -> Result<Vec<NodeRow>, DatabaseError> {
        Ok(self.tables.nodes_on_map(map_id))
    }

    fn query_links(&self) -> Result<Vec<LinkRow>, DatabaseError> {
        Ok(self.tables.links.clone())
    }

    fn query_path_points(&self) -> Result<Vec<PathPointRow>, DatabaseError> {
        Ok(self.tables.ordered_path_points())
    }

    fn execute(&mut self, statement: &WriteStatement) -> Result<(), DatabaseError> {
        if self.read_only {
            return Err(DatabaseError::ReadOnly);
        }
        self.tables.apply(statement)
    }

    fn describe(&self) -> String {
        format!(
            "memory ({} nodes, {} links, {} path points)",
            self.tables.nodes.len(),
            self.tables.links.len(),
            self.tables.path_points.len()
        )
    }
}

use crate::engine::graph::NodeGraphStore;
use bevy::prelude::*;

pub const SEGMENT_START_COLOUR: Color = Color::srgb(0.0, 1.0, 0.0);
pub const SEGMENT_PATH_COLOUR: Color = Color::srgb(0.5, 0.5, 1.0);
pub const SEGMENT_END_COLOUR: Color = Color::srgb(1.0, 0.0, 0.0);

/// One link flattened to a polyline: start node, path points by `nr`, end node.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSegment {
    pub from_node_id: u32,
    pub to_node_id: u32,
    pub vertices: Vec<Vec3>,
}

impl PathSegment {
    /// Vertices paired with their colour. Start green, path points blue, end red.
    pub fn coloured_vertices(&self) -> impl Iterator<Item = (Vec3, Color)> + '_ {
        let last = self.vertices.len().saturating_sub(1);
        self.vertices.iter().enumerate().map(move |(i, v)| {
            let colour = if i == 0 {
                SEGMENT_START_COLOUR
            } else if i == last {
                SEGMENT_END_COLOUR
            } else {
                SEGMENT_PATH_COLOUR
            };
            (*v, colour)
        })
    }

    /// Distance from `point` to the closest vertex.
    pub fn nearest_vertex_distance(&self, point: Vec3) -> f32 {
        self.vertices
            .iter()
            .map(|v| v.distance(point))
            .fold(f32::INFINITY, f32::min)
    }
}

/// Flatten every link of the store into a segment.
pub fn build_path_segments(store: &NodeGraphStore) -> Vec<PathSegment> {
    store
        .links()
        .iter()
        .filter_map(|link| {
            let from = store.node(link.from_node_id)?;
            let to = store.node(link.to_node_id)?;

            let mut vertices = Vec::with_capacity(link.points.len() + 2);
            vertices.push(from.position);
            vertices.extend(store.link_points(link).map(|p| p.position));
            vertices.push(to.position);

            Some(PathSegment {
                from_node_id: link.from_node_id,
                to_node_id: link.to_node_id,
                vertices,
            })
        })
        .collect()
}

/// Derived link geometry, rebuilt on `RebuildNodeGeometryEvent`.
#[derive(Resource, Default)]
pub struct NodeGeometryCache {
    pub segments: Vec<PathSegment>,
}

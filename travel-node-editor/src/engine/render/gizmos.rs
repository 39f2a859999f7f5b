use super::NodeDisplaySettings;
use super::geometry::NodeGeometryCache;
use crate::engine::graph::{NodeGraphStore, SelectableRef};
use crate::tools::node_editor::manipulation::ManipulationController;
use bevy::prelude::*;
use constants::render_settings::{DEFAULT_BOX_SIZE, PATH_POINT_SIZE, SELECTED_PATH_POINT_SIZE};

const LINKED_NODE_COLOUR: Color = Color::srgb(0.0, 1.0, 0.0);
const UNLINKED_NODE_COLOUR: Color = Color::srgb(1.0, 0.0, 0.0);
const PATH_POINT_COLOUR: Color = Color::srgb(0.5, 0.5, 1.0);
const SELECTION_COLOUR: Color = Color::srgb(1.0, 1.0, 0.0);

pub fn node_colour(linked: bool) -> Color {
    if linked { LINKED_NODE_COLOUR } else { UNLINKED_NODE_COLOUR }
}

// Draws node boxes, link polylines, path points and the selection highlight
pub fn draw_travel_nodes(
    mut gizmos: Gizmos,
    store: Res<NodeGraphStore>,
    cache: Res<NodeGeometryCache>,
    controller: Res<ManipulationController>,
    display: Res<NodeDisplaySettings>,
    cameras: Query<&GlobalTransform, With<Camera3d>>,
) {
    let Ok(cam_xf) = cameras.single() else {
        return;
    };
    let eye = cam_xf.translation();
    let in_view = |p: Vec3| p.distance(eye) <= display.view_distance;

    if display.show_nodes {
        for node in store.nodes().iter().filter(|n| in_view(n.position)) {
            gizmos.cuboid(
                Transform::from_translation(node.position).with_scale(Vec3::splat(DEFAULT_BOX_SIZE)),
                node_colour(node.is_linked()),
            );
        }

        for segment in &cache.segments {
            if segment.nearest_vertex_distance(eye) > display.view_distance {
                continue;
            }
            gizmos.linestrip_gradient(segment.coloured_vertices());
        }
    }

    if display.show_path_points {
        for point in store.path_points().iter().filter(|p| in_view(p.position)) {
            gizmos.sphere(
                Isometry3d::from_translation(point.position),
                PATH_POINT_SIZE,
                PATH_POINT_COLOUR,
            );
        }
    }

    // The highlight follows the cached position so it tracks an active drag.
    if let Some(selected) = controller.selected_object() {
        match selected.target {
            SelectableRef::Node { .. } => {
                gizmos.cuboid(
                    Transform::from_translation(selected.position)
                        .with_scale(Vec3::splat(DEFAULT_BOX_SIZE * 1.2)),
                    SELECTION_COLOUR,
                );
            }
            SelectableRef::PathPoint { .. } => {
                gizmos.sphere(
                    Isometry3d::from_translation(selected.position),
                    SELECTED_PATH_POINT_SIZE,
                    SELECTION_COLOUR,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linked_nodes_are_green_and_unlinked_red() {
        assert_eq!(node_colour(true), LINKED_NODE_COLOUR);
        assert_eq!(node_colour(false), UNLINKED_NODE_COLOUR);
    }
}

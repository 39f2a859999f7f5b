//! Travel graph overlay rendering.
//!
//! Everything is drawn with immediate-mode gizmos and UI text, reading the
//! graph store directly. Only link polylines are cached, since they need the
//! path point lists joined with node positions.
//!
//! ## Cache Invalidation
//!
//! ```text
//! NodeGraphStore (dirty after load / move)
//!   └─> emit_rebuild_on_dirty()      take_dirty() -> RebuildNodeGeometryEvent
//!       └─> rebuild_geometry_on_event()
//!           └─> NodeGeometryCache.segments = build_path_segments(store)
//! ```
//!
//! ## Display Toggles
//!
//! F1 nodes and links, F2 labels, F3 path points. Everything beyond
//! `view_distance` from the camera is culled.

/// Link polylines and their colours.
pub mod geometry;

/// Gizmo drawing of nodes, links, path points and the selection.
pub mod gizmos;

/// Screen-projected node labels.
pub mod labels;

use bevy::prelude::*;
use constants::render_settings::VIEW_DISTANCE;

use crate::engine::graph::NodeGraphStore;
use geometry::{NodeGeometryCache, build_path_segments};
use gizmos::draw_travel_nodes;
use labels::update_node_labels;

#[derive(Resource)]
pub struct NodeDisplaySettings {
    pub view_distance: f32,
    pub show_nodes: bool,
    pub show_labels: bool,
    pub show_path_points: bool,
}

impl Default for NodeDisplaySettings {
    fn default() -> Self {
        Self {
            view_distance: VIEW_DISTANCE,
            show_nodes: true,
            show_labels: true,
            show_path_points: true,
        }
    }
}

#[derive(Event)]
pub struct RebuildNodeGeometryEvent;

pub struct NodeRenderPlugin;

impl Plugin for NodeRenderPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NodeDisplaySettings>()
            .init_resource::<NodeGeometryCache>()
            .add_event::<RebuildNodeGeometryEvent>()
            .add_systems(
                Update,
                (
                    handle_display_toggles,
                    emit_rebuild_on_dirty,
                    rebuild_geometry_on_event,
                    draw_travel_nodes,
                    update_node_labels,
                )
                    .chain(),
            );
    }
}

pub fn emit_rebuild_on_dirty(
    mut store: ResMut<NodeGraphStore>,
    mut events: EventWriter<RebuildNodeGeometryEvent>,
) {
    // Avoid tripping change detection on frames where nothing happened.
    if store.is_dirty() && store.take_dirty() {
        events.write(RebuildNodeGeometryEvent);
    }
}

pub fn rebuild_geometry_on_event(
    mut events: EventReader<RebuildNodeGeometryEvent>,
    store: Res<NodeGraphStore>,
    mut cache: ResMut<NodeGeometryCache>,
) {
    if events.read().count() == 0 {
        return;
    }
    cache.segments = build_path_segments(&store);
    debug!("Rebuilt {} link segments", cache.segments.len());
}

#[cfg(not(target_arch = "wasm32"))]
pub fn handle_display_toggles(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut display: ResMut<NodeDisplaySettings>,
) {
    if keyboard.just_pressed(KeyCode::F1) {
        display.show_nodes = !display.show_nodes;
    }
    if keyboard.just_pressed(KeyCode::F2) {
        display.show_labels = !display.show_labels;
    }
    if keyboard.just_pressed(KeyCode::F3) {
        display.show_path_points = !display.show_path_points;
    }
}

/// Placeholder system for WASM builds where toggles are not bound to keys.
#[cfg(target_arch = "wasm32")]
pub fn handle_display_toggles() {}

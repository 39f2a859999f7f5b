use super::ray::ray_plane_intersection;
use super::selection::{PickTolerances, SelectableObject, SelectableType, SelectionIndex};
use crate::engine::graph::{NodeGraphStore, SelectableRef, StoreError};
use bevy::prelude::*;
use constants::render_settings::{
    ADD_NODE_FALLBACK_DISTANCE, FAST_DRAG_MULTIPLIER, SLOW_DRAG_MULTIPLIER,
};
use serde::{Deserialize, Serialize};

/// Editing mode. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManipulatorMode {
    #[default]
    None,
    Select,
    Move,
    Add,
    Delete,
}

impl ManipulatorMode {
    /// Convert string identifier to mode for RPC compatibility.
    pub fn from_string(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" => Some(Self::None),
            "select" => Some(Self::Select),
            "move" => Some(Self::Move),
            "add" => Some(Self::Add),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }

    pub fn to_string(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Select => "select",
            Self::Move => "move",
            Self::Add => "add",
            Self::Delete => "delete",
        }
    }
}

/// Modifier keys sampled for one drag frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragModifiers {
    /// Drag on the camera-facing plane instead of the ground plane.
    pub vertical: bool,
    pub fast: bool,
    pub slow: bool,
}

/// State of an active drag. Present only while dragging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub start_screen: Vec2,
    pub last_screen: Vec2,
    /// Position when the drag began.
    pub origin: Vec3,
    /// Position the current anchor was taken at. Moves on re-anchor.
    pub start_position: Vec3,
    /// First plane hit of the session. Displacements are measured from here.
    pub anchor: Option<Vec3>,
    pub vertical: bool,
    /// Speed multiplier the current anchor was taken with.
    pub multiplier: f32,
}

/// Tuning applied from configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManipulationSettings {
    pub fast_multiplier: f32,
    pub slow_multiplier: f32,
    /// Write every drag frame through to the store, not just the release.
    pub persist_during_drag: bool,
    pub tolerances: PickTolerances,
}

impl Default for ManipulationSettings {
    fn default() -> Self {
        Self {
            fast_multiplier: FAST_DRAG_MULTIPLIER,
            slow_multiplier: SLOW_DRAG_MULTIPLIER,
            persist_during_drag: true,
            tolerances: PickTolerances::default(),
        }
    }
}

/// Mode state machine, single selection and drag lifecycle.
///
/// The controller keeps its own [`SelectionIndex`] and tracks the store's
/// generation. A reload cancels any selection or drag and rebuilds the index.
#[derive(Resource, Default)]
pub struct ManipulationController {
    mode: ManipulatorMode,
    index: SelectionIndex,
    selected: Option<usize>,
    drag: Option<DragSession>,
    settings: ManipulationSettings,
    observed_generation: Option<u64>,
}

impl ManipulationController {
    pub fn new(settings: ManipulationSettings) -> Self {
        let mut controller = Self::default();
        controller.apply_settings(settings);
        controller
    }

    pub fn apply_settings(&mut self, settings: ManipulationSettings) {
        self.settings = settings;
        self.index.set_tolerances(settings.tolerances);
    }

    pub fn settings(&self) -> ManipulationSettings {
        self.settings
    }

    /// Returns false when the mode was already active.
    pub fn set_mode(&mut self, mode: ManipulatorMode) -> bool {
        if self.mode == mode {
            return false;
        }
        self.mode = mode;
        true
    }

    /// Rebuild the index if the store reloaded since the last call.
    /// Returns true when a rebuild happened.
    pub fn sync_with_store(&mut self, store: &NodeGraphStore) -> bool {
        if self.observed_generation == Some(store.generation()) {
            return false;
        }
        if self.selected.is_some() || self.drag.is_some() {
            debug!("Graph reloaded, dropping selection");
        }
        self.drag = None;
        self.selected = None;
        self.index.rebuild(store);
        self.observed_generation = Some(store.generation());
        true
    }

    /// Pick under the ray and make it the only selected entry. Select mode only.
    pub fn update_selection(
        &mut self,
        store: &NodeGraphStore,
        origin: Vec3,
        direction: Vec3,
    ) -> Option<SelectableRef> {
        self.sync_with_store(store);
        if self.mode != ManipulatorMode::Select {
            return self.selected_object().map(|o| o.target);
        }

        self.index.clear_selection_flags();
        self.selected = self.index.pick(origin, direction);
        if let Some(object) = self.selected.and_then(|i| self.index.get_mut(i)) {
            object.selected = true;
        }
        self.selected_object().map(|o| o.target)
    }

    pub fn clear_selection(&mut self) {
        self.drag = None;
        self.selected = None;
        self.index.clear_selection_flags();
    }

    /// Begin a drag of the current selection. Returns false without a selection.
    pub fn start_dragging(&mut self, screen: Vec2) -> bool {
        let Some(object) = self.selected_object() else {
            return false;
        };
        self.drag = Some(DragSession {
            start_screen: screen,
            last_screen: screen,
            origin: object.position,
            start_position: object.position,
            anchor: None,
            vertical: false,
            multiplier: 1.0,
        });
        true
    }

    /// Move the selection to follow the ray. Returns Ok(true) when it moved.
    ///
    /// Without the vertical modifier the selection slides on the horizontal
    /// plane through its start position. With it the plane passes through the
    /// start position and faces the ray origin.
    pub fn update_dragging(
        &mut self,
        store: &mut NodeGraphStore,
        screen: Vec2,
        origin: Vec3,
        direction: Vec3,
        modifiers: DragModifiers,
    ) -> Result<bool, StoreError> {
        self.sync_with_store(store);
        let Some(selected) = self.selected else {
            return Ok(false);
        };
        let Some(current) = self.index.get(selected).map(|o| o.position) else {
            return Ok(false);
        };
        let multiplier = if modifiers.fast {
            self.settings.fast_multiplier
        } else if modifiers.slow {
            self.settings.slow_multiplier
        } else {
            1.0
        };
        let Some(session) = self.drag.as_mut() else {
            return Ok(false);
        };
        session.last_screen = screen;

        if session.vertical != modifiers.vertical || session.multiplier != multiplier {
            session.vertical = modifiers.vertical;
            session.multiplier = multiplier;
            session.start_position = current;
            session.anchor = None;
        }

        let Some(dir) = direction.try_normalize() else {
            return Ok(false);
        };
        let normal = if session.vertical {
            let Some(facing) = (origin - session.start_position).try_normalize() else {
                return Ok(false);
            };
            facing
        } else {
            Vec3::Y
        };
        let Some(hit) = ray_plane_intersection(origin, dir, session.start_position, normal) else {
            return Ok(false);
        };

        let Some(anchor) = session.anchor else {
            session.anchor = Some(hit);
            return Ok(false);
        };

        let mut position = session.start_position + (hit - anchor) * multiplier;
        if !session.vertical {
            position.y = session.start_position.y;
        }

        let Some(target) = self.index.get(selected).map(|o| o.target) else {
            return Ok(false);
        };
        if self.settings.persist_during_drag {
            store.move_entity(target, position)?;
        }
        if let Some(object) = self.index.get_mut(selected) {
            object.position = position;
        }
        Ok(true)
    }

    /// End the drag with one final write. Returns Ok(false) when no drag was active.
    ///
    /// A drag cancelled by a reload ends without writing.
    pub fn stop_dragging(&mut self, store: &mut NodeGraphStore) -> Result<bool, StoreError> {
        self.sync_with_store(store);
        if self.drag.take().is_none() {
            return Ok(false);
        }
        let Some(object) = self.selected_object() else {
            return Ok(false);
        };
        let (target, position) = (object.target, object.position);
        store.move_entity(target, position)?;
        Ok(true)
    }

    /// Delete the selection. Returns Ok(false) when nothing is selected.
    pub fn delete_selected(&mut self, store: &mut NodeGraphStore) -> Result<bool, StoreError> {
        self.sync_with_store(store);
        let Some(target) = self.selected_object().map(|o| o.target) else {
            return Ok(false);
        };
        self.drag = None;
        store.delete_entity(target)?;
        self.clear_selection();
        self.sync_with_store(store);
        Ok(true)
    }

    /// Delete whatever lies under the ray. Used by Delete mode clicks.
    pub fn delete_at(
        &mut self,
        store: &mut NodeGraphStore,
        origin: Vec3,
        direction: Vec3,
    ) -> Result<Option<SelectableRef>, StoreError> {
        self.sync_with_store(store);
        let Some(target) = self
            .index
            .pick(origin, direction)
            .and_then(|i| self.index.get(i))
            .map(|o| o.target)
        else {
            return Ok(None);
        };
        store.delete_entity(target)?;
        self.clear_selection();
        self.sync_with_store(store);
        Ok(Some(target))
    }

    /// Create a new entity at a viewer space position. Path points are reserved
    /// and create nothing. The index is rebuilt either way.
    pub fn add_new_object(
        &mut self,
        store: &mut NodeGraphStore,
        position: Vec3,
        kind: SelectableType,
    ) -> Result<bool, StoreError> {
        let added = match kind {
            SelectableType::TravelNode => {
                store.add_node(position)?;
                true
            }
            other => {
                debug!("Adding {} objects is not supported", other.to_string());
                false
            }
        };

        self.sync_with_store(store);
        let selected_target = self.selected_object().map(|o| o.target);
        self.index.rebuild(store);
        self.selected = selected_target.and_then(|t| self.index.find(t));
        if let Some(object) = self.selected.and_then(|i| self.index.get_mut(i)) {
            object.selected = true;
        }
        Ok(added)
    }

    pub fn rename_selected(
        &mut self,
        store: &mut NodeGraphStore,
        name: &str,
    ) -> Result<bool, StoreError> {
        self.sync_with_store(store);
        let Some(selected) = self.selected else {
            return Ok(false);
        };
        let Some(target) = self.index.get(selected).map(|o| o.target) else {
            return Ok(false);
        };
        store.rename_entity(target, name)?;
        if let Some(object) = self.index.get_mut(selected) {
            object.label = name.to_string();
        }
        Ok(true)
    }

    pub fn mode(&self) -> ManipulatorMode {
        self.mode
    }

    pub fn selected_object(&self) -> Option<&SelectableObject> {
        self.selected.and_then(|i| self.index.get(i))
    }

    pub fn has_selection(&self) -> bool {
        self.selected_object().is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn drag_session(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    pub fn index(&self) -> &SelectionIndex {
        &self.index
    }

    /// Multiplier applied while the fast modifier is held.
    pub fn drag_speed(&self) -> f32 {
        self.settings.fast_multiplier
    }

    pub fn set_drag_speed(&mut self, speed: f32) {
        self.settings.fast_multiplier = speed;
    }
}

/// Where Add mode places a node for a click ray: on the horizontal plane at
/// the height of the node nearest the ray origin, or a fixed distance along
/// the ray when there is no such node or the plane is missed.
pub fn new_node_position(store: &NodeGraphStore, origin: Vec3, direction: Vec3) -> Option<Vec3> {
    let dir = direction.try_normalize()?;
    let ground = store
        .nearest_node(origin)
        .and_then(|node| ray_plane_intersection(origin, dir, node.position, Vec3::Y));
    Some(ground.unwrap_or(origin + dir * ADD_NODE_FALLBACK_DISTANCE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::database::MemoryDatabase;
    use crate::engine::graph::PathPointKey;
    use crate::engine::graph::store::tests::{sample_store, sample_tables};
    use approx::assert_abs_diff_eq;

    const SCREEN: Vec2 = Vec2::new(400.0, 300.0);

    fn controller_in(mode: ManipulatorMode, store: &NodeGraphStore) -> ManipulationController {
        let mut controller = ManipulationController::default();
        controller.set_mode(mode);
        controller.sync_with_store(store);
        controller
    }

    /// Select an entity by casting straight down onto it from above.
    fn select(controller: &mut ManipulationController, store: &NodeGraphStore, at: Vec3) {
        let previous = controller.mode();
        controller.set_mode(ManipulatorMode::Select);
        controller.update_selection(store, at + Vec3::Y * 50.0, -Vec3::Y);
        controller.set_mode(previous);
    }

    fn ray_towards(origin: Vec3, target: Vec3) -> (Vec3, Vec3) {
        (origin, target - origin)
    }

    #[test]
    fn selection_only_changes_in_select_mode() {
        let store = sample_store();
        let node = store.node(2).unwrap().position;

        let mut controller = controller_in(ManipulatorMode::Move, &store);
        controller.update_selection(&store, node + Vec3::Y * 50.0, -Vec3::Y);
        assert!(!controller.has_selection());

        controller.set_mode(ManipulatorMode::Select);
        let picked = controller.update_selection(&store, node + Vec3::Y * 50.0, -Vec3::Y);
        assert_eq!(picked, Some(SelectableRef::Node { id: 2 }));
        assert_eq!(
            controller.index().objects().iter().filter(|o| o.selected).count(),
            1
        );

        controller.update_selection(&store, node + Vec3::Y * 50.0, Vec3::Y);
        assert!(!controller.has_selection());
        assert!(controller.index().objects().iter().all(|o| !o.selected));
    }

    #[test]
    fn start_dragging_needs_a_selection() {
        let store = sample_store();
        let mut controller = controller_in(ManipulatorMode::Move, &store);

        assert!(!controller.start_dragging(SCREEN));
        assert!(!controller.is_dragging());
    }

    #[test]
    fn ground_plane_drag_keeps_height() {
        let mut store = sample_store();
        let start = store.node(2).unwrap().position;
        let mut controller = controller_in(ManipulatorMode::Move, &store);
        select(&mut controller, &store, start);
        assert!(controller.start_dragging(SCREEN));

        let eye = start + Vec3::new(0.0, 40.0, 40.0);
        let (o, d) = ray_towards(eye, start + Vec3::new(1.0, 0.0, 1.0));
        assert!(!controller.update_dragging(&mut store, SCREEN, o, d, DragModifiers::default()).unwrap());

        let (o, d) = ray_towards(eye, start + Vec3::new(4.0, 0.0, -2.0));
        assert!(controller.update_dragging(&mut store, SCREEN, o, d, DragModifiers::default()).unwrap());

        let moved = controller.selected_object().unwrap().position;
        assert_abs_diff_eq!(moved.x, start.x + 3.0, epsilon = 5e-2);
        assert_abs_diff_eq!(moved.z, start.z - 3.0, epsilon = 5e-2);
        assert_eq!(moved.y, start.y);
        assert_eq!(store.node(2).unwrap().position, moved);
    }

    #[test]
    fn fast_modifier_scales_displacement() {
        let mut store = sample_store();
        let start = store.node(2).unwrap().position;
        let mut controller = controller_in(ManipulatorMode::Move, &store);
        select(&mut controller, &store, start);
        controller.start_dragging(SCREEN);
        let fast = DragModifiers {
            fast: true,
            ..Default::default()
        };

        let eye = start + Vec3::new(0.0, 40.0, 40.0);
        let (o, d) = ray_towards(eye, start);
        controller.update_dragging(&mut store, SCREEN, o, d, fast).unwrap();
        let (o, d) = ray_towards(eye, start + Vec3::new(1.0, 0.0, 0.0));
        controller.update_dragging(&mut store, SCREEN, o, d, fast).unwrap();

        let moved = controller.selected_object().unwrap().position;
        assert_abs_diff_eq!(moved.x, start.x + FAST_DRAG_MULTIPLIER, epsilon = 1e-1);
        assert_abs_diff_eq!(moved.z, start.z, epsilon = 1e-1);
    }

    #[test]
    fn vertical_modifier_drags_on_camera_facing_plane() {
        let mut store = sample_store();
        let start = store.node(2).unwrap().position;
        let mut controller = controller_in(ManipulatorMode::Move, &store);
        select(&mut controller, &store, start);
        controller.start_dragging(SCREEN);
        let vertical = DragModifiers {
            vertical: true,
            ..Default::default()
        };

        let eye = start + Vec3::new(0.0, 0.0, 50.0);
        let (o, d) = ray_towards(eye, start + Vec3::new(0.0, 2.0, 0.0));
        controller.update_dragging(&mut store, SCREEN, o, d, vertical).unwrap();
        let (o, d) = ray_towards(eye, start + Vec3::new(1.0, 5.0, 0.0));
        assert!(controller.update_dragging(&mut store, SCREEN, o, d, vertical).unwrap());

        let moved = controller.selected_object().unwrap().position;
        assert_abs_diff_eq!(moved.x, start.x + 1.0, epsilon = 5e-2);
        assert_abs_diff_eq!(moved.y, start.y + 3.0, epsilon = 5e-2);
        assert_abs_diff_eq!(moved.z, start.z, epsilon = 5e-2);
    }

    #[test]
    fn degenerate_frames_are_skipped() {
        let mut store = sample_store();
        let start = store.node(2).unwrap().position;
        let mut controller = controller_in(ManipulatorMode::Move, &store);
        select(&mut controller, &store, start);
        controller.start_dragging(SCREEN);
        let eye = start + Vec3::new(0.0, 40.0, 0.0);
        let none = DragModifiers::default();

        // Parallel to the ground plane, zero length, pointing away.
        assert!(!controller.update_dragging(&mut store, SCREEN, eye, Vec3::X, none).unwrap());
        assert!(!controller.update_dragging(&mut store, SCREEN, eye, Vec3::ZERO, none).unwrap());
        assert!(!controller.update_dragging(&mut store, SCREEN, eye, Vec3::Y, none).unwrap());

        assert_eq!(controller.selected_object().unwrap().position, start);
        assert!(controller.drag_session().unwrap().anchor.is_none());
    }

    #[test]
    fn stop_dragging_writes_once() {
        let mut db = MemoryDatabase::with_tables(sample_tables());
        db.set_read_only(true);
        let mut store = NodeGraphStore::open(Box::new(db), 0);
        let start = store.node(1).unwrap().position;
        let mut controller = controller_in(ManipulatorMode::Move, &store);
        select(&mut controller, &store, start);
        controller.start_dragging(SCREEN);

        // The read-only store fails every write, so a second write would be visible.
        assert!(matches!(
            controller.stop_dragging(&mut store),
            Err(StoreError::Database(_))
        ));
        assert!(!controller.is_dragging());
        assert!(!controller.stop_dragging(&mut store).unwrap());
    }

    #[test]
    fn drag_without_live_writes_persists_on_release() {
        let mut store = sample_store();
        let start = store.node(3).unwrap().position;
        let mut controller = ManipulationController::new(ManipulationSettings {
            persist_during_drag: false,
            ..Default::default()
        });
        controller.sync_with_store(&store);
        select(&mut controller, &store, start);
        controller.set_mode(ManipulatorMode::Move);
        controller.start_dragging(SCREEN);

        let eye = start + Vec3::new(0.0, 40.0, 40.0);
        let (o, d) = ray_towards(eye, start);
        controller.update_dragging(&mut store, SCREEN, o, d, DragModifiers::default()).unwrap();
        let (o, d) = ray_towards(eye, start + Vec3::new(2.0, 0.0, 0.0));
        controller.update_dragging(&mut store, SCREEN, o, d, DragModifiers::default()).unwrap();
        assert_eq!(store.node(3).unwrap().position, start);

        assert!(controller.stop_dragging(&mut store).unwrap());
        let stored = store.node(3).unwrap().position;
        assert_eq!(stored, controller.selected_object().unwrap().position);
        assert_abs_diff_eq!(stored.x, start.x + 2.0, epsilon = 5e-2);
    }

    #[test]
    fn reload_then_stop_dragging_issues_no_write() {
        let mut store = sample_store();
        let start = store.node(2).unwrap().position;
        let mut controller = ManipulationController::new(ManipulationSettings {
            persist_during_drag: false,
            ..Default::default()
        });
        controller.sync_with_store(&store);
        select(&mut controller, &store, start);
        controller.set_mode(ManipulatorMode::Move);
        controller.start_dragging(SCREEN);

        let eye = start + Vec3::new(0.0, 40.0, 40.0);
        let (o, d) = ray_towards(eye, start);
        controller.update_dragging(&mut store, SCREEN, o, d, DragModifiers::default()).unwrap();
        let (o, d) = ray_towards(eye, start + Vec3::new(5.0, 0.0, 0.0));
        assert!(controller.update_dragging(&mut store, SCREEN, o, d, DragModifiers::default()).unwrap());

        store.load_from_source();

        assert!(!controller.stop_dragging(&mut store).unwrap());
        assert!(!controller.is_dragging());
        assert_eq!(store.node(2).unwrap().position, start);
    }

    #[test]
    fn failed_drag_write_leaves_cached_position_untouched() {
        let mut db = MemoryDatabase::with_tables(sample_tables());
        db.set_read_only(true);
        let mut store = NodeGraphStore::open(Box::new(db), 0);
        let start = store.node(2).unwrap().position;
        let mut controller = controller_in(ManipulatorMode::Move, &store);
        select(&mut controller, &store, start);
        controller.start_dragging(SCREEN);

        let eye = start + Vec3::new(0.0, 40.0, 40.0);
        let (o, d) = ray_towards(eye, start);
        controller.update_dragging(&mut store, SCREEN, o, d, DragModifiers::default()).unwrap();
        let (o, d) = ray_towards(eye, start + Vec3::new(5.0, 0.0, 0.0));
        assert!(controller
            .update_dragging(&mut store, SCREEN, o, d, DragModifiers::default())
            .is_err());

        let cached = controller.selected_object().unwrap().position;
        assert_eq!(cached, store.node(2).unwrap().position);
        assert_eq!(cached, start);
    }

    #[test]
    fn changing_speed_mid_drag_does_not_jump() {
        let mut store = sample_store();
        let start = store.node(2).unwrap().position;
        let mut controller = controller_in(ManipulatorMode::Move, &store);
        select(&mut controller, &store, start);
        controller.start_dragging(SCREEN);
        let none = DragModifiers::default();
        let fast = DragModifiers {
            fast: true,
            ..Default::default()
        };

        let eye = start + Vec3::new(0.0, 40.0, 40.0);
        let (o, d) = ray_towards(eye, start);
        controller.update_dragging(&mut store, SCREEN, o, d, none).unwrap();
        let (o, d) = ray_towards(eye, start + Vec3::new(10.0, 0.0, 0.0));
        assert!(controller.update_dragging(&mut store, SCREEN, o, d, none).unwrap());
        let before = controller.selected_object().unwrap().position;
        assert_abs_diff_eq!(before.x, start.x + 10.0, epsilon = 5e-2);

        // Same ray with Shift held: re-anchors in place.
        assert!(!controller.update_dragging(&mut store, SCREEN, o, d, fast).unwrap());
        assert_eq!(controller.selected_object().unwrap().position, before);
        assert_eq!(controller.drag_session().unwrap().multiplier, FAST_DRAG_MULTIPLIER);

        let (o, d) = ray_towards(eye, start + Vec3::new(11.0, 0.0, 0.0));
        assert!(controller.update_dragging(&mut store, SCREEN, o, d, fast).unwrap());
        let after = controller.selected_object().unwrap().position;
        assert_abs_diff_eq!(after.x, before.x + FAST_DRAG_MULTIPLIER, epsilon = 1e-1);
        assert_eq!(store.node(2).unwrap().position, after);
    }

    #[test]
    fn delete_selected_reloads_and_clears_selection() {
        let mut store = sample_store();
        let mut controller = controller_in(ManipulatorMode::Select, &store);
        let position = store.node(3).unwrap().position;
        select(&mut controller, &store, position);

        assert!(controller.delete_selected(&mut store).unwrap());
        assert!(!controller.has_selection());
        assert!(store.node(3).is_none());
        assert_eq!(controller.index().len(), 4);

        assert!(!controller.delete_selected(&mut store).unwrap());
    }

    #[test]
    fn delete_at_removes_path_point_under_ray() {
        let mut store = sample_store();
        let key = PathPointKey::new(1, 2, 2);
        let position = store.path_point(key).unwrap().position;
        let mut controller = controller_in(ManipulatorMode::Delete, &store);

        let removed = controller
            .delete_at(&mut store, position + Vec3::Y * 30.0, -Vec3::Y)
            .unwrap();

        assert_eq!(removed, Some(SelectableRef::PathPoint { key }));
        assert!(store.path_point(key).is_none());
        assert_eq!(controller.index().len(), 4);
    }

    #[test]
    fn add_new_node_rebuilds_index() {
        let mut store = sample_store();
        let mut controller = controller_in(ManipulatorMode::Add, &store);
        let position = store.node(1).unwrap().position + Vec3::new(50.0, 0.0, 0.0);

        assert!(controller
            .add_new_object(&mut store, position, SelectableType::TravelNode)
            .unwrap());
        assert_eq!(store.nodes().len(), 4);
        assert_eq!(controller.index().len(), 6);

        assert!(!controller
            .add_new_object(&mut store, position, SelectableType::PathPoint)
            .unwrap());
        assert_eq!(store.nodes().len(), 4);
        assert_eq!(controller.index().len(), 6);
    }

    #[test]
    fn rename_selected_updates_label() {
        let mut store = sample_store();
        let mut controller = controller_in(ManipulatorMode::Select, &store);
        let position = store.node(1).unwrap().position;
        select(&mut controller, &store, position);

        assert!(controller.rename_selected(&mut store, "Inn").unwrap());
        assert_eq!(controller.selected_object().unwrap().label, "Inn");
        assert_eq!(store.node(1).unwrap().name, "Inn");
    }

    #[test]
    fn reload_cancels_selection_and_drag() {
        let mut store = sample_store();
        let mut controller = controller_in(ManipulatorMode::Move, &store);
        let position = store.node(1).unwrap().position;
        select(&mut controller, &store, position);
        controller.start_dragging(SCREEN);

        store.load_from_source();

        assert!(controller.sync_with_store(&store));
        assert!(!controller.has_selection());
        assert!(!controller.is_dragging());
        assert!(!controller.sync_with_store(&store));
    }

    #[test]
    fn new_nodes_land_on_nearest_node_height() {
        let store = sample_store();
        let node = store.node(1).unwrap().position;
        let eye = node + Vec3::new(0.0, 20.0, 0.0);

        let placed = new_node_position(&store, eye, Vec3::new(1.0, -1.0, 0.0)).unwrap();
        assert_abs_diff_eq!(placed.y, node.y, epsilon = 1e-3);
        assert_abs_diff_eq!(placed.x, node.x + 20.0, epsilon = 5e-2);

        let level = new_node_position(&store, eye, Vec3::X).unwrap();
        assert_abs_diff_eq!(level.x, eye.x + ADD_NODE_FALLBACK_DISTANCE, epsilon = 5e-2);
        assert!(new_node_position(&store, eye, Vec3::ZERO).is_none());
    }

    #[test]
    fn mode_names_round_trip() {
        for mode in [
            ManipulatorMode::None,
            ManipulatorMode::Select,
            ManipulatorMode::Move,
            ManipulatorMode::Add,
            ManipulatorMode::Delete,
        ] {
            assert_eq!(ManipulatorMode::from_string(mode.to_string()), Some(mode));
        }
        assert_eq!(ManipulatorMode::from_string("MOVE"), Some(ManipulatorMode::Move));
        assert_eq!(ManipulatorMode::from_string("rotate"), None);
    }
}

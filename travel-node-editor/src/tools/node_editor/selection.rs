use super::ray::ray_point_distance;
use crate::engine::graph::{NodeGraphStore, SelectableRef};
use bevy::prelude::*;
use constants::render_settings::{NODE_PICK_RADIUS, PATH_POINT_PICK_RADIUS};

/// Kind of a selectable entry. Links are never produced by the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectableType {
    None,
    TravelNode,
    PathPoint,
    Link,
}

impl SelectableType {
    pub fn to_string(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::TravelNode => "node",
            Self::PathPoint => "path_point",
            Self::Link => "link",
        }
    }
}

/// One pickable entry. Rebuilt from the store, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectableObject {
    pub target: SelectableRef,
    pub position: Vec3,
    pub label: String,
    pub selected: bool,
}

impl SelectableObject {
    pub fn kind(&self) -> SelectableType {
        match self.target {
            SelectableRef::Node { .. } => SelectableType::TravelNode,
            SelectableRef::PathPoint { .. } => SelectableType::PathPoint,
        }
    }
}

/// Maximum ray distance per selectable kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickTolerances {
    pub node: f32,
    pub path_point: f32,
}

impl Default for PickTolerances {
    fn default() -> Self {
        Self {
            node: NODE_PICK_RADIUS,
            path_point: PATH_POINT_PICK_RADIUS,
        }
    }
}

impl PickTolerances {
    fn for_kind(&self, kind: SelectableType) -> f32 {
        match kind {
            SelectableType::TravelNode => self.node,
            SelectableType::PathPoint => self.path_point,
            SelectableType::None | SelectableType::Link => 0.0,
        }
    }
}

/// Flat list of everything the ray can hit: nodes first, then path points in link order.
#[derive(Debug, Clone, Default)]
pub struct SelectionIndex {
    objects: Vec<SelectableObject>,
    tolerances: PickTolerances,
}

impl SelectionIndex {
    pub fn rebuild(&mut self, store: &NodeGraphStore) {
        self.objects.clear();

        for node in store.nodes() {
            self.objects.push(SelectableObject {
                target: SelectableRef::Node { id: node.id },
                position: node.position,
                label: node.name.clone(),
                selected: false,
            });
        }

        for link in store.links() {
            for point in store.link_points(link) {
                self.objects.push(SelectableObject {
                    target: SelectableRef::PathPoint { key: point.key },
                    position: point.position,
                    label: point.label(),
                    selected: false,
                });
            }
        }
    }

    /// Index of the entry closest to the ray within its tolerance.
    /// Ties resolve to the earlier entry.
    pub fn pick(&self, origin: Vec3, direction: Vec3) -> Option<usize> {
        let dir = direction.try_normalize()?;

        let mut best: Option<(usize, f32)> = None;
        for (i, object) in self.objects.iter().enumerate() {
            let Some(distance) = ray_point_distance(origin, dir, object.position) else {
                continue;
            };
            if distance >= self.tolerances.for_kind(object.kind()) {
                continue;
            }
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((i, distance));
            }
        }

        best.map(|(i, _)| i)
    }

    pub fn find(&self, target: SelectableRef) -> Option<usize> {
        self.objects.iter().position(|o| o.target == target)
    }

    pub fn objects(&self) -> &[SelectableObject] {
        &self.objects
    }

    pub fn get(&self, index: usize) -> Option<&SelectableObject> {
        self.objects.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut SelectableObject> {
        self.objects.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn tolerances(&self) -> PickTolerances {
        self.tolerances
    }

    pub fn set_tolerances(&mut self, tolerances: PickTolerances) {
        self.tolerances = tolerances;
    }

    pub fn clear_selection_flags(&mut self) {
        for object in &mut self.objects {
            object.selected = false;
        }
    }
}

use super::NodeDisplaySettings;
use crate::engine::graph::NodeGraphStore;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use constants::render_settings::{LABEL_SCREEN_MARGIN, TEXT_HEIGHT_OFFSET};
use std::collections::HashSet;

/// Screen-space text showing `[id] name` above a node.
#[derive(Component)]
pub struct NodeLabel {
    pub node_id: u32,
}

/// True when a projected label keeps the margin to every window edge.
pub fn label_fits_window(screen: Vec2, window_size: Vec2, margin: f32) -> bool {
    screen.x >= margin
        && screen.y >= margin
        && screen.x <= window_size.x - margin
        && screen.y <= window_size.y - margin
}

// Keeps one label entity per node and projects it every frame
pub fn update_node_labels(
    mut commands: Commands,
    store: Res<NodeGraphStore>,
    display: Res<NodeDisplaySettings>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&GlobalTransform, &Camera), With<Camera3d>>,
    mut labels: Query<(Entity, &NodeLabel, &mut Text, &mut Node, &mut Visibility)>,
) {
    let Ok(window) = windows.single() else { return };
    let Ok((cam_xf, camera)) = cameras.single() else { return };
    let eye = cam_xf.translation();
    let forward = cam_xf.forward().as_vec3();
    let window_size = window.size();

    let mut labelled = HashSet::new();
    for (entity, label, mut text, mut node_style, mut visibility) in &mut labels {
        let Some(node) = store.node(label.node_id) else {
            commands.entity(entity).despawn();
            continue;
        };
        labelled.insert(label.node_id);

        let caption = node.label();
        if text.0 != caption {
            text.0 = caption;
        }

        let anchor = node.position + Vec3::Y * TEXT_HEIGHT_OFFSET;
        let screen = if !display.show_labels
            || anchor.distance(eye) > display.view_distance
            || (anchor - eye).dot(forward) <= 0.0
        {
            None
        } else {
            camera
                .world_to_viewport(cam_xf, anchor)
                .ok()
                .filter(|s| label_fits_window(*s, window_size, LABEL_SCREEN_MARGIN))
        };

        match screen {
            Some(s) => {
                node_style.left = Val::Px(s.x);
                node_style.top = Val::Px(s.y);
                *visibility = Visibility::Visible;
            }
            None => *visibility = Visibility::Hidden,
        }
    }

    for node in store.nodes().iter().filter(|n| !labelled.contains(&n.id)) {
        commands.spawn((
            NodeLabel { node_id: node.id },
            Name::new(format!("NodeLabel{}", node.id)),
            Text::new(node.label()),
            TextFont { font_size: 13.0, ..default() },
            TextColor(Color::srgb(1.0, 1.0, 1.0)),
            Node {
                position_type: PositionType::Absolute,
                ..default()
            },
            Visibility::Hidden,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_near_window_edges_are_hidden() {
        let window = Vec2::new(800.0, 600.0);

        assert!(label_fits_window(Vec2::new(400.0, 300.0), window, 10.0));
        assert!(label_fits_window(Vec2::new(10.0, 590.0), window, 10.0));
        assert!(!label_fits_window(Vec2::new(5.0, 300.0), window, 10.0));
        assert!(!label_fits_window(Vec2::new(400.0, 595.0), window, 10.0));
        assert!(!label_fits_window(Vec2::new(-40.0, -40.0), window, 10.0));
    }
}

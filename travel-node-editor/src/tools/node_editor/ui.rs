use super::manipulation::ManipulationController;
use super::state::*;
use crate::engine::graph::{NodeGraphStore, SelectableRef};
use bevy::ecs::query::QueryFilter;
use bevy::prelude::*;
use constants::coordinate_system::viewer_to_game_vec3;

const PANEL_TEXT: Color = Color::srgb(1.0, 1.0, 1.0);
const PANEL_MUTED: Color = Color::srgb(0.70, 0.72, 0.76);
const PANEL_WARNING: Color = Color::srgb(1.0, 0.85, 0.35);
const PANEL_WIDTH: f32 = 320.0;

// Spawns the travel node panel: title, live readouts and key help
pub fn spawn_editor_panel(mut commands: Commands) {
    commands
        .spawn((
            EditorPanelRoot,
            Name::new("TravelNodePanel"),
            BackgroundColor(Color::srgba(0.10, 0.11, 0.13, 0.92)),
            Node {
                width: Val::Px(PANEL_WIDTH),
                position_type: PositionType::Absolute,
                left: Val::Px(0.0),
                top: Val::Px(0.0),
                padding: UiRect::axes(Val::Px(12.0), Val::Px(8.0)),
                row_gap: Val::Px(6.0),
                display: Display::Flex,
                flex_direction: FlexDirection::Column,
                ..default()
            },
        ))
        .with_children(|panel| {
            panel.spawn((Name::new("Title"), Text::new("Travel Nodes"), TextFont { font_size: 18.0, ..default() }, TextColor(PANEL_TEXT)));
            panel.spawn((ModeText, Text::new("Mode: none"), TextFont { font_size: 16.0, ..default() }, TextColor(PANEL_TEXT)));
            panel.spawn((SelectionText, Text::new("Selected: nothing"), TextFont { font_size: 15.0, ..default() }, TextColor(PANEL_TEXT)));
            panel.spawn((SelectionPositionText, Text::new(""), TextFont { font_size: 13.0, ..default() }, TextColor(PANEL_MUTED)));
            panel.spawn((CameraPositionText, Text::new(""), TextFont { font_size: 13.0, ..default() }, TextColor(PANEL_MUTED)));
            panel.spawn((StatusText, Text::new(""), TextFont { font_size: 13.0, ..default() }, TextColor(PANEL_WARNING)));
            panel.spawn((
                Text::new(
                    "1 select  2 move  3 add  4 delete  0 none\n\
                     Ctrl drag: vertical  Shift: fast  Alt: slow\n\
                     Esc deselect  Del delete  G next node  Ctrl+N nearest\n\
                     F1 nodes  F2 labels  F3 path points",
                ),
                TextFont { font_size: 12.0, ..default() },
                TextColor(PANEL_MUTED),
            ));
        });
}

// Refreshes mode, selection, coordinates and status readouts
pub fn update_editor_panel(
    controller: Res<ManipulationController>,
    store: Res<NodeGraphStore>,
    status: Res<EditorStatus>,
    cameras: Query<&GlobalTransform, With<Camera3d>>,
    mut texts: ParamSet<(
        Query<&mut Text, With<ModeText>>,
        Query<&mut Text, With<SelectionText>>,
        Query<&mut Text, With<SelectionPositionText>>,
        Query<&mut Text, With<CameraPositionText>>,
        Query<&mut Text, With<StatusText>>,
    )>,
) {
    let dragging = match (controller.drag_session(), controller.selected_object()) {
        (Some(session), Some(object)) => format!(
            " (dragging {:.1}, {:.0}px)",
            object.position.distance(session.origin),
            session.last_screen.distance(session.start_screen)
        ),
        _ => String::new(),
    };
    let mode = format!(
        "Mode: {}{}   Shift x{:.1}",
        controller.mode().to_string(),
        dragging,
        controller.drag_speed()
    );
    set_text(&mut texts.p0(), mode);
    set_text(&mut texts.p1(), selection_summary(&controller, &store));

    let selection_position = controller
        .selected_object()
        .map(|o| format_position(o.position))
        .unwrap_or_default();
    set_text(&mut texts.p2(), selection_position);

    if let Ok(cam_xf) = cameras.single() {
        set_text(&mut texts.p3(), format!("Camera\n{}", format_position(cam_xf.translation())));
    }

    set_text(&mut texts.p4(), status.message.clone().unwrap_or_default());
}

fn set_text<F: QueryFilter>(query: &mut Query<&mut Text, F>, value: String) {
    if let Ok(mut t) = query.single_mut() {
        if t.0 != value { t.0 = value; }
    }
}

/// One-line description of the current selection.
pub fn selection_summary(controller: &ManipulationController, store: &NodeGraphStore) -> String {
    let Some(object) = controller.selected_object() else {
        return "Selected: nothing".to_string();
    };
    match object.target {
        SelectableRef::Node { id } => {
            let links = store.node(id).map_or(0, |n| store.outgoing_links(n).count());
            format!("Selected: [{}] {} ({} links)", id, object.label, links)
        }
        SelectableRef::PathPoint { key } => format!(
            "Selected: {} on {} -> {}",
            object.label, key.from_node_id, key.to_node_id
        ),
    }
}

/// Viewer and game coordinates of a viewer space position.
pub fn format_position(viewer: Vec3) -> String {
    let game = viewer_to_game_vec3(viewer);
    format!(
        "viewer ({:.2}, {:.2}, {:.2})\ngame ({:.2}, {:.2}, {:.2})",
        viewer.x, viewer.y, viewer.z, game.x, game.y, game.z
    )
}

use crate::engine::graph::{NodeGraphStore, TravelNode};
use bevy::input::mouse::MouseScrollUnit;
use bevy::math::EulerRot;
use bevy::{
    input::mouse::{MouseMotion, MouseWheel},
    prelude::*,
};

/// Offset from a node the camera jumps to when navigating to it.
const NODE_VIEW_OFFSET: Vec3 = Vec3::new(0.0, 12.0, 24.0);

#[derive(Resource)]
pub struct ViewportCamera {
    pub focus_point: Vec3,
    pub pitch: f32,
    pub yaw: f32,
    pub move_speed: f32,
    /// Position in the node list for cycling. Next jump goes to this node.
    pub cycle_index: usize,
}

impl ViewportCamera {
    pub fn new(focus_point: Vec3) -> Self {
        Self {
            focus_point,
            ..default()
        }
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// Place the camera above and behind a point, looking at it.
    pub fn look_at_from_offset(&mut self, target: Vec3, offset: Vec3) {
        self.focus_point = target + offset;
        let (yaw, pitch) = look_angles(self.focus_point, target);
        self.yaw = yaw;
        self.pitch = pitch;
    }

    pub fn go_to_node(&mut self, node: &TravelNode) {
        self.look_at_from_offset(node.position, NODE_VIEW_OFFSET);
        info!("Camera moved to node {}", node.label());
    }
}

impl Default for ViewportCamera {
    fn default() -> Self {
        Self {
            focus_point: Vec3::ZERO,
            pitch: -0.6,
            yaw: 0.0,
            move_speed: 40.0,
            cycle_index: 0,
        }
    }
}

/// Yaw and pitch that point the camera's forward (-Z) axis from `from` to `to`.
pub fn look_angles(from: Vec3, to: Vec3) -> (f32, f32) {
    let Some(dir) = (to - from).try_normalize() else {
        return (0.0, 0.0);
    };
    let yaw = (-dir.x).atan2(-dir.z);
    let pitch = dir.y.clamp(-1.0, 1.0).asin();
    (yaw, pitch)
}

/// Camera jumps requested by keyboard or RPC.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum CameraNavigationEvent {
    GoToNode(u32),
    GoToNearestNode,
    NextNode,
}

pub fn camera_controller(
    mut camera_query: Query<&mut Transform, With<Camera3d>>,
    mut maps_camera: ResMut<ViewportCamera>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
    keyboard: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
) {
    let Ok(mut camera_transform) = camera_query.single_mut() else {
        return;
    };

    // Read mouse motion
    let mouse_delta: Vec2 = mouse_motion.read().map(|m| m.delta).sum();

    // Mouse motion with right click (look around)
    if mouse_button.pressed(MouseButton::Right) && mouse_delta != Vec2::ZERO {
        let yaw_sens = 0.0035;
        let pitch_sens = 0.0030;
        maps_camera.yaw += -mouse_delta.x * yaw_sens;
        maps_camera.pitch += -mouse_delta.y * pitch_sens;
        maps_camera.pitch = maps_camera.pitch.clamp(-1.55, 1.55);
    }

    // Mouse wheel scroll accumulation (pixel and line scroll)
    let mut scroll_accum = 0.0;
    for ev in scroll_events.read() {
        scroll_accum += match ev.unit {
            MouseScrollUnit::Line => ev.y * 1.0,
            MouseScrollUnit::Pixel => ev.y * 0.05,
        };
    }

    // Mouse wheel dollies along the view direction
    if scroll_accum.abs() > f32::EPSILON {
        let forward = (maps_camera.rotation() * Vec3::Z).normalize();
        let dolly = scroll_accum * maps_camera.move_speed * 0.25;
        maps_camera.focus_point -= forward * dolly;
    }

    // Keyboard movement input
    let mut move_input = Vec3::ZERO;
    if keyboard.pressed(KeyCode::KeyW) { move_input.z -= 1.0; }
    if keyboard.pressed(KeyCode::KeyS) { move_input.z += 1.0; }
    if keyboard.pressed(KeyCode::KeyD) { move_input.x += 1.0; }
    if keyboard.pressed(KeyCode::KeyA) { move_input.x -= 1.0; }
    if keyboard.pressed(KeyCode::KeyE) { move_input.y += 1.0; } // Up
    if keyboard.pressed(KeyCode::KeyQ) { move_input.y -= 1.0; } // Down

    if move_input != Vec3::ZERO {
        let view_rot = maps_camera.rotation();
        let forward = (view_rot * Vec3::Z).normalize();
        let right = (view_rot * Vec3::X).normalize();

        // Shift = faster, Alt = slower
        let mut speed = maps_camera.move_speed;
        if keyboard.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]) { speed *= 3.5; }
        if keyboard.any_pressed([KeyCode::AltLeft, KeyCode::AltRight]) { speed *= 0.25; }

        let world_delta = right * move_input.x + Vec3::Y * move_input.y + forward * move_input.z;
        maps_camera.focus_point += world_delta.normalize() * speed * time.delta_secs();
    }

    let target_rot = maps_camera.rotation();
    let target_pos = maps_camera.focus_point;

    let lerp_speed = 12.0 * time.delta_secs();
    camera_transform.translation = camera_transform
        .translation
        .lerp(target_pos, lerp_speed.min(1.0));
    camera_transform.rotation = camera_transform
        .rotation
        .slerp(target_rot, lerp_speed.min(1.0));
}

/// G cycles through nodes, Ctrl+N jumps to the nearest one.
#[cfg(not(target_arch = "wasm32"))]
pub fn handle_camera_keyboard_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut events: EventWriter<CameraNavigationEvent>,
) {
    if keyboard.just_pressed(KeyCode::KeyG) {
        events.write(CameraNavigationEvent::NextNode);
    }

    let ctrl = keyboard.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]);
    if ctrl && keyboard.just_pressed(KeyCode::KeyN) {
        events.write(CameraNavigationEvent::GoToNearestNode);
    }
}

/// Placeholder system for WASM builds where navigation comes from RPC.
#[cfg(target_arch = "wasm32")]
pub fn handle_camera_keyboard_shortcuts() {}

pub fn handle_camera_navigation(
    mut events: EventReader<CameraNavigationEvent>,
    store: Res<NodeGraphStore>,
    mut maps_camera: ResMut<ViewportCamera>,
    cameras: Query<&GlobalTransform, With<Camera3d>>,
) {
    for event in events.read() {
        match *event {
            CameraNavigationEvent::GoToNode(id) => match store.node(id) {
                Some(node) => maps_camera.go_to_node(node),
                None => warn!("Cannot move camera to unknown node {}", id),
            },
            CameraNavigationEvent::GoToNearestNode => {
                let from = cameras
                    .single()
                    .map(|xf| xf.translation())
                    .unwrap_or(maps_camera.focus_point);
                if let Some(node) = store.nearest_node(from) {
                    maps_camera.go_to_node(node);
                }
            }
            CameraNavigationEvent::NextNode => {
                let Some(index) = next_cycle_index(maps_camera.cycle_index, store.nodes().len())
                else {
                    continue;
                };
                maps_camera.go_to_node(&store.nodes()[index]);
                maps_camera.cycle_index = index + 1;
            }
        }
    }
}

/// Jump to the first node once a non-empty graph has loaded.
pub fn focus_first_node_on_load(
    store: Res<NodeGraphStore>,
    mut events: EventWriter<CameraNavigationEvent>,
    mut focused: Local<bool>,
) {
    if *focused || store.nodes().is_empty() {
        return;
    }
    *focused = true;
    events.write(CameraNavigationEvent::NextNode);
}

/// Node to visit next when cycling, wrapping at the end of the list.
pub fn next_cycle_index(current: usize, node_count: usize) -> Option<usize> {
    if node_count == 0 {
        return None;
    }
    Some(current % node_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn look_angles_point_forward_axis_at_target() {
        let from = Vec3::new(3.0, 10.0, -4.0);
        let to = Vec3::new(-7.0, 2.0, 15.0);
        let (yaw, pitch) = look_angles(from, to);

        let forward = Quat::from_euler(EulerRot::YXZ, yaw, pitch, 0.0) * Vec3::NEG_Z;
        let expected = (to - from).normalize();
        assert_abs_diff_eq!(forward.x, expected.x, epsilon = 1e-5);
        assert_abs_diff_eq!(forward.y, expected.y, epsilon = 1e-5);
        assert_abs_diff_eq!(forward.z, expected.z, epsilon = 1e-5);
    }

    #[test]
    fn node_jump_places_camera_at_offset() {
        let mut camera = ViewportCamera::default();
        let target = Vec3::new(100.0, 5.0, -30.0);
        camera.look_at_from_offset(target, NODE_VIEW_OFFSET);

        assert_eq!(camera.focus_point, target + NODE_VIEW_OFFSET);
        assert!(camera.pitch < 0.0);
    }

    #[test]
    fn cycling_wraps_and_handles_empty_graphs() {
        assert_eq!(next_cycle_index(0, 3), Some(0));
        assert_eq!(next_cycle_index(3, 3), Some(0));
        assert_eq!(next_cycle_index(4, 3), Some(1));
        assert_eq!(next_cycle_index(2, 0), None);
    }
}

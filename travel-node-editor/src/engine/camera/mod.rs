//! Free-flying viewport camera for travel graph navigation.
//!
//! Right mouse looks around, W/A/S/D/E/Q fly, the wheel dollies along the view
//! direction. Node jumps (go to node, nearest node, cycle) arrive as
//! `CameraNavigationEvent`s from the keyboard or RPC.

/// Viewport camera resource, controller and navigation systems.
pub mod viewport_camera;

pub use viewport_camera::{CameraNavigationEvent, ViewportCamera};

/// Game space and viewer space conversion shared by the editor and its tools.
pub mod coordinate_system;

/// Sizes, distances and multipliers used when drawing and editing travel nodes.
pub mod render_settings;

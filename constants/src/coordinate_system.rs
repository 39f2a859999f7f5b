use bevy::math::Vec3;

/// Origin offset of the game's map grid. Viewer space is re-centred around it.
pub const ZERO_POINT: f32 = 17066.666;

/// Game or viewer space coordinate with an orientation in radians.
/// Orientation is carried through every conversion untouched.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub o: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32, z: f32, o: f32) -> Self {
        Self { x, y, z, o }
    }

    /// Lossy: a bare vector has no orientation, so it becomes 0.
    pub fn from_vec3(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z, 0.0)
    }

    pub fn from_vec3_with_orientation(v: Vec3, orientation: f32) -> Self {
        Self::new(v.x, v.y, v.z, orientation)
    }

    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

/// Convert stored game coordinates into the camera/renderer system.
///
/// Axes are permuted (game Z becomes viewer Y) and the two horizontal axes
/// are mirrored around [`ZERO_POINT`].
pub fn game_to_viewer(game: Position) -> Position {
    Position::new(
        -(game.y - ZERO_POINT),
        game.z,
        -(game.x - ZERO_POINT),
        game.o,
    )
}

/// Inverse of [`game_to_viewer`].
pub fn viewer_to_game(viewer: Position) -> Position {
    Position::new(
        -(viewer.z - ZERO_POINT),
        -(viewer.x - ZERO_POINT),
        viewer.y,
        viewer.o,
    )
}

pub fn game_to_viewer_vec3(game: Vec3) -> Vec3 {
    game_to_viewer(Position::from_vec3(game)).to_vec3()
}

pub fn viewer_to_game_vec3(viewer: Vec3) -> Vec3 {
    viewer_to_game(Position::from_vec3(viewer)).to_vec3()
}

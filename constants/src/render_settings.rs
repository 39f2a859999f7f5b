/// Edge length of the box drawn for every travel node.
pub const DEFAULT_BOX_SIZE: f32 = 3.0;

/// Radius of the sphere drawn for path points. Smaller than node boxes.
pub const PATH_POINT_SIZE: f32 = 1.0;

/// Radius of the highlight drawn around a selected path point.
pub const SELECTED_PATH_POINT_SIZE: f32 = 1.5;

/// Vertical offset of node labels above the node position.
pub const TEXT_HEIGHT_OFFSET: f32 = 1.0;

/// Nodes, links and labels further than this from the camera are not drawn.
pub const VIEW_DISTANCE: f32 = 300.0;

/// Labels closer than this to the window edge (pixels) are hidden.
pub const LABEL_SCREEN_MARGIN: f32 = 10.0;

/// Maximum ray distance at which a node is picked.
pub const NODE_PICK_RADIUS: f32 = 3.0;

/// Maximum ray distance at which a path point is picked.
pub const PATH_POINT_PICK_RADIUS: f32 = 2.0;

/// Drag displacement multiplier while the "fast" modifier is held.
pub const FAST_DRAG_MULTIPLIER: f32 = 5.0;

/// Drag displacement multiplier while the "slow" modifier is held.
pub const SLOW_DRAG_MULTIPLIER: f32 = 0.2;

/// Rays closer than this to parallel with the drag plane are ignored.
pub const DRAG_PLANE_EPSILON: f32 = 0.0001;

/// Distance along the pick ray used for new nodes when no ground height is known.
pub const ADD_NODE_FALLBACK_DISTANCE: f32 = 30.0;

/// Name given to nodes created from the editor.
pub const DEFAULT_NODE_NAME: &str = "New Node";

/// Map loaded when no configuration says otherwise.
pub const DEFAULT_MAP_ID: u32 = 0;

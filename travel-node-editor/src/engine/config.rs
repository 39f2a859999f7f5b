//! Runtime editor configuration.
//!
//! `EditorConfig` is a JSON asset (`config/default.editor.json`) loaded through
//! `bevy_common_assets`. Every field has a default, so a partial file or a
//! failed load still yields a working editor.
//!
//! ```text
//! Startup: ConfigLoader.handle = asset_server.load(..)
//! Update:  asset ready  -> apply(config)
//!          load failed  -> apply(EditorConfig::default())
//!
//! apply: store.replace_database(open_database(), map_id)
//!        controller.apply_settings(..)
//!        display.view_distance = ..
//! ```

use crate::engine::database::{MemoryDatabase, NodeDatabase};
use crate::engine::graph::NodeGraphStore;
use crate::engine::render::NodeDisplaySettings;
use crate::tools::node_editor::manipulation::{ManipulationController, ManipulationSettings};
use crate::tools::node_editor::selection::PickTolerances;
use bevy::asset::LoadState;
use bevy::prelude::*;
use constants::render_settings::{
    DEFAULT_MAP_ID, FAST_DRAG_MULTIPLIER, NODE_PICK_RADIUS, PATH_POINT_PICK_RADIUS,
    SLOW_DRAG_MULTIPLIER, VIEW_DISTANCE,
};
use serde::{Deserialize, Serialize};

pub const EDITOR_CONFIG_PATH: &str = "config/default.editor.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Asset, TypePath)]
#[serde(default)]
pub struct EditorConfig {
    /// JSON node database. Relative paths resolve against the crate directory
    /// when run through cargo, otherwise against the working directory.
    pub database_path: String,
    pub map_id: u32,
    pub view_distance: f32,
    pub node_pick_radius: f32,
    pub path_point_pick_radius: f32,
    pub fast_drag_multiplier: f32,
    pub slow_drag_multiplier: f32,
    pub persist_during_drag: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            database_path: "data/travel_nodes.json".to_string(),
            map_id: DEFAULT_MAP_ID,
            view_distance: VIEW_DISTANCE,
            node_pick_radius: NODE_PICK_RADIUS,
            path_point_pick_radius: PATH_POINT_PICK_RADIUS,
            fast_drag_multiplier: FAST_DRAG_MULTIPLIER,
            slow_drag_multiplier: SLOW_DRAG_MULTIPLIER,
            persist_during_drag: true,
        }
    }
}

impl EditorConfig {
    pub fn manipulation_settings(&self) -> ManipulationSettings {
        ManipulationSettings {
            fast_multiplier: self.fast_drag_multiplier,
            slow_multiplier: self.slow_drag_multiplier,
            persist_during_drag: self.persist_during_drag,
            tolerances: PickTolerances {
                node: self.node_pick_radius,
                path_point: self.path_point_pick_radius,
            },
        }
    }

    /// Open the configured database. Falls back to an empty in-memory one.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn open_database(&self) -> Box<dyn NodeDatabase> {
        use crate::engine::database::JsonFileDatabase;

        let path = self.resolved_database_path();
        match JsonFileDatabase::open(&path) {
            Ok(db) => Box::new(db),
            Err(e) => {
                warn!(
                    "Failed to open node database {}: {}. Using an empty in-memory database",
                    path.display(),
                    e
                );
                Box::new(MemoryDatabase::new())
            }
        }
    }

    /// The browser build has no file system access. It edits an in-memory
    /// copy of the bundled sample graph.
    #[cfg(target_arch = "wasm32")]
    pub fn open_database(&self) -> Box<dyn NodeDatabase> {
        use crate::engine::database::memory::NodeTables;

        match serde_json::from_str::<NodeTables>(include_str!("../../data/travel_nodes.json")) {
            Ok(tables) => Box::new(MemoryDatabase::with_tables(tables)),
            Err(e) => {
                warn!("Bundled node data is malformed: {}", e);
                Box::new(MemoryDatabase::new())
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn resolved_database_path(&self) -> std::path::PathBuf {
        let path = std::path::PathBuf::from(&self.database_path);
        if path.is_absolute() {
            return path;
        }
        match std::env::var_os("CARGO_MANIFEST_DIR") {
            Some(dir) => std::path::PathBuf::from(dir).join(path),
            None => path,
        }
    }
}

#[derive(Resource, Default)]
pub struct ConfigLoader {
    handle: Option<Handle<EditorConfig>>,
    applied: bool,
}

pub fn start_config_loading(mut loader: ResMut<ConfigLoader>, asset_server: Res<AssetServer>) {
    println!("Loading editor config from: {}", EDITOR_CONFIG_PATH);
    loader.handle = Some(asset_server.load(EDITOR_CONFIG_PATH));
}

// Apply the config once it is available, or the defaults if loading failed
pub fn apply_editor_config(
    mut loader: ResMut<ConfigLoader>,
    asset_server: Res<AssetServer>,
    configs: Res<Assets<EditorConfig>>,
    mut store: ResMut<NodeGraphStore>,
    mut controller: ResMut<ManipulationController>,
    mut display: ResMut<NodeDisplaySettings>,
) {
    if loader.applied {
        return;
    }
    let Some(ref handle) = loader.handle else {
        return;
    };

    let config = if let Some(config) = configs.get(handle) {
        println!("✓ Editor config loaded");
        config.clone()
    } else if matches!(asset_server.load_state(handle.id()), LoadState::Failed(_)) {
        warn!("Failed to load {}, using defaults", EDITOR_CONFIG_PATH);
        EditorConfig::default()
    } else {
        return;
    };

    controller.apply_settings(config.manipulation_settings());
    display.view_distance = config.view_distance;
    store.replace_database(config.open_database(), config.map_id);
    info!(
        "Editing map {} from {}",
        store.map_id(),
        store.database_description()
    );
    loader.applied = true;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: EditorConfig =
            serde_json::from_str(r#"{ "map_id": 530, "persist_during_drag": false }"#).unwrap();

        assert_eq!(config.map_id, 530);
        assert!(!config.persist_during_drag);
        assert_eq!(config.view_distance, VIEW_DISTANCE);
        assert_eq!(config.node_pick_radius, NODE_PICK_RADIUS);
        assert_eq!(config.database_path, "data/travel_nodes.json");
    }

    #[test]
    fn settings_follow_config_values() {
        let config = EditorConfig {
            node_pick_radius: 4.0,
            path_point_pick_radius: 1.5,
            fast_drag_multiplier: 8.0,
            ..Default::default()
        };
        let settings = config.manipulation_settings();

        assert_eq!(settings.tolerances.node, 4.0);
        assert_eq!(settings.tolerances.path_point, 1.5);
        assert_eq!(settings.fast_multiplier, 8.0);
        assert_eq!(settings.slow_multiplier, SLOW_DRAG_MULTIPLIER);
    }

    #[test]
    fn shipped_config_parses() {
        let config: EditorConfig =
            serde_json::from_str(include_str!("../../assets/config/default.editor.json")).unwrap();
        assert_eq!(config.map_id, DEFAULT_MAP_ID);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn absolute_database_paths_are_kept() {
        let absolute = std::env::temp_dir().join("nodes.json");
        let config = EditorConfig {
            database_path: absolute.display().to_string(),
            ..Default::default()
        };
        assert_eq!(config.resolved_database_path(), absolute);
    }
}

pub mod camera;
pub mod config;
pub mod database;
pub mod graph;
pub mod render;

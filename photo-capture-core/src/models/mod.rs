pub mod asset;
pub mod camera_models;
pub mod config;
pub mod error;
pub mod preview;
pub mod state;

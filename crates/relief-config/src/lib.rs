//! Configuration system for Relief.
//!
//! Runtime settings persist to disk as a RON file. CLI arguments parsed with
//! clap override the loaded values, and [`Config::reload`] detects on-disk edits.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    CameraConfig, Config, DebugConfig, EffectConfig, InputConfig, LightingConfig, TerrainConfig,
    WindowConfig,
};
pub use error::ConfigError;

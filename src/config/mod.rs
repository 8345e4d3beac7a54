//! Configuration module for the poem camera.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each subsystem,
//! `AppPaths` for the settings location, `Secrets` for the two service
//! credentials, and TOML persistence via `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    AppConfig, CameraConfig, CaptionConfig, PipelineConfig, PoemConfig, PrinterConfig, Secrets,
    StorageConfig, TriggerBackend, TriggerConfig,
};

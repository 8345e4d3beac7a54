//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// TriggerBackend
// ---------------------------------------------------------------------------

/// Selects where button presses come from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TriggerBackend {
    /// Momentary button on a GPIO line (production).
    Gpio,
    /// A line on stdin counts as a press — bench testing without hardware.
    Stdin,
}

impl Default for TriggerBackend {
    fn default() -> Self {
        Self::Gpio
    }
}

// ---------------------------------------------------------------------------
// CameraConfig
// ---------------------------------------------------------------------------

/// Settings for the still camera.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Capture command invoked per shot; `{path}` is replaced with the
    /// output file (e.g. `"rpicam-still -n -o {path}"`).
    pub capture_command: String,
    /// Seconds to wait after starting the camera for exposure and
    /// white-balance to converge.
    pub warmup_secs: f64,
    /// Seconds to pause between stopping and restarting the camera during a
    /// hardware reset.
    pub restart_pause_secs: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            capture_command: "rpicam-still -n --immediate -o {path}".into(),
            warmup_secs: 2.0,
            restart_pause_secs: 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// PrinterConfig
// ---------------------------------------------------------------------------

/// Settings for the thermal receipt printer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrinterConfig {
    /// Byte-oriented output device the printer is attached to.
    pub device: String,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            device: "/dev/usb/lp0".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// TriggerConfig
// ---------------------------------------------------------------------------

/// Settings for the shutter button.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Which trigger implementation to use.
    pub backend: TriggerBackend,
    /// BCM GPIO line the button is wired to (active-low, pull-up).
    pub gpio_line: u32,
    /// Polling interval for the GPIO value file, in milliseconds.
    pub poll_interval_ms: u64,
    /// Seconds to settle after a completed run before re-arming the button.
    pub rearm_delay_secs: f64,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            backend: TriggerBackend::default(),
            gpio_line: 16,
            poll_interval_ms: 20,
            rearm_delay_secs: 2.0,
        }
    }
}

// ---------------------------------------------------------------------------
// CaptionConfig
// ---------------------------------------------------------------------------

/// Settings for the remote vision / captioning service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionConfig {
    /// Base URL of the predictions API.
    pub base_url: String,
    /// Model version identifier sent with every prediction request.
    pub model_version: String,
    /// Maximum seconds to wait for a caption before timing out.
    pub timeout_secs: u64,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.replicate.com".into(),
            model_version: "4b32258c42e9efd4288bb9910bc532a69727f9acd26aa08e175713a0a857a608"
                .into(),
            timeout_secs: 60,
        }
    }
}

// ---------------------------------------------------------------------------
// PoemConfig
// ---------------------------------------------------------------------------

/// Settings for the remote composition service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoemConfig {
    /// Base URL of an OpenAI-compatible chat-completions endpoint.
    pub base_url: String,
    /// Model identifier sent to the API (e.g. `"gpt-4"`).
    pub model: String,
    /// Sampling temperature (0.0 – 1.0).
    pub temperature: f32,
    /// Maximum seconds to wait for a poem before timing out.
    pub timeout_secs: u64,
}

impl Default for PoemConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".into(),
            model: "gpt-4".into(),
            temperature: 0.7,
            timeout_secs: 60,
        }
    }
}

// ---------------------------------------------------------------------------
// StorageConfig
// ---------------------------------------------------------------------------

/// Where captured photos and the persistent log are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for captured photos; created at startup if absent.
    pub image_dir: String,
    /// Append-mode log file mirroring the console output.
    pub log_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            image_dir: "/home/pi/images".into(),
            log_file: "/home/pi/poem-camera.log".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// PipelineConfig
// ---------------------------------------------------------------------------

/// Orchestrator behaviour knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Consecutive camera-reset failures tolerated before the appliance
    /// gives up and exits (a stuck camera would otherwise fail every run
    /// forever with no operator-visible signal beyond the log).
    pub max_reset_failures: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_reset_failures: 3,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use poem_camera::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Still camera settings.
    pub camera: CameraConfig,
    /// Thermal printer settings.
    pub printer: PrinterConfig,
    /// Shutter button settings.
    pub trigger: TriggerConfig,
    /// Vision / caption service settings.
    pub caption: CaptionConfig,
    /// Poem composition service settings.
    pub poem: PoemConfig,
    /// Photo + log storage locations.
    pub storage: StorageConfig,
    /// Orchestrator behaviour.
    pub pipeline: PipelineConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Default` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Secrets
// ---------------------------------------------------------------------------

/// API credentials for the two remote services.
///
/// Read from the environment at startup (after `dotenvy::dotenv()`); never
/// written to `settings.toml`. A missing credential is a fatal startup
/// error, not a per-run error.
#[derive(Clone)]
pub struct Secrets {
    /// Token for the vision / caption service.
    pub caption_token: String,
    /// API key for the poem composition service.
    pub poem_api_key: String,
}

impl Secrets {
    pub const CAPTION_TOKEN_VAR: &'static str = "REPLICATE_API_TOKEN";
    pub const POEM_API_KEY_VAR: &'static str = "OPENAI_API_KEY";

    /// Read both credentials from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first missing or empty variable.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            caption_token: Self::require(Self::CAPTION_TOKEN_VAR)?,
            poem_api_key: Self::require(Self::POEM_API_KEY_VAR)?,
        })
    }

    fn require(var: &str) -> Result<String> {
        match std::env::var(var) {
            Ok(v) if !v.trim().is_empty() => Ok(v),
            _ => anyhow::bail!("missing environment variable: {var}"),
        }
    }
}

// Credentials must never leak into logs via {:?}.
impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("caption_token", &"***")
            .field("poem_api_key", &"***")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Verify that a default `AppConfig` can be serialised to TOML and
    /// deserialised back without any data loss.
    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");

        // CameraConfig
        assert_eq!(original.camera.capture_command, loaded.camera.capture_command);
        assert_eq!(original.camera.warmup_secs, loaded.camera.warmup_secs);
        assert_eq!(
            original.camera.restart_pause_secs,
            loaded.camera.restart_pause_secs
        );

        // PrinterConfig
        assert_eq!(original.printer.device, loaded.printer.device);

        // TriggerConfig
        assert_eq!(original.trigger.backend, loaded.trigger.backend);
        assert_eq!(original.trigger.gpio_line, loaded.trigger.gpio_line);

        // CaptionConfig / PoemConfig
        assert_eq!(original.caption.base_url, loaded.caption.base_url);
        assert_eq!(original.caption.model_version, loaded.caption.model_version);
        assert_eq!(original.poem.base_url, loaded.poem.base_url);
        assert_eq!(original.poem.model, loaded.poem.model);
        assert_eq!(original.poem.timeout_secs, loaded.poem.timeout_secs);

        // StorageConfig
        assert_eq!(original.storage.image_dir, loaded.storage.image_dir);
        assert_eq!(original.storage.log_file, loaded.storage.log_file);
    }

    /// `load_from` on a non-existent path must return `Default` without error.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        let default = AppConfig::default();

        assert_eq!(config.printer.device, default.printer.device);
        assert_eq!(config.trigger.gpio_line, default.trigger.gpio_line);
        assert_eq!(config.poem.model, default.poem.model);
    }

    /// A partial settings file fills the remaining fields from defaults.
    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[printer]\ndevice = \"/dev/lp1\"\n").expect("write");

        let config = AppConfig::load_from(&path).expect("load");

        assert_eq!(config.printer.device, "/dev/lp1");
        assert_eq!(config.trigger.gpio_line, TriggerConfig::default().gpio_line);
        assert_eq!(config.poem.model, PoemConfig::default().model);
    }

    /// Verify default values match the device wiring.
    #[test]
    fn default_values_match_device() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.printer.device, "/dev/usb/lp0");
        assert_eq!(cfg.trigger.gpio_line, 16);
        assert_eq!(cfg.trigger.backend, TriggerBackend::Gpio);
        assert_eq!(cfg.camera.warmup_secs, 2.0);
        assert_eq!(cfg.camera.restart_pause_secs, 1.0);
        assert_eq!(cfg.poem.model, "gpt-4");
        assert_eq!(cfg.storage.image_dir, "/home/pi/images");
        assert_eq!(cfg.pipeline.max_reset_failures, 3);
    }

    /// Secrets must never appear in Debug output.
    #[test]
    fn secrets_debug_is_redacted() {
        let secrets = Secrets {
            caption_token: "r8_secret".into(),
            poem_api_key: "sk-secret".into(),
        };
        let rendered = format!("{secrets:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("***"));
    }
}

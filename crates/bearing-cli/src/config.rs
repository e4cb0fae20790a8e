//! Reads and writes `~/.bearing/config.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bearing_hal::WatchOptions;
use bearing_perception::TriggerConfig;
use bearing_runtime::{OverlayConfig, SessionConfig, StreamConfig};
use bearing_types::BearingError;

/// Persisted shell configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Half-width of the facing window around north, in degrees.
    #[serde(default = "default_tolerance_degrees")]
    pub tolerance_degrees: f64,

    /// Downward swipe distance that dismisses the overlay.
    #[serde(default = "default_dismiss_threshold")]
    pub dismiss_threshold: f64,

    #[serde(default = "default_true")]
    pub high_accuracy: bool,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Oldest cached fix the platform may hand back; 0 forces a fresh one.
    #[serde(default)]
    pub max_cache_age_ms: u64,

    /// Whether the simulated platform asks for orientation consent.
    #[serde(default = "default_true")]
    pub require_consent: bool,

    #[serde(default = "default_bus_capacity")]
    pub bus_capacity: usize,

    /// JSON file holding the overlay payload. The built-in demo payload is
    /// used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_file: Option<PathBuf>,
}

fn default_tolerance_degrees() -> f64 {
    bearing_perception::trigger::DEFAULT_TOLERANCE_DEGREES
}
fn default_dismiss_threshold() -> f64 {
    bearing_runtime::overlay::DEFAULT_DISMISS_THRESHOLD
}
fn default_true() -> bool {
    true
}
fn default_timeout_ms() -> u64 {
    10_000
}
fn default_bus_capacity() -> usize {
    bearing_middleware::bus::DEFAULT_CAPACITY
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tolerance_degrees: default_tolerance_degrees(),
            dismiss_threshold: default_dismiss_threshold(),
            high_accuracy: true,
            timeout_ms: default_timeout_ms(),
            max_cache_age_ms: 0,
            require_consent: true,
            bus_capacity: default_bus_capacity(),
            content_file: None,
        }
    }
}

impl Config {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            stream: StreamConfig {
                watch_options: WatchOptions {
                    high_accuracy: self.high_accuracy,
                    timeout: Duration::from_millis(self.timeout_ms),
                    maximum_age: Duration::from_millis(self.max_cache_age_ms),
                },
                trigger: TriggerConfig {
                    tolerance_degrees: self.tolerance_degrees,
                },
            },
            overlay: OverlayConfig {
                dismiss_threshold: self.dismiss_threshold,
            },
            bus_capacity: self.bus_capacity,
        }
    }
}

/// Return the path to `~/.bearing/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".bearing").join("config.toml")
}

/// Load the config from disk, falling back to defaults when the file is
/// absent. Env overrides apply either way.
pub fn load() -> Result<Config, BearingError> {
    let mut cfg = load_from(&config_path())?;
    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

pub(crate) fn load_from(path: &Path) -> Result<Config, BearingError> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| BearingError::Config(format!("failed to read {}: {e}", path.display())))?;
    toml::from_str(&raw)
        .map_err(|e| BearingError::Config(format!("failed to parse {}: {e}", path.display())))
}

/// Apply `BEARING_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `BEARING_TOLERANCE_DEGREES` | `tolerance_degrees` |
/// | `BEARING_DISMISS_THRESHOLD` | `dismiss_threshold` |
/// | `BEARING_TIMEOUT_MS` | `timeout_ms` |
///
/// Values that do not parse are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("BEARING_TOLERANCE_DEGREES")
        && let Ok(deg) = v.trim().parse::<f64>()
    {
        cfg.tolerance_degrees = deg;
    }
    if let Ok(v) = std::env::var("BEARING_DISMISS_THRESHOLD")
        && let Ok(threshold) = v.trim().parse::<f64>()
    {
        cfg.dismiss_threshold = threshold;
    }
    if let Ok(v) = std::env::var("BEARING_TIMEOUT_MS")
        && let Ok(ms) = v.trim().parse::<u64>()
    {
        cfg.timeout_ms = ms;
    }
}

/// Save the config to disk, creating `~/.bearing/` if necessary.
pub fn save(cfg: &Config) -> Result<(), BearingError> {
    save_to(cfg, &config_path())
}

pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), BearingError> {
    let io_err = |what: &str, e: std::io::Error| BearingError::Config(format!("{what}: {e}"));

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_err("failed to create config directory", e))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700))
                .map_err(|e| io_err("failed to set config directory permissions", e))?;
        }
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| BearingError::Config(format!("failed to serialize config: {e}")))?;

    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| f.write_all(raw.as_bytes()))
            .map_err(|e| io_err(&format!("failed to write {}", path.display()), e))?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw).map_err(|e| io_err(&format!("failed to write {}", path.display()), e))?;
    Ok(())
}

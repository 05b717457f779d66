//! # Configuration
//!
//! Settings resolve in this order: defaults → config file → CLI flags.
//!
//! The config file lives at `~/.goreplay/config.toml` unless a path is given
//! explicitly. Every field is optional.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{LevelFilter, debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{DEFAULT_LOG_FILE, UNKNOWN, VARIATION_WINDOW_HEIGHT, VARIATION_WINDOW_WIDTH};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ReplayConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// `off`, `error`, `warn`, `info`, `debug` or `trace`.
    pub log_level: Option<String>,
    pub log_file: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DisplayConfig {
    pub unknown_placeholder: Option<String>,
    pub variation_width: Option<usize>,
    pub variation_height: Option<usize>,
}

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub log_level: LevelFilter,
    pub log_file: PathBuf,
    pub unknown_placeholder: String,
    pub variation_width: usize,
    pub variation_height: usize,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        resolve(&ReplayConfig::default(), None)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.goreplay/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".goreplay").join("config.toml"))
}

/// Load the config file. A missing file is not an error and yields the
/// defaults; an unreadable or malformed one is.
pub fn load_config(path: &Path) -> Result<ReplayConfig, ConfigError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(ReplayConfig::default());
        }
        Err(e) => return Err(e.into()),
    };
    let config = parse_config(&contents)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

pub fn parse_config(contents: &str) -> Result<ReplayConfig, ConfigError> {
    Ok(toml::from_str(contents)?)
}

// ============================================================================
// Resolution
// ============================================================================

/// Collapse defaults → config file → CLI. `cli_log_level` comes from the
/// command line and wins when given.
pub fn resolve(config: &ReplayConfig, cli_log_level: Option<LevelFilter>) -> ResolvedConfig {
    let log_level = cli_log_level
        .or_else(|| file_log_level(config).ok().flatten())
        .unwrap_or(LevelFilter::Info);

    ResolvedConfig {
        log_level,
        log_file: PathBuf::from(
            config
                .general
                .log_file
                .clone()
                .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string()),
        ),
        unknown_placeholder: config
            .display
            .unknown_placeholder
            .clone()
            .unwrap_or_else(|| UNKNOWN.to_string()),
        variation_width: config
            .display
            .variation_width
            .unwrap_or(VARIATION_WINDOW_WIDTH),
        variation_height: config
            .display
            .variation_height
            .unwrap_or(VARIATION_WINDOW_HEIGHT),
    }
}

/// The file's `general.log_level`: `Ok(None)` when unset, `Err(raw)` when
/// it does not name a level.
fn file_log_level(config: &ReplayConfig) -> Result<Option<LevelFilter>, &str> {
    match config.general.log_level.as_deref() {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<LevelFilter>().map(Some).map_err(|_| raw),
    }
}

/// Log every file setting that `resolve` had to replace by a default.
/// Call once the logger is installed. Returns the number of warnings.
pub fn warn_on_fallbacks(config: &ReplayConfig, resolved: &ResolvedConfig) -> usize {
    let mut warnings = 0;
    if let Err(raw) = file_log_level(config) {
        warn!("Unknown log level {raw:?} in config, using {}", resolved.log_level);
        warnings += 1;
    }
    warnings
}

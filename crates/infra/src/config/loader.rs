//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `PATROLARC_DB_PATH` is unset, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `PATROLARC_DB_PATH`: Database file path (required for env loading)
//! - `PATROLARC_DB_POOL_SIZE`: Connection pool size
//! - `PATROLARC_DB_BUSY_TIMEOUT_MS`: SQLite busy timeout
//! - `PATROLARC_REQUEST_TIMEOUT_MS`: Per-call visit store timeout
//! - `PATROLARC_DAY_START`: Production day start (`HH:MM`)
//! - `PATROLARC_DAY_SPAN_MINUTES`: Production day length
//! - `PATROLARC_NOMINAL_SHIFT_MINUTES`: Reported total working minutes
//! - `PATROLARC_SLOT_MINUTES`: Time-slot width for reports
//! - `PATROLARC_VALID_TYPES`: Comma-separated valid working types
//! - `PATROLARC_VALID_TYPES_TTL_SECS`: Allow-list cache lifetime
//! - `PATROLARC_LOG_LEVEL`: Default log filter
//! - `PATROLARC_LOG_JSON`: JSON log output (true/false)
//!
//! Unset optional variables keep their defaults. The break table and dedup
//! types can only be changed through a config file.
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.{json,toml}`, then `./patrolarc.{json,toml}`
//! 2. `../config.{json,toml}` and `../../config.{json,toml}`
//! 3. The same names relative to the executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use patrolarc_domain::{Config, PatrolArcError, Result};

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `PatrolArcError::Config` if neither source yields a valid
/// configuration.
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `PatrolArcError::Config` if `PATROLARC_DB_PATH` is missing or any
/// set variable has an invalid value.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();

    config.database.path = env_var("PATROLARC_DB_PATH")?;
    if let Some(pool_size) = env_parse("PATROLARC_DB_POOL_SIZE")? {
        config.database.pool_size = pool_size;
    }
    if let Some(busy_timeout_ms) = env_parse("PATROLARC_DB_BUSY_TIMEOUT_MS")? {
        config.database.busy_timeout_ms = busy_timeout_ms;
    }

    if let Some(timeout_ms) = env_parse("PATROLARC_REQUEST_TIMEOUT_MS")? {
        config.lifecycle.request_timeout_ms = timeout_ms;
    }

    if let Ok(day_start) = std::env::var("PATROLARC_DAY_START") {
        config.reporting.day_start = day_start;
        config.reporting.day_start_time()?;
    }
    if let Some(span) = env_parse("PATROLARC_DAY_SPAN_MINUTES")? {
        config.reporting.day_span_minutes = span;
    }
    if let Some(shift) = env_parse("PATROLARC_NOMINAL_SHIFT_MINUTES")? {
        config.reporting.nominal_shift_minutes = shift;
    }
    if let Some(slot) = env_parse("PATROLARC_SLOT_MINUTES")? {
        config.reporting.slot_minutes = slot;
    }
    if let Ok(types) = std::env::var("PATROLARC_VALID_TYPES") {
        config.reporting.valid_types = split_list(&types);
    }
    if let Some(ttl) = env_parse("PATROLARC_VALID_TYPES_TTL_SECS")? {
        config.reporting.valid_types_ttl_secs = ttl;
    }

    if let Ok(level) = std::env::var("PATROLARC_LOG_LEVEL") {
        config.logging.level = level;
    }
    config.logging.json = env_bool("PATROLARC_LOG_JSON", config.logging.json);

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Format is detected by file extension.
///
/// # Errors
/// Returns `PatrolArcError::Config` if the file is missing or invalid.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(PatrolArcError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            PatrolArcError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| PatrolArcError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    // Surface malformed break tables and day starts at load time.
    config.reporting.parsed_break_ranges()?;
    config.reporting.day_start_time()?;
    Ok(config)
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| PatrolArcError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| PatrolArcError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(PatrolArcError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// Returns the first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidates_in(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidates_in(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidates_in(dir: &Path) -> Vec<PathBuf> {
    vec![
        dir.join("config.json"),
        dir.join("config.toml"),
        dir.join("patrolarc.json"),
        dir.join("patrolarc.toml"),
        dir.join("../config.json"),
        dir.join("../config.toml"),
        dir.join("../../config.json"),
        dir.join("../../config.toml"),
    ]
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        PatrolArcError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Parse an optional variable; `Ok(None)` when unset.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| PatrolArcError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(None),
    }
}

/// Accepts `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
}

//! Configuration management

use std::time::Duration;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BREAK_RANGES, DEFAULT_DAY_SPAN_MINUTES, DEFAULT_DAY_START, DEFAULT_DEDUP_TYPES,
    DEFAULT_DEDUP_TYPE_PATTERNS, DEFAULT_NOMINAL_SHIFT_MINUTES, DEFAULT_REQUEST_TIMEOUT_MS,
    DEFAULT_SLOT_MINUTES, DEFAULT_VALID_TYPES_TTL_SECS,
};
use crate::errors::{PatrolArcError, Result};
use crate::types::BreakRange;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
    #[serde(default)]
    pub reporting: ReportingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: "patrolarc.db".to_string(), pool_size: 8, busy_timeout_ms: 5_000 }
    }
}

/// Visit lifecycle configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Upper bound for each visit-store call made while handling a request.
    pub request_timeout_ms: u64,
}

impl LifecycleConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.max(1))
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self { request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS }
    }
}

/// One configured break, as written in config files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakRangeConfig {
    pub start: String,
    pub end: String,
}

/// Working-time reporting configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportingConfig {
    /// Local time the production day starts (`"HH:MM"`).
    pub day_start: String,
    /// Length of the production-day window in minutes.
    pub day_span_minutes: u32,
    pub nominal_shift_minutes: u32,
    pub slot_minutes: u32,
    pub break_ranges: Vec<BreakRangeConfig>,
    /// Inspect types whose duplicate rows are collapsed (exact match).
    pub dedup_types: Vec<String>,
    /// Inspect types containing any of these substrings are also collapsed.
    pub dedup_type_patterns: Vec<String>,
    /// Valid working types used when no master-data table is available.
    pub valid_types: Vec<String>,
    pub valid_types_ttl_secs: u64,
}

impl ReportingConfig {
    /// Parse the configured break table.
    ///
    /// # Errors
    /// Returns `PatrolArcError::Config` for any malformed range.
    pub fn parsed_break_ranges(&self) -> Result<Vec<BreakRange>> {
        self.break_ranges.iter().map(|range| BreakRange::parse(&range.start, &range.end)).collect()
    }

    /// Parse `day_start` into a wall-clock time.
    pub fn day_start_time(&self) -> Result<NaiveTime> {
        NaiveTime::parse_from_str(self.day_start.trim(), "%H:%M").map_err(|e| {
            PatrolArcError::Config(format!("invalid reporting.day_start '{}': {e}", self.day_start))
        })
    }
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            day_start: DEFAULT_DAY_START.to_string(),
            day_span_minutes: DEFAULT_DAY_SPAN_MINUTES,
            nominal_shift_minutes: DEFAULT_NOMINAL_SHIFT_MINUTES,
            slot_minutes: DEFAULT_SLOT_MINUTES,
            break_ranges: DEFAULT_BREAK_RANGES
                .iter()
                .map(|(start, end)| BreakRangeConfig {
                    start: (*start).to_string(),
                    end: (*end).to_string(),
                })
                .collect(),
            dedup_types: DEFAULT_DEDUP_TYPES.iter().map(|s| (*s).to_string()).collect(),
            dedup_type_patterns: DEFAULT_DEDUP_TYPE_PATTERNS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            valid_types: Vec::new(),
            valid_types_ttl_secs: DEFAULT_VALID_TYPES_TTL_SECS,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}

//! Logging initialisation
//!
//! `RUST_LOG` wins over `logging.level` when set. Initialisation is
//! idempotent: a second call (or a subscriber installed by a test harness)
//! is reported as `false` instead of panicking.

use patrolarc_domain::{LoggingConfig, PatrolArcError, Result};
use tracing_subscriber::EnvFilter;

/// Build the env filter for `config`.
///
/// # Errors
/// `PatrolArcError::Config` when `logging.level` is not a valid directive.
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| {
            PatrolArcError::Config(format!("invalid logging.level '{}': {e}", config.level))
        }),
    }
}

/// Install the global tracing subscriber.
///
/// Returns `Ok(true)` when this call installed it, `Ok(false)` when one was
/// already set.
pub fn init_tracing(config: &LoggingConfig) -> Result<bool> {
    let filter = env_filter(config)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let installed = if config.json {
        builder.json().with_current_span(false).try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    };

    if installed {
        tracing::debug!(level = %config.level, json = config.json, "tracing initialised");
    }
    Ok(installed)
}

//! Application context - wires configuration, storage and services

use std::sync::Arc;
use std::time::Duration;

use patrolarc_core::{
    Clock, DeviceDirectory, ReportingService, SystemClock, ValidTypeProvider,
    VisitLifecycleService, VisitStore,
};
use patrolarc_domain::{Config, Result};
use tracing::info;

use crate::database::{
    DbManager, SqliteDeviceDirectory, SqliteInspectTypeRepository, SqliteVisitRepository,
};
use crate::services::{CachedValidTypeProvider, StaticValidTypeProvider};

/// Everything a front end needs to serve taps and reports.
pub struct PatrolArcContext {
    pub config: Config,
    pub db: Arc<DbManager>,
    pub visits: Arc<SqliteVisitRepository>,
    pub devices: Arc<SqliteDeviceDirectory>,
    pub inspect_types: Arc<SqliteInspectTypeRepository>,
    pub valid_types: Arc<dyn ValidTypeProvider>,
    pub lifecycle: Arc<VisitLifecycleService>,
    pub reporting: Arc<ReportingService>,
}

impl PatrolArcContext {
    /// Build the context with the system clock.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Build the context with an explicit clock.
    ///
    /// Opens the database, applies the schema and validates the reporting
    /// configuration before any service is handed out.
    pub fn with_clock(config: Config, clock: Arc<dyn Clock>) -> Result<Self> {
        let db = Arc::new(DbManager::from_config(&config.database)?);
        db.run_migrations()?;

        let visits = Arc::new(SqliteVisitRepository::new(Arc::clone(&db)));
        let devices = Arc::new(SqliteDeviceDirectory::new(Arc::clone(&db)));
        let inspect_types = Arc::new(SqliteInspectTypeRepository::new(Arc::clone(&db)));

        // A configured list takes precedence over the master-data table.
        let valid_types: Arc<dyn ValidTypeProvider> = if config.reporting.valid_types.is_empty() {
            Arc::new(CachedValidTypeProvider::new(
                inspect_types.clone(),
                Duration::from_secs(config.reporting.valid_types_ttl_secs),
            ))
        } else {
            Arc::new(StaticValidTypeProvider::new(config.reporting.valid_types.iter().cloned()))
        };

        let visit_store: Arc<dyn VisitStore> = visits.clone();
        let directory: Arc<dyn DeviceDirectory> = devices.clone();

        let lifecycle = Arc::new(
            VisitLifecycleService::new(Arc::clone(&visit_store), directory, clock)
                .with_request_timeout(config.lifecycle.request_timeout()),
        );
        let reporting = Arc::new(
            ReportingService::from_config(visit_store, Arc::clone(&valid_types), &config.reporting)?
                .with_request_timeout(config.lifecycle.request_timeout()),
        );

        info!(
            db_path = %db.path().display(),
            static_valid_types = !config.reporting.valid_types.is_empty(),
            "patrolarc context ready"
        );

        Ok(Self { config, db, visits, devices, inspect_types, valid_types, lifecycle, reporting })
    }
}

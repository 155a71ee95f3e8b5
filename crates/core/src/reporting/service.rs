//! Reporting service - pulls a window of visits and produces the daily report

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use patrolarc_domain::constants::DEFAULT_REQUEST_TIMEOUT_MS;
use patrolarc_domain::{
    AggregatedWorkerActivity, DailyReport, ReportWindow, ReportingConfig, Result,
};
use tracing::{debug, info, warn};

use super::aggregator::WorkingTimeAggregator;
use super::ports::ValidTypeProvider;
use super::projection::ReportProjector;
use super::window::ProductionDay;
use crate::deadline;
use crate::visits::ports::VisitStore;

/// Read-only reporting over the visit store.
///
/// Holds no mutable state, so reports for different dates can be computed
/// concurrently.
pub struct ReportingService {
    store: Arc<dyn VisitStore>,
    valid_types: Arc<dyn ValidTypeProvider>,
    aggregator: WorkingTimeAggregator,
    production_day: ProductionDay,
    projector: ReportProjector,
    request_timeout: Duration,
}

impl ReportingService {
    pub fn new(
        store: Arc<dyn VisitStore>,
        valid_types: Arc<dyn ValidTypeProvider>,
        aggregator: WorkingTimeAggregator,
        production_day: ProductionDay,
        projector: ReportProjector,
    ) -> Self {
        Self {
            store,
            valid_types,
            aggregator,
            production_day,
            projector,
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }

    /// Bound the visit-store and allow-list reads by `timeout`.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Wire the service from the reporting configuration.
    ///
    /// # Errors
    /// `PatrolArcError::Config` when the break table or day window is invalid.
    pub fn from_config(
        store: Arc<dyn VisitStore>,
        valid_types: Arc<dyn ValidTypeProvider>,
        config: &ReportingConfig,
    ) -> Result<Self> {
        Ok(Self::new(
            store,
            valid_types,
            WorkingTimeAggregator::from_config(config)?,
            ProductionDay::from_config(config)?,
            ReportProjector::new(config.slot_minutes),
        ))
    }

    pub fn production_window(&self, date: NaiveDate) -> ReportWindow {
        self.production_day.window_for(date)
    }

    /// Per-worker activity for an arbitrary window.
    ///
    /// # Errors
    /// `StoreUnavailable` when the visit store cannot be read in time.
    pub async fn aggregate_window(
        &self,
        window: &ReportWindow,
    ) -> Result<Vec<AggregatedWorkerActivity>> {
        let mut visits = deadline::bounded(
            self.request_timeout,
            "visit.query_by_window",
            self.store.query_by_window(window.start, window.end),
        )
        .await?;
        visits.retain(|visit| window.contains(visit.arrive_at));
        debug!(start = %window.start, end = %window.end, visits = visits.len(), "visits loaded");

        let valid_types = self.load_valid_types().await;
        Ok(self.aggregator.aggregate(&visits, &valid_types))
    }

    /// Full report for one production day.
    pub async fn daily_report(&self, date: NaiveDate) -> Result<DailyReport> {
        let window = self.production_window(date);
        let workers = self.aggregate_window(&window).await?;
        if workers.is_empty() {
            return Ok(DailyReport::empty(window));
        }

        let devices = self.projector.by_device(&workers);
        let slots = self.projector.by_time_slot(&window, &workers);

        info!(
            date = %date,
            workers = workers.len(),
            devices = devices.len(),
            "daily report built"
        );
        Ok(DailyReport { window, workers, devices, slots })
    }

    async fn load_valid_types(&self) -> HashSet<String> {
        let read = deadline::bounded(
            self.request_timeout,
            "valid_types.active",
            self.valid_types.active_valid_types(),
        );
        match read.await {
            Ok(types) => types,
            Err(err) => {
                warn!(error = %err, "valid type list unavailable; counting no working time");
                HashSet::new()
            }
        }
    }
}

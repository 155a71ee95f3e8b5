//! Working-time report types
//!
//! Derived from visits at report time, never persisted.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::types::visit::Visit;

/// Half-open reporting window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportWindow {
    /// Production date the window belongs to.
    pub date: NaiveDate,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl ReportWindow {
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        ts >= self.start && ts < self.end
    }
}

/// Net time one retained visit contributed to its worker's total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitContribution {
    pub record_id: String,
    pub device_id: String,
    pub area: String,
    pub net_minutes: f64,
}

/// Per-worker aggregation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedWorkerActivity {
    pub worker_id: String,
    pub worker_name: String,
    /// Every visit of the worker in the window, in arrival order.
    pub visits: Vec<Visit>,
    /// Nominal shift length, for comparison only.
    pub total_working_minutes: f64,
    pub valid_working_minutes: f64,
    /// Visits that survived filtering and dedup, with their net minutes.
    pub contributions: Vec<VisitContribution>,
}

/// Device-level view of a reporting window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceActivity {
    pub device_id: String,
    pub area: String,
    pub visit_count: usize,
    pub worker_ids: Vec<String>,
    pub valid_working_minutes: f64,
}

/// Visits that arrived at one device during one fixed-width slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlotActivity {
    pub slot_start: NaiveDateTime,
    pub slot_end: NaiveDateTime,
    pub device_id: String,
    pub visit_count: usize,
    pub worker_names: Vec<String>,
}

/// Everything presentation needs for one production day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReport {
    pub window: ReportWindow,
    pub workers: Vec<AggregatedWorkerActivity>,
    pub devices: Vec<DeviceActivity>,
    pub slots: Vec<TimeSlotActivity>,
}

impl DailyReport {
    pub fn empty(window: ReportWindow) -> Self {
        Self { window, workers: Vec::new(), devices: Vec::new(), slots: Vec::new() }
    }
}

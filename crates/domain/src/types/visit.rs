//! Inspection visit records
//!
//! A visit opens when a worker taps an NFC card at a device and closes when
//! results are submitted or the visit is cancelled. Timestamps are
//! factory-local wall-clock times because break ranges and production days
//! are defined in local time-of-day.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::constants::CANCEL_INSPECT_TYPE;
use crate::impl_domain_status_conversions;
use crate::types::device::DeviceRef;

/// One inspection occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    pub record_id: String,
    pub worker_id: String,
    pub worker_name: String,
    pub device_id: String,
    pub area: String,
    pub inspect_type: String,
    pub work_order: Option<String>,
    pub arrive_at: NaiveDateTime,
    /// `None` while the visit is open.
    pub submit_data_at: Option<NaiveDateTime>,
    pub source: String,
    pub ok_count: Option<i64>,
    pub ng_count: Option<i64>,
}

impl Visit {
    /// Build a stored visit from its creation request and assigned id.
    pub fn from_new(record_id: impl Into<String>, new: NewVisit) -> Self {
        Self {
            record_id: record_id.into(),
            worker_id: new.worker_id,
            worker_name: new.worker_name,
            device_id: new.device_id,
            area: new.area,
            inspect_type: new.inspect_type,
            work_order: new.work_order,
            arrive_at: new.arrive_at,
            submit_data_at: None,
            source: new.source,
            ok_count: None,
            ng_count: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.submit_data_at.is_none()
    }

    pub fn is_cancelled(&self) -> bool {
        self.inspect_type == CANCEL_INSPECT_TYPE
    }

    pub fn status(&self) -> VisitStatus {
        if self.is_open() {
            VisitStatus::Open
        } else if self.is_cancelled() {
            VisitStatus::Cancelled
        } else {
            VisitStatus::Closed
        }
    }

    /// Duration in whole seconds, or `None` while open.
    pub fn duration_secs(&self) -> Option<i64> {
        self.submit_data_at.map(|submit| (submit - self.arrive_at).num_seconds())
    }
}

/// Creation request for a visit; the store assigns `record_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVisit {
    pub worker_id: String,
    pub worker_name: String,
    pub device_id: String,
    pub area: String,
    pub inspect_type: String,
    pub work_order: Option<String>,
    pub arrive_at: NaiveDateTime,
    pub source: String,
}

impl NewVisit {
    pub fn for_device(
        worker: &WorkerIdentity,
        device: &DeviceRef,
        inspect_type: impl Into<String>,
        source: impl Into<String>,
        arrive_at: NaiveDateTime,
    ) -> Self {
        Self {
            worker_id: worker.worker_id.clone(),
            worker_name: worker.worker_name.clone(),
            device_id: device.device_id.clone(),
            area: device.area.clone(),
            inspect_type: inspect_type.into(),
            work_order: None,
            arrive_at,
            source: source.into(),
        }
    }
}

/// How an open visit gets closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VisitClosure {
    /// Abandon the visit: the inspect type becomes the cancel sentinel.
    Cancel { at: NaiveDateTime },
    /// Normal result submission; the inspect type is kept.
    Submit {
        at: NaiveDateTime,
        ok_count: Option<i64>,
        ng_count: Option<i64>,
        work_order: Option<String>,
    },
}

impl VisitClosure {
    pub fn at(&self) -> NaiveDateTime {
        match self {
            Self::Cancel { at } | Self::Submit { at, .. } => *at,
        }
    }

    /// Apply the closure to an in-memory visit.
    ///
    /// Callers are responsible for the open-and-owned check.
    pub fn apply(&self, visit: &mut Visit) {
        match self {
            Self::Cancel { at } => {
                visit.inspect_type = CANCEL_INSPECT_TYPE.to_string();
                visit.submit_data_at = Some(*at);
            }
            Self::Submit { at, ok_count, ng_count, work_order } => {
                visit.submit_data_at = Some(*at);
                visit.ok_count = *ok_count;
                visit.ng_count = *ng_count;
                if work_order.is_some() {
                    visit.work_order.clone_from(work_order);
                }
            }
        }
    }
}

/// Derived lifecycle state of a visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitStatus {
    Open,
    Closed,
    Cancelled,
}

impl_domain_status_conversions!(VisitStatus {
    Open => "open",
    Closed => "closed",
    Cancelled => "cancelled",
});

/// Worker identity handed in by the session layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerIdentity {
    pub worker_id: String,
    pub worker_name: String,
}

impl WorkerIdentity {
    pub fn new(worker_id: impl Into<String>, worker_name: impl Into<String>) -> Self {
        Self { worker_id: worker_id.into(), worker_name: worker_name.into() }
    }
}

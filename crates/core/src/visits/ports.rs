//! Port interfaces for the visit lifecycle
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use patrolarc_domain::{DeviceRef, NewVisit, Result, Visit, VisitClosure};

/// Durable storage for inspection visits.
///
/// Implementations must make "at most one open visit per worker" hold at the
/// storage level (conditional updates, uniqueness on the open state) rather
/// than relying on callers to check first.
#[async_trait]
pub trait VisitStore: Send + Sync {
    /// Persist a new open visit and return it with its assigned record id.
    ///
    /// Fails with `PatrolArcError::VisitAlreadyOpen` when the worker already
    /// has an open visit and the store can detect it.
    async fn create(&self, visit: NewVisit) -> Result<Visit>;

    /// The worker's open visit; the most recently arrived one if several
    /// exist.
    async fn find_open_by_worker(&self, worker_id: &str) -> Result<Option<Visit>>;

    /// Close `record_id` only if it is still open and owned by `worker_id`.
    ///
    /// Returns the number of affected records (0 or 1).
    async fn close_if_open_and_owned(
        &self,
        record_id: &str,
        worker_id: &str,
        closure: VisitClosure,
    ) -> Result<usize>;

    /// Visits whose `arrive_at` lies in `[start, end)`, ordered by worker then
    /// arrival.
    async fn query_by_window(&self, start: NaiveDateTime, end: NaiveDateTime)
        -> Result<Vec<Visit>>;

    /// One worker's visits whose `arrive_at` lies in `[start, end)`, in
    /// arrival order.
    async fn query_by_worker(
        &self,
        worker_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Visit>>;
}

/// NFC card to device/area lookup owned by master data.
#[async_trait]
pub trait DeviceDirectory: Send + Sync {
    /// Resolve a card; `None` when the card is not registered.
    async fn resolve(&self, card_id: &str) -> Result<Option<DeviceRef>>;
}

//! Visit lifecycle service - core business logic
//!
//! Owns the per-worker state machine (`NoOpenVisit` / `OpenVisit(device)`)
//! driven by NFC taps. The service never holds a lock across store calls;
//! the "one open visit per worker" rule is enforced by conditional writes in
//! the store, and a lost race on `create` is folded back into the normal tap
//! outcomes.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use patrolarc_domain::constants::DEFAULT_REQUEST_TIMEOUT_MS;
use patrolarc_domain::{
    DeviceRef, NewVisit, PatrolArcError, Result, Visit, VisitClosure, WorkerIdentity,
};
use tracing::{debug, info, warn};

use super::ports::{DeviceDirectory, VisitStore};
use crate::clock::Clock;
use crate::deadline;

/// One NFC tap as received from the session layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapRequest {
    /// `None` when no worker is logged in.
    pub worker: Option<WorkerIdentity>,
    pub card_id: String,
    pub inspect_type: String,
    pub source: String,
    /// Set when the caller confirms abandoning `old_record_id`.
    pub confirm_replace: bool,
    pub old_record_id: Option<String>,
}

/// Result of a tap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapOutcome {
    /// A new visit was opened.
    Opened { visit: Visit, replaced_record_id: Option<String> },
    /// The worker re-tapped the device of their open visit.
    Existing { visit: Visit },
    /// The worker has an open visit on another device; nothing was written.
    NeedsConfirmation { pending: Visit, requested: DeviceRef },
}

impl TapOutcome {
    /// Record id of the visit the worker is now on, if any.
    pub fn record_id(&self) -> Option<&str> {
        match self {
            Self::Opened { visit, .. } | Self::Existing { visit } => Some(&visit.record_id),
            Self::NeedsConfirmation { .. } => None,
        }
    }

    pub fn arrive_at(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Opened { visit, .. } | Self::Existing { visit } => Some(visit.arrive_at),
            Self::NeedsConfirmation { .. } => None,
        }
    }

    pub fn is_existing(&self) -> bool {
        matches!(self, Self::Existing { .. })
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Opened { replaced_record_id: Some(_), .. } => "replaced",
            Self::Opened { .. } => "opened",
            Self::Existing { .. } => "existing",
            Self::NeedsConfirmation { .. } => "needs_confirmation",
        }
    }
}

/// Results submitted when an inspection finishes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitResult {
    pub ok_count: Option<i64>,
    pub ng_count: Option<i64>,
    pub work_order: Option<String>,
}

/// Visit lifecycle service
pub struct VisitLifecycleService {
    store: Arc<dyn VisitStore>,
    devices: Arc<dyn DeviceDirectory>,
    clock: Arc<dyn Clock>,
    request_timeout: Duration,
}

impl VisitLifecycleService {
    /// Create a new lifecycle service
    pub fn new(
        store: Arc<dyn VisitStore>,
        devices: Arc<dyn DeviceDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            devices,
            clock,
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }

    /// Bound every store and directory call by `timeout`.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Look up the device behind an NFC card.
    ///
    /// # Errors
    /// `CardNotFound` when the card has no mapping.
    pub async fn resolve_card_to_device(&self, card_id: &str) -> Result<DeviceRef> {
        let resolved = self.bounded("device.resolve", self.devices.resolve(card_id)).await?;
        resolved.ok_or_else(|| PatrolArcError::CardNotFound(card_id.to_string()))
    }

    /// Unconditionally open a visit on `device` stamped with the current time.
    ///
    /// Only call after the tap protocol established that the worker has no
    /// open visit.
    pub async fn begin_visit(
        &self,
        worker: &WorkerIdentity,
        device: &DeviceRef,
        inspect_type: &str,
        source: &str,
    ) -> Result<Visit> {
        let new = NewVisit::for_device(worker, device, inspect_type, source, self.clock.now());
        let visit = self.bounded("visit.create", self.store.create(new)).await?;

        info!(
            worker_id = %visit.worker_id,
            device_id = %visit.device_id,
            record_id = %visit.record_id,
            inspect_type = %visit.inspect_type,
            "visit opened"
        );
        Ok(visit)
    }

    /// The worker's open visit, if any.
    pub async fn find_open_visit(&self, worker_id: &str) -> Result<Option<Visit>> {
        self.bounded("visit.find_open", self.store.find_open_by_worker(worker_id)).await
    }

    /// Cancel `record_id` if it is still open and owned by `worker_id`.
    ///
    /// `false` means another path closed it first or it belongs to someone
    /// else; that is an expected race, not an error.
    pub async fn close_or_cancel_visit(&self, record_id: &str, worker_id: &str) -> Result<bool> {
        let closure = VisitClosure::Cancel { at: self.clock.now() };
        let affected = self
            .bounded(
                "visit.cancel",
                self.store.close_if_open_and_owned(record_id, worker_id, closure),
            )
            .await?;

        if affected == 0 {
            debug!(worker_id, record_id, "cancel skipped: visit already closed or not owned");
        } else {
            info!(worker_id, record_id, "visit cancelled");
        }
        Ok(affected > 0)
    }

    /// Close an open visit with its inspection results.
    ///
    /// Keeps the visit's inspect type. Returns `false` when the visit was
    /// already closed or is not owned by the worker.
    pub async fn submit_visit_result(
        &self,
        worker: Option<&WorkerIdentity>,
        record_id: &str,
        result: VisitResult,
    ) -> Result<bool> {
        let worker = require_worker(worker)?;
        if result.ok_count.is_some_and(|n| n < 0) || result.ng_count.is_some_and(|n| n < 0) {
            return Err(PatrolArcError::InvalidInput("result counts must not be negative".into()));
        }

        let closure = VisitClosure::Submit {
            at: self.clock.now(),
            ok_count: result.ok_count,
            ng_count: result.ng_count,
            work_order: result.work_order,
        };
        let affected = self
            .bounded(
                "visit.submit",
                self.store.close_if_open_and_owned(record_id, &worker.worker_id, closure),
            )
            .await?;

        if affected == 0 {
            debug!(worker_id = %worker.worker_id, record_id, "submit skipped: visit not open");
        } else {
            info!(worker_id = %worker.worker_id, record_id, "visit results submitted");
        }
        Ok(affected > 0)
    }

    /// One worker's visits arriving in `[start, end)`.
    pub async fn list_worker_visits(
        &self,
        worker_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Visit>> {
        self.bounded("visit.query_by_worker", self.store.query_by_worker(worker_id, start, end))
            .await
    }

    /// Run the tap protocol.
    ///
    /// 1. Resolve the card (fail fast with `CardNotFound`).
    /// 2. With `confirm_replace` and an old record id: cancel the old visit
    ///    (ignoring a lost race) and open a new one.
    /// 3. Otherwise look up the open visit:
    ///    - none: open a new visit
    ///    - same device: return it unchanged
    ///    - other device: ask for confirmation, writing nothing
    pub async fn process_tap(&self, request: TapRequest) -> Result<TapOutcome> {
        let worker = require_worker(request.worker.as_ref())?;
        if request.inspect_type.trim().is_empty() {
            return Err(PatrolArcError::InvalidInput("inspect type is required".into()));
        }

        let device = self.resolve_card_to_device(&request.card_id).await?;

        let outcome = match (request.confirm_replace, request.old_record_id.as_deref()) {
            (true, Some(old_record_id)) => {
                // Caller already confirmed; proceed even if the old visit was
                // closed elsewhere in the meantime.
                self.close_or_cancel_visit(old_record_id, &worker.worker_id).await?;
                self.open_or_recover(worker, &device, &request, Some(old_record_id.to_string()))
                    .await?
            }
            _ => match self.find_open_visit(&worker.worker_id).await? {
                None => self.open_or_recover(worker, &device, &request, None).await?,
                Some(pending) => classify_pending(pending, device),
            },
        };

        info!(
            worker_id = %worker.worker_id,
            card_id = %request.card_id,
            record_id = outcome.record_id().unwrap_or_default(),
            outcome = outcome.label(),
            "tap processed"
        );
        Ok(outcome)
    }

    async fn open_or_recover(
        &self,
        worker: &WorkerIdentity,
        device: &DeviceRef,
        request: &TapRequest,
        replaced_record_id: Option<String>,
    ) -> Result<TapOutcome> {
        match self.begin_visit(worker, device, &request.inspect_type, &request.source).await {
            Ok(visit) => Ok(TapOutcome::Opened { visit, replaced_record_id }),
            Err(PatrolArcError::VisitAlreadyOpen(worker_id)) => {
                warn!(%worker_id, device_id = %device.device_id, "lost open-visit race");
                match self.find_open_visit(&worker.worker_id).await? {
                    Some(pending) => Ok(classify_pending(pending, device.clone())),
                    None => Err(PatrolArcError::VisitAlreadyOpen(worker_id)),
                }
            }
            Err(err) => Err(err),
        }
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        deadline::bounded(self.request_timeout, operation, fut).await
    }
}

fn require_worker(worker: Option<&WorkerIdentity>) -> Result<&WorkerIdentity> {
    match worker {
        Some(worker) if !worker.worker_id.trim().is_empty() => Ok(worker),
        _ => Err(PatrolArcError::NotLoggedIn),
    }
}

fn classify_pending(pending: Visit, requested: DeviceRef) -> TapOutcome {
    if pending.device_id == requested.device_id {
        TapOutcome::Existing { visit: pending }
    } else {
        TapOutcome::NeedsConfirmation { pending, requested }
    }
}

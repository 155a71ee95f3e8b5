//! In-memory port implementations for testing
//!
//! `InMemoryVisitStore` enforces the one-open-visit-per-worker rule the same
//! way the SQLite store does, by failing `create` with `VisitAlreadyOpen`.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use patrolarc_core::{DeviceDirectory, ValidTypeProvider, VisitStore};
use patrolarc_domain::{
    DeviceRef, NewVisit, PatrolArcError, Result as DomainResult, Visit, VisitClosure,
};
use uuid::Uuid;

/// In-memory `VisitStore`.
#[derive(Default, Clone)]
pub struct InMemoryVisitStore {
    visits: Arc<Mutex<Vec<Visit>>>,
    creates: Arc<AtomicUsize>,
}

impl InMemoryVisitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with already-persisted visits.
    pub fn with_visits(visits: Vec<Visit>) -> Self {
        let store = Self::default();
        store.visits.lock().unwrap().extend(visits);
        store
    }

    pub fn all(&self) -> Vec<Visit> {
        self.visits.lock().unwrap().clone()
    }

    pub fn get(&self, record_id: &str) -> Option<Visit> {
        self.visits.lock().unwrap().iter().find(|v| v.record_id == record_id).cloned()
    }

    pub fn open_count(&self, worker_id: &str) -> usize {
        self.visits.lock().unwrap().iter().filter(|v| v.worker_id == worker_id && v.is_open()).count()
    }

    /// Number of successful `create` calls.
    pub fn create_count(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VisitStore for InMemoryVisitStore {
    async fn create(&self, visit: NewVisit) -> DomainResult<Visit> {
        let mut visits = self.visits.lock().unwrap();
        if visits.iter().any(|v| v.worker_id == visit.worker_id && v.is_open()) {
            return Err(PatrolArcError::VisitAlreadyOpen(visit.worker_id));
        }
        let stored = Visit::from_new(Uuid::now_v7().to_string(), visit);
        visits.push(stored.clone());
        self.creates.fetch_add(1, Ordering::SeqCst);
        Ok(stored)
    }

    async fn find_open_by_worker(&self, worker_id: &str) -> DomainResult<Option<Visit>> {
        Ok(self
            .visits
            .lock()
            .unwrap()
            .iter()
            .filter(|v| v.worker_id == worker_id && v.is_open())
            .max_by_key(|v| v.arrive_at)
            .cloned())
    }

    async fn close_if_open_and_owned(
        &self,
        record_id: &str,
        worker_id: &str,
        closure: VisitClosure,
    ) -> DomainResult<usize> {
        let mut visits = self.visits.lock().unwrap();
        match visits
            .iter_mut()
            .find(|v| v.record_id == record_id && v.worker_id == worker_id && v.is_open())
        {
            Some(visit) => {
                closure.apply(visit);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn query_by_window(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> DomainResult<Vec<Visit>> {
        let mut found: Vec<Visit> = self
            .visits
            .lock()
            .unwrap()
            .iter()
            .filter(|v| v.arrive_at >= start && v.arrive_at < end)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.worker_id.cmp(&b.worker_id).then(a.arrive_at.cmp(&b.arrive_at)));
        Ok(found)
    }

    async fn query_by_worker(
        &self,
        worker_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> DomainResult<Vec<Visit>> {
        let mut found = self.query_by_window(start, end).await?;
        found.retain(|v| v.worker_id == worker_id);
        Ok(found)
    }
}

/// Simulates a concurrent tap that wins the race: every `create` first
/// opens a rival visit for the same worker on `rival`, then delegates.
#[derive(Clone)]
pub struct RacingVisitStore {
    pub inner: InMemoryVisitStore,
    rival: DeviceRef,
}

impl RacingVisitStore {
    pub fn new(rival: DeviceRef) -> Self {
        Self { inner: InMemoryVisitStore::new(), rival }
    }
}

#[async_trait]
impl VisitStore for RacingVisitStore {
    async fn create(&self, visit: NewVisit) -> DomainResult<Visit> {
        let mut rival = visit.clone();
        rival.device_id.clone_from(&self.rival.device_id);
        rival.area.clone_from(&self.rival.area);
        // Ignore the result: after the first call the rival is already open.
        let _ = self.inner.create(rival).await;
        self.inner.create(visit).await
    }

    async fn find_open_by_worker(&self, worker_id: &str) -> DomainResult<Option<Visit>> {
        self.inner.find_open_by_worker(worker_id).await
    }

    async fn close_if_open_and_owned(
        &self,
        record_id: &str,
        worker_id: &str,
        closure: VisitClosure,
    ) -> DomainResult<usize> {
        self.inner.close_if_open_and_owned(record_id, worker_id, closure).await
    }

    async fn query_by_window(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> DomainResult<Vec<Visit>> {
        self.inner.query_by_window(start, end).await
    }

    async fn query_by_worker(
        &self,
        worker_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> DomainResult<Vec<Visit>> {
        self.inner.query_by_worker(worker_id, start, end).await
    }
}

/// Store whose every call sleeps for `delay` before failing.
#[derive(Clone)]
pub struct StalledVisitStore {
    delay: Duration,
}

impl StalledVisitStore {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    async fn stall<T>(&self) -> DomainResult<T> {
        tokio::time::sleep(self.delay).await;
        Err(PatrolArcError::Internal("stalled store finished".into()))
    }
}

#[async_trait]
impl VisitStore for StalledVisitStore {
    async fn create(&self, _visit: NewVisit) -> DomainResult<Visit> {
        self.stall().await
    }

    async fn find_open_by_worker(&self, _worker_id: &str) -> DomainResult<Option<Visit>> {
        self.stall().await
    }

    async fn close_if_open_and_owned(
        &self,
        _record_id: &str,
        _worker_id: &str,
        _closure: VisitClosure,
    ) -> DomainResult<usize> {
        self.stall().await
    }

    async fn query_by_window(
        &self,
        _start: NaiveDateTime,
        _end: NaiveDateTime,
    ) -> DomainResult<Vec<Visit>> {
        self.stall().await
    }

    async fn query_by_worker(
        &self,
        _worker_id: &str,
        _start: NaiveDateTime,
        _end: NaiveDateTime,
    ) -> DomainResult<Vec<Visit>> {
        self.stall().await
    }
}

/// In-memory `DeviceDirectory` keyed by card id.
#[derive(Default, Clone)]
pub struct InMemoryDeviceDirectory {
    cards: Arc<HashMap<String, DeviceRef>>,
}

impl InMemoryDeviceDirectory {
    pub fn new(devices: impl IntoIterator<Item = DeviceRef>) -> Self {
        Self {
            cards: Arc::new(devices.into_iter().map(|d| (d.card_id.clone(), d)).collect()),
        }
    }
}

#[async_trait]
impl DeviceDirectory for InMemoryDeviceDirectory {
    async fn resolve(&self, card_id: &str) -> DomainResult<Option<DeviceRef>> {
        Ok(self.cards.get(card_id).cloned())
    }
}

/// Fixed valid-type allow-list.
#[derive(Default, Clone)]
pub struct FixedValidTypes {
    types: HashSet<String>,
}

impl FixedValidTypes {
    pub fn new(types: &[&str]) -> Self {
        Self { types: types.iter().map(|t| (*t).to_string()).collect() }
    }
}

#[async_trait]
impl ValidTypeProvider for FixedValidTypes {
    async fn active_valid_types(&self) -> DomainResult<HashSet<String>> {
        Ok(self.types.clone())
    }
}

/// Provider that always fails, as when the master table is unreachable.
#[derive(Default, Clone, Copy)]
pub struct UnavailableValidTypes;

#[async_trait]
impl ValidTypeProvider for UnavailableValidTypes {
    async fn active_valid_types(&self) -> DomainResult<HashSet<String>> {
        Err(PatrolArcError::StoreUnavailable("inspect_types unreachable".into()))
    }
}

/// `ValidTypeProvider` that never answers within any reasonable deadline.
pub struct StalledValidTypes {
    delay: Duration,
}

impl StalledValidTypes {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl ValidTypeProvider for StalledValidTypes {
    async fn active_valid_types(&self) -> DomainResult<HashSet<String>> {
        tokio::time::sleep(self.delay).await;
        Ok(HashSet::new())
    }
}

//! # PatrolArc Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The inspection visit lifecycle (tap protocol, close/cancel)
//! - The working-time aggregation engine and break calendar
//! - Reporting projections over aggregated activity
//! - Port interfaces (traits) for storage and master data
//!
//! ## Architecture Principles
//! - Only depends on `patrolarc-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod clock;
mod deadline;
pub mod reporting;
pub mod visits;

pub use clock::{Clock, FixedClock, SystemClock};
pub use reporting::ports::ValidTypeProvider;
pub use reporting::{
    BreakCalendar, DedupPolicy, ProductionDay, ReportProjector, ReportingService,
    WorkingTimeAggregator,
};
pub use visits::ports::{DeviceDirectory, VisitStore};
pub use visits::{TapOutcome, TapRequest, VisitLifecycleService, VisitResult};

//! Working-time aggregation and reporting projections

pub mod aggregator;
pub mod break_calendar;
pub mod ports;
pub mod projection;
pub mod service;
pub mod window;

pub use aggregator::{DedupPolicy, WorkingTimeAggregator};
pub use break_calendar::BreakCalendar;
pub use projection::ReportProjector;
pub use service::ReportingService;
pub use window::ProductionDay;

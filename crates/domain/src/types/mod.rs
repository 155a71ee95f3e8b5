//! Domain types and models

pub mod breaks;
pub mod device;
pub mod report;
pub mod visit;

pub use breaks::BreakRange;
pub use device::DeviceRef;
pub use report::{
    AggregatedWorkerActivity, DailyReport, DeviceActivity, ReportWindow, TimeSlotActivity,
    VisitContribution,
};
pub use visit::{NewVisit, Visit, VisitClosure, VisitStatus, WorkerIdentity};

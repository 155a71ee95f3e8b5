//! Inspection visit lifecycle

pub mod ports;
pub mod service;

pub use service::{TapOutcome, TapRequest, VisitLifecycleService, VisitResult};

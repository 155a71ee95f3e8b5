//! # PatrolArc Domain
//!
//! Business domain types and models for PatrolArc.
//!
//! This crate contains:
//! - Inspection visit records and the device/area mapping types
//! - Break ranges and derived working-time report types
//! - Domain error types and Result definitions
//! - Configuration structures and defaults
//!
//! ## Architecture
//! - No dependencies on other PatrolArc crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;

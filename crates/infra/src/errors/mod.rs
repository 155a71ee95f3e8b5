//! Infrastructure error conversions

pub mod conversions;

pub use conversions::{is_unique_violation, InfraError};

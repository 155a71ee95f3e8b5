//! Infrastructure services

pub mod valid_types;

pub use valid_types::{CachedValidTypeProvider, StaticValidTypeProvider};

//! # PatrolArc Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - SQLite repositories for visits, NFC cards and inspect types
//! - Configuration loading (environment, TOML, JSON)
//! - Tracing subscriber setup
//! - Cached valid-type provider
//! - Context wiring for front ends
//!
//! ## Architecture
//! - Implements traits defined in `patrolarc-core`
//! - Contains all "impure" code (I/O, pools, global subscribers)

pub mod config;
pub mod context;
pub mod database;
pub mod errors;
pub mod observability;
pub mod services;

pub use context::PatrolArcContext;
pub use database::*;
pub use errors::InfraError;
pub use services::*;

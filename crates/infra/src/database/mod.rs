//! Database implementations

pub mod device_repository;
pub mod inspect_type_repository;
pub mod manager;
pub mod visit_repository;

pub use device_repository::SqliteDeviceDirectory;
pub use inspect_type_repository::SqliteInspectTypeRepository;
pub use manager::{DbConnection, DbManager};
pub use visit_repository::SqliteVisitRepository;

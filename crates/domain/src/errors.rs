//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for PatrolArc
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum PatrolArcError {
    /// The tapped NFC card has no device mapping.
    #[error("NFC card not registered: {0}")]
    CardNotFound(String),

    /// No worker identity was supplied with the request.
    #[error("No worker is logged in")]
    NotLoggedIn,

    /// Storage rejected a second open visit for the same worker.
    #[error("Worker already has an open visit: {0}")]
    VisitAlreadyOpen(String),

    #[error("Visit store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PatrolArcError {
    /// Stable label suitable for structured log fields.
    pub fn label(&self) -> &'static str {
        match self {
            Self::CardNotFound(_) => "card_not_found",
            Self::NotLoggedIn => "not_logged_in",
            Self::VisitAlreadyOpen(_) => "visit_already_open",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::Config(_) => "config",
            Self::NotFound(_) => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for PatrolArc operations
pub type Result<T> = std::result::Result<T, PatrolArcError>;

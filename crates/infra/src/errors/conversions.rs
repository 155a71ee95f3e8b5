//! Conversions from external infrastructure errors into domain errors.

use patrolarc_domain::PatrolArcError;
use rusqlite::Error as SqlError;
use tokio::task::JoinError;

/// SQLite extended code for a UNIQUE constraint violation.
const SQLITE_CONSTRAINT_UNIQUE: i32 = 2067;
/// SQLite extended code for a FOREIGN KEY constraint violation.
const SQLITE_CONSTRAINT_FOREIGNKEY: i32 = 787;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub PatrolArcError);

impl From<InfraError> for PatrolArcError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<PatrolArcError> for InfraError {
    fn from(value: PatrolArcError) -> Self {
        InfraError(value)
    }
}

trait IntoPatrolArcError {
    fn into_patrolarc(self) -> PatrolArcError;
}

/// True when `err` is a UNIQUE constraint failure.
pub fn is_unique_violation(err: &SqlError) -> bool {
    matches!(
        err,
        SqlError::SqliteFailure(failure, _) if failure.extended_code == SQLITE_CONSTRAINT_UNIQUE
    )
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → PatrolArcError */
/* -------------------------------------------------------------------------- */

impl IntoPatrolArcError for SqlError {
    fn into_patrolarc(self) -> PatrolArcError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        PatrolArcError::StoreUnavailable("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        PatrolArcError::StoreUnavailable("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, SQLITE_CONSTRAINT_UNIQUE) => {
                        PatrolArcError::InvalidInput(format!("unique constraint violation: {message}"))
                    }
                    (ErrorCode::ConstraintViolation, SQLITE_CONSTRAINT_FOREIGNKEY) => {
                        PatrolArcError::InvalidInput("foreign key constraint violation".into())
                    }
                    (ErrorCode::CannotOpen | ErrorCode::SystemIoFailure | ErrorCode::DiskFull, _) => {
                        PatrolArcError::StoreUnavailable(format!("database unavailable: {message}"))
                    }
                    _ => PatrolArcError::StoreUnavailable(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => PatrolArcError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                PatrolArcError::Internal(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                PatrolArcError::Internal(format!("invalid column type: {ty}"))
            }
            RE::Utf8Error(_) => {
                PatrolArcError::Internal("invalid UTF-8 returned from sqlite".into())
            }
            RE::InvalidParameterName(parameter_name) => {
                PatrolArcError::Internal(format!("invalid parameter name: {parameter_name}"))
            }
            RE::InvalidPath(path) => PatrolArcError::Config(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => PatrolArcError::StoreUnavailable(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_patrolarc())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → PatrolArcError */
/* -------------------------------------------------------------------------- */

impl IntoPatrolArcError for r2d2::Error {
    fn into_patrolarc(self) -> PatrolArcError {
        PatrolArcError::StoreUnavailable(format!("connection pool: {self}"))
    }
}

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(value.into_patrolarc())
    }
}

/* -------------------------------------------------------------------------- */
/* tokio::task::JoinError → PatrolArcError */
/* -------------------------------------------------------------------------- */

impl IntoPatrolArcError for JoinError {
    fn into_patrolarc(self) -> PatrolArcError {
        if self.is_cancelled() {
            PatrolArcError::Internal("blocking database task cancelled".into())
        } else {
            PatrolArcError::Internal(format!("blocking database task failed: {self}"))
        }
    }
}

impl From<JoinError> for InfraError {
    fn from(value: JoinError) -> Self {
        InfraError(value.into_patrolarc())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

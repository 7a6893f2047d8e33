// Ledger errors - one taxonomy for every repository call
//
// Store failures are classified by SQLite result code:
// - SQLITE_CONSTRAINT (check, foreign key, not null) -> ConstraintViolation
// - open/busy/locked/io/corrupt                      -> StoreUnavailable
// - everything else                                  -> Store
// NotFound is never produced by the conversion; repositories raise it
// themselves when a row-returning statement matches nothing.

use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("store unavailable: {0}")]
    StoreUnavailable(#[source] rusqlite::Error),

    #[error("store error: {0}")]
    Store(#[source] rusqlite::Error),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

impl LedgerError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    /// True when a lookup matched no row
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::ConstraintViolation(_))
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

impl From<rusqlite::Error> for LedgerError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(code, message)
                if code.code == ErrorCode::ConstraintViolation =>
            {
                Self::ConstraintViolation(message.unwrap_or_else(|| code.to_string()))
            }
            rusqlite::Error::SqliteFailure(code, _)
                if matches!(
                    code.code,
                    ErrorCode::CannotOpen
                        | ErrorCode::DatabaseBusy
                        | ErrorCode::DatabaseLocked
                        | ErrorCode::SystemIoFailure
                        | ErrorCode::DatabaseCorrupt
                        | ErrorCode::NotADatabase
                        | ErrorCode::PermissionDenied
                ) =>
            {
                Self::StoreUnavailable(err)
            }
            rusqlite::Error::InvalidPath(_) => Self::StoreUnavailable(err),
            other => Self::Store(other),
        }
    }
}

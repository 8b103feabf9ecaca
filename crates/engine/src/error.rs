//! The module contains the errors the engine can return.
//!
//! The set is closed:
//!
//! - [`InvalidInput`] the request can never succeed as written.
//! - [`NotFound`] a referenced row does not exist or is not visible to the
//!   caller.
//! - [`Unauthorized`] the caller lacks the required relationship.
//! - [`Internal`] any other storage failure.
//!
//! Storage errors are classified exactly once, by `From<DbErr>`, so every `?`
//! on a storage call already yields one of the variants above.
//!
//!  [`InvalidInput`]: EngineError::InvalidInput
//!  [`NotFound`]: EngineError::NotFound
//!  [`Unauthorized`]: EngineError::Unauthorized
//!  [`Internal`]: EngineError::Internal
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Internal error: {0}")]
    Internal(DbErr),
}

impl EngineError {
    /// Stable machine-readable code, used in API error bodies.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::NotFound(_) => "not_found",
            Self::Unauthorized(_) => "unauthorized",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Build an internal error that did not come from the driver.
    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::Internal(DbErr::Custom(message.into()))
    }
}

impl From<DbErr> for EngineError {
    fn from(err: DbErr) -> Self {
        if let DbErr::RecordNotFound(what) = &err {
            return Self::NotFound(what.clone());
        }
        match err.sql_err() {
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                Self::InvalidInput(format!("invalid reference: {detail}"))
            }
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                Self::InvalidInput(format!("already exists: {detail}"))
            }
            _ => Self::Internal(err),
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::Unauthorized(a), Self::Unauthorized(b)) => a == b,
            (Self::Internal(a), Self::Internal(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

//! The module contains the error the engine can throw.
//!
//! The taxonomy follows the propagation policy: [`Unauthenticated`] and
//! [`Validation`] carry user-actionable detail, [`Database`] is surfaced
//! generically at the API boundary, and partial failures (relationship
//! linking/refresh) are never errors of the primary operation — they travel
//! in outcome lists, not through this type.
//!
//! [`Unauthenticated`]: EngineError::Unauthenticated
//! [`Validation`]: EngineError::Validation
//! [`Database`]: EngineError::Database

use sea_orm::DbErr;
use thiserror::Error;

use crate::validation::SplitValidation;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("no resolvable caller identity: {0}")]
    Unauthenticated(String),
    /// Carries the validator's report verbatim so callers can render the
    /// specific error list.
    #[error("invalid splits: {}", .0.errors.join("; "))]
    Validation(SplitValidation),
    #[error("\"{0}\" already present!")]
    Conflict(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid role: {0}")]
    InvalidRole(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Unauthenticated(a), Self::Unauthenticated(b)) => a == b,
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidRole(a), Self::InvalidRole(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::InvalidCursor(a), Self::InvalidCursor(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// One variant per failure class the workflows can surface. The calling layer
/// maps these to user-facing responses; nothing here is retried automatically
/// except `LockTimeout`, which the ledger retries a bounded number of times
/// before letting it escape.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A referenced product/warehouse/order/return does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Requested quantity exceeds what the stock row holds.
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: i64, available: i64 },

    /// Malformed input (non-positive quantity, unknown status value,
    /// same-warehouse transfer, empty line list).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A uniqueness rule was violated (e.g. second return for an order).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The operation is not legal for the current order status.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A stock-row lock could not be acquired within the bounded wait.
    /// Transient; the caller may retry the whole operation.
    #[error("lock acquisition timed out")]
    LockTimeout,
}

impl DomainError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn insufficient_stock(requested: i64, available: i64) -> Self {
        Self::InsufficientStock {
            requested,
            available,
        }
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// True for failures the caller may safely retry as-is.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::LockTimeout)
    }
}

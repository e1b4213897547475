//! Error types for the coin ledger
//!
//! Every operation returns [`LedgerError`] on failure. Business outcomes
//! (`InsufficientFunds`, `Unauthorized`, `NotFound`, ...) are ordinary values the
//! caller is expected to handle; only `StoreFailure` means "retry later".
//!
//! # Error Categories
//!
//! - **Argument Errors**: malformed or out-of-range input that slipped past the boundary
//! - **Resolution Errors**: a coin, user or request that does not resolve for the caller
//! - **Balance Errors**: insufficient funds, arithmetic overflow
//! - **Governance Errors**: role or permission checks that failed
//! - **Store Errors**: the backing transaction could not run or commit

use super::ids::{Amount, CoinKey, UserKey};
use super::role::Action;
use std::fmt::Display;
use thiserror::Error;

/// Main error type for the coin ledger
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Malformed or out-of-range input
    ///
    /// The outer layers validate input before it reaches the core; the core
    /// still rejects values that would break its invariants (e.g. zero amounts).
    #[error("Invalid {field}: {reason}")]
    InvalidArgument {
        /// Name of the offending field
        field: String,
        /// What the field must satisfy
        reason: String,
    },

    /// A coin, user, request, role or transaction does not resolve
    ///
    /// Also returned when the caller is not allowed to act on a request, so that
    /// the existence of other users' requests is not revealed.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of record that was looked up
        entity: String,
        /// Identifier the caller supplied
        id: String,
    },

    /// The sender's entry holds less than the requested amount
    #[error(
        "Insufficient funds for user {user} in coin {coin}: available {available}, requested {requested}"
    )]
    InsufficientFunds {
        /// User whose entry was debited
        user: UserKey,
        /// Coin of the entry
        coin: CoinKey,
        /// Balance at the time of the check
        available: Amount,
        /// Amount the transfer asked for
        requested: Amount,
    },

    /// The caller's role does not satisfy the permission for an action
    #[error("User {user} is not permitted to {action} on coin {coin}")]
    Unauthorized {
        /// Acting user
        user: UserKey,
        /// Coin being administered
        coin: CoinKey,
        /// Action that was denied
        action: Action,
    },

    /// The operation conflicts with existing state or targets the caller itself
    #[error("Conflict: {reason}")]
    Conflict {
        /// Description of the conflict
        reason: String,
    },

    /// A balance would exceed the storable maximum
    #[error("Arithmetic overflow in {operation} for user {user}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// User whose entry would overflow
        user: UserKey,
    },

    /// The backing store failed; nothing from the unit of work was applied
    #[error("Store failure: {message}")]
    StoreFailure {
        /// Description of the store error
        message: String,
    },
}

// Conversion from sqlx::Error to LedgerError
impl From<sqlx::Error> for LedgerError {
    fn from(error: sqlx::Error) -> Self {
        let unique_violation = error
            .as_database_error()
            .is_some_and(|db_error| db_error.is_unique_violation());

        if unique_violation {
            LedgerError::Conflict {
                reason: error.to_string(),
            }
        } else {
            LedgerError::StoreFailure {
                message: error.to_string(),
            }
        }
    }
}

// Helper functions for creating common errors

impl LedgerError {
    /// Create an InvalidArgument error
    pub fn invalid_argument(field: &str, reason: impl Into<String>) -> Self {
        LedgerError::InvalidArgument {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a NotFound error
    pub fn not_found(entity: &str, id: impl Display) -> Self {
        LedgerError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(
        user: UserKey,
        coin: CoinKey,
        available: Amount,
        requested: Amount,
    ) -> Self {
        LedgerError::InsufficientFunds {
            user,
            coin,
            available,
            requested,
        }
    }

    /// Create an Unauthorized error
    pub fn unauthorized(user: UserKey, coin: CoinKey, action: Action) -> Self {
        LedgerError::Unauthorized { user, coin, action }
    }

    /// Create a Conflict error
    pub fn conflict(reason: impl Into<String>) -> Self {
        LedgerError::Conflict {
            reason: reason.into(),
        }
    }

    /// Create the Conflict error for operations aimed at the caller itself
    pub fn self_target() -> Self {
        LedgerError::conflict("sender and receiver must be different users")
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, user: UserKey) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
            user,
        }
    }

    /// Create a StoreFailure error
    pub fn store_failure(message: impl Into<String>) -> Self {
        LedgerError::StoreFailure {
            message: message.into(),
        }
    }

    /// Whether the caller may retry the same operation unchanged
    ///
    /// Only store failures are transient. Every other variant describes the
    /// state of the ledger and will repeat until the caller changes the input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::StoreFailure { .. })
    }
}

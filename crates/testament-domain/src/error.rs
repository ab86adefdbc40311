//! Error taxonomy for testament commands

use crate::identity::Role;
use crate::testament::{Lifecycle, TestamentId};
use thiserror::Error;

/// Errors returned by testament commands and queries
///
/// Failures are deterministic given the current state and time, so none of
/// them are retried internally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TestamentError {
    /// Caller does not hold the role the command requires
    #[error("Unauthorized: caller is not the {required}")]
    Unauthorized {
        /// Role the command requires
        required: Role,
    },

    /// Lifecycle guard violated
    #[error("Invalid state ({current}): {reason}")]
    InvalidState {
        /// Lifecycle stage at the time of the call
        current: Lifecycle,
        /// What the command was waiting for
        reason: String,
    },

    /// A role was assigned the zero identity at creation
    #[error("Invalid role: {role} must not be the zero address")]
    InvalidRole {
        /// Offending role
        role: Role,
    },

    /// Malformed input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No testament with this id
    #[error("Testament not found: {0}")]
    NotFound(TestamentId),

    /// The backing store failed
    #[error("Store error: {0}")]
    Store(String),
}

impl TestamentError {
    /// Short machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            TestamentError::Unauthorized { .. } => "unauthorized",
            TestamentError::InvalidState { .. } => "invalid_state",
            TestamentError::InvalidRole { .. } => "invalid_role",
            TestamentError::InvalidArgument(_) => "invalid_argument",
            TestamentError::NotFound(_) => "not_found",
            TestamentError::Store(_) => "store",
        }
    }
}

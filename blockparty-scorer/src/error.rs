//! Error types raised by the recommendation and feedback paths.

use blockparty_core::{InteractionError, StoreError};
use thiserror::Error;

/// Errors raised while serving a recommendation request.
#[derive(Debug, Error)]
pub enum RecommendError {
    /// The request failed field-level validation before any scoring ran.
    #[error("invalid request: {field} {message}")]
    InvalidRequest {
        /// Name of the offending field.
        field: &'static str,
        /// Human-readable description of the problem.
        message: String,
    },
    /// One or more scoring weights were unusable.
    #[error("scoring weights must be finite, non-negative, and sum to a positive value")]
    InvalidWeights,
    /// An environment override could not be parsed as a number.
    #[error("weight override {name}={value} is not a number")]
    WeightParse {
        /// Environment variable name.
        name: String,
        /// Rejected value.
        value: String,
    },
    /// The requesting user does not exist.
    #[error("user {id} not found")]
    UserNotFound {
        /// Identifier that failed to resolve.
        id: String,
    },
    /// The store failed; propagated uncategorised.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors raised while applying interaction feedback.
#[derive(Debug, Error)]
pub enum FeedbackError {
    /// The reacting user does not exist.
    #[error("user {id} not found")]
    UserNotFound {
        /// Identifier that failed to resolve.
        id: String,
    },
    /// The target event does not exist.
    #[error("event {id} not found")]
    EventNotFound {
        /// Identifier that failed to resolve.
        id: String,
    },
    /// The interaction record itself was malformed.
    #[error(transparent)]
    Invalid(#[from] InteractionError),
    /// The store failed; propagated uncategorised.
    #[error(transparent)]
    Store(#[from] StoreError),
}

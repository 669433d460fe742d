//! Error types for the solvers and the cached front.
//!
//! Validation errors are caller-fixable and carry a message meant to be shown
//! as-is. Internal and cache errors are reported with a generic message; their
//! cause goes to the log.

use thiserror::Error;

/// Result type alias for solve operations
pub type Result<T> = std::result::Result<T, SolveError>;

/// Generic message returned to callers for anything that is not their fault.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Rejections raised before any solver work starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The TSP instance has no cities at all
    #[error("At least one city is required")]
    NoCities,

    /// A city has no row in the distance mapping
    #[error("Missing distance mapping for city {0}")]
    MissingCity(String),

    /// A row lacks the entry towards another city of the instance
    #[error("Missing distance between {from} and {to}")]
    MissingDistance { from: String, to: String },

    /// Knapsack capacity below zero
    #[error("Maximum weight cannot be negative")]
    NegativeCapacity,

    /// Knapsack capacity is NaN or infinite
    #[error("Maximum weight must be a finite number")]
    NonFiniteCapacity,

    /// An item weight is negative, NaN or infinite
    #[error("Item {0} must have a finite, non-negative weight")]
    InvalidItemWeight(String),
}

/// Failures of the result cache collaborator.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backing store could not be reached or is in a broken state
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    /// A key or a cached payload could not be (de)serialized
    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Top-level error of a solve call.
#[derive(Debug, Error)]
pub enum SolveError {
    /// Caller-fixable input problem
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A broken invariant inside a solver
    #[error("Internal solver error: {0}")]
    Internal(String),

    /// Cache failure surfaced under the `Fail` policy
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl SolveError {
    pub fn internal(msg: impl Into<String>) -> Self {
        SolveError::Internal(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, SolveError::Validation(_))
    }

    /// Message safe to hand back to a caller.
    pub fn public_message(&self) -> String {
        match self {
            SolveError::Validation(e) => e.to_string(),
            SolveError::Internal(_) | SolveError::Cache(_) => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }
}

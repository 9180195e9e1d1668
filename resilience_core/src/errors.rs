//! # Error Types
//!
//! Structured error types for resilience_core. Every variant carries enough
//! context to tell which table, quantity or sample caused the failure, and
//! all of them serialize to JSON so batch reports can embed them verbatim.
//!
//! ## Example
//!
//! ```rust
//! use resilience_core::errors::{ResilienceError, ResilienceResult};
//!
//! fn validate_drift(idr: f64) -> ResilienceResult<()> {
//!     if idr.is_nan() {
//!         return Err(ResilienceError::numeric_domain(
//!             "idr",
//!             idr,
//!             "Drift demand is NaN",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for resilience_core operations
pub type ResilienceResult<T> = Result<T, ResilienceError>;

/// Structured error type for hinge derivation, loss simulation and study I/O.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum ResilienceError {
    /// An input value is invalid (out of range, wrong length, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A section label or component id has no entry in its table
    #[error("No entry '{key}' in {table}")]
    DataLookup { table: String, key: String },

    /// A numeric evaluation received a value outside its domain
    #[error("Numeric domain error for '{quantity}' = {value}: {reason}")]
    NumericDomain {
        quantity: String,
        value: String,
        reason: String,
    },

    /// The external time-history solver failed for one sample
    #[error("Solver did not converge: {reason}")]
    SolverNonConvergence { reason: String },

    /// Another external collaborator (e.g. the ground-motion generator) failed
    #[error("{collaborator} failed: {reason}")]
    CollaboratorFailed {
        collaborator: String,
        reason: String,
    },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ResilienceError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        ResilienceError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a DataLookup error
    pub fn data_lookup(table: impl Into<String>, key: impl Into<String>) -> Self {
        ResilienceError::DataLookup {
            table: table.into(),
            key: key.into(),
        }
    }

    /// Create a NumericDomain error
    pub fn numeric_domain(quantity: impl Into<String>, value: f64, reason: impl Into<String>) -> Self {
        ResilienceError::NumericDomain {
            quantity: quantity.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a SolverNonConvergence error
    pub fn solver_non_convergence(reason: impl Into<String>) -> Self {
        ResilienceError::SolverNonConvergence {
            reason: reason.into(),
        }
    }

    /// Create a CollaboratorFailed error
    pub fn collaborator_failed(collaborator: impl Into<String>, reason: impl Into<String>) -> Self {
        ResilienceError::CollaboratorFailed {
            collaborator: collaborator.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        ResilienceError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(path: impl Into<String>, locked_by: impl Into<String>, locked_at: impl Into<String>) -> Self {
        ResilienceError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl Into<String>) -> Self {
        ResilienceError::SerializationError {
            reason: reason.into(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ResilienceError::FileLocked { .. })
    }

    /// Errors that invalidate a single sample and must become a sentinel
    /// record instead of aborting the batch.
    pub fn is_sample_fatal(&self) -> bool {
        matches!(
            self,
            ResilienceError::SolverNonConvergence { .. } | ResilienceError::CollaboratorFailed { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ResilienceError::InvalidInput { .. } => "INVALID_INPUT",
            ResilienceError::DataLookup { .. } => "DATA_LOOKUP",
            ResilienceError::NumericDomain { .. } => "NUMERIC_DOMAIN",
            ResilienceError::SolverNonConvergence { .. } => "SOLVER_NON_CONVERGENCE",
            ResilienceError::CollaboratorFailed { .. } => "COLLABORATOR_FAILED",
            ResilienceError::FileError { .. } => "FILE_ERROR",
            ResilienceError::FileLocked { .. } => "FILE_LOCKED",
            ResilienceError::SerializationError { .. } => "SERIALIZATION_ERROR",
            ResilienceError::VersionMismatch { .. } => "VERSION_MISMATCH",
            ResilienceError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

//! Custom error types for grant-ledger
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

use crate::models::ExpenditureId;

/// The main error type for grant-ledger operations
#[derive(Error, Debug)]
pub enum GrantError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for draft entities
    #[error("Validation error: {0}")]
    Validation(String),

    /// Required fields missing on a draft entity
    #[error("Validation error: missing required field(s): {}", fields.join(", "))]
    MissingFields { fields: Vec<&'static str> },

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Durable write failed; in-memory state was not advanced
    #[error("Storage error during {operation}: {reason}")]
    Storage {
        operation: &'static str,
        reason: String,
    },

    /// The primary expenditure was persisted but the derived indirect-cost
    /// entry was not. The caller must surface the partial result.
    #[error("Indirect-cost entry failed after primary expenditure {primary} was saved: {reason}")]
    IndirectCostFailed {
        primary: ExpenditureId,
        reason: String,
    },

    /// A platform or language-model call failed; recoverable by manual entry
    #[error("External service error: {0}")]
    ExternalService(String),

    /// The platform layer is absent (e.g. running in a plain browser context)
    #[error("Feature unavailable: {0}")]
    FeatureUnavailable(&'static str),

    /// Snapshot import errors
    #[error("Import error: {0}")]
    Import(String),

    /// Snapshot/report export errors
    #[error("Export error: {0}")]
    Export(String),
}

impl GrantError {
    /// Create a "not found" error for grants
    pub fn grant_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Grant",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for sub-recipients
    pub fn sub_recipient_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "SubRecipient",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for deliverables
    pub fn deliverable_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Deliverable",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for budget categories
    pub fn category_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "BudgetCategory",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for expenditures
    pub fn expenditure_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Expenditure",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for email templates
    pub fn template_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "EmailTemplate",
            identifier: identifier.into(),
        }
    }

    /// Create a storage error naming the failed operation
    pub fn storage(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Storage {
            operation,
            reason: reason.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::MissingFields { .. })
    }

    /// Check if this error is recoverable by falling back to manual entry
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::ExternalService(_) | Self::FeatureUnavailable(_))
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for GrantError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for GrantError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for grant-ledger operations
pub type GrantResult<T> = Result<T, GrantError>;

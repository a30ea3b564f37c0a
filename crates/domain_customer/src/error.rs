//! Customer domain errors
//!
//! Every aggregate-mutating path reports failures through this enum so the
//! HTTP layer can map each kind to a single status code.

use thiserror::Error;

/// Errors that can occur in the customer domain
#[derive(Debug, Error)]
pub enum CustomerError {
    /// A required field is missing or malformed
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A uniqueness invariant would be violated (NIC, mobile number,
    /// country code, city per country)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// No customer matches the given identifier or NIC
    #[error("Not found: {0}")]
    NotFound(String),

    /// A spreadsheet could not be read or written
    #[error("Workbook error: {0}")]
    Workbook(String),

    /// The persistence layer failed for a reason unrelated to domain rules
    #[error("Storage error: {0}")]
    Storage(String),
}

impl CustomerError {
    /// Creates a Validation error naming the offending field
    pub fn validation(message: impl Into<String>) -> Self {
        CustomerError::Validation(message.into())
    }

    /// Creates a Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        CustomerError::Conflict(message.into())
    }

    /// Creates a NotFound error from any identifier type
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        CustomerError::NotFound(format!("{} with id '{}' not found", entity, id))
    }

    /// Creates a Workbook error
    pub fn workbook(message: impl std::fmt::Display) -> Self {
        CustomerError::Workbook(message.to_string())
    }

    /// Returns true for row-level failures bulk import downgrades to a skip
    pub fn is_row_level(&self) -> bool {
        matches!(
            self,
            CustomerError::Validation(_) | CustomerError::Conflict(_)
        )
    }
}

// ==============================================================================
// error.rs - Engine Error Types
// ==============================================================================
// Description: Validation and knowledge base errors for the recommendation engine
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// ==============================================================================

use thiserror::Error;

/// Malformed input detected before any analyzer runs.
///
/// `field` is a dotted path into the aggregate input document
/// (e.g. `lifestyle_data.exercise`, `genetic_data.BRCA1.variant`).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid input at '{field}': expected {expected}")]
    InvalidType { field: String, expected: &'static str },

    #[error("Invalid input at '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Too many entries at '{field}': {count} (max: {max})")]
    TooManyEntries {
        field: String,
        count: usize,
        max: usize,
    },
}

impl ValidationError {
    /// Path of the offending field
    pub fn field(&self) -> &str {
        match self {
            ValidationError::InvalidType { field, .. }
            | ValidationError::InvalidValue { field, .. }
            | ValidationError::TooManyEntries { field, .. } => field,
        }
    }

    pub(crate) fn invalid_type(field: impl Into<String>, expected: &'static str) -> Self {
        ValidationError::InvalidType {
            field: field.into(),
            expected,
        }
    }

    pub(crate) fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Errors that can occur while loading marker knowledge base extensions
#[derive(Error, Debug)]
pub enum KnowledgeBaseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid risk factor for marker '{gene}': {value}")]
    InvalidRiskFactor { gene: String, value: f64 },

    #[error("Marker '{gene}' has no associated conditions")]
    MissingConditions { gene: String },

    #[error("Marker row has an empty gene identifier")]
    EmptyGene,
}

/// Top-level library error
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    KnowledgeBase(#[from] KnowledgeBaseError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_names_field() {
        let err = ValidationError::invalid_type("lifestyle_data.exercise", "a number");
        assert_eq!(err.field(), "lifestyle_data.exercise");
        assert_eq!(
            err.to_string(),
            "Invalid input at 'lifestyle_data.exercise': expected a number"
        );
    }

    #[test]
    fn test_too_many_entries_message() {
        let err = ValidationError::TooManyEntries {
            field: "genetic_data".to_string(),
            count: 2001,
            max: 1000,
        };
        assert_eq!(err.field(), "genetic_data");
        assert!(err.to_string().contains("2001"));
    }
}

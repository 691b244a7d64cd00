//! Per-request estimation errors

use thiserror::Error;

/// Failure of a single price estimate.
///
/// Every variant is terminal for the request that produced it; the caller may
/// correct the input and resubmit.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimateError {
    #[error("invalid input for {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("unknown category {value:?} for column {column:?}")]
    UnknownCategory { column: String, value: String },

    #[error("feature schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("model inference failed: {0}")]
    Model(String),
}

impl EstimateError {
    /// Short label used for metrics and machine-readable output
    pub fn kind(&self) -> &'static str {
        match self {
            EstimateError::InvalidInput { .. } => "invalid_input",
            EstimateError::UnknownCategory { .. } => "unknown_category",
            EstimateError::SchemaMismatch(_) => "schema_mismatch",
            EstimateError::Model(_) => "model",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = EstimateError::UnknownCategory {
            column: "fuel".to_string(),
            value: "Hybrid".to_string(),
        };
        assert_eq!(
            err.to_string(),
            r#"unknown category "Hybrid" for column "fuel""#
        );
        assert_eq!(err.kind(), "unknown_category");

        let err = EstimateError::InvalidInput {
            field: "seats",
            reason: "must be at least 1".to_string(),
        };
        assert_eq!(err.to_string(), "invalid input for seats: must be at least 1");
    }
}

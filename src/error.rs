use crate::schema::SchemaError;

/// Faults surfaced to the presentation layer for a single trigger.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum PredictError {
    /// The model artifact was missing or failed to load at startup.
    #[error("Model file not found.")]
    ModelUnavailable,
    /// Anything that went wrong while building or scoring the record.
    #[error("Prediction failed: {0}")]
    ScoringFailure(String),
}

impl From<SchemaError> for PredictError {
    fn from(e: SchemaError) -> Self {
        PredictError::ScoringFailure(e.to_string())
    }
}

impl From<anyhow::Error> for PredictError {
    fn from(e: anyhow::Error) -> Self {
        // alternate form keeps the context chain on one line
        PredictError::ScoringFailure(format!("{e:#}"))
    }
}

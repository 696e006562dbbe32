use thiserror::Error;

#[derive(Debug, Error)]
pub enum FinCalcError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Numeric overflow in {context}")]
    Overflow { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Export error: {0}")]
    Export(String),
}

impl FinCalcError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        FinCalcError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for FinCalcError {
    fn from(e: serde_json::Error) -> Self {
        FinCalcError::SerializationError(e.to_string())
    }
}

impl From<csv::Error> for FinCalcError {
    fn from(e: csv::Error) -> Self {
        FinCalcError::Export(e.to_string())
    }
}

impl From<std::io::Error> for FinCalcError {
    fn from(e: std::io::Error) -> Self {
        FinCalcError::Export(e.to_string())
    }
}

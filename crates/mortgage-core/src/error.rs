use thiserror::Error;

#[derive(Debug, Error)]
pub enum MortgageError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Export error: {0}")]
    Export(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for MortgageError {
    fn from(e: serde_json::Error) -> Self {
        MortgageError::SerializationError(e.to_string())
    }
}

impl From<std::io::Error> for MortgageError {
    fn from(e: std::io::Error) -> Self {
        MortgageError::Export(e.to_string())
    }
}

#[cfg(feature = "export")]
impl From<csv::Error> for MortgageError {
    fn from(e: csv::Error) -> Self {
        MortgageError::Export(e.to_string())
    }
}

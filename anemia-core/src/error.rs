use thiserror::Error;

/// Failure to turn caller text into a field edit or a stage
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseEditError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Unknown stage: {0}")]
    UnknownStage(String),

    #[error("Invalid value {value:?} for {field}: expected {expected}")]
    InvalidValue {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
}

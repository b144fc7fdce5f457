use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("Invalid request document: {0}")]
    InvalidDocument(String),

    // A reserved envelope field showed up inside `request.contents`. This is
    // a scoping regression in the pipeline, never a client mistake.
    #[error("Scope violation: reserved field '{field}' found at {path}")]
    ScopeViolation { path: String, field: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl TranslateError {
    pub fn is_internal(&self) -> bool {
        matches!(self, TranslateError::ScopeViolation { .. })
    }
}

impl Serialize for TranslateError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}

pub type TranslateResult<T> = Result<T, TranslateError>;

use thiserror::Error;

/// Failures raised by a document store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("database operation failed: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("document encoding failed: {0}")]
    Encoding(#[from] mongodb::bson::ser::Error),

    #[error("document decoding failed: {0}")]
    Decoding(#[from] mongodb::bson::de::Error),

    #[error("document serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(reason.into())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

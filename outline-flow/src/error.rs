use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutlineError {
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Outline source error: {0}")]
    Source(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[cfg(feature = "http")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, OutlineError>;

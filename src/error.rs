//! Error types for the tactic matrix.

use thiserror::Error;

/// Everything that can go wrong while reading or appending to the matrix.
#[derive(Error, Debug)]
pub enum MatrixError {
    /// A submitted field is missing or not acceptable.
    #[error("{0}")]
    Validation(String),

    /// No row carries the requested identifier.
    #[error("{0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MatrixError {
    /// True for errors caused by the request rather than by storage.
    pub fn is_client_error(&self) -> bool {
        matches!(self, MatrixError::Validation(_) | MatrixError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, MatrixError>;

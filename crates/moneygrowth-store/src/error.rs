//! Error types for moneygrowth-store

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Result type with StoreError
pub type StoreResult<T> = Result<T, StoreError>;

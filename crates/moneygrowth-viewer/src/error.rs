//! Viewer errors

use moneygrowth_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("Terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Loading rows failed: {0}")]
    Core(#[from] CoreError),
}

pub type ViewerResult<T> = Result<T, ViewerError>;

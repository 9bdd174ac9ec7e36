//! Download error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("Download not found: {0}")]
    NotFound(String),

    #[error("Download already finished: {0}")]
    AlreadyFinished(String),

    #[error("Storage error: {0}")]
    Storage(#[from] wren_storage::StorageError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

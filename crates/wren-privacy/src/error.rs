//! Privacy error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrivacyError {
    #[error("Storage error: {0}")]
    Storage(#[from] wren_storage::StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid exception: {0}")]
    InvalidException(String),
}

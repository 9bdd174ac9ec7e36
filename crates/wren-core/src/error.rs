//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] wren_storage::StorageError),

    #[error("Privacy error: {0}")]
    Privacy(#[from] wren_privacy::PrivacyError),

    #[error("Navigation error: {0}")]
    Navigation(#[from] wren_navigation::NavigationError),

    #[error("View error: {0}")]
    View(#[from] wren_view::ViewError),

    #[error("Download error: {0}")]
    Download(#[from] wren_download::DownloadError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Credential lookup failed: {0}")]
    CredentialLookup(String),
}

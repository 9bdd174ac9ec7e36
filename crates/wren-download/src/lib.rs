//! Wren Download Manager
//!
//! Downloads are handed off by the engine; the transfer itself stays with
//! the engine. This crate records them:
//! - Target path inside the download directory
//! - MIME-based risk level
//! - Final state (completed, failed, cancelled)

mod download;
mod error;
mod manager;

pub use download::{Download, DownloadHandle, DownloadState, RiskLevel};
pub use error::DownloadError;
pub use manager::DownloadManager;

pub type Result<T> = std::result::Result<T, DownloadError>;

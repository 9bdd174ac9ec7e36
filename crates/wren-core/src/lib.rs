//! Wren Core
//!
//! Adapter between a browser engine and the shell's decision crates:
//! - `Engine` / `EngineEvent`: the engine boundary
//! - `ViewController`: per-view event handling and effect application
//! - Offline retry timer, credential lookup, reader mode, preview cache
//! - `Shell`: builds everything from `Config`

mod art;
mod config;
mod controller;
mod engine;
mod error;
mod events;
mod forms;
mod network;
mod reader;
mod recheck;
mod services;
mod shell;

pub use art::{ArtCache, PREVIEW_SUFFIXES};
pub use config::Config;
pub use controller::ViewController;
pub use engine::{Engine, EngineEvent, EventResponse, LoadEvent, PolicyResponse};
pub use error::CoreError;
pub use events::{ShellEvent, ViewCommand};
pub use forms::{CredentialSource, Credentials, FormSubmission, NoCredentials};
pub use network::SharedNetworkMonitor;
pub use reader::{extract_readable, Readable, ReaderChange, ReaderOverlay};
pub use recheck::NetworkRecheck;
pub use services::ViewServices;
pub use shell::{Shell, ShellChannels};

// Re-export the decision crates
pub use wren_download::{Download, DownloadError, DownloadHandle, DownloadManager, DownloadState, RiskLevel};
pub use wren_navigation::{
    BlockDecision, LoadTarget, MouseButton, NavigationError, NavigationRequest, NavigationType,
};
pub use wren_privacy::{
    Certificate, ExceptionRegistry, Exceptions, PermissionKind, PermissionState, ScriptCatalog,
    TrustStore,
};
pub use wren_storage::{keys, Database, SettingsSource, SettingsStore, StorageError};
pub use wren_view::{
    CertificateError, ErrorPageTemplates, InputSource, LoadState, NetworkMonitor, SystemFonts,
    ViewError, ViewState,
};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}

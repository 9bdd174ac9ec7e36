//! Wren Storage Layer
//!
//! SQLite-backed persistence for shell preferences, ad-block exceptions
//! and handed-off downloads. The settings store doubles as the read-only
//! settings source consulted by the navigation and load decisions.

mod database;
mod error;
mod migrations;
mod settings;

pub use database::Database;
pub use error::StorageError;
pub use settings::{keys, SettingsSource, SettingsStore};

pub type Result<T> = std::result::Result<T, StorageError>;

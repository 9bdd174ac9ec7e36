//! Blocking exceptions
//!
//! An exception is either a bare netloc (`example.com`, `localhost:8080`)
//! or a netloc followed by a path (`example.com/videos`). Lookups are exact:
//! the caller asks once for the netloc and once for netloc+path.

use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

use wren_storage::Database;

use crate::error::PrivacyError;
use crate::Result;

/// Answers "is this host/path exempt from blocking policy".
pub trait ExceptionRegistry: Send + Sync {
    fn is_exception(&self, value: &str) -> bool;
}

/// Host plus optional port, the way the address bar shows it.
pub fn netloc(url: &Url) -> String {
    let host = url.host_str().unwrap_or("");
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

/// The `(host, host+path)` pair checked for a URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionQuery {
    pub host: String,
    pub host_path: String,
}

impl ExceptionQuery {
    pub fn from_uri(uri: &str) -> Self {
        match Url::parse(uri) {
            Ok(url) => {
                let host = netloc(&url);
                let host_path = format!("{}{}", host, url.path());
                Self { host, host_path }
            }
            Err(_) => Self {
                host: String::new(),
                host_path: String::new(),
            },
        }
    }

    /// True if either the host or host+path is registered.
    /// URIs without a host are never exempt.
    pub fn is_exempt(&self, registry: &dyn ExceptionRegistry) -> bool {
        if self.host.is_empty() {
            return false;
        }
        registry.is_exception(&self.host) || registry.is_exception(&self.host_path)
    }
}

/// Database-backed exception registry
pub struct Exceptions {
    entries: Arc<RwLock<HashSet<String>>>,
    db: Database,
}

impl Exceptions {
    /// Load registered exceptions from the database
    pub fn load(db: Database) -> Result<Self> {
        let entries = db.with_connection(|conn| {
            let mut stmt = conn.prepare("SELECT value FROM adblock_exceptions")?;
            let mut values = HashSet::new();
            for row in stmt.query_map([], |row| row.get::<_, String>(0))? {
                match row {
                    Ok(value) => {
                        values.insert(value);
                    }
                    Err(e) => tracing::warn!(error = %e, "Skipping unreadable blocking exception"),
                }
            }
            Ok(values)
        })?;

        tracing::debug!(count = entries.len(), "Loaded blocking exceptions");

        Ok(Self {
            entries: Arc::new(RwLock::new(entries)),
            db,
        })
    }

    pub fn add(&self, value: &str) -> Result<()> {
        let value = normalize(value)?;

        self.db.with_connection(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO adblock_exceptions (value, created_at) VALUES (?1, ?2)",
                rusqlite::params![value, Utc::now().to_rfc3339()],
            )?;
            Ok(())
        })?;

        tracing::info!(exception = %value, "Added blocking exception");
        self.entries.write().insert(value);

        Ok(())
    }

    pub fn remove(&self, value: &str) -> Result<()> {
        let value = normalize(value)?;

        self.db.with_connection(|conn| {
            conn.execute("DELETE FROM adblock_exceptions WHERE value = ?1", [&value])?;
            Ok(())
        })?;

        tracing::info!(exception = %value, "Removed blocking exception");
        self.entries.write().remove(&value);

        Ok(())
    }

    pub fn list(&self) -> Vec<String> {
        let mut values: Vec<String> = self.entries.read().iter().cloned().collect();
        values.sort();
        values
    }
}

fn normalize(value: &str) -> Result<String> {
    let value = value.trim().to_lowercase();
    if value.is_empty() || value.contains(char::is_whitespace) {
        return Err(PrivacyError::InvalidException(value));
    }
    Ok(value)
}

impl ExceptionRegistry for Exceptions {
    fn is_exception(&self, value: &str) -> bool {
        self.entries.read().contains(&value.to_lowercase())
    }
}

impl Clone for Exceptions {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            db: self.db.clone(),
        }
    }
}

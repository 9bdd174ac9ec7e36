//! Settings source
//!
//! Preferences are stored as strings in the `settings` table. Reads never
//! fail from the caller's point of view: a missing, unreadable or malformed
//! value falls back to the built-in default for that key.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::database::Database;
use crate::error::StorageError;
use crate::Result;

/// Preference keys understood by the shell.
pub mod keys {
    pub const POPUP_BLOCK: &str = "popupblock";
    pub const IMAGE_BLOCK: &str = "imgblock";
    pub const ADBLOCK: &str = "adblock";
    pub const DEVELOPER_EXTRAS: &str = "developer-extras";
    pub const ENABLE_PLUGINS: &str = "enable-plugins";
    pub const MIN_FONT_SIZE: &str = "min-font-size";
    pub const USE_SYSTEM_FONTS: &str = "use-system-fonts";
    pub const FONT_MONOSPACE: &str = "font-monospace";
    pub const FONT_SANS_SERIF: &str = "font-sans-serif";
    pub const FONT_SERIF: &str = "font-serif";
    /// JSON object mapping a host to its zoom level in percent
    pub const ZOOM_LEVELS: &str = "zoom-levels";
}

fn default_value(key: &str) -> Option<&'static str> {
    match key {
        keys::POPUP_BLOCK => Some("true"),
        keys::IMAGE_BLOCK => Some("false"),
        keys::ADBLOCK => Some("true"),
        keys::DEVELOPER_EXTRAS => Some("false"),
        keys::ENABLE_PLUGINS => Some("false"),
        keys::MIN_FONT_SIZE => Some("0"),
        keys::USE_SYSTEM_FONTS => Some("true"),
        keys::FONT_MONOSPACE => Some("Monospace"),
        keys::FONT_SANS_SERIF => Some("Sans"),
        keys::FONT_SERIF => Some("Serif"),
        keys::ZOOM_LEVELS => Some("{}"),
        _ => None,
    }
}

/// Read-only view of the shell preferences.
pub trait SettingsSource: Send + Sync {
    fn get_bool(&self, key: &str) -> bool;

    fn get_int(&self, key: &str) -> i64;

    fn get_string(&self, key: &str) -> String;

    /// Stored zoom level for a host, in percent
    fn zoom_level(&self, host: &str) -> Option<u32>;
}

/// Parsed `zoom-levels` map together with the JSON it came from
#[derive(Debug, Clone)]
struct ZoomCache {
    json: String,
    levels: HashMap<String, u32>,
}

/// Database-backed settings store.
pub struct SettingsStore {
    db: Database,
    /// Reparsed whenever the stored JSON differs, whoever wrote it
    zoom_cache: Arc<RwLock<Option<ZoomCache>>>,
}

impl SettingsStore {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            zoom_cache: Arc::new(RwLock::new(None)),
        }
    }

    pub fn set_bool(&self, key: &str, value: bool) -> Result<()> {
        self.db
            .set_setting(key, if value { "true" } else { "false" })
    }

    pub fn set_int(&self, key: &str, value: i64) -> Result<()> {
        self.db.set_setting(key, &value.to_string())
    }

    pub fn set_string(&self, key: &str, value: &str) -> Result<()> {
        self.db.set_setting(key, value)
    }

    /// Store a zoom level (percent) for a host
    pub fn set_zoom_level(&self, host: &str, percent: u32) -> Result<()> {
        let mut levels = self.zoom_levels()?;
        levels.insert(host.to_string(), percent);
        self.save_zoom_levels(levels)
    }

    /// Forget the zoom level of a host
    pub fn reset_zoom_level(&self, host: &str) -> Result<()> {
        let mut levels = self.zoom_levels()?;
        if levels.remove(host).is_none() {
            return Ok(());
        }
        self.save_zoom_levels(levels)
    }

    /// All stored zoom levels
    pub fn zoom_levels(&self) -> Result<HashMap<String, u32>> {
        let json = self.db.get_setting(keys::ZOOM_LEVELS)?.unwrap_or_default();

        if let Some(cache) = self.zoom_cache.read().as_ref() {
            if cache.json == json {
                return Ok(cache.levels.clone());
            }
        }

        let levels: HashMap<String, u32> = if json.trim().is_empty() {
            HashMap::new()
        } else {
            serde_json::from_str(&json)?
        };
        *self.zoom_cache.write() = Some(ZoomCache {
            json,
            levels: levels.clone(),
        });

        Ok(levels)
    }

    fn save_zoom_levels(&self, levels: HashMap<String, u32>) -> Result<()> {
        let json = serde_json::to_string(&levels)?;
        self.db.set_setting(keys::ZOOM_LEVELS, &json)?;
        *self.zoom_cache.write() = Some(ZoomCache { json, levels });
        Ok(())
    }

    fn raw(&self, key: &str) -> Option<String> {
        match self.db.get_setting(key) {
            Ok(Some(value)) => Some(value),
            Ok(None) => default_value(key).map(str::to_string),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to read setting, using default");
                default_value(key).map(str::to_string)
            }
        }
    }

    fn parse_bool(key: &str, value: &str) -> Result<bool> {
        match value.trim() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            other => Err(StorageError::InvalidValue {
                key: key.to_string(),
                value: other.to_string(),
            }),
        }
    }
}

impl SettingsSource for SettingsStore {
    fn get_bool(&self, key: &str) -> bool {
        let Some(value) = self.raw(key) else {
            return false;
        };

        Self::parse_bool(key, &value).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Malformed boolean setting");
            default_value(key)
                .and_then(|d| Self::parse_bool(key, d).ok())
                .unwrap_or(false)
        })
    }

    fn get_int(&self, key: &str) -> i64 {
        self.raw(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }

    fn get_string(&self, key: &str) -> String {
        self.raw(key).unwrap_or_default()
    }

    fn zoom_level(&self, host: &str) -> Option<u32> {
        match self.zoom_levels() {
            Ok(levels) => levels.get(host).copied(),
            Err(e) => {
                tracing::warn!(host = %host, error = %e, "Failed to read zoom levels");
                None
            }
        }
    }
}

impl Clone for SettingsStore {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            zoom_cache: Arc::clone(&self.zoom_cache),
        }
    }
}

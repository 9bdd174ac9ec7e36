//! Per-host ad-block scripts
//!
//! Scripts are named `adblock_<host>.js`. A page at `www.example.com` first
//! looks for `adblock_www.example.com.js`, then for the host with its last
//! label removed (`adblock_www.example.js`). Only one level is stripped.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::Result;

const PREFIX: &str = "adblock_";
const SUFFIX: &str = ".js";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    /// Resource name, e.g. `adblock_example.com.js`
    pub name: String,
    pub source: String,
}

#[derive(Debug, Clone, Default)]
pub struct ScriptCatalog {
    /// Host -> script
    scripts: HashMap<String, Script>,
}

/// Drop the last dot-separated label: `a.b.c` -> `a.b`, `localhost` -> ``.
pub fn strip_last_label(host: &str) -> &str {
    match host.rfind('.') {
        Some(idx) => &host[..idx],
        None => "",
    }
}

impl ScriptCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `adblock_<host>.js` file found in `dir`.
    ///
    /// A missing directory yields an empty catalog.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let mut catalog = Self::new();

        if !dir.is_dir() {
            tracing::warn!(dir = %dir.display(), "Ad-block script directory not found");
            return Ok(catalog);
        }

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(host) = file_name
                .strip_prefix(PREFIX)
                .and_then(|rest| rest.strip_suffix(SUFFIX))
            else {
                continue;
            };

            match fs::read_to_string(&path) {
                Ok(source) => catalog.insert(host, source),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to read ad-block script");
                }
            }
        }

        tracing::info!(dir = %dir.display(), count = catalog.len(), "Loaded ad-block scripts");

        Ok(catalog)
    }

    pub fn insert(&mut self, host: &str, source: String) {
        let host = host.to_lowercase();
        let name = format!("{}{}{}", PREFIX, host, SUFFIX);
        self.scripts.insert(host, Script { name, source });
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    /// Find the script for a page netloc: exact match first, then the netloc
    /// with one label stripped.
    pub fn lookup(&self, netloc: &str) -> Option<&Script> {
        let netloc = netloc.to_lowercase();
        if netloc.is_empty() {
            return None;
        }

        if let Some(script) = self.scripts.get(&netloc) {
            return Some(script);
        }

        let stripped = strip_last_label(&netloc);
        if stripped.is_empty() {
            return None;
        }
        self.scripts.get(stripped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_last_label() {
        assert_eq!(strip_last_label("www.example.com"), "www.example");
        assert_eq!(strip_last_label("example.com"), "example");
        assert_eq!(strip_last_label("localhost"), "");
    }

    #[test]
    fn test_lookup_exact_then_stripped() {
        let mut catalog = ScriptCatalog::new();
        catalog.insert("www.example.com", "exact()".to_string());
        catalog.insert("news.example", "stripped()".to_string());

        let script = catalog.lookup("www.example.com").unwrap();
        assert_eq!(script.name, "adblock_www.example.com.js");
        assert_eq!(script.source, "exact()");

        // news.example.org -> news.example
        assert_eq!(catalog.lookup("news.example.org").unwrap().source, "stripped()");

        // Only one level is stripped
        assert!(catalog.lookup("a.news.example.org").is_none());
        assert!(catalog.lookup("").is_none());
    }

    #[test]
    fn test_from_dir() {
        let dir = std::env::temp_dir().join(format!("wren-scripts-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("adblock_video.site.js"), "hide()").unwrap();
        fs::write(dir.join("readme.txt"), "ignored").unwrap();

        let catalog = ScriptCatalog::from_dir(&dir).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.lookup("video.site").unwrap().source, "hide()");

        fs::remove_dir_all(&dir).unwrap();

        let empty = ScriptCatalog::from_dir(dir.join("missing")).unwrap();
        assert!(empty.is_empty());
    }
}

//! Page preview cache
//!
//! Thumbnails are stored as `<sha256(uri)>_<suffix>.png` under the cache
//! directory. `preview` images back the tab switcher, `start` images the
//! start page.

use sha2::{Digest, Sha256};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::Result;

pub const PREVIEW_SUFFIXES: [&str; 2] = ["preview", "start"];

#[derive(Debug, Clone)]
pub struct ArtCache {
    dir: PathBuf,
}

impl ArtCache {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, uri: &str, suffix: &str) -> PathBuf {
        let digest = Sha256::digest(uri.as_bytes());
        self.dir.join(format!("{:x}_{}.png", digest, suffix))
    }

    pub fn exists(&self, uri: &str, suffix: &str) -> bool {
        self.path(uri, suffix).is_file()
    }

    pub fn save(&self, uri: &str, suffix: &str, png: &[u8]) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path(uri, suffix);
        fs::write(&path, png)?;
        Ok(path)
    }

    /// Drop every cached image of `uri`. Missing files are not an error.
    pub fn delete_previews(&self, uri: &str) -> Result<()> {
        for suffix in PREVIEW_SUFFIXES {
            match fs::remove_file(self.path(uri, suffix)) {
                Ok(()) => tracing::debug!(uri = %uri, suffix, "Deleted cached preview"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

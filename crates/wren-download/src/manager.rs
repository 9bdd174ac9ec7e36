//! Download manager

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use url::Url;

use wren_storage::Database;

use crate::download::{Download, DownloadHandle, DownloadState};
use crate::error::DownloadError;
use crate::Result;

pub struct DownloadManager {
    /// In-memory download cache
    downloads: Arc<RwLock<HashMap<String, Download>>>,
    /// Database for persistence
    db: Database,
    download_dir: PathBuf,
}

impl DownloadManager {
    pub fn new(db: Database, download_dir: PathBuf) -> Self {
        Self {
            downloads: Arc::new(RwLock::new(HashMap::new())),
            db,
            download_dir,
        }
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Record a download handed off by the engine.
    pub fn add(&self, handle: DownloadHandle) -> Result<Download> {
        let url = Url::parse(&handle.uri).map_err(|_| DownloadError::InvalidUrl(handle.uri.clone()))?;

        let proposed = handle
            .suggested_file_name
            .clone()
            .or_else(|| {
                url.path_segments()
                    .and_then(|mut segments| segments.next_back())
                    .map(|s| s.to_string())
            })
            .unwrap_or_default();
        let file_name = self.unique_file_name(&sanitize_file_name(&proposed));
        let file_path = self.download_dir.join(&file_name);

        let download = Download::new(
            handle.uri,
            file_path.to_string_lossy().to_string(),
            file_name,
            handle.mime_type,
        );

        self.save_download(&download)?;
        self.downloads
            .write()
            .insert(download.id.clone(), download.clone());

        tracing::info!(
            download_id = %download.id,
            url = %download.url,
            risk = ?download.risk_level(),
            "Download started"
        );

        Ok(download)
    }

    /// Get a download by ID
    pub fn get(&self, id: &str) -> Result<Download> {
        self.downloads
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| DownloadError::NotFound(id.to_string()))
    }

    /// All downloads, newest first
    pub fn list(&self) -> Vec<Download> {
        let mut downloads: Vec<Download> = self.downloads.read().values().cloned().collect();
        downloads.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        downloads
    }

    pub fn active(&self) -> Vec<Download> {
        self.list()
            .into_iter()
            .filter(|d| d.state == DownloadState::Started)
            .collect()
    }

    pub fn complete(&self, id: &str) -> Result<Download> {
        let download = self.finish(id, DownloadState::Completed)?;
        tracing::info!(download_id = %id, path = %download.file_path, "Download completed");
        Ok(download)
    }

    pub fn fail(&self, id: &str, reason: &str) -> Result<Download> {
        let download = self.finish(id, DownloadState::Failed)?;
        tracing::warn!(download_id = %id, reason = %reason, "Download failed");
        Ok(download)
    }

    pub fn cancel(&self, id: &str) -> Result<Download> {
        let download = self.finish(id, DownloadState::Cancelled)?;
        tracing::info!(download_id = %id, "Download cancelled");
        Ok(download)
    }

    fn finish(&self, id: &str, state: DownloadState) -> Result<Download> {
        let mut download = self.get(id)?;

        if download.state.is_finished() {
            return Err(DownloadError::AlreadyFinished(id.to_string()));
        }

        download.state = state;
        download.finished_at = Some(Utc::now());

        self.save_download(&download)?;
        self.downloads
            .write()
            .insert(id.to_string(), download.clone());

        Ok(download)
    }

    /// Load downloads from database
    pub fn load(&self) -> Result<()> {
        let downloads = self.db.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, url, file_path, file_name, mime_type, state, created_at, finished_at
                 FROM downloads",
            )?;

            let downloads: Vec<Download> = stmt
                .query_map([], |row| {
                    let state_str: String = row.get(5)?;
                    // Transfers do not survive a restart
                    let state: DownloadState = state_str.parse().unwrap_or(DownloadState::Failed);

                    let created_str: String = row.get(6)?;
                    let finished_str: Option<String> = row.get(7)?;

                    let created_at = DateTime::parse_from_rfc3339(&created_str)
                        .map(|dt| dt.with_timezone(&Utc))
                        .unwrap_or_else(|_| Utc::now());
                    let finished_at = finished_str.and_then(|s| {
                        DateTime::parse_from_rfc3339(&s)
                            .map(|dt| dt.with_timezone(&Utc))
                            .ok()
                    });

                    Ok(Download {
                        id: row.get(0)?,
                        url: row.get(1)?,
                        file_path: row.get(2)?,
                        file_name: row.get(3)?,
                        mime_type: row.get(4)?,
                        state,
                        created_at,
                        finished_at,
                    })
                })?
                .filter_map(|r| r.ok())
                .collect();

            Ok(downloads)
        })?;

        let count = downloads.len();
        let mut cache = self.downloads.write();
        for download in downloads {
            cache.insert(download.id.clone(), download);
        }

        tracing::debug!(count, "Loaded downloads");
        Ok(())
    }

    fn save_download(&self, download: &Download) -> Result<()> {
        Ok(self.db.with_connection(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO downloads
                 (id, url, file_path, file_name, mime_type, state, created_at, finished_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    download.id,
                    download.url,
                    download.file_path,
                    download.file_name,
                    download.mime_type,
                    download.state.as_str(),
                    download.created_at.to_rfc3339(),
                    download.finished_at.map(|dt| dt.to_rfc3339()),
                ],
            )?;
            Ok(())
        })?)
    }

    /// `name`, or `stem (n).ext` if a recorded download already uses it
    fn unique_file_name(&self, name: &str) -> String {
        let cache = self.downloads.read();
        let taken = |candidate: &str| cache.values().any(|d| d.file_name == candidate);

        if !taken(name) {
            return name.to_string();
        }

        let (stem, ext) = match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
            _ => (name, None),
        };

        (1..)
            .map(|n| match ext {
                Some(ext) => format!("{} ({}).{}", stem, n, ext),
                None => format!("{} ({})", stem, n),
            })
            .find(|candidate| !taken(candidate))
            .unwrap_or_else(|| name.to_string())
    }
}

impl Clone for DownloadManager {
    fn clone(&self) -> Self {
        Self {
            downloads: Arc::clone(&self.downloads),
            db: self.db.clone(),
            download_dir: self.download_dir.clone(),
        }
    }
}

fn sanitize_file_name(file_name: &str) -> String {
    let name = Path::new(file_name)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("")
        .trim();

    if name.is_empty() || name == "." || name == ".." {
        "download".to_string()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> DownloadManager {
        let db = Database::open_in_memory().unwrap();
        DownloadManager::new(db, PathBuf::from("/downloads"))
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("report.pdf"), "report.pdf");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("   "), "download");
        assert_eq!(sanitize_file_name(""), "download");
    }

    #[test]
    fn test_add_download() {
        let manager = manager();

        let download = manager
            .add(DownloadHandle::new("https://example.com/docs/file.pdf").with_mime_type("application/pdf"))
            .unwrap();
        assert_eq!(download.state, DownloadState::Started);
        assert_eq!(download.file_name, "file.pdf");
        assert_eq!(download.file_path, "/downloads/file.pdf");
        assert_eq!(download.mime_type.as_deref(), Some("application/pdf"));

        let suggested = manager
            .add(DownloadHandle::new("https://example.com/get?id=4").with_file_name("../report.csv"))
            .unwrap();
        assert_eq!(suggested.file_name, "report.csv");

        let bare = manager.add(DownloadHandle::new("https://example.com/")).unwrap();
        assert_eq!(bare.file_name, "download");

        assert!(matches!(
            manager.add(DownloadHandle::new("not a uri")),
            Err(DownloadError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_duplicate_names_get_suffix() {
        let manager = manager();

        let first = manager.add(DownloadHandle::new("https://a.example/file.pdf")).unwrap();
        let second = manager.add(DownloadHandle::new("https://b.example/file.pdf")).unwrap();
        let third = manager.add(DownloadHandle::new("https://c.example/file.pdf")).unwrap();

        assert_eq!(first.file_name, "file.pdf");
        assert_eq!(second.file_name, "file (1).pdf");
        assert_eq!(third.file_name, "file (2).pdf");
    }

    #[test]
    fn test_finish_states() {
        let manager = manager();

        let a = manager.add(DownloadHandle::new("https://example.com/a.zip")).unwrap();
        let b = manager.add(DownloadHandle::new("https://example.com/b.zip")).unwrap();
        let c = manager.add(DownloadHandle::new("https://example.com/c.zip")).unwrap();
        assert_eq!(manager.active().len(), 3);

        let completed = manager.complete(&a.id).unwrap();
        assert_eq!(completed.state, DownloadState::Completed);
        assert!(completed.finished_at.is_some());

        assert_eq!(manager.fail(&b.id, "disk full").unwrap().state, DownloadState::Failed);
        assert_eq!(manager.cancel(&c.id).unwrap().state, DownloadState::Cancelled);
        assert!(manager.active().is_empty());

        assert!(matches!(manager.cancel(&a.id), Err(DownloadError::AlreadyFinished(_))));
        assert!(matches!(manager.get("missing"), Err(DownloadError::NotFound(_))));
    }

    #[test]
    fn test_persistence() {
        let db = Database::open_in_memory().unwrap();
        let manager = DownloadManager::new(db.clone(), PathBuf::from("/downloads"));

        let download = manager
            .add(DownloadHandle::new("https://example.com/file.pdf").with_mime_type("application/pdf"))
            .unwrap();
        manager.complete(&download.id).unwrap();

        let reloaded = DownloadManager::new(db, PathBuf::from("/downloads"));
        reloaded.load().unwrap();

        let restored = reloaded.get(&download.id).unwrap();
        assert_eq!(restored.url, "https://example.com/file.pdf");
        assert_eq!(restored.state, DownloadState::Completed);
        assert_eq!(restored.mime_type.as_deref(), Some("application/pdf"));
        assert!(restored.finished_at.is_some());
        assert_eq!(reloaded.list().len(), 1);
    }
}

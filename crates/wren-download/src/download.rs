//! Download data structure

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What the engine hands over when a response is turned into a download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadHandle {
    pub uri: String,
    /// File name proposed by the server, if any
    pub suggested_file_name: Option<String>,
    pub mime_type: Option<String>,
}

impl DownloadHandle {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            suggested_file_name: None,
            mime_type: None,
        }
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.suggested_file_name = Some(name.into());
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadState {
    /// Handed to the engine, transfer running
    Started,
    Completed,
    Failed,
    /// Cancelled by the user
    Cancelled,
}

impl DownloadState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadState::Started => "started",
            DownloadState::Completed => "completed",
            DownloadState::Failed => "failed",
            DownloadState::Cancelled => "cancelled",
        }
    }

    pub fn is_finished(&self) -> bool {
        !matches!(self, DownloadState::Started)
    }
}

impl std::str::FromStr for DownloadState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "started" => Ok(DownloadState::Started),
            "completed" => Ok(DownloadState::Completed),
            "failed" => Ok(DownloadState::Failed),
            "cancelled" => Ok(DownloadState::Cancelled),
            _ => Err(format!("Unknown download state: {}", s)),
        }
    }
}

/// Risk level based on MIME type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Safe,
    Warning,
    Dangerous,
}

impl RiskLevel {
    pub fn classify(mime_type: Option<&str>) -> Self {
        let Some(mime) = mime_type else {
            return RiskLevel::Warning;
        };
        let mime = mime.to_lowercase();

        const DANGEROUS: [&str; 4] = ["executable", "x-msdownload", "x-msdos-program", "x-msi"];
        const WARNING: [&str; 8] = [
            "javascript",
            "x-sh",
            "x-python",
            "zip",
            "x-rar",
            "x-7z",
            "x-tar",
            "x-debian-package",
        ];

        if DANGEROUS.iter().any(|m| mime.contains(m)) {
            RiskLevel::Dangerous
        } else if WARNING.iter().any(|m| mime.contains(m)) {
            RiskLevel::Warning
        } else if ["image/", "audio/", "video/", "text/"]
            .iter()
            .any(|p| mime.starts_with(p))
            || mime == "application/pdf"
        {
            RiskLevel::Safe
        } else {
            RiskLevel::Warning
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Download {
    pub id: String,
    pub url: String,
    pub file_path: String,
    pub file_name: String,
    pub mime_type: Option<String>,
    pub state: DownloadState,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Download {
    pub fn new(url: String, file_path: String, file_name: String, mime_type: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            url,
            file_path,
            file_name,
            mime_type,
            state: DownloadState::Started,
            created_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::classify(self.mime_type.as_deref())
    }

    /// Check if this is a risky download that needs user warning
    pub fn needs_warning(&self) -> bool {
        self.risk_level() != RiskLevel::Safe
    }
}

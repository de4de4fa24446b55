use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// State of a simulated offline download
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DownloadStatus {
    Downloading,
    Downloaded,
    Failed,
}

/// A locally tracked offline copy of a catalog item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OfflineBook {
    pub content_id: Uuid,
    pub title: String,
    pub status: DownloadStatus,
    /// Download progress, 0-100
    pub percentage: u8,
    pub updated_at: DateTime<Utc>,
}

impl OfflineBook {
    /// Creates a record for a download that just started
    pub fn started(content_id: Uuid, title: impl Into<String>) -> Self {
        Self {
            content_id,
            title: title.into(),
            status: DownloadStatus::Downloading,
            percentage: 0,
            updated_at: Utc::now(),
        }
    }
}

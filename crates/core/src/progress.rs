use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of one file inside an ingestion batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Uploading,
    Completed,
    Error,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileStatus::Uploading => write!(f, "uploading"),
            FileStatus::Completed => write!(f, "completed"),
            FileStatus::Error => write!(f, "error"),
        }
    }
}

/// Per-file progress record surfaced to the presentation layer during
/// ingest, and mirrored to durable storage like any other collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileUploadProgress {
    pub name: String,
    /// Parse milestone percentage: 0, 50 or 100.
    pub progress: u8,
    pub status: FileStatus,
}

impl FileUploadProgress {
    /// The state every submitted file starts in, before any per-file work.
    pub fn started(name: &str) -> Self {
        FileUploadProgress {
            name: name.to_string(),
            progress: 0,
            status: FileStatus::Uploading,
        }
    }
}

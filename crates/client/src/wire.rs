//! Wire types for the put.io v2 file API and boundary normalization.
//!
//! Provider-specific field probing happens exactly once, here. The file
//! API describes entries with a `file_type` string on newer responses and
//! only a MIME `content_type` on older ones; both are folded into the
//! fixed [`RemoteEntry`] shape so the rest of the system never branches on
//! which fields a record happened to carry.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use putsweep_core::types::{FileId, RemoteEntry, Timestamp};

/// `GET /account/info` response envelope.
#[derive(Debug, Deserialize)]
pub struct AccountInfoResponse {
    pub info: AccountInfo,
}

#[derive(Debug, Deserialize)]
pub struct AccountInfo {
    pub disk: DiskInfo,
    #[serde(default)]
    pub trash_size: i64,
}

#[derive(Debug, Deserialize)]
pub struct DiskInfo {
    pub size: i64,
    pub used: i64,
    pub avail: i64,
}

/// `GET /files/list` response envelope (also used for trash listings).
#[derive(Debug, Deserialize)]
pub struct FileListResponse {
    #[serde(default)]
    pub files: Vec<FileRecord>,
}

/// One raw file record as the provider returns it.
#[derive(Debug, Deserialize)]
pub struct FileRecord {
    pub id: FileId,
    pub name: String,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub parent_id: FileId,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
}

impl FileRecord {
    /// Normalize into the provider-independent entry shape.
    ///
    /// Classification prefers `file_type` and falls back to
    /// `content_type`; an entry is never both folder and video (folder
    /// wins). `folder_has_video` starts false and is filled in by the
    /// scanner.
    pub fn into_entry(self) -> RemoteEntry {
        let file_type = self.file_type.as_deref();
        let content_type = self.content_type.as_deref();

        let is_folder = file_type == Some("FOLDER")
            || content_type == Some("application/x-directory");
        let is_video = !is_folder
            && (file_type == Some("VIDEO")
                || content_type.is_some_and(|c| c.starts_with("video/")));

        RemoteEntry {
            id: self.id,
            name: self.name,
            size: self.size,
            created_at: parse_created_at(self.created_at.as_deref()),
            is_folder,
            is_video,
            parent_id: self.parent_id,
            folder_has_video: false,
        }
    }
}

/// Parse the provider's `created_at` field.
///
/// Accepts RFC 3339 as well as the bare `%Y-%m-%dT%H:%M:%S` form the file
/// API historically used (taken as UTC). Missing or unparseable values
/// fall back to the Unix epoch, so malformed entries sort oldest and are
/// evicted eagerly rather than shielded forever.
pub fn parse_created_at(raw: Option<&str>) -> Timestamp {
    let Some(raw) = raw else {
        return DateTime::UNIX_EPOCH;
    };

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return ts.with_timezone(&Utc);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return naive.and_utc();
    }

    tracing::debug!(raw, "Unparseable created_at, treating as epoch");
    DateTime::UNIX_EPOCH
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

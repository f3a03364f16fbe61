//! Core identifiers and the normalized remote-entry shape.

/// Remote file and folder identifiers are the provider's 64-bit IDs.
pub type FileId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Identifier of the account root folder.
pub const ROOT_FOLDER_ID: FileId = 0;

/// One file or folder in the remote tree.
///
/// Produced by the client boundary in a fully normalized form: the rest of
/// the system never inspects provider-specific fields. `folder_has_video`
/// is only meaningful when `is_folder` is true and is filled in by the
/// scanner once the folder's whole subtree has been listed.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteEntry {
    pub id: FileId,
    pub name: String,
    /// Byte count. Folders are not pre-aggregated by the provider; unit
    /// sizing sums the relevant children instead.
    pub size: i64,
    /// Creation time; the only ordering key for eviction (oldest first).
    pub created_at: Timestamp,
    pub is_folder: bool,
    pub is_video: bool,
    /// Id of the immediate containing folder; [`ROOT_FOLDER_ID`] at the root.
    pub parent_id: FileId,
    /// True when this folder or any descendant, transitively, is a video.
    pub folder_has_video: bool,
}

/// Account disk accounting, fetched fresh at the start of a run and
/// re-fetched after destructive phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountState {
    /// Total capacity in bytes.
    pub disk_size: i64,
    /// Bytes in use, trash included.
    pub disk_used: i64,
    /// Free bytes; trash does not count as free.
    pub disk_avail: i64,
    /// Bytes currently sitting in trash.
    pub trash_size: i64,
}

impl AccountState {
    /// Bytes in use excluding trash.
    pub fn non_trash_used(&self) -> i64 {
        (self.disk_used - self.trash_size).max(0)
    }

    /// Project the state after permanently deleting `bytes`, from trash
    /// when `from_trash`. Used for dry-run accounting and as a fallback
    /// when a state re-fetch fails mid-run.
    pub fn after_permanent_delete(&self, bytes: i64, from_trash: bool) -> Self {
        Self {
            disk_size: self.disk_size,
            disk_used: (self.disk_used - bytes).max(0),
            disk_avail: (self.disk_avail + bytes).min(self.disk_size),
            trash_size: if from_trash {
                (self.trash_size - bytes).max(0)
            } else {
                self.trash_size
            },
        }
    }

    /// Project the state after moving `bytes` of content into the trash.
    /// Trash still occupies disk, so only the trash share shifts.
    pub fn after_trash_move(&self, bytes: i64) -> Self {
        Self {
            trash_size: self.trash_size + bytes,
            ..*self
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

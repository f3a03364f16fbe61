//! Deletion-unit collection over scanned folder trees.
//!
//! A deletion unit is the atomic granularity of one eviction action:
//! either a single video file sitting directly under a monitored root, or
//! an entire sub-folder that (transitively) contains video content and is
//! deleted as one piece.

use crate::types::{FileId, RemoteEntry, Timestamp};

/// One atomic eviction candidate.
#[derive(Debug, Clone)]
pub struct DeletionUnit {
    /// Present when the unit is a sub-folder; absent for a standalone file.
    pub container: Option<RemoteEntry>,
    /// The container's direct children, or the single standalone file.
    /// Never empty: a container is only collected when its subtree holds a
    /// video, which implies at least one direct child.
    pub members: Vec<RemoteEntry>,
}

impl DeletionUnit {
    /// A unit for a single standalone file.
    pub fn file(entry: RemoteEntry) -> Self {
        Self {
            container: None,
            members: vec![entry],
        }
    }

    /// A unit for a sub-folder deleted as a whole.
    pub fn folder(container: RemoteEntry, members: Vec<RemoteEntry>) -> Self {
        Self {
            container: Some(container),
            members,
        }
    }

    /// The remote id a destructive call targets: the container when
    /// present, else the standalone file.
    pub fn target_id(&self) -> FileId {
        match &self.container {
            Some(c) => c.id,
            None => self.members[0].id,
        }
    }

    /// Effective creation time, the ordering key for eviction.
    pub fn created_at(&self) -> Timestamp {
        match &self.container {
            Some(c) => c.created_at,
            None => self.members[0].created_at,
        }
    }

    /// Bare display name, without any log label.
    pub fn name(&self) -> &str {
        match &self.container {
            Some(c) => &c.name,
            None => &self.members[0].name,
        }
    }

    /// Unit size in bytes. Container units sum their direct children only;
    /// content nested deeper is deleted along with the folder but does not
    /// count toward freed-space accounting.
    pub fn size(&self) -> i64 {
        self.members.iter().map(|m| m.size).sum()
    }
}

/// Collect deletion units among the direct children of the root folder
/// `root_id`. `entries` is the flattened scan of the root's descendants.
///
/// Direct-child videos become standalone units; direct-child folders whose
/// subtree holds a video become container units whose members are the
/// entries one level below them. The root folder itself is never a unit.
pub fn collect_units(root_id: FileId, entries: &[RemoteEntry]) -> Vec<DeletionUnit> {
    let mut units = Vec::new();

    for entry in entries.iter().filter(|e| e.parent_id == root_id) {
        if entry.is_video {
            units.push(DeletionUnit::file(entry.clone()));
        } else if entry.is_folder && entry.folder_has_video {
            let members: Vec<RemoteEntry> = entries
                .iter()
                .filter(|e| e.parent_id == entry.id)
                .cloned()
                .collect();
            units.push(DeletionUnit::folder(entry.clone(), members));
        }
    }

    units
}

/// Order units ascending by effective creation time. The sort is stable,
/// so units sharing a timestamp keep their collection order.
pub fn order_units(mut units: Vec<DeletionUnit>) -> Vec<DeletionUnit> {
    units.sort_by_key(DeletionUnit::created_at);
    units
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Shared mock remote store for janitor integration tests.
//!
//! The mock mutates its own accounting the way the provider does, so
//! live-mode re-fetches observe the space a deletion freed. Folder
//! deletions free the shallow sum of the folder's direct children, which
//! is exactly what the engine tallies -- fixtures therefore avoid nesting
//! folders inside folders.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use putsweep_client::store::{RemoteStore, StoreError};
use putsweep_core::types::{AccountState, FileId, RemoteEntry};

pub const GB: i64 = 1024 * 1024 * 1024;
pub const MB: i64 = 1024 * 1024;

/// One destructive call the store observed, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Trashed(FileId),
    Purged(FileId),
    PurgedFromTrash(FileId),
}

pub struct MockStore {
    inner: Mutex<Inner>,
}

struct Inner {
    account: AccountState,
    folders: HashMap<FileId, Vec<RemoteEntry>>,
    trash: Vec<RemoteEntry>,
    fail_listings: HashSet<FileId>,
    mutations: Vec<Mutation>,
}

impl MockStore {
    pub fn new(account: AccountState) -> Self {
        Self {
            inner: Mutex::new(Inner {
                account,
                folders: HashMap::new(),
                trash: Vec::new(),
                fail_listings: HashSet::new(),
                mutations: Vec::new(),
            }),
        }
    }

    /// Register `entry` as a direct child of `parent`.
    pub fn put(&self, parent: FileId, entry: RemoteEntry) {
        self.inner
            .lock()
            .unwrap()
            .folders
            .entry(parent)
            .or_default()
            .push(entry);
    }

    pub fn put_trash(&self, entry: RemoteEntry) {
        self.inner.lock().unwrap().trash.push(entry);
    }

    /// Make listings of `folder_id` fail with a transient error.
    pub fn fail_listing(&self, folder_id: FileId) {
        self.inner.lock().unwrap().fail_listings.insert(folder_id);
    }

    /// Every destructive call seen so far, in order.
    pub fn mutations(&self) -> Vec<Mutation> {
        self.inner.lock().unwrap().mutations.clone()
    }
}

impl Inner {
    /// Detach `id` from its folder; returns the entry and the bytes its
    /// deletion frees (shallow sum for folders).
    fn remove(&mut self, id: FileId) -> Option<(RemoteEntry, i64)> {
        let parent = self
            .folders
            .iter()
            .find_map(|(pid, children)| children.iter().any(|e| e.id == id).then_some(*pid))?;
        let child_bytes: i64 = self
            .folders
            .get(&id)
            .map(|children| children.iter().map(|c| c.size).sum())
            .unwrap_or(0);

        let children = self.folders.get_mut(&parent).unwrap();
        let pos = children.iter().position(|e| e.id == id).unwrap();
        let entry = children.remove(pos);

        let bytes = if entry.is_folder { child_bytes } else { entry.size };
        self.folders.remove(&id);
        Some((entry, bytes))
    }
}

#[async_trait]
impl RemoteStore for &MockStore {
    async fn account_state(&self) -> Result<AccountState, StoreError> {
        Ok(self.inner.lock().unwrap().account)
    }

    async fn list_children(&self, folder_id: FileId) -> Result<Vec<RemoteEntry>, StoreError> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_listings.contains(&folder_id) {
            return Err(StoreError::Transient("listing failed".into()));
        }
        Ok(inner.folders.get(&folder_id).cloned().unwrap_or_default())
    }

    async fn list_trash(&self) -> Result<Vec<RemoteEntry>, StoreError> {
        Ok(self.inner.lock().unwrap().trash.clone())
    }

    async fn move_to_trash(&self, id: FileId) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let (entry, bytes) = inner
            .remove(id)
            .ok_or_else(|| StoreError::Transient("no such file".into()))?;
        inner.account.trash_size += bytes;
        inner.trash.push(entry);
        inner.mutations.push(Mutation::Trashed(id));
        Ok(())
    }

    async fn delete_permanently(&self, id: FileId, from_trash: bool) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if from_trash {
            let pos = inner
                .trash
                .iter()
                .position(|e| e.id == id)
                .ok_or_else(|| StoreError::Transient("not in trash".into()))?;
            let entry = inner.trash.remove(pos);
            inner.account.trash_size -= entry.size;
            inner.account.disk_used -= entry.size;
            inner.account.disk_avail += entry.size;
            inner.mutations.push(Mutation::PurgedFromTrash(id));
        } else {
            let (_, bytes) = inner
                .remove(id)
                .ok_or_else(|| StoreError::Transient("no such file".into()))?;
            inner.account.disk_used -= bytes;
            inner.account.disk_avail += bytes;
            inner.mutations.push(Mutation::Purged(id));
        }
        Ok(())
    }
}

pub fn file_entry(id: FileId, name: &str, parent_id: FileId, size: i64, day: u32) -> RemoteEntry {
    RemoteEntry {
        id,
        name: name.to_string(),
        size,
        created_at: Utc.with_ymd_and_hms(2024, 3, day, 0, 0, 0).unwrap(),
        is_folder: false,
        is_video: false,
        parent_id,
        folder_has_video: false,
    }
}

pub fn video_entry(id: FileId, name: &str, parent_id: FileId, size: i64, day: u32) -> RemoteEntry {
    RemoteEntry {
        is_video: true,
        ..file_entry(id, name, parent_id, size, day)
    }
}

pub fn folder_entry(id: FileId, name: &str, parent_id: FileId, day: u32) -> RemoteEntry {
    RemoteEntry {
        is_folder: true,
        ..file_entry(id, name, parent_id, 0, day)
    }
}

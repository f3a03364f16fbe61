//! Capability surface the eviction engine needs from a remote file store.

use async_trait::async_trait;
use putsweep_core::types::{AccountState, FileId, RemoteEntry};

/// Errors surfaced by a remote store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Network-level or 5xx-class failure; safe to retry.
    #[error("Transient store error: {0}")]
    Transient(String),

    /// Authentication or authorization failure; retrying cannot help.
    #[error("Authentication failed: {0}")]
    Auth(String),
}

impl StoreError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// A remote file store the janitor can evict from.
///
/// Any provider that reports disk accounting, lists folders and trash, and
/// supports soft and permanent deletion can back the janitor. Entries come
/// back fully normalized -- no provider-specific fields leak past this
/// boundary.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch current disk accounting for the account.
    async fn account_state(&self) -> Result<AccountState, StoreError>;

    /// List the direct children of a folder.
    async fn list_children(&self, folder_id: FileId) -> Result<Vec<RemoteEntry>, StoreError>;

    /// List the contents of the trash.
    async fn list_trash(&self) -> Result<Vec<RemoteEntry>, StoreError>;

    /// Soft-delete an entry into the trash.
    async fn move_to_trash(&self, id: FileId) -> Result<(), StoreError>;

    /// Permanently delete an entry; `from_trash` targets a trash entry.
    async fn delete_permanently(&self, id: FileId, from_trash: bool) -> Result<(), StoreError>;
}

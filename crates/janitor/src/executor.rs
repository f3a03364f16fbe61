//! Executes a remediation phase against an ordered candidate list.
//!
//! Greedy oldest-first bin covering: units are consumed from the front of
//! the queue until the deficit is covered or candidates run out. The last
//! unit may overshoot the deficit; the executor never stops short while
//! candidates remain. A failed deletion is skipped without counting
//! toward freed bytes, and protected names are refused outright.

use std::collections::{HashSet, VecDeque};

use putsweep_client::store::RemoteStore;
use putsweep_core::collect::DeletionUnit;
use putsweep_core::format::format_bytes;
use putsweep_core::report::{Phase, PhaseReport};

/// How a phase removes content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionMode {
    /// Soft delete into the trash.
    MoveToTrash,
    /// Permanent delete, bypassing the trash.
    Purge,
    /// Permanent delete of an entry already in the trash.
    PurgeFromTrash,
}

impl DeletionMode {
    fn phase(self) -> Phase {
        match self {
            Self::MoveToTrash => Phase::TrashMove,
            Self::Purge => Phase::FolderPurge,
            Self::PurgeFromTrash => Phase::TrashPurge,
        }
    }

    /// Log and summary label for a unit under this mode.
    fn label(self, unit: &DeletionUnit) -> String {
        match self {
            Self::PurgeFromTrash => format!("Trash: {}", unit.name()),
            _ if unit.container.is_some() => format!("Folder: {}", unit.name()),
            _ => unit.name().to_string(),
        }
    }
}

pub struct Executor<'a, S> {
    store: &'a S,
    protected: HashSet<String>,
    dry_run: bool,
}

impl<'a, S: RemoteStore> Executor<'a, S> {
    pub fn new(store: &'a S, protected: HashSet<String>, dry_run: bool) -> Self {
        Self {
            store,
            protected,
            dry_run,
        }
    }

    /// Work through `units` oldest-first until `deficit` bytes are freed
    /// or the queue is exhausted. Consumed units are drained from the
    /// front; whatever remains is left for a later phase.
    pub async fn execute(
        &self,
        units: &mut VecDeque<DeletionUnit>,
        deficit: i64,
        mode: DeletionMode,
    ) -> PhaseReport {
        let mut report = PhaseReport::new(mode.phase(), deficit);

        while report.bytes_freed < deficit {
            let Some(unit) = units.pop_front() else { break };
            let label = mode.label(&unit);

            if self.is_protected(&label) {
                tracing::warn!(unit = %label, "Refusing to delete a protected folder");
                report.units_blocked += 1;
                continue;
            }

            let size = unit.size();
            if self.delete(&unit, size, &label, mode).await {
                report.units_deleted += 1;
                report.bytes_freed += size;
                report.deleted.push(label);
            } else {
                report.units_failed += 1;
            }
        }

        if !report.covered() {
            tracing::warn!(
                freed = %format_bytes(report.bytes_freed),
                deficit = %format_bytes(report.deficit),
                "Ran out of candidates before covering the deficit",
            );
        }

        report
    }

    /// The collector never yields a monitored root as its own unit; this
    /// also stops a name collision from slipping through.
    fn is_protected(&self, label: &str) -> bool {
        self.protected.contains(strip_label(label))
    }

    async fn delete(&self, unit: &DeletionUnit, size: i64, label: &str, mode: DeletionMode) -> bool {
        if self.dry_run {
            tracing::info!(unit = %label, size = %format_bytes(size), "[dry run] Would delete");
            return true;
        }

        let result = match mode {
            DeletionMode::MoveToTrash => self.store.move_to_trash(unit.target_id()).await,
            DeletionMode::Purge => self.store.delete_permanently(unit.target_id(), false).await,
            DeletionMode::PurgeFromTrash => {
                self.store.delete_permanently(unit.target_id(), true).await
            }
        };

        match result {
            Ok(()) => {
                tracing::info!(unit = %label, size = %format_bytes(size), "Deleted");
                true
            }
            Err(e) => {
                tracing::error!(unit = %label, error = %e, "Failed to delete, skipping");
                false
            }
        }
    }
}

/// Strip the log-label prefix so the guard compares bare names.
fn strip_label(label: &str) -> &str {
    label
        .strip_prefix("Folder: ")
        .or_else(|| label.strip_prefix("Trash: "))
        .unwrap_or(label)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use putsweep_client::store::StoreError;
    use putsweep_core::types::{AccountState, FileId, RemoteEntry};
    use std::sync::Mutex;

    const GB: i64 = 1024 * 1024 * 1024;

    #[derive(Default)]
    struct RecordingStore {
        fail_ids: HashSet<FileId>,
        trashed: Mutex<Vec<FileId>>,
        purged: Mutex<Vec<(FileId, bool)>>,
    }

    impl RecordingStore {
        fn failing(ids: impl IntoIterator<Item = FileId>) -> Self {
            Self {
                fail_ids: ids.into_iter().collect(),
                ..Self::default()
            }
        }

        fn check(&self, id: FileId) -> Result<(), StoreError> {
            if self.fail_ids.contains(&id) {
                Err(StoreError::Transient("deletion failed".into()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl RemoteStore for RecordingStore {
        async fn account_state(&self) -> Result<AccountState, StoreError> {
            unimplemented!("not used by the executor")
        }

        async fn list_children(&self, _: FileId) -> Result<Vec<RemoteEntry>, StoreError> {
            unimplemented!("not used by the executor")
        }

        async fn list_trash(&self) -> Result<Vec<RemoteEntry>, StoreError> {
            unimplemented!("not used by the executor")
        }

        async fn move_to_trash(&self, id: FileId) -> Result<(), StoreError> {
            self.check(id)?;
            self.trashed.lock().unwrap().push(id);
            Ok(())
        }

        async fn delete_permanently(&self, id: FileId, from_trash: bool) -> Result<(), StoreError> {
            self.check(id)?;
            self.purged.lock().unwrap().push((id, from_trash));
            Ok(())
        }
    }

    fn video(id: FileId, name: &str, size: i64, day: u32) -> RemoteEntry {
        RemoteEntry {
            id,
            name: name.to_string(),
            size,
            created_at: Utc.with_ymd_and_hms(2024, 3, day, 0, 0, 0).unwrap(),
            is_folder: false,
            is_video: true,
            parent_id: 1,
            folder_has_video: false,
        }
    }

    fn units(entries: Vec<RemoteEntry>) -> VecDeque<DeletionUnit> {
        entries.into_iter().map(DeletionUnit::file).collect()
    }

    fn executor(store: &RecordingStore) -> Executor<'_, RecordingStore> {
        Executor::new(store, HashSet::from(["media".to_string()]), false)
    }

    #[tokio::test]
    async fn stops_once_deficit_is_covered() {
        let store = RecordingStore::default();
        let mut queue = units(vec![
            video(10, "a.mp4", 2 * GB, 1),
            video(11, "b.mp4", 2 * GB, 2),
            video(12, "c.mp4", 2 * GB, 3),
        ]);

        let report = executor(&store)
            .execute(&mut queue, 3 * GB, DeletionMode::MoveToTrash)
            .await;

        assert_eq!(report.units_deleted, 2);
        assert_eq!(report.bytes_freed, 4 * GB);
        assert!(report.covered());
        // The third unit stays queued for a later phase.
        assert_eq!(queue.len(), 1);
        assert_eq!(*store.trashed.lock().unwrap(), vec![10, 11]);
    }

    #[tokio::test]
    async fn failed_deletion_is_skipped_and_not_counted() {
        let store = RecordingStore::failing([10]);
        let mut queue = units(vec![
            video(10, "a.mp4", 2 * GB, 1),
            video(11, "b.mp4", 2 * GB, 2),
        ]);

        let report = executor(&store)
            .execute(&mut queue, GB, DeletionMode::MoveToTrash)
            .await;

        assert_eq!(report.units_failed, 1);
        assert_eq!(report.units_deleted, 1);
        assert_eq!(report.bytes_freed, 2 * GB);
        assert_eq!(*store.trashed.lock().unwrap(), vec![11]);
    }

    #[tokio::test]
    async fn protected_name_is_blocked_even_in_dry_run() {
        let store = RecordingStore::default();
        for dry_run in [false, true] {
            let mut queue = units(vec![
                video(10, "media", 2 * GB, 1),
                video(11, "b.mp4", 2 * GB, 2),
            ]);
            let executor =
                Executor::new(&store, HashSet::from(["media".to_string()]), dry_run);
            let report = executor.execute(&mut queue, GB, DeletionMode::Purge).await;

            assert_eq!(report.units_blocked, 1);
            assert_eq!(report.units_deleted, 1);
            assert_eq!(report.bytes_freed, 2 * GB);
        }
        // Only the live pass reached the store, and never for the blocked id.
        assert_eq!(*store.purged.lock().unwrap(), vec![(11, false)]);
    }

    #[tokio::test]
    async fn dry_run_tallies_without_store_calls() {
        let store = RecordingStore::default();
        let mut queue = units(vec![video(10, "a.mp4", 2 * GB, 1)]);

        let executor = Executor::new(&store, HashSet::new(), true);
        let report = executor.execute(&mut queue, GB, DeletionMode::Purge).await;

        assert_eq!(report.units_deleted, 1);
        assert_eq!(report.bytes_freed, 2 * GB);
        assert!(store.purged.lock().unwrap().is_empty());
        assert!(store.trashed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn exhausting_candidates_reports_shortfall() {
        let store = RecordingStore::default();
        let mut queue = units(vec![video(10, "a.mp4", GB, 1)]);

        let report = executor(&store)
            .execute(&mut queue, 10 * GB, DeletionMode::MoveToTrash)
            .await;

        assert!(!report.covered());
        assert_eq!(report.bytes_freed, GB);
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn trash_purge_targets_the_trash_flag_and_label() {
        let store = RecordingStore::default();
        let mut queue = units(vec![video(10, "old.mp4", GB, 1)]);

        let report = executor(&store)
            .execute(&mut queue, GB, DeletionMode::PurgeFromTrash)
            .await;

        assert_eq!(*store.purged.lock().unwrap(), vec![(10, true)]);
        assert_eq!(report.deleted, vec!["Trash: old.mp4".to_string()]);
    }

    #[tokio::test]
    async fn folder_units_carry_the_folder_label() {
        let store = RecordingStore::default();
        let container = RemoteEntry {
            is_folder: true,
            is_video: false,
            folder_has_video: true,
            ..video(2, "batch", 0, 3)
        };
        let member = video(20, "b.mp4", 3 * GB, 3);
        let mut queue: VecDeque<DeletionUnit> =
            vec![DeletionUnit::folder(container, vec![member])].into();

        let report = executor(&store)
            .execute(&mut queue, GB, DeletionMode::MoveToTrash)
            .await;

        assert_eq!(report.deleted, vec!["Folder: batch".to_string()]);
        assert_eq!(report.bytes_freed, 3 * GB);
        assert_eq!(*store.trashed.lock().unwrap(), vec![2]);
    }

    #[test]
    fn label_stripping_uncovers_bare_names() {
        assert_eq!(strip_label("Folder: media"), "media");
        assert_eq!(strip_label("Trash: media"), "media");
        assert_eq!(strip_label("media"), "media");
    }
}

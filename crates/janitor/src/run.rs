//! The run orchestrator.
//!
//! One janitor run: fetch account state, evaluate the policy, execute the
//! remediation phases it calls for, and report. Critical remediation
//! purges trash first and the monitored folders second, re-evaluating
//! between phases; clearing the critical floor re-triggers a single
//! comfort check. Nothing is carried over between runs -- candidates and
//! account state are rebuilt from the live account every time.

use std::collections::VecDeque;

use chrono::Utc;

use putsweep_client::store::{RemoteStore, StoreError};
use putsweep_core::collect::{collect_units, order_units, DeletionUnit};
use putsweep_core::format::format_bytes;
use putsweep_core::policy::{evaluate, PolicyDecision};
use putsweep_core::report::{Phase, PhaseReport, RunOutcome, RunReport};
use putsweep_core::types::{AccountState, RemoteEntry, ROOT_FOLDER_ID};

use crate::config::JanitorConfig;
use crate::executor::{DeletionMode, Executor};
use crate::scanner::scan_folder;

/// Error that aborts a run before any policy decision can be made.
///
/// This is the only fatal path: everything past the initial account-state
/// fetch degrades per-unit or per-subtree instead of failing the run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Could not fetch account state: {0}")]
    AccountState(#[from] StoreError),
}

pub struct Janitor<S> {
    store: S,
    config: JanitorConfig,
}

impl<S: RemoteStore> Janitor<S> {
    pub fn new(store: S, config: JanitorConfig) -> Self {
        Self { store, config }
    }

    /// Execute one full run and return its report.
    pub async fn run(&self) -> Result<RunReport, RunError> {
        let mut report = RunReport::new(self.config.dry_run);

        let state = self.store.account_state().await?;
        log_account_state(&state);

        // Candidates are scanned at most once per run; phases consume
        // units from the front of the shared queue.
        let mut candidates: Option<VecDeque<DeletionUnit>> = None;

        match evaluate(&state, &self.config.thresholds) {
            PolicyDecision::None => {
                tracing::info!(
                    available = %format_bytes(state.disk_avail),
                    "Free space and usage are within thresholds, no cleanup needed",
                );
            }
            PolicyDecision::Comfort { deficit } => {
                self.comfort_phase(deficit, &mut candidates, &mut report)
                    .await;
            }
            PolicyDecision::Critical { deficit } => {
                let state = self
                    .critical_phases(state, deficit, &mut candidates, &mut report)
                    .await;
                // Clearing the critical floor re-triggers one comfort check.
                if let PolicyDecision::Comfort { deficit } =
                    evaluate(&state, &self.config.thresholds)
                {
                    self.comfort_phase(deficit, &mut candidates, &mut report)
                        .await;
                }
            }
        }

        self.log_summary(&report).await;
        Ok(report)
    }

    /// Critical remediation: purge trash, then purge from the monitored
    /// folders if the floor is still breached. Returns the latest state.
    async fn critical_phases(
        &self,
        state: AccountState,
        deficit: i64,
        candidates: &mut Option<VecDeque<DeletionUnit>>,
        report: &mut RunReport,
    ) -> AccountState {
        tracing::info!(
            available = %format_bytes(state.disk_avail),
            deficit = %format_bytes(deficit),
            "Free space is below the critical floor, deleting permanently",
        );

        let mut state = state;

        // Trash is reclaimed before touching live content.
        let mut trash = self.trash_candidates().await;
        if trash.is_empty() {
            tracing::info!("No eligible trash entries to purge");
        } else {
            let phase = self
                .executor()
                .execute(&mut trash, deficit, DeletionMode::PurgeFromTrash)
                .await;
            state = self.refreshed_state(state, &phase).await;
            report.phases.push(phase);
        }

        if let PolicyDecision::Critical { deficit } = evaluate(&state, &self.config.thresholds) {
            let units = self.candidates(candidates).await;
            let phase = self
                .executor()
                .execute(units, deficit, DeletionMode::Purge)
                .await;
            state = self.refreshed_state(state, &phase).await;
            report.phases.push(phase);
        }

        state
    }

    /// Comfort remediation: move the oldest deletable units to trash.
    async fn comfort_phase(
        &self,
        deficit: i64,
        candidates: &mut Option<VecDeque<DeletionUnit>>,
        report: &mut RunReport,
    ) {
        tracing::info!(
            deficit = %format_bytes(deficit),
            "Non-trash usage exceeds the comfort ceiling, moving oldest content to trash",
        );

        let units = self.candidates(candidates).await;
        let phase = self
            .executor()
            .execute(units, deficit, DeletionMode::MoveToTrash)
            .await;
        report.phases.push(phase);
    }

    fn executor(&self) -> Executor<'_, S> {
        Executor::new(
            &self.store,
            self.config.protected_names(),
            self.config.dry_run,
        )
    }

    /// State after a destructive phase: re-fetched live, or projected from
    /// the phase's accounting in dry-run and when the re-fetch fails (only
    /// the initial fetch is fatal).
    async fn refreshed_state(&self, prev: AccountState, phase: &PhaseReport) -> AccountState {
        let projected = match phase.phase {
            Phase::TrashPurge => prev.after_permanent_delete(phase.bytes_freed, true),
            Phase::FolderPurge => prev.after_permanent_delete(phase.bytes_freed, false),
            Phase::TrashMove => prev.after_trash_move(phase.bytes_freed),
        };

        if self.config.dry_run {
            return projected;
        }

        match self.store.account_state().await {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Could not re-fetch account state, continuing with projected accounting",
                );
                projected
            }
        }
    }

    /// Lazily scan and collect the deletion candidates.
    async fn candidates<'c>(
        &self,
        cache: &'c mut Option<VecDeque<DeletionUnit>>,
    ) -> &'c mut VecDeque<DeletionUnit> {
        if cache.is_none() {
            *cache = Some(self.collect_candidates().await);
        }
        cache.as_mut().expect("just populated")
    }

    async fn collect_candidates(&self) -> VecDeque<DeletionUnit> {
        let roots = self.find_deletable_roots().await;
        if roots.is_empty() {
            tracing::error!(
                folders = ?self.config.deletable_folders,
                "None of the configured folders were found, nothing to collect",
            );
            return VecDeque::new();
        }

        let mut units = Vec::new();
        for root in roots {
            tracing::info!(folder = %root.name, "Scanning folder");
            let entries = scan_folder(&self.store, root.id).await;
            let found = collect_units(root.id, &entries);
            tracing::info!(
                folder = %root.name,
                units = found.len(),
                "Collected deletion candidates",
            );
            units.extend(found);
        }

        order_units(units).into()
    }

    /// Resolve the configured folder names among the account root's
    /// children. Only folders count; a name that resolves to nothing is
    /// logged and skipped.
    async fn find_deletable_roots(&self) -> Vec<RemoteEntry> {
        let children = match self.store.list_children(ROOT_FOLDER_ID).await {
            Ok(children) => children,
            Err(e) => {
                tracing::warn!(error = %e, "Could not list the account root");
                return Vec::new();
            }
        };

        let mut roots = Vec::new();
        for name in &self.config.deletable_folders {
            match children.iter().find(|e| e.is_folder && &e.name == name) {
                Some(folder) => {
                    tracing::info!(folder = %name, id = folder.id, "Found deletable folder");
                    roots.push(folder.clone());
                }
                None => {
                    tracing::warn!(folder = %name, "Configured folder not found at the account root");
                }
            }
        }
        roots
    }

    /// Trash entries eligible for purging, oldest first.
    async fn trash_candidates(&self) -> VecDeque<DeletionUnit> {
        let mut entries = match self.store.list_trash().await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "Could not list trash, skipping trash purge");
                return VecDeque::new();
            }
        };

        if let Some(days) = self.config.min_trash_age_days {
            let cutoff = Utc::now() - chrono::Duration::days(days);
            let before = entries.len();
            entries.retain(|e| e.created_at < cutoff);
            tracing::debug!(
                eligible = entries.len(),
                skipped = before - entries.len(),
                min_age_days = days,
                "Applied trash age gate",
            );
        }

        entries.sort_by_key(|e| e.created_at);
        entries.into_iter().map(DeletionUnit::file).collect()
    }

    async fn log_summary(&self, report: &RunReport) {
        if report.total_units_deleted() > 0 {
            tracing::info!(
                units = report.total_units_deleted(),
                freed = %format_bytes(report.total_bytes_freed()),
                dry_run = report.dry_run,
                "Run summary",
            );
            for label in report.deleted_labels() {
                tracing::info!("  - {label}");
            }
        }

        if report.outcome() == RunOutcome::Partial {
            tracing::warn!("Could not free enough space to satisfy the breached threshold");
        }

        // Final state is informational only; dry runs change nothing.
        if !report.phases.is_empty() && !report.dry_run {
            match self.store.account_state().await {
                Ok(state) => tracing::info!(
                    available = %format_bytes(state.disk_avail),
                    "Free space after cleanup",
                ),
                Err(e) => tracing::debug!(error = %e, "Could not fetch final account state"),
            }
        }
    }
}

fn log_account_state(state: &AccountState) {
    tracing::info!(
        total = %format_bytes(state.disk_size),
        used = %format_bytes(state.disk_used),
        available = %format_bytes(state.disk_avail),
        trash = %format_bytes(state.trash_size),
        "Account state",
    );
}

//! Dual-threshold eviction policy evaluation.
//!
//! Pure logic -- no store access. The caller fetches account state and
//! passes it in, re-evaluating after each destructive phase.

use crate::error::CoreError;
use crate::format::format_bytes;
use crate::types::AccountState;

/// Validated eviction thresholds.
///
/// The critical threshold is the minimum free space the account must keep;
/// breaching it means the account risks exhaustion even counting trash as
/// reclaimable, so remediation deletes permanently. The comfort threshold
/// caps how much non-trash content may accumulate before soft eviction
/// into the trash starts.
#[derive(Debug, Clone, Copy)]
pub struct PolicyThresholds {
    critical_bytes: i64,
    comfort_bytes: i64,
}

impl PolicyThresholds {
    /// Build thresholds, enforcing `comfort > critical > 0`.
    pub fn new(critical_bytes: i64, comfort_bytes: i64) -> Result<Self, CoreError> {
        if critical_bytes <= 0 {
            return Err(CoreError::Validation(
                "Critical threshold must be positive".to_string(),
            ));
        }
        if comfort_bytes <= critical_bytes {
            return Err(CoreError::Validation(format!(
                "Comfort threshold ({}) must exceed the critical threshold ({})",
                format_bytes(comfort_bytes),
                format_bytes(critical_bytes),
            )));
        }
        Ok(Self {
            critical_bytes,
            comfort_bytes,
        })
    }

    pub fn critical_bytes(&self) -> i64 {
        self.critical_bytes
    }

    pub fn comfort_bytes(&self) -> i64 {
        self.comfort_bytes
    }
}

/// Outcome of evaluating account state against the thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    /// Both thresholds are satisfied; nothing to do.
    None,
    /// Free space dropped below the critical floor. `deficit` is how many
    /// bytes must be permanently freed to restore it.
    Critical { deficit: i64 },
    /// Non-trash usage exceeds the comfort ceiling. `deficit` is how many
    /// bytes must move to trash to get back under it.
    Comfort { deficit: i64 },
}

/// Evaluate the account against the thresholds. Critical takes precedence
/// over comfort regardless of how the two compare.
pub fn evaluate(state: &AccountState, thresholds: &PolicyThresholds) -> PolicyDecision {
    if state.disk_avail < thresholds.critical_bytes {
        return PolicyDecision::Critical {
            deficit: thresholds.critical_bytes - state.disk_avail,
        };
    }

    let comfort_limit = state.disk_size - thresholds.comfort_bytes;
    let non_trash = state.non_trash_used();
    if non_trash > comfort_limit {
        return PolicyDecision::Comfort {
            deficit: non_trash - comfort_limit,
        };
    }

    PolicyDecision::None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

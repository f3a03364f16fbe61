//! Janitor configuration loaded from environment variables.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::{bail, Context};

use putsweep_client::retry::RetryConfig;
use putsweep_core::format::gb_to_bytes;
use putsweep_core::policy::PolicyThresholds;

/// Default API base URL.
const DEFAULT_API_URL: &str = "https://api.put.io/v2";
/// Default critical free-space floor (GB).
const DEFAULT_CRITICAL_GB: f64 = 6.0;
/// Default comfort usage ceiling (GB).
const DEFAULT_COMFORT_GB: f64 = 10.0;
/// Default monitored folders.
const DEFAULT_DELETABLE_FOLDERS: &str = "chill.institute,putfirst";

/// Process configuration, loaded once at startup and immutable for the run.
#[derive(Debug, Clone)]
pub struct JanitorConfig {
    pub api_url: String,
    pub token: String,
    pub thresholds: PolicyThresholds,
    /// Root folders whose contents may be evicted. The folder entries
    /// themselves are protected from deletion.
    pub deletable_folders: Vec<String>,
    /// Legacy gate: only purge trash entries at least this many days old.
    pub min_trash_age_days: Option<i64>,
    pub dry_run: bool,
    pub retry: RetryConfig,
}

impl JanitorConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env var                       | Default                    |
    /// |-------------------------------|----------------------------|
    /// | `PUTIO_TOKEN`                 | required                   |
    /// | `PUTIO_API_URL`               | `https://api.put.io/v2`    |
    /// | `PUTIO_CRITICAL_THRESHOLD_GB` | `6`                        |
    /// | `PUTIO_COMFORT_THRESHOLD_GB`  | `10`                       |
    /// | `PUTIO_DELETABLE_FOLDERS`     | `chill.institute,putfirst` |
    /// | `PUTIO_MIN_TRASH_AGE_DAYS`    | `0` (disabled)             |
    /// | `PUTIO_DRY_RUN`               | `false`                    |
    /// | `PUTIO_MAX_RETRIES`           | `3`                        |
    /// | `PUTIO_RETRY_DELAY_SECS`      | `5`                        |
    pub fn from_env() -> anyhow::Result<Self> {
        let token = std::env::var("PUTIO_TOKEN")
            .context("PUTIO_TOKEN environment variable is not set")?;
        let api_url = env_or("PUTIO_API_URL", DEFAULT_API_URL);

        let critical_gb: f64 = parse_env("PUTIO_CRITICAL_THRESHOLD_GB", DEFAULT_CRITICAL_GB)?;
        let comfort_gb: f64 = parse_env("PUTIO_COMFORT_THRESHOLD_GB", DEFAULT_COMFORT_GB)?;
        let thresholds = PolicyThresholds::new(gb_to_bytes(critical_gb), gb_to_bytes(comfort_gb))?;

        let deletable_folders =
            parse_folder_list(&env_or("PUTIO_DELETABLE_FOLDERS", DEFAULT_DELETABLE_FOLDERS));
        if deletable_folders.is_empty() {
            bail!("PUTIO_DELETABLE_FOLDERS must name at least one folder");
        }

        let min_days: i64 = parse_env("PUTIO_MIN_TRASH_AGE_DAYS", 0)?;
        let max_attempts: u32 = parse_env("PUTIO_MAX_RETRIES", 3)?;
        let delay_secs: u64 = parse_env("PUTIO_RETRY_DELAY_SECS", 5)?;

        let dry_run = std::env::var("PUTIO_DRY_RUN")
            .map(|v| parse_bool(&v))
            .unwrap_or(false);

        Ok(Self {
            api_url,
            token,
            thresholds,
            deletable_folders,
            min_trash_age_days: (min_days > 0).then_some(min_days),
            dry_run,
            retry: RetryConfig {
                max_attempts,
                delay: Duration::from_secs(delay_secs),
            },
        })
    }

    /// Names that must never be deleted themselves.
    pub fn protected_names(&self) -> HashSet<String> {
        self.deletable_folders.iter().cloned().collect()
    }
}

fn env_or(var: &str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: std::str::FromStr>(var: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{var} has an invalid value: '{raw}'")),
        Err(_) => Ok(default),
    }
}

/// Accepts `true` / `1` / `yes`, case-insensitively.
fn parse_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}

fn parse_folder_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

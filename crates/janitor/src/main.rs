//! `putsweep` -- storage janitor for put.io-compatible accounts.
//!
//! Evaluates the account against a critical/comfort threshold pair and
//! deletes the oldest video content from configured folders when space
//! runs short: permanently once free space breaches the critical floor,
//! softly (into the trash) once non-trash usage breaches the comfort
//! ceiling. Configuration is environment-based; see
//! [`JanitorConfig::from_env`].

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use putsweep_client::api::PutioStore;
use putsweep_core::format::format_bytes;
use putsweep_core::report::RunOutcome;
use putsweep_janitor::config::JanitorConfig;
use putsweep_janitor::run::Janitor;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "putsweep_janitor=info,putsweep_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match JanitorConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {e:#}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        critical = %format_bytes(config.thresholds.critical_bytes()),
        comfort = %format_bytes(config.thresholds.comfort_bytes()),
        folders = ?config.deletable_folders,
        dry_run = config.dry_run,
        "Starting putsweep",
    );

    let store = PutioStore::new(&config.api_url, &config.token, config.retry);
    let janitor = Janitor::new(store, config);

    match janitor.run().await {
        Ok(report) => {
            // A shortfall is only an error when the run had real effects.
            if report.outcome() == RunOutcome::Partial && !report.dry_run {
                std::process::exit(1);
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Janitor run failed");
            std::process::exit(1);
        }
    }
}

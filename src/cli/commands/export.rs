//! Export command implementation
//!
//! Loads the configuration, opens the snapshot, connects to OrderCloud,
//! runs the orchestrator, and prints the per-category summary. The exit
//! code reflects the run outcome: 0 clean, 1 completed with errored
//! entities, 2 configuration/snapshot problems, 5 connection failure.

use crate::adapters::ordercloud::OrderCloudClient;
use crate::adapters::source::SnapshotStore;
use crate::config::load_config;
use crate::core::Orchestrator;
use clap::Args;
use std::sync::Arc;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Override the snapshot path from the configuration file
    #[arg(long)]
    pub snapshot: Option<String>,
}

impl ExportArgs {
    /// Execute the export command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let mut config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        if let Some(snapshot) = &self.snapshot {
            config.source.snapshot_path = snapshot.clone();
        }

        let source = match SnapshotStore::load(&config.source.snapshot_path) {
            Ok(store) => store,
            Err(e) => {
                eprintln!("Failed to open snapshot: {e}");
                return Ok(2);
            }
        };

        let client = match OrderCloudClient::connect(&config.ordercloud).await {
            Ok(client) => client,
            Err(e) => {
                eprintln!("Failed to connect to OrderCloud: {e}");
                return Ok(5);
            }
        };

        let orchestrator =
            Orchestrator::new(Arc::new(client), Arc::new(source), Arc::new(config));
        let result = orchestrator.run().await;

        print_summary(&result);

        Ok(if result.is_successful() { 0 } else { 1 })
    }
}

fn print_summary(result: &crate::core::ExportResult) {
    println!();
    println!(
        "{:<28} {:>9} {:>11} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "Category", "Processed", "NotChanged", "Created", "Updated", "Patched", "Skipped", "Errored"
    );
    for (name, bucket) in result.buckets() {
        if bucket.is_empty() {
            continue;
        }
        println!(
            "{:<28} {:>9} {:>11} {:>8} {:>8} {:>8} {:>8} {:>8}",
            name,
            bucket.processed,
            bucket.not_changed,
            bucket.created,
            bucket.updated,
            bucket.patched,
            bucket.skipped,
            bucket.errored
        );
    }
    println!();
    if let Some(started_at) = result.started_at {
        println!("Started:  {}", started_at.to_rfc3339());
    }
    println!(
        "Completed in {}s with {} errored entities",
        result.duration.as_secs(),
        result.total_errored()
    );
    for error in &result.run_errors {
        println!("  error: {error}");
    }
}

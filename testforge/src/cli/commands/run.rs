//! Run command: the build, diagnose and patch loop

use crate::cli::app::{OutputFormat, RunArgs};
use anyhow::{Context, Result};
use chrono::Utc;
use std::path::PathBuf;
use testforge_core::report::SessionRecord;
use testforge_core::{CommandToolchain, FsFileStore, SessionOptions, run_session};
use tracing::{info, warn};

/// Execute the run command; returns whether the session succeeded
pub async fn execute(args: RunArgs, config: Option<PathBuf>) -> Result<bool> {
    let mut config = super::load_project_config(config.as_deref()).await?;
    if let Some(max_attempts) = args.max_attempts {
        config.session.max_attempts = max_attempts;
    }
    let root = config.project.root.clone();

    if args.no_reconcile {
        info!("Skipping step reconciliation");
    } else if config.features_path().exists() {
        let result = super::reconcile::reconcile_project(
            &config.features_path(),
            &config.step_definitions_path(),
            true,
        )
        .await?;
        if !result.is_complete() {
            println!("Stubbed {} missing step(s) before building", result.stubs.len());
        }
    } else {
        warn!("No features at {}, skipping step reconciliation", config.features_path().display());
    }

    let toolchain = CommandToolchain::new(&root, config.build.clone());
    let store = FsFileStore::new(&root);
    let options = SessionOptions::from_config(&config);

    let started_at = Utc::now();
    let report = run_session(&toolchain, &store, &options).await.context("Session aborted")?;
    let record = SessionRecord::new(report, started_at);

    match args.format {
        OutputFormat::Text => print!("{}", record.render_text()),
        OutputFormat::Json => println!("{}", record.to_json()?),
    }

    if let Some(path) = &args.report {
        tokio::fs::write(path, record.to_json()?)
            .await
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!("Session record written to {}", path.display());
    }

    Ok(record.report.outcome.is_success())
}

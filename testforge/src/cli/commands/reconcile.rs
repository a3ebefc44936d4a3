//! Reconcile command: scenario steps versus step definitions

use crate::cli::app::ReconcileArgs;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use testforge_core::patch::insert_stubs_with_imports;
use testforge_core::steps::{Reconciliation, load_scenario_steps, parse_implemented_steps, reconcile_steps};
use tracing::{info, warn};

/// Execute the reconcile command
pub async fn execute(args: ReconcileArgs, config: Option<PathBuf>) -> Result<()> {
    let config = super::load_project_config(config.as_deref()).await?;
    let features = args.features.map(|p| config.resolve(&p)).unwrap_or_else(|| config.features_path());
    let steps = args.steps.map(|p| config.resolve(&p)).unwrap_or_else(|| config.step_definitions_path());

    let result = reconcile_project(&features, &steps, args.write).await?;

    if result.is_complete() {
        println!("All scenario steps have step definitions.");
        return Ok(());
    }

    println!("{} scenario step(s) without a step definition:", result.missing.len());
    for stub in &result.stubs {
        println!("  [{} / {}] {}", stub.keyword, stub.intent, stub.step);
    }

    if args.write {
        println!("\nStubs written to {}", steps.display());
    } else {
        println!();
        for stub in &result.stubs {
            println!("{}\n", stub.source);
        }
    }
    Ok(())
}

/// Reconcile a feature tree against a step definition file, optionally
/// inserting the synthesized stubs.
pub async fn reconcile_project(features: &Path, steps: &Path, write: bool) -> Result<Reconciliation> {
    let scenario = load_scenario_steps(features)
        .await
        .with_context(|| format!("Failed to read scenarios from {}", features.display()))?;

    let existing = match tokio::fs::read_to_string(steps).await {
        Ok(content) => Some(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("Step definitions {} not found", steps.display());
            None
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", steps.display()));
        }
    };

    let implemented = existing.as_deref().map(parse_implemented_steps).unwrap_or_default();
    let result = reconcile_steps(&scenario, &implemented);
    info!(
        "{} scenario steps, {} implemented, {} missing",
        scenario.len(),
        implemented.len(),
        result.missing.len()
    );

    if write && !result.is_complete() {
        let base = existing.unwrap_or_else(|| skeleton(steps));
        let content = insert_stubs_with_imports(&base, &result.stubs);
        if let Some(parent) = steps.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(steps, content)
            .await
            .with_context(|| format!("Failed to write {}", steps.display()))?;
        info!("Inserted {} stubs into {}", result.stubs.len(), steps.display());
    }

    Ok(result)
}

/// Empty step definition class named after the file
fn skeleton(path: &Path) -> String {
    let class = path.file_stem().and_then(|s| s.to_str()).unwrap_or("StepDefinitions");
    format!("public class {} {{\n}}\n", class)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEATURE: &str = "Feature: Login\n  Scenario: Successful login\n    Given user is on login page\n    When user enters username\n    Then user should be logged in\n";

    #[tokio::test]
    async fn test_reconcile_project_writes_stubs_once() {
        let dir = tempfile::tempdir().unwrap();
        let features = dir.path().join("login.feature");
        let steps = dir.path().join("steps/LoginSteps.java");
        std::fs::write(&features, FEATURE).unwrap();

        let first = reconcile_project(&features, &steps, true).await.unwrap();
        assert_eq!(first.missing.len(), 3);

        let written = std::fs::read_to_string(&steps).unwrap();
        assert!(written.starts_with("import io.cucumber.java.en."));
        assert!(written.contains("public class LoginSteps {"));
        assert!(written.contains("import io.cucumber.java.en.Then;"));

        let second = reconcile_project(&features, &steps, true).await.unwrap();
        assert!(second.is_complete());
        assert_eq!(std::fs::read_to_string(&steps).unwrap(), written);
    }

    #[tokio::test]
    async fn test_reconcile_project_dry_run_leaves_files_alone() {
        let dir = tempfile::tempdir().unwrap();
        let features = dir.path().join("login.feature");
        let steps = dir.path().join("LoginSteps.java");
        std::fs::write(&features, FEATURE).unwrap();

        let result = reconcile_project(&features, &steps, false).await.unwrap();
        assert_eq!(result.stubs.len(), 3);
        assert!(!steps.exists());
    }
}

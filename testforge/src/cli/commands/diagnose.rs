//! Diagnose command: classify captured tool output

use crate::cli::app::{DiagnoseArgs, OutputFormat};
use anyhow::{Context, Result};
use std::path::PathBuf;
use testforge_core::diagnostics::DiagnosticExtractor;
use testforge_core::patch::PatchEngine;

/// Execute the diagnose command
pub async fn execute(args: DiagnoseArgs, config: Option<PathBuf>) -> Result<()> {
    let config = super::load_project_config(config.as_deref()).await?;
    let raw = tokio::fs::read_to_string(&args.output)
        .await
        .with_context(|| format!("Failed to read {}", args.output.display()))?;

    let diagnostics = DiagnosticExtractor::new()
        .with_project_root(&config.project.root)
        .extract(&raw, args.stage.into());
    let engine = PatchEngine::new();

    match args.format {
        OutputFormat::Json => {
            let entries: Vec<serde_json::Value> = diagnostics
                .iter()
                .map(|d| {
                    serde_json::json!({
                        "diagnostic": d,
                        "rule": engine.rule_for(d).map(|rule| rule.name),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Text => {
            if diagnostics.is_empty() {
                println!("No diagnostics recognized in {}", args.output.display());
                return Ok(());
            }
            for diagnostic in &diagnostics {
                let rule = engine.rule_for(diagnostic).map(|rule| rule.name).unwrap_or("no applicable rule");
                println!("{}\n  -> {}", diagnostic, rule);
            }
            let unhandled = diagnostics.iter().filter(|d| engine.rule_for(d).is_none()).count();
            println!("\n{} diagnostic(s), {} without a rule", diagnostics.len(), unhandled);
        }
    }
    Ok(())
}

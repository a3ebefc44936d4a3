// Command handlers, one module per subcommand

pub mod diagnose;
pub mod reconcile;
pub mod run;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use testforge_core::config::{CONFIG_FILE, ForgeConfig, load_config};
use tracing::debug;

/// Load the project configuration with its root made absolute.
///
/// A relative root is taken relative to the directory holding the config file.
pub async fn load_project_config(path: Option<&Path>) -> Result<ForgeConfig> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
    let mut config = load_config(&path)
        .await
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;

    let base = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let root = base.join(&config.project.root);
    config.project.root = std::fs::canonicalize(&root).unwrap_or(root);

    debug!("Project root: {}", config.project.root.display());
    Ok(config)
}

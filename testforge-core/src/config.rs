//! Project configuration loaded from `testforge.toml`

use crate::error::{ForgeError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default name of the configuration file at the project root
pub const CONFIG_FILE: &str = "testforge.toml";

/// Retry budget used when nothing else is configured
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeConfig {
    pub project: ProjectConfig,
    pub build: BuildConfig,
    pub session: SessionConfig,
}

/// Layout of the generated test-automation tree
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project root; every other path is relative to it
    pub root: PathBuf,

    /// Feature file or directory of `.feature` files
    pub features: PathBuf,

    /// Java class holding the step definitions
    pub step_definitions: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            features: PathBuf::from("src/test/resources/features"),
            step_definitions: PathBuf::from("src/test/java/steps/StepDefinitions.java"),
        }
    }
}

/// Commands for the two external invocations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub compile: Vec<String>,
    pub test: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            compile: vec!["mvn".to_string(), "-q".to_string(), "test-compile".to_string()],
            test: vec!["mvn".to_string(), "-q".to_string(), "test".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub max_attempts: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { max_attempts: DEFAULT_MAX_ATTEMPTS }
    }
}

impl ForgeConfig {
    /// Resolve a project-relative path against the configured root
    pub fn resolve(&self, relative: &Path) -> PathBuf {
        if relative.is_absolute() { relative.to_path_buf() } else { self.project.root.join(relative) }
    }

    pub fn features_path(&self) -> PathBuf {
        self.resolve(&self.project.features)
    }

    pub fn step_definitions_path(&self) -> PathBuf {
        self.resolve(&self.project.step_definitions)
    }
}

/// Parse configuration text
pub fn parse_config(content: &str, origin: &Path) -> Result<ForgeConfig> {
    toml::from_str(content).map_err(|e| ForgeError::Configuration {
        path: origin.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load configuration from a file; a missing file yields the defaults
pub async fn load_config(path: &Path) -> Result<ForgeConfig> {
    if !path.exists() {
        return Ok(ForgeConfig::default());
    }

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ForgeError::FileAccess { path: path.to_path_buf(), source })?;
    parse_config(&content, path)
}

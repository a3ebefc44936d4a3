//! The two external invocations the retry loop drives
//!
//! [`CommandToolchain`] runs the configured compile and test commands in the
//! project directory. A non-zero exit is a failed invocation, not an error;
//! only a command that cannot be started is an error.

use crate::config::BuildConfig;
use crate::diagnostics::Stage;
use crate::error::{ForgeError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::{debug, info};

/// Outcome of one compile or test run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub success: bool,

    /// Combined stdout and stderr
    pub output: String,
}

impl Invocation {
    pub fn passed(output: impl Into<String>) -> Self {
        Self { success: true, output: output.into() }
    }

    pub fn failed(output: impl Into<String>) -> Self {
        Self { success: false, output: output.into() }
    }
}

#[async_trait]
pub trait Toolchain: Send + Sync {
    async fn compile(&self) -> Result<Invocation>;

    async fn test(&self) -> Result<Invocation>;
}

#[derive(Debug, Clone)]
pub struct CommandToolchain {
    project_root: PathBuf,
    build: BuildConfig,
}

impl CommandToolchain {
    pub fn new(project_root: impl Into<PathBuf>, build: BuildConfig) -> Self {
        Self { project_root: project_root.into(), build }
    }

    async fn run(&self, stage: Stage, command: &[String]) -> Result<Invocation> {
        let Some((program, args)) = command.split_first() else {
            return Err(ForgeError::EmptyCommand { stage: stage.to_string() });
        };
        let command_line = command.join(" ");
        info!("Running {} step: {}", stage, command_line);

        let output = Command::new(program)
            .args(args)
            .current_dir(&self.project_root)
            .output()
            .await
            .map_err(|source| ForgeError::Launch { command: command_line.clone(), source })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let mut combined = stdout.into_owned();
        if !stderr.is_empty() {
            if !combined.is_empty() && !combined.ends_with('\n') {
                combined.push('\n');
            }
            combined.push_str(&stderr);
        }

        debug!("`{}` exited with {} ({} bytes of output)", command_line, output.status, combined.len());
        Ok(Invocation { success: output.status.success(), output: combined })
    }
}

#[async_trait]
impl Toolchain for CommandToolchain {
    async fn compile(&self) -> Result<Invocation> {
        self.run(Stage::Compile, &self.build.compile).await
    }

    async fn test(&self) -> Result<Invocation> {
        self.run(Stage::Test, &self.build.test).await
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell(script: &str) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), script.to_string()]
    }

    #[tokio::test]
    async fn test_exit_status_and_combined_output() {
        let dir = tempfile::tempdir().unwrap();
        let toolchain = CommandToolchain::new(
            dir.path(),
            BuildConfig {
                compile: shell("echo compiled"),
                test: shell("echo out; echo 'error: boom' >&2; exit 1"),
            },
        );

        let compiled = toolchain.compile().await.unwrap();
        assert!(compiled.success);
        assert_eq!(compiled.output, "compiled\n");

        let tested = toolchain.test().await.unwrap();
        assert!(!tested.success);
        assert_eq!(tested.output, "out\nerror: boom\n");
    }

    #[tokio::test]
    async fn test_empty_command() {
        let toolchain = CommandToolchain::new(".", BuildConfig { compile: vec![], test: vec![] });
        assert!(matches!(toolchain.compile().await, Err(ForgeError::EmptyCommand { .. })));
    }

    #[tokio::test]
    async fn test_missing_program_is_a_launch_error() {
        let toolchain = CommandToolchain::new(
            ".",
            BuildConfig {
                compile: vec!["testforge-no-such-program".to_string(), "--quiet".to_string()],
                test: vec![],
            },
        );
        match toolchain.compile().await {
            Err(ForgeError::Launch { command, .. }) => {
                assert_eq!(command, "testforge-no-such-program --quiet")
            }
            other => panic!("expected a launch error, got {:?}", other.map(|i| i.success)),
        }
    }
}

//! Error types for testforge operations
//!
//! Expected session outcomes (success, exhausted retries, unrecoverable
//! diagnostics) are ordinary return values. These errors cover faults only:
//! file access, spawning the build tool, and malformed configuration or input.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForgeError {
    /// Reading or writing a generated source file failed
    #[error("File access failed for {path}: {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The build or test command could not be started
    #[error("Failed to launch `{command}`: {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A configured command was empty
    #[error("Command for {stage} is empty")]
    EmptyCommand { stage: String },

    /// Configuration file could not be parsed
    #[error("Configuration error in {path}: {message}")]
    Configuration { path: PathBuf, message: String },

    /// A feature file could not be parsed
    #[error("Failed to parse feature file {path}: {message}")]
    FeatureParse { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ForgeError>;

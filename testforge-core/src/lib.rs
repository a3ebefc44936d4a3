//! Core functionality for testforge
//!
//! This crate holds the repair loop for generated test-automation sources:
//! diagnostic extraction from build and test output, step reconciliation
//! between feature files and step definitions, the rewrite rule catalogue,
//! and the bounded retry controller that ties them together.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod patch;
pub mod report;
pub mod session;
pub mod steps;
pub mod toolchain;
pub mod workspace;

pub use config::{ForgeConfig, load_config};
pub use diagnostics::{Diagnostic, DiagnosticCategory, Stage, extract};
pub use error::{ForgeError, Result};
pub use patch::{PatchEngine, PatchOutcome};
pub use session::{SessionOptions, SessionOutcome, SessionReport, run_session};
pub use steps::{Reconciliation, reconcile_steps};
pub use toolchain::{CommandToolchain, Invocation, Toolchain};
pub use workspace::{FileStore, FsFileStore};

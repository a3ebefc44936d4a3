//! The Generate → Build → Diagnose → Patch retry loop
//!
//! [`RetrySession`] is an immutable value: every transition consumes the
//! session and returns the next one, carrying the attempt counter and the
//! full history along. [`run_session`] drives the transitions against a
//! [`Toolchain`](crate::toolchain::Toolchain) and a
//! [`FileStore`](crate::workspace::FileStore).

pub mod controller;


use crate::config::{DEFAULT_MAX_ATTEMPTS, ForgeConfig};
use crate::diagnostics::{Diagnostic, Stage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub use controller::run_session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Compiling,
    Testing,
    /// Applying fixes for diagnostics produced by the given stage
    Patching(Stage),
    Succeeded,
    FailedExhausted,
    FailedUnrecoverable,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::FailedExhausted | Self::FailedUnrecoverable)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compiling => write!(f, "Compiling"),
            Self::Testing => write!(f, "Testing"),
            Self::Patching(stage) => write!(f, "Patching ({} failures)", stage),
            Self::Succeeded => write!(f, "Succeeded"),
            Self::FailedExhausted => write!(f, "Failed (retries exhausted)"),
            Self::FailedUnrecoverable => write!(f, "Failed (unrecoverable)"),
        }
    }
}

/// One rule application recorded in the history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedPatch {
    pub path: String,
    pub rule: String,
    pub changed: bool,
}

/// One failed invocation and what was done about it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub attempt: u32,
    pub stage: Stage,
    pub diagnostics: Vec<Diagnostic>,
    pub patches: Vec<AppliedPatch>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnrecoverableCause {
    /// The invocation failed but no diagnostic could be extracted
    UnparsedOutput { excerpt: String },
    NoApplicableRule { diagnostic: Diagnostic },
    /// The diagnostic names no file to patch
    UnresolvedTarget { diagnostic: Diagnostic },
}

impl fmt::Display for UnrecoverableCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnparsedOutput { .. } => write!(f, "build failed with output no matcher recognized"),
            Self::NoApplicableRule { diagnostic } => write!(f, "no rule applies to {}", diagnostic),
            Self::UnresolvedTarget { diagnostic } => write!(f, "no file to patch for {}", diagnostic),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionOutcome {
    Succeeded { attempts: u32 },
    FailedExhausted { last_diagnostics: Vec<Diagnostic> },
    FailedUnrecoverable { cause: UnrecoverableCause },
}

impl SessionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

impl fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded { attempts } => write!(f, "succeeded on attempt {}", attempts),
            Self::FailedExhausted { last_diagnostics } => {
                write!(f, "failed, retries exhausted with {} diagnostics outstanding", last_diagnostics.len())
            }
            Self::FailedUnrecoverable { cause } => write!(f, "failed, {}", cause),
        }
    }
}

/// Terminal outcome plus every recorded attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionReport {
    pub outcome: SessionOutcome,
    pub history: Vec<AttemptRecord>,
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub max_attempts: u32,

    /// Where stubs for undefined steps are inserted, relative to the store root
    pub step_definitions: PathBuf,

    /// Absolute paths under this root are reported relative to it
    pub project_root: Option<PathBuf>,
}

impl SessionOptions {
    pub fn new(step_definitions: impl Into<PathBuf>) -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            step_definitions: step_definitions.into(),
            project_root: None,
        }
    }

    pub fn from_config(config: &ForgeConfig) -> Self {
        Self {
            max_attempts: config.session.max_attempts,
            step_definitions: config.project.step_definitions.clone(),
            project_root: Some(config.project.root.clone()),
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = Some(root.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrySession {
    attempt: u32,
    max_attempts: u32,
    phase: Phase,
    history: Vec<AttemptRecord>,
    outcome: Option<SessionOutcome>,
}

impl RetrySession {
    pub fn new(max_attempts: u32) -> Self {
        Self { attempt: 1, max_attempts, phase: Phase::Compiling, history: Vec::new(), outcome: None }
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn history(&self) -> &[AttemptRecord] {
        &self.history
    }

    /// Diagnostics awaiting patches, while in [`Phase::Patching`]
    pub fn pending_diagnostics(&self) -> &[Diagnostic] {
        match (self.phase, self.history.last()) {
            (Phase::Patching(_), Some(record)) => &record.diagnostics,
            _ => &[],
        }
    }

    /// Stage the next invocation runs, if one is due
    pub fn due_stage(&self) -> Option<Stage> {
        match self.phase {
            Phase::Compiling => Some(Stage::Compile),
            Phase::Testing => Some(Stage::Test),
            _ => None,
        }
    }

    /// Ends the session if the retry budget is spent
    pub fn check_budget(self) -> Self {
        if self.phase.is_terminal() || self.attempt <= self.max_attempts {
            return self;
        }
        let last_diagnostics =
            self.history.last().map(|record| record.diagnostics.clone()).unwrap_or_default();
        warn!("Giving up after {} attempts", self.max_attempts);
        self.finish(Phase::FailedExhausted, SessionOutcome::FailedExhausted { last_diagnostics })
    }

    /// The due invocation succeeded
    pub fn passed(self) -> Self {
        match self.phase {
            Phase::Compiling => {
                info!("Attempt {}: compile succeeded", self.attempt);
                self.enter(Phase::Testing)
            }
            Phase::Testing => {
                info!("Attempt {}: tests passed", self.attempt);
                let attempts = self.attempt;
                self.finish(Phase::Succeeded, SessionOutcome::Succeeded { attempts })
            }
            _ => self,
        }
    }

    /// The due invocation failed with these diagnostics
    pub fn failed(self, diagnostics: Vec<Diagnostic>) -> Self {
        let Some(stage) = self.due_stage() else {
            return self;
        };
        info!("Attempt {}: {} failed with {} diagnostics", self.attempt, stage, diagnostics.len());

        let record = AttemptRecord { attempt: self.attempt, stage, diagnostics, patches: Vec::new() };
        let mut history = self.history;
        history.push(record);
        Self { history, phase: Phase::Patching(stage), ..self }
    }

    /// Patches for the pending diagnostics were applied; retry the failing stage
    pub fn patched(self, patches: Vec<AppliedPatch>) -> Self {
        let Phase::Patching(stage) = self.phase else {
            return self;
        };
        debug!("Attempt {}: applied {} patches", self.attempt, patches.len());

        let mut history = self.history;
        if let Some(record) = history.last_mut() {
            record.patches = patches;
        }
        let phase = match stage {
            Stage::Compile => Phase::Compiling,
            Stage::Test => Phase::Testing,
        };
        Self { attempt: self.attempt + 1, history, phase, ..self }
    }

    pub fn unrecoverable(self, cause: UnrecoverableCause) -> Self {
        warn!("Attempt {}: {}", self.attempt, cause);
        self.finish(Phase::FailedUnrecoverable, SessionOutcome::FailedUnrecoverable { cause })
    }

    /// The report once the session is terminal, otherwise the session itself
    pub fn into_report(self) -> std::result::Result<SessionReport, Self> {
        match self.outcome {
            Some(outcome) => Ok(SessionReport { outcome, history: self.history }),
            None => Err(self),
        }
    }

    fn enter(self, phase: Phase) -> Self {
        debug!("{} -> {}", self.phase, phase);
        Self { phase, ..self }
    }

    fn finish(self, phase: Phase, outcome: SessionOutcome) -> Self {
        let session = self.enter(phase);
        Self { outcome: Some(outcome), ..session }
    }
}

//! Drives a [`RetrySession`] to a terminal phase

use super::{AppliedPatch, Phase, RetrySession, SessionOptions, SessionReport, UnrecoverableCause};
use crate::diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticExtractor, Stage};
use crate::error::Result;
use crate::patch::PatchEngine;
use crate::toolchain::Toolchain;
use crate::workspace::FileStore;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info};

/// Lines of unparsed output kept in an unrecoverable report
const EXCERPT_LINES: usize = 20;

/// Run compile and test until they pass, the budget runs out, or a failure
/// cannot be repaired.
///
/// Expected outcomes, including both kinds of failure, are returned in the
/// report. An `Err` means the loop itself broke: a file could not be read or
/// written, or a command could not be started.
pub async fn run_session(
    toolchain: &dyn Toolchain,
    store: &dyn FileStore,
    options: &SessionOptions,
) -> Result<SessionReport> {
    let engine = PatchEngine::new();
    let extractor = match &options.project_root {
        Some(root) => DiagnosticExtractor::new().with_project_root(root),
        None => DiagnosticExtractor::new(),
    };

    info!("Starting session with up to {} attempts", options.max_attempts);
    let mut session = RetrySession::new(options.max_attempts);

    loop {
        session = match session.into_report() {
            Ok(report) => {
                info!("Session finished: {}", report.outcome);
                return Ok(report);
            }
            Err(session) => session,
        };

        session = match session.phase() {
            Phase::Compiling | Phase::Testing => {
                let session = session.check_budget();
                match session.due_stage() {
                    Some(stage) => invoke(session, stage, toolchain, &extractor).await?,
                    None => session,
                }
            }
            Phase::Patching(_) => match plan_patches(&engine, session.pending_diagnostics(), options) {
                Err(cause) => session.unrecoverable(cause),
                Ok(plan) => {
                    let applied = apply_plan(&engine, store, plan).await?;
                    session.patched(applied)
                }
            },
            Phase::Succeeded | Phase::FailedExhausted | Phase::FailedUnrecoverable => session,
        };
    }
}

async fn invoke(
    session: RetrySession,
    stage: Stage,
    toolchain: &dyn Toolchain,
    extractor: &DiagnosticExtractor,
) -> Result<RetrySession> {
    info!("Attempt {}/{}: {}", session.attempt(), session.max_attempts(), stage);

    let invocation = match stage {
        Stage::Compile => toolchain.compile().await?,
        Stage::Test => toolchain.test().await?,
    };
    if invocation.success {
        return Ok(session.passed());
    }

    let diagnostics = extractor.extract(&invocation.output, stage);
    if diagnostics.is_empty() {
        let cause = UnrecoverableCause::UnparsedOutput { excerpt: excerpt(&invocation.output) };
        return Ok(session.failed(diagnostics).unrecoverable(cause));
    }
    Ok(session.failed(diagnostics))
}

/// Diagnostics grouped by target file; files in path order, each file's
/// diagnostics in the order they were reported
type PatchPlan = BTreeMap<PathBuf, Vec<Diagnostic>>;

/// Check every diagnostic has a rule and a target before anything is written
fn plan_patches(
    engine: &PatchEngine,
    diagnostics: &[Diagnostic],
    options: &SessionOptions,
) -> std::result::Result<PatchPlan, UnrecoverableCause> {
    let mut plan = PatchPlan::new();
    for diagnostic in diagnostics {
        if engine.rule_for(diagnostic).is_none() {
            return Err(UnrecoverableCause::NoApplicableRule { diagnostic: diagnostic.clone() });
        }

        let target = if diagnostic.category == DiagnosticCategory::UndefinedStep {
            options.step_definitions.clone()
        } else if diagnostic.has_source() {
            PathBuf::from(&diagnostic.source_path)
        } else {
            return Err(UnrecoverableCause::UnresolvedTarget { diagnostic: diagnostic.clone() });
        };
        plan.entry(target).or_default().push(diagnostic.clone());
    }
    Ok(plan)
}

/// One read-modify-write per file
async fn apply_plan(
    engine: &PatchEngine,
    store: &dyn FileStore,
    plan: PatchPlan,
) -> Result<Vec<AppliedPatch>> {
    let mut applied = Vec::new();
    for (path, diagnostics) in plan {
        let original = store.read(&path).await?;
        let mut content = original.clone();

        for diagnostic in &diagnostics {
            let outcome = engine.patch(diagnostic, &content);
            applied.push(AppliedPatch {
                path: path.to_string_lossy().into_owned(),
                rule: outcome.rule.unwrap_or_default().to_string(),
                changed: outcome.changed,
            });
            content = outcome.content;
        }

        if content != original {
            info!("Patched {} ({} diagnostics)", path.display(), diagnostics.len());
            store.write(&path, &content).await?;
        } else {
            debug!("{} already up to date", path.display());
        }
    }
    Ok(applied)
}

fn excerpt(output: &str) -> String {
    let lines: Vec<&str> = output.lines().filter(|line| !line.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(EXCERPT_LINES);
    lines[start..].join("\n")
}

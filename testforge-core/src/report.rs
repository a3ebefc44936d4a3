//! Plain session history dump, as text or JSON

use crate::error::Result;
use crate::session::{SessionOutcome, SessionReport, UnrecoverableCause};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use uuid::Uuid;

/// A finished session stamped for archiving
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    #[serde(flatten)]
    pub report: SessionReport,
}

impl SessionRecord {
    pub fn new(report: SessionReport, started_at: DateTime<Utc>) -> Self {
        Self { id: Uuid::new_v4(), started_at, finished_at: Utc::now(), report }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let elapsed = self.finished_at - self.started_at;
        let _ = writeln!(out, "Session {} ({:.1}s)", self.id, elapsed.num_milliseconds() as f64 / 1000.0);
        out.push_str(&render_text(&self.report));
        out
    }
}

/// Human-readable summary of a report
pub fn render_text(report: &SessionReport) -> String {
    let mut out = String::new();

    for record in &report.history {
        let _ = writeln!(
            out,
            "Attempt {} ({}): {} diagnostics",
            record.attempt,
            record.stage,
            record.diagnostics.len()
        );
        for diagnostic in &record.diagnostics {
            let _ = writeln!(out, "  {}", diagnostic);
        }
        for patch in &record.patches {
            let status = if patch.changed { "applied" } else { "no change" };
            let _ = writeln!(out, "  -> {} on {} ({})", patch.rule, patch.path, status);
        }
    }

    match &report.outcome {
        SessionOutcome::Succeeded { attempts } => {
            let _ = writeln!(out, "SUCCEEDED after {} attempt(s)", attempts);
        }
        SessionOutcome::FailedExhausted { last_diagnostics } => {
            let _ = writeln!(out, "FAILED: retry budget exhausted");
            for diagnostic in last_diagnostics {
                let _ = writeln!(out, "  {}", diagnostic);
            }
        }
        SessionOutcome::FailedUnrecoverable { cause } => {
            let _ = writeln!(out, "FAILED: {}", cause);
            match cause {
                UnrecoverableCause::UnparsedOutput { excerpt } => {
                    for line in excerpt.lines() {
                        let _ = writeln!(out, "  | {}", line);
                    }
                }
                UnrecoverableCause::NoApplicableRule { diagnostic }
                | UnrecoverableCause::UnresolvedTarget { diagnostic } => {
                    for line in diagnostic.raw_message.lines() {
                        let _ = writeln!(out, "  | {}", line);
                    }
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{Diagnostic, DiagnosticCategory, Stage, SymbolKind};
    use crate::session::{AppliedPatch, AttemptRecord};

    fn locator() -> Diagnostic {
        Diagnostic::new(DiagnosticCategory::UnresolvedSymbol, "cannot find symbol\n  symbol:   class Locator")
            .at("pages/LoginPage.java", Some(4))
            .with_symbol(SymbolKind::Class, "Locator")
    }

    fn repaired() -> SessionReport {
        SessionReport {
            outcome: SessionOutcome::Succeeded { attempts: 2 },
            history: vec![AttemptRecord {
                attempt: 1,
                stage: Stage::Compile,
                diagnostics: vec![locator()],
                patches: vec![AppliedPatch {
                    path: "pages/LoginPage.java".to_string(),
                    rule: "add-missing-import".to_string(),
                    changed: true,
                }],
            }],
        }
    }

    #[test]
    fn test_render_text() {
        let text = render_text(&repaired());
        assert_eq!(
            text,
            "\
Attempt 1 (compile): 1 diagnostics
  pages/LoginPage.java:4: [unresolved symbol] cannot find symbol (Locator)
  -> add-missing-import on pages/LoginPage.java (applied)
SUCCEEDED after 2 attempt(s)
"
        );
    }

    #[test]
    fn test_render_unrecoverable_shows_raw_message() {
        let report = SessionReport {
            outcome: SessionOutcome::FailedUnrecoverable {
                cause: UnrecoverableCause::NoApplicableRule { diagnostic: locator() },
            },
            history: vec![],
        };
        let text = render_text(&report);
        assert!(text.starts_with("FAILED: no rule applies to pages/LoginPage.java:4"));
        assert!(text.contains("  |   symbol:   class Locator"));
    }

    #[test]
    fn test_json_record() {
        let record = SessionRecord::new(repaired(), Utc::now());
        let json: serde_json::Value = serde_json::from_str(&record.to_json().unwrap()).unwrap();

        assert_eq!(json["outcome"]["status"], "succeeded");
        assert_eq!(json["outcome"]["attempts"], 2);
        assert_eq!(json["history"][0]["stage"], "compile");
        assert_eq!(json["history"][0]["diagnostics"][0]["category"], "UnresolvedSymbol");
        assert_eq!(json["id"], record.id.to_string());
    }
}

//! Diagnostic-driven source rewriting
//!
//! A [`PatchEngine`] holds an ordered catalogue of [`PatchRule`]s. For a given
//! diagnostic the first rule whose predicate matches is applied to the
//! offending file's content; no other rule is consulted.

pub mod imports;
pub mod rules;

use crate::diagnostics::Diagnostic;
use serde::Serialize;
use tracing::debug;

pub use rules::{catalogue, insert_import, insert_stubs_with_imports};

/// A predicate over diagnostics paired with a pure content transform
#[derive(Clone, Copy)]
pub struct PatchRule {
    pub name: &'static str,
    pub matches: fn(&Diagnostic) -> bool,
    pub apply: fn(&str, &Diagnostic) -> String,
}

impl std::fmt::Debug for PatchRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatchRule").field("name", &self.name).finish()
    }
}

/// Result of patching one file for one diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchOutcome {
    pub content: String,

    /// Whether `content` differs from the input
    pub changed: bool,

    /// Name of the rule that handled the diagnostic; `None` when no rule applies
    pub rule: Option<&'static str>,
}

impl PatchOutcome {
    pub fn is_applicable(&self) -> bool {
        self.rule.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct PatchEngine {
    rules: Vec<PatchRule>,
}

impl PatchEngine {
    /// Engine with the default catalogue
    pub fn new() -> Self {
        Self { rules: catalogue() }
    }

    pub fn with_rules(rules: Vec<PatchRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[PatchRule] {
        &self.rules
    }

    /// First rule in catalogue order that matches
    pub fn rule_for(&self, diagnostic: &Diagnostic) -> Option<&PatchRule> {
        self.rules.iter().find(|rule| (rule.matches)(diagnostic))
    }

    pub fn patch(&self, diagnostic: &Diagnostic, content: &str) -> PatchOutcome {
        let Some(rule) = self.rule_for(diagnostic) else {
            debug!("No rule for {}", diagnostic);
            return PatchOutcome { content: content.to_string(), changed: false, rule: None };
        };

        let patched = (rule.apply)(content, diagnostic);
        let changed = patched != content;
        debug!("Rule {} {} {}", rule.name, if changed { "rewrote" } else { "left unchanged" }, diagnostic);

        PatchOutcome { content: patched, changed, rule: Some(rule.name) }
    }
}

impl Default for PatchEngine {
    fn default() -> Self {
        Self::new()
    }
}

//! Step reconciliation between Gherkin scenarios and Java step definitions
//!
//! Scenario steps and implemented steps are compared by their normalized text
//! only. Normalization strips the Gherkin keyword, collapses whitespace and
//! drops trailing punctuation, and is applied identically on both sides.

pub mod classifier;
pub mod reconciler;
pub mod sources;
pub mod templates;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use classifier::{StubIntent, classify_intent, classify_keyword};
pub use reconciler::{Reconciliation, StepStub, insert_stubs, reconcile_steps};
pub use regex_utils::step_text::normalize;
pub use sources::{load_scenario_steps, parse_feature, parse_implemented_steps};

/// Grammatical role of a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepKeyword {
    Given,
    When,
    Then,
}

impl StepKeyword {
    /// Java annotation name for the keyword
    pub fn annotation(&self) -> &'static str {
        match self {
            Self::Given => "Given",
            Self::When => "When",
            Self::Then => "Then",
        }
    }
}

impl fmt::Display for StepKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.annotation())
    }
}

/// A declared step line from a scenario
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScenarioStep {
    text: String,
}

impl ScenarioStep {
    pub fn new(text: &str) -> Self {
        Self { text: normalize(text) }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for ScenarioStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A step already bound to a step-definition method
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImplementedStep {
    text: String,
    pub keyword: StepKeyword,
}

impl ImplementedStep {
    pub fn new(text: &str, keyword: StepKeyword) -> Self {
        Self { text: normalize(text), keyword }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Escape step text for use as a Cucumber expression inside a Java string literal
pub fn escape_expression(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            // `\\` in the expression, each backslash doubled again for Java
            '\\' => escaped.push_str("\\\\\\\\"),
            '"' => escaped.push_str("\\\""),
            '(' | ')' | '{' | '}' | '/' => {
                escaped.push_str("\\\\");
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Recover plain step text from the contents of a step annotation's string literal.
///
/// Undoes Java string escapes, then Cucumber expression escapes, and strips the
/// `^`/`$` anchors of regex-style step definitions.
pub fn unescape_expression(literal: &str) -> String {
    let java = unescape_java(literal);

    let mut text = String::with_capacity(java.len());
    let mut chars = java.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if matches!(next, '\\' | '(' | ')' | '{' | '}' | '/') {
                    text.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        text.push(c);
    }

    if let Some(anchored) = text.strip_prefix('^') {
        return anchored.strip_suffix('$').unwrap_or(anchored).to_string();
    }
    text
}

fn unescape_java(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len());
    let mut chars = literal.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Escape text for a plain Java string literal
pub fn escape_java(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

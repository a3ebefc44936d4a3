//! Keyword-pattern classification of step text

use super::StepKeyword;
use regex::Regex;
use regex_utils::step_phrasing;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Infer the grammatical role of a step from its phrasing.
///
/// Setup phrasing wins over interaction verbs, which win over outcome
/// phrasing; anything unrecognized is treated as an outcome.
pub fn classify_keyword(text: &str) -> StepKeyword {
    let lower = text.to_lowercase();

    if step_phrasing::describes_setup(&lower) {
        StepKeyword::Given
    } else if step_phrasing::INTERACTION.is_match(&lower) {
        StepKeyword::When
    } else if step_phrasing::OUTCOME.is_match(&lower) {
        StepKeyword::Then
    } else {
        StepKeyword::Then
    }
}

/// What a synthesized stub is meant to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StubIntent {
    Navigation,
    Click,
    Type,
    VisibilityAssert,
    EnabledAssert,
    ContainsAssert,
    Wait,
    ErrorAssert,
    SuccessAssert,
    Generic,
}

impl fmt::Display for StubIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Navigation => "navigation",
            Self::Click => "click",
            Self::Type => "type",
            Self::VisibilityAssert => "visibility-assert",
            Self::EnabledAssert => "enabled-assert",
            Self::ContainsAssert => "contains-assert",
            Self::Wait => "wait",
            Self::ErrorAssert => "error-assert",
            Self::SuccessAssert => "success-assert",
            Self::Generic => "generic",
        };
        f.write_str(name)
    }
}

/// Ordered intent rules; the first pattern that matches decides
fn intent_rules() -> [(&'static Regex, StubIntent); 9] {
    [
        (&*step_phrasing::WAIT, StubIntent::Wait),
        (&*step_phrasing::ERROR_ASSERT, StubIntent::ErrorAssert),
        (&*step_phrasing::ENABLED_ASSERT, StubIntent::EnabledAssert),
        (&*step_phrasing::CONTAINS_ASSERT, StubIntent::ContainsAssert),
        (&*step_phrasing::SUCCESS_ASSERT, StubIntent::SuccessAssert),
        (&*step_phrasing::VISIBILITY_ASSERT, StubIntent::VisibilityAssert),
        (&*step_phrasing::NAVIGATION, StubIntent::Navigation),
        (&*step_phrasing::TYPE_TEXT, StubIntent::Type),
        (&*step_phrasing::CLICK, StubIntent::Click),
    ]
}

/// Pick the stub template for a step
pub fn classify_intent(text: &str) -> StubIntent {
    let lower = text.to_lowercase();
    intent_rules()
        .into_iter()
        .find(|(pattern, _)| pattern.is_match(&lower))
        .map(|(_, intent)| intent)
        .unwrap_or(StubIntent::Generic)
}

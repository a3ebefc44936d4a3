//! Set difference between declared and implemented steps, plus stub synthesis

use super::templates::{method_name, render_stub};
use super::{
    ImplementedStep, ScenarioStep, StepKeyword, StubIntent, classify_intent, classify_keyword,
    normalize, parse_implemented_steps,
};
use regex_utils::java;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

/// A synthesized step-definition method for one missing step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepStub {
    pub step: ScenarioStep,
    pub keyword: StepKeyword,
    pub intent: StubIntent,
    pub method_name: String,
    pub source: String,
}

impl StepStub {
    pub fn new(step: ScenarioStep) -> Self {
        let keyword = classify_keyword(step.text());
        let intent = classify_intent(step.text());
        let name = method_name(step.text());
        let source = render_stub(keyword, intent, step.text(), &name);
        Self { step, keyword, intent, method_name: name, source }
    }

    /// Same stub under a different method name
    pub fn renamed(&self, name: &str) -> Self {
        Self {
            step: self.step.clone(),
            keyword: self.keyword,
            intent: self.intent,
            method_name: name.to_string(),
            source: render_stub(self.keyword, self.intent, self.step.text(), name),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    /// Missing steps, deduplicated and sorted by text
    pub missing: Vec<ScenarioStep>,

    /// One stub per missing step, in the same order
    pub stubs: Vec<StepStub>,
}

impl Reconciliation {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Compute `normalize(scenario) \ normalize(implemented)` and a stub for each gap
pub fn reconcile_steps(scenario: &[ScenarioStep], implemented: &[ImplementedStep]) -> Reconciliation {
    let implemented: HashSet<String> = implemented.iter().map(|s| normalize(s.text())).collect();

    let missing: BTreeSet<String> = scenario
        .iter()
        .map(|s| normalize(s.text()))
        .filter(|text| !text.is_empty() && !implemented.contains(text))
        .collect();

    let missing: Vec<ScenarioStep> = missing.iter().map(|text| ScenarioStep::new(text)).collect();

    let mut taken = HashSet::new();
    let stubs = missing
        .iter()
        .map(|step| {
            let stub = StepStub::new(step.clone());
            let name = unique_name(&stub.method_name, &taken);
            taken.insert(name.clone());
            if name == stub.method_name { stub } else { stub.renamed(&name) }
        })
        .collect();

    debug!("Reconciled {} scenario steps: {} missing", scenario.len(), missing.len());
    Reconciliation { missing, stubs }
}

/// Insert stubs before the closing brace of the step-definition class.
///
/// Stubs whose step is already implemented in `content` are skipped and method
/// names are made unique against the methods already declared, so inserting
/// the same stubs twice changes nothing the second time.
pub fn insert_stubs(content: &str, stubs: &[StepStub]) -> String {
    let implemented: HashSet<String> =
        parse_implemented_steps(content).iter().map(|s| s.text().to_string()).collect();
    let mut taken: HashSet<String> = java::declared_methods(content).map(str::to_string).collect();

    let mut rendered = Vec::new();
    let mut seen = HashSet::new();
    for stub in stubs {
        let text = stub.step.text().to_string();
        if implemented.contains(&text) || !seen.insert(text) {
            continue;
        }
        let name = unique_name(&stub.method_name, &taken);
        taken.insert(name.clone());
        rendered.push(if name == stub.method_name { stub.source.clone() } else { stub.renamed(&name).source });
    }

    if rendered.is_empty() {
        return content.to_string();
    }

    let block = rendered.join("\n\n");
    match content.rfind('}') {
        Some(close) => {
            let head = content[..close].trim_end();
            format!("{}\n\n{}\n{}", head, block, &content[close..])
        }
        None if content.trim().is_empty() => format!("{}\n", block),
        None => format!("{}\n\n{}\n", content.trim_end(), block),
    }
}

fn unique_name(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{}{}", base, n))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario(texts: &[&str]) -> Vec<ScenarioStep> {
        texts.iter().map(|t| ScenarioStep::new(t)).collect()
    }

    const STEP_FILE: &str = r#"package steps;

import io.cucumber.java.en.Given;
import io.cucumber.java.en.When;

public class LoginSteps {
    @Given("user is on login page")
    public void userIsOnLoginPage() {
        loginPage.open();
    }

    @When("user enters username")
    public void userEntersUsername() {
        loginPage.enterUsername("demo");
    }
}
"#;

    #[test]
    fn test_login_example() {
        let declared = scenario(&[
            "Given user is on login page",
            "When user enters username",
            "Then user should be logged in",
        ]);
        let implemented = parse_implemented_steps(STEP_FILE);

        let result = reconcile_steps(&declared, &implemented);

        assert_eq!(result.missing, scenario(&["user should be logged in"]));
        assert_eq!(result.stubs.len(), 1);
        assert_eq!(result.stubs[0].keyword, StepKeyword::Then);
        assert!(result.stubs[0].source.contains("@Then(\"user should be logged in\")"));
    }

    #[test]
    fn test_missing_is_a_set_difference() {
        let implemented = vec![ImplementedStep::new("b", StepKeyword::Given)];
        let forward = reconcile_steps(&scenario(&["a", "b", "c", "a", "And c."]), &implemented);
        let backward = reconcile_steps(&scenario(&["c", "a", "b"]), &implemented);

        assert_eq!(forward.missing, scenario(&["a", "c"]));
        assert_eq!(forward.missing, backward.missing);
        assert_eq!(forward.stubs.len(), 2);
    }

    #[test]
    fn test_nothing_missing() {
        let implemented = vec![ImplementedStep::new("user is on login page", StepKeyword::Given)];
        let result = reconcile_steps(&scenario(&["Given user is on login page"]), &implemented);
        assert!(result.is_complete());
        assert!(result.stubs.is_empty());
    }

    #[test]
    fn test_inserted_stubs_complete_the_implementation() {
        let declared = scenario(&[
            "Given user is on login page",
            "When user enters username",
            "When user clicks (submit)",
            r#"Then the banner reads "Welcome/Bienvenue""#,
            "Then user should be logged in",
        ]);
        let first = reconcile_steps(&declared, &parse_implemented_steps(STEP_FILE));
        assert_eq!(first.missing.len(), 3);

        let patched = insert_stubs(STEP_FILE, &first.stubs);
        let second = reconcile_steps(&declared, &parse_implemented_steps(&patched));

        assert!(second.is_complete(), "still missing: {:?}", second.missing);
        assert!(patched.trim_end().ends_with('}'));
        assert_eq!(patched.matches('{').count(), patched.matches('}').count());
    }

    #[test]
    fn test_insert_stubs_is_idempotent() {
        let declared = scenario(&["Then user should be logged in"]);
        let result = reconcile_steps(&declared, &parse_implemented_steps(STEP_FILE));

        let once = insert_stubs(STEP_FILE, &result.stubs);
        let twice = insert_stubs(&once, &result.stubs);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_method_names_do_not_collide() {
        let content = "public class S {\n    public void userShouldBeLoggedIn() {\n    }\n}\n";
        let result = reconcile_steps(&scenario(&["user should be logged in"]), &[]);

        let patched = insert_stubs(content, &result.stubs);
        assert!(patched.contains("public void userShouldBeLoggedIn2()"));
    }

    #[test]
    fn test_stub_names_unique_within_one_reconciliation() {
        let result = reconcile_steps(&scenario(&["user page", "user-page"]), &[]);
        let names: Vec<_> = result.stubs.iter().map(|s| s.method_name.as_str()).collect();
        assert_eq!(names, vec!["userPage", "userPage2"]);
        assert!(result.stubs[1].source.contains("public void userPage2()"));
    }
}

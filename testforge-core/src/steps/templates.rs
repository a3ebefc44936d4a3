//! Java source templates for synthesized step definitions
//!
//! One template per [`StubIntent`]. Bodies only print a marker line so the
//! generated method compiles against any step-definition class; wiring them
//! to page objects is left to the author.

use super::{StepKeyword, StubIntent, escape_expression, escape_java};

const INDENT: &str = "    ";

/// Render a complete step-definition method
pub fn render_stub(keyword: StepKeyword, intent: StubIntent, text: &str, method_name: &str) -> String {
    let body = match intent {
        StubIntent::Navigation => navigation(text),
        StubIntent::Click => click(text),
        StubIntent::Type => type_text(text),
        StubIntent::VisibilityAssert => visibility_assert(text),
        StubIntent::EnabledAssert => enabled_assert(text),
        StubIntent::ContainsAssert => contains_assert(text),
        StubIntent::Wait => wait(text),
        StubIntent::ErrorAssert => error_assert(text),
        StubIntent::SuccessAssert => success_assert(text),
        StubIntent::Generic => generic(text),
    };

    let mut method = format!(
        "{INDENT}@{}(\"{}\")\n{INDENT}public void {}() {{\n",
        keyword.annotation(),
        escape_expression(text),
        method_name
    );
    for line in body {
        method.push_str(INDENT);
        method.push_str(INDENT);
        method.push_str(&line);
        method.push('\n');
    }
    method.push_str(INDENT);
    method.push('}');
    method
}

fn marker(label: &str, text: &str) -> String {
    format!("System.out.println(\"[testforge] {}: {}\");", label, escape_java(text))
}

fn navigation(text: &str) -> Vec<String> {
    vec!["// open the page this step refers to".to_string(), marker("navigate", text)]
}

fn click(text: &str) -> Vec<String> {
    vec!["// locate the target element and click it".to_string(), marker("click", text)]
}

fn type_text(text: &str) -> Vec<String> {
    vec!["// locate the input field and fill in the value".to_string(), marker("type", text)]
}

fn visibility_assert(text: &str) -> Vec<String> {
    vec!["// assert that the element is visible".to_string(), marker("assert visible", text)]
}

fn enabled_assert(text: &str) -> Vec<String> {
    vec!["// assert the element's enabled state".to_string(), marker("assert enabled", text)]
}

fn contains_assert(text: &str) -> Vec<String> {
    vec!["// assert that the element text contains the expected value".to_string(), marker("assert contains", text)]
}

fn wait(text: &str) -> Vec<String> {
    vec!["// wait for the page or element to settle".to_string(), marker("wait", text)]
}

fn error_assert(text: &str) -> Vec<String> {
    vec!["// assert that the error message is shown".to_string(), marker("assert error", text)]
}

fn success_assert(text: &str) -> Vec<String> {
    vec!["// assert the post-action success state".to_string(), marker("assert success", text)]
}

fn generic(text: &str) -> Vec<String> {
    vec![marker("pending", text)]
}

/// camelCase Java identifier for a step
pub fn method_name(text: &str) -> String {
    let mut name = String::new();
    for word in text.split(|c: char| !c.is_ascii_alphanumeric()).filter(|w| !w.is_empty()) {
        let mut chars = word.chars();
        let Some(first) = chars.next() else { continue };
        if name.is_empty() {
            name.push(first.to_ascii_lowercase());
            name.extend(chars.map(|c| c.to_ascii_lowercase()));
        } else {
            name.push(first.to_ascii_uppercase());
            name.extend(chars.map(|c| c.to_ascii_lowercase()));
        }
    }

    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert_str(0, "step");
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_name() {
        assert_eq!(method_name("user should be logged in"), "userShouldBeLoggedIn");
        assert_eq!(method_name("the URL contains \"/home\""), "theUrlContainsHome");
        assert_eq!(method_name("3 items are in the cart"), "step3ItemsAreInTheCart");
        assert_eq!(method_name("!!!"), "step");
    }

    #[test]
    fn test_success_template() {
        let source = render_stub(
            StepKeyword::Then,
            StubIntent::SuccessAssert,
            "user should be logged in",
            "userShouldBeLoggedIn",
        );

        assert_eq!(
            source,
            r#"    @Then("user should be logged in")
    public void userShouldBeLoggedIn() {
        // assert the post-action success state
        System.out.println("[testforge] assert success: user should be logged in");
    }"#
        );
    }

    #[test]
    fn test_generic_template_escapes_text() {
        let source = render_stub(StepKeyword::Then, StubIntent::Generic, r#"it says "hi" (twice)"#, "itSaysHiTwice");

        assert_eq!(
            source,
            r#"    @Then("it says \"hi\" \\(twice\\)")
    public void itSaysHiTwice() {
        System.out.println("[testforge] pending: it says \"hi\" (twice)");
    }"#
        );
    }

    #[test]
    fn test_every_intent_renders_a_closed_method() {
        let intents = [
            StubIntent::Navigation,
            StubIntent::Click,
            StubIntent::Type,
            StubIntent::VisibilityAssert,
            StubIntent::EnabledAssert,
            StubIntent::ContainsAssert,
            StubIntent::Wait,
            StubIntent::ErrorAssert,
            StubIntent::SuccessAssert,
            StubIntent::Generic,
        ];
        for intent in intents {
            let source = render_stub(StepKeyword::When, intent, "x", "x");
            assert!(source.starts_with("    @When(\"x\")\n    public void x() {\n"));
            assert!(source.ends_with("\n    }"));
            assert_eq!(source.matches('{').count(), source.matches('}').count());
        }
    }
}

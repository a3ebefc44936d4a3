//! Line-oriented extraction of diagnostics from raw tool output
//!
//! Matchers are tied to javac (plain and Maven-relayed), Cucumber-JVM and
//! Surefire phrasing. Each line yields at most one diagnostic; the first
//! matcher to fire wins. Continuation lines (`symbol:`, `location:`, the
//! exception line of a failed test) are folded into the diagnostic that owns
//! them.

use super::{Diagnostic, DiagnosticCategory, Stage, SymbolKind};
use crate::steps::unescape_expression;
use regex_utils::{cucumber, javac, prefix, step_text, surefire};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// How far past a compiler error header continuation lines are searched
const CONTINUATION_WINDOW: usize = 4;

/// Extract diagnostics with paths reported as printed
pub fn extract(raw_output: &str, stage: Stage) -> Vec<Diagnostic> {
    DiagnosticExtractor::new().extract(raw_output, stage)
}

#[derive(Debug, Clone, Default)]
pub struct DiagnosticExtractor {
    project_root: Option<PathBuf>,
}

/// A line of tool output with its Maven level marker removed
struct OutputLine<'a> {
    text: &'a str,
    informational: bool,
}

impl DiagnosticExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report paths under `root` relative to it
    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = Some(root.into());
        self
    }

    pub fn extract(&self, raw_output: &str, stage: Stage) -> Vec<Diagnostic> {
        let lines: Vec<OutputLine<'_>> = raw_output
            .lines()
            .map(|raw| OutputLine {
                text: prefix::strip(raw).trim_end(),
                informational: raw.starts_with("[INFO]")
                    || raw.starts_with("[WARNING]")
                    || raw.starts_with("[WARN]"),
            })
            .collect();

        let mut diagnostics = Vec::new();
        let mut in_snippets = false;
        let mut index = 0;

        while index < lines.len() {
            if stage == Stage::Test {
                if cucumber::SNIPPET_BANNER.is_match(lines[index].text) {
                    in_snippets = true;
                    index += 1;
                    continue;
                }
                if let Some((diagnostic, next)) = self.match_test_line(&lines, index, in_snippets) {
                    diagnostics.push(diagnostic);
                    index = next;
                    continue;
                }
            }

            if let Some((diagnostic, next)) = self.match_compile_line(&lines, index) {
                diagnostics.push(diagnostic);
                index = next;
                continue;
            }

            index += 1;
        }

        dedupe(diagnostics)
    }

    fn match_test_line(
        &self,
        lines: &[OutputLine<'_>],
        index: usize,
        in_snippets: bool,
    ) -> Option<(Diagnostic, usize)> {
        let text = lines[index].text;

        if let Some(caps) = cucumber::UNDEFINED_STEP.captures(text) {
            let step = caps.name("dq").or_else(|| caps.name("sq"))?.as_str();
            return Some((undefined_step(text, step), index + 1));
        }

        if let Some(caps) = cucumber::UNDEFINED_STEP_LINE.captures(text) {
            return Some((undefined_step(text, &caps["text"]), index + 1));
        }

        // a snippet with parameter types no longer reads as the step it came from
        if in_snippets {
            if let Some(caps) = cucumber::STEP_ANNOTATION.captures(text) {
                if cucumber::PARAMETER_TYPE.is_match(&caps["expr"]) {
                    return None;
                }
                let step = unescape_expression(&caps["expr"]);
                return Some((undefined_step(text, &step), index + 1));
            }
        }

        if text.contains("Tests run:") {
            return None;
        }
        let caps = surefire::FAILED_TEST.captures(text)?;
        let test_name = caps["name"].trim().to_string();

        // the exception line follows the header, possibly after a blank line
        let exception_index = lines
            .iter()
            .enumerate()
            .skip(index + 1)
            .take(2)
            .find(|(_, line)| !line.text.trim().is_empty())
            .filter(|(_, line)| surefire::EXCEPTION_LINE.is_match(line.text))
            .map(|(i, _)| i)?;

        let exception = lines[exception_index].text;
        if let Some(caps) = cucumber::UNDEFINED_STEP.captures(exception) {
            let step = caps.name("dq").or_else(|| caps.name("sq"))?.as_str();
            return Some((undefined_step(exception, step), exception_index + 1));
        }

        let raw_message = format!("{}\n{}", text.trim(), exception.trim());
        let diagnostic = Diagnostic::new(DiagnosticCategory::AssertionFailure, raw_message)
            .with_symbol(SymbolKind::Test, test_name);
        Some((diagnostic, exception_index + 1))
    }

    fn match_compile_line(
        &self,
        lines: &[OutputLine<'_>],
        index: usize,
    ) -> Option<(Diagnostic, usize)> {
        let line = &lines[index];
        if line.informational {
            return None;
        }

        let (path, line_number, message) = parse_header(line.text)?;

        let mut raw_message = message.to_string();
        let mut symbol: Option<(SymbolKind, String)> = None;
        let mut next = index + 1;

        let window_end = (index + 1 + CONTINUATION_WINDOW).min(lines.len());
        for (offset, continuation) in lines[index + 1..window_end].iter().enumerate() {
            if parse_header(continuation.text).is_some() {
                break;
            }
            if let Some(caps) = javac::SYMBOL.captures(continuation.text) {
                symbol = Some((symbol_kind(&caps["kind"]), caps["name"].to_string()));
            } else if !javac::LOCATION.is_match(continuation.text) {
                // echoed source line or caret marker
                continue;
            }
            raw_message.push('\n');
            raw_message.push_str(continuation.text);
            next = index + 1 + offset + 1;
        }

        let (category, captured) = classify_compiler_message(message, symbol);
        let source_path = path.map(|p| self.relativize(p)).unwrap_or_default();

        let mut diagnostic = Diagnostic::new(category, raw_message).at(source_path, line_number);
        if let Some((kind, name)) = captured {
            diagnostic = diagnostic.with_symbol(kind, name);
        }
        Some((diagnostic, next))
    }

    fn relativize(&self, path: &str) -> String {
        let Some(root) = &self.project_root else {
            return path.to_string();
        };
        match Path::new(path).strip_prefix(root) {
            Ok(relative) => relative.to_string_lossy().replace('\\', "/"),
            Err(_) => path.to_string(),
        }
    }
}

/// Split a compiler error header into (path, line, message)
fn parse_header(text: &str) -> Option<(Option<&str>, Option<usize>, &str)> {
    let caps = javac::MAVEN_HEADER
        .captures(text)
        .or_else(|| javac::JAVAC_HEADER.captures(text));

    if let Some(caps) = caps {
        let path = caps.name("path").map(|m| m.as_str());
        let line = caps.name("line").and_then(|m| m.as_str().parse().ok());
        let message = caps.name("msg").map(|m| m.as_str()).unwrap_or("");
        return Some((path, line, message));
    }

    javac::BARE_ERROR
        .captures(text)
        .and_then(|caps| caps.name("msg"))
        .map(|m| (None, None, m.as_str()))
}

fn classify_compiler_message(
    message: &str,
    symbol: Option<(SymbolKind, String)>,
) -> (DiagnosticCategory, Option<(SymbolKind, String)>) {
    if javac::CANNOT_FIND_SYMBOL.is_match(message) {
        return (DiagnosticCategory::UnresolvedSymbol, symbol);
    }

    if let Some(caps) = javac::MISSING_PACKAGE.captures(message) {
        return (
            DiagnosticCategory::MissingImport,
            Some((SymbolKind::Package, caps["package"].to_string())),
        );
    }

    if let Some(caps) = javac::CANNOT_ACCESS.captures(message) {
        let class = caps.name("class").map(|m| (SymbolKind::Class, m.as_str().to_string()));
        return (DiagnosticCategory::MissingImport, class.or(symbol));
    }

    if let Some(caps) = javac::ABSTRACT_METHOD.captures(message) {
        let signature = format!("{}({})", &caps["method"], &caps["params"]);
        return (DiagnosticCategory::MissingMethod, Some((SymbolKind::Method, signature)));
    }

    if javac::WEAKER_ACCESS.is_match(message) {
        return (DiagnosticCategory::MissingMethod, symbol);
    }

    if javac::SYNTAX.is_match(message) {
        return (DiagnosticCategory::SyntaxError, symbol);
    }

    (DiagnosticCategory::Other, symbol)
}

fn symbol_kind(kind: &str) -> SymbolKind {
    match kind {
        "method" => SymbolKind::Method,
        "variable" => SymbolKind::Variable,
        "package" => SymbolKind::Package,
        _ => SymbolKind::Class,
    }
}

fn undefined_step(line: &str, step: &str) -> Diagnostic {
    Diagnostic::new(DiagnosticCategory::UndefinedStep, line.trim())
        .with_symbol(SymbolKind::Step, step_text::normalize(step))
}

/// Maven echoes every compiler error in its failure summary; Cucumber reports an
/// undefined step once per scenario and again as a snippet.
fn dedupe(diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
    let mut seen = HashSet::new();
    diagnostics
        .into_iter()
        .filter(|d| {
            let key = match d.category {
                DiagnosticCategory::UndefinedStep => {
                    (d.category, String::new(), None, d.symbol.clone().unwrap_or_default())
                }
                _ => (d.category, d.source_path.clone(), d.line, d.raw_message.clone()),
            };
            seen.insert(key)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_cannot_find_symbol() {
        let output = "error: cannot find symbol\n  symbol:   class Locator\n";
        let diagnostics = extract(output, Stage::Compile);

        assert_eq!(diagnostics.len(), 1);
        let diagnostic = &diagnostics[0];
        assert_eq!(diagnostic.category, DiagnosticCategory::UnresolvedSymbol);
        assert!(diagnostic.raw_message.ends_with("class Locator"));
        assert_eq!(diagnostic.symbol_of(SymbolKind::Class), Some("Locator"));
        assert!(!diagnostic.has_source());
    }

    #[test]
    fn test_maven_output_is_relativized_and_deduplicated() {
        let output = "\
[INFO] Compiling 4 source files to /work/target/test-classes
[ERROR] COMPILATION ERROR :
[INFO] -------------------------------------------------------------
[ERROR] /work/src/test/java/pages/LoginPage.java:[14,13] cannot find symbol
  symbol:   class Locator
  location: class pages.LoginPage
[INFO] 1 error
[ERROR] Failed to execute goal org.apache.maven.plugins:maven-compiler-plugin:3.11.0:testCompile (default-testCompile) on project demo: Compilation failure
[ERROR] /work/src/test/java/pages/LoginPage.java:[14,13] cannot find symbol
[ERROR]   symbol:   class Locator
[ERROR]   location: class pages.LoginPage
";
        let diagnostics =
            DiagnosticExtractor::new().with_project_root("/work").extract(output, Stage::Compile);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].source_path, "src/test/java/pages/LoginPage.java");
        assert_eq!(diagnostics[0].line, Some(14));
        assert_eq!(
            diagnostics[0].raw_message,
            "cannot find symbol\n  symbol:   class Locator\n  location: class pages.LoginPage"
        );
    }

    #[test]
    fn test_plain_javac_skips_source_echo() {
        let output = "\
src/steps/LoginSteps.java:9: error: cannot find symbol
        loginPage.getTitle();
                 ^
  symbol:   method getTitle()
  location: variable loginPage of type LoginPage
1 error
";
        let diagnostics = extract(output, Stage::Compile);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].source_path, "src/steps/LoginSteps.java");
        assert_eq!(diagnostics[0].symbol_of(SymbolKind::Method), Some("getTitle()"));
    }

    #[test]
    fn test_compile_categories() {
        let output = "\
[ERROR] /w/A.java:[1,20] package cucumber.api.java.en does not exist
[ERROR] /w/B.java:[5,8] B is not abstract and does not override abstract method close() in java.lang.AutoCloseable
[ERROR] /w/C.java:[7,30] ';' expected
[ERROR] /w/D.java:[40,2] reached end of file while parsing
[ERROR] /w/E.java:[3,5] incompatible types: int cannot be converted to java.lang.String
";
        let categories: Vec<_> =
            extract(output, Stage::Compile).into_iter().map(|d| d.category).collect();

        assert_eq!(
            categories,
            vec![
                DiagnosticCategory::MissingImport,
                DiagnosticCategory::MissingMethod,
                DiagnosticCategory::SyntaxError,
                DiagnosticCategory::SyntaxError,
                DiagnosticCategory::Other,
            ]
        );
    }

    #[test]
    fn test_abstract_method_signature_is_captured() {
        let output = "/w/B.java:5: error: B is not abstract and does not override abstract method fill(java.lang.String,int) in Form";
        let diagnostics = extract(output, Stage::Compile);
        assert_eq!(
            diagnostics[0].symbol_of(SymbolKind::Method),
            Some("fill(java.lang.String,int)")
        );
    }

    #[test]
    fn test_warnings_are_ignored() {
        let output = "[WARNING] /w/A.java:[3,1] [deprecation] Foo in Bar has been deprecated\n";
        assert!(extract(output, Stage::Compile).is_empty());
    }

    #[test]
    fn test_unrecognized_output_yields_nothing() {
        let output = "[ERROR] Failed to execute goal: could not resolve dependencies\nBUILD FAILURE\n";
        assert!(extract(output, Stage::Compile).is_empty());
        assert!(extract(output, Stage::Test).is_empty());
    }

    #[test]
    fn test_undefined_steps_from_cucumber() {
        let output = r#"
Scenario: Successful login
  Given user is on login page
  When user enters username
  Then user should be logged in
io.cucumber.junit.platform.engine.UndefinedStepException: The step 'user should be logged in' is undefined.
You can implement this step using the snippet(s) below:

You can implement missing steps with the snippets below:

@Then("user should be logged in")
public void user_should_be_logged_in() {
    throw new io.cucumber.java.PendingException();
}
"#;
        let diagnostics = extract(output, Stage::Test);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].category, DiagnosticCategory::UndefinedStep);
        assert_eq!(diagnostics[0].symbol_of(SymbolKind::Step), Some("user should be logged in"));
    }

    #[test]
    fn test_undefined_step_line_strips_keyword() {
        let diagnostics = extract("Undefined step: Then the cart is empty.", Stage::Test);
        assert_eq!(diagnostics[0].symbol.as_deref(), Some("the cart is empty"));
    }

    #[test]
    fn test_snippets_ignored_at_compile_stage() {
        let output = "You can implement missing steps with the snippets below:\n@Then(\"x\")\n";
        assert!(extract(output, Stage::Compile).is_empty());
    }

    #[test]
    fn test_failed_test_block() {
        let output = "\
[ERROR] Tests run: 3, Failures: 1, Errors: 0, Skipped: 0, Time elapsed: 4.2 s <<< FAILURE! - in runners.RunCucumberTest
[ERROR] Successful login  Time elapsed: 1.3 s  <<< FAILURE!
java.lang.AssertionError: expected:<Dashboard> but was:<Login>
\tat org.junit.Assert.fail(Assert.java:89)
";
        let diagnostics = extract(output, Stage::Test);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].category, DiagnosticCategory::AssertionFailure);
        assert_eq!(diagnostics[0].symbol_of(SymbolKind::Test), Some("Successful login"));
        assert!(diagnostics[0].raw_message.contains("expected:<Dashboard> but was:<Login>"));
    }

    #[test]
    fn test_surefire_error_block_for_undefined_step() {
        let output = "\
[ERROR] Tests run: 1, Failures: 0, Errors: 1, Skipped: 0, Time elapsed: 0.5 s <<< FAILURE! - in Login
[ERROR] Login.Successful login  Time elapsed: 0.1 s  <<< ERROR!
io.cucumber.junit.platform.engine.UndefinedStepException: The step 'user should be logged in' is undefined.
You can implement this step using the snippet(s) below:

@Then(\"user should be logged in\")
public void user_should_be_logged_in() {
    throw new io.cucumber.java.PendingException();
}
";
        let diagnostics = extract(output, Stage::Test);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].category, DiagnosticCategory::UndefinedStep);
        assert_eq!(diagnostics[0].symbol_of(SymbolKind::Step), Some("user should be logged in"));
    }

    #[test]
    fn test_parameterized_snippets_are_skipped() {
        let output = r#"
The step 'user enters "admin"' is undefined.
You can implement this step using the snippet(s) below:

@When("user enters {string}")
public void user_enters(String string) {
    throw new io.cucumber.java.PendingException();
}
"#;
        let steps: Vec<_> = extract(output, Stage::Test)
            .into_iter()
            .filter_map(|d| d.symbol)
            .collect();

        assert_eq!(steps, vec!["user enters \"admin\"".to_string()]);
    }

    #[test]
    fn test_failed_test_without_exception_is_not_reported() {
        let output = "[ERROR] Successful login  Time elapsed: 1.3 s  <<< FAILURE!\n\tat Foo.bar(Foo.java:1)\n";
        assert!(extract(output, Stage::Test).is_empty());
    }

    #[test]
    fn test_test_stage_still_sees_compile_errors() {
        let output = "[ERROR] /w/steps/StepDefinitions.java:[30,5] ';' expected\n";
        let diagnostics = extract(output, Stage::Test);
        assert_eq!(diagnostics[0].category, DiagnosticCategory::SyntaxError);
    }
}

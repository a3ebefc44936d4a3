//! Simple class names the generated sources commonly use, and where they live

/// (simple name, fully qualified name)
const KNOWN_IMPORTS: &[(&str, &str)] = &[
    // Playwright
    ("Playwright", "com.microsoft.playwright.Playwright"),
    ("Browser", "com.microsoft.playwright.Browser"),
    ("BrowserContext", "com.microsoft.playwright.BrowserContext"),
    ("BrowserType", "com.microsoft.playwright.BrowserType"),
    ("Page", "com.microsoft.playwright.Page"),
    ("Locator", "com.microsoft.playwright.Locator"),
    ("ElementHandle", "com.microsoft.playwright.ElementHandle"),
    ("PlaywrightAssertions", "com.microsoft.playwright.assertions.PlaywrightAssertions"),
    ("AriaRole", "com.microsoft.playwright.options.AriaRole"),
    ("LoadState", "com.microsoft.playwright.options.LoadState"),
    ("WaitForSelectorState", "com.microsoft.playwright.options.WaitForSelectorState"),
    // Cucumber
    ("Given", "io.cucumber.java.en.Given"),
    ("When", "io.cucumber.java.en.When"),
    ("Then", "io.cucumber.java.en.Then"),
    ("And", "io.cucumber.java.en.And"),
    ("But", "io.cucumber.java.en.But"),
    ("Before", "io.cucumber.java.Before"),
    ("After", "io.cucumber.java.After"),
    ("Scenario", "io.cucumber.java.Scenario"),
    ("PendingException", "io.cucumber.java.PendingException"),
    ("DataTable", "io.cucumber.datatable.DataTable"),
    ("Cucumber", "io.cucumber.junit.Cucumber"),
    ("CucumberOptions", "io.cucumber.junit.CucumberOptions"),
    // JUnit
    ("Assertions", "org.junit.jupiter.api.Assertions"),
    ("Test", "org.junit.jupiter.api.Test"),
    ("Assert", "org.junit.Assert"),
    ("RunWith", "org.junit.runner.RunWith"),
    // JDK
    ("List", "java.util.List"),
    ("ArrayList", "java.util.ArrayList"),
    ("Map", "java.util.Map"),
    ("HashMap", "java.util.HashMap"),
    ("Set", "java.util.Set"),
    ("HashSet", "java.util.HashSet"),
    ("Optional", "java.util.Optional"),
    ("Arrays", "java.util.Arrays"),
    ("Collections", "java.util.Collections"),
    ("Pattern", "java.util.regex.Pattern"),
    ("Duration", "java.time.Duration"),
    ("Paths", "java.nio.file.Paths"),
    ("Path", "java.nio.file.Path"),
];

/// Fully qualified name for a simple class name, if known
pub fn lookup(simple_name: &str) -> Option<&'static str> {
    KNOWN_IMPORTS.iter().find(|(name, _)| *name == simple_name).map(|(_, fqcn)| *fqcn)
}

/// Where pre-4.0 `cucumber.api` types moved to
pub fn relocate_legacy(rest: &str) -> String {
    let moved = [
        ("java.", "io.cucumber.java."),
        ("junit.", "io.cucumber.junit."),
        ("CucumberOptions", "io.cucumber.junit.CucumberOptions"),
        ("Scenario", "io.cucumber.java.Scenario"),
        ("PendingException", "io.cucumber.java.PendingException"),
        ("DataTable", "io.cucumber.datatable.DataTable"),
    ];
    moved
        .iter()
        .find_map(|(old, new)| {
            if let Some(tail) = rest.strip_prefix(old).filter(|_| old.ends_with('.')) {
                Some(format!("{}{}", new, tail))
            } else if rest == *old {
                Some(new.to_string())
            } else {
                None
            }
        })
        .unwrap_or_else(|| format!("io.cucumber.{}", rest))
}

//! Regex utilities for testforge
//! Extracted to a separate crate for compilation optimization

use once_cell::sync::Lazy;
use regex::Regex;

/// Tool prefixes that wrap compiler and test output lines
pub mod prefix {
    use super::*;

    pub static MAVEN_LEVEL: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^\[(?:ERROR|WARNING|WARN|INFO)\]\s?").expect("Invalid regex pattern")
    });

    /// Strip a leading `[ERROR] `-style Maven level marker
    pub fn strip(line: &str) -> &str {
        match MAVEN_LEVEL.find(line) {
            Some(m) => &line[m.end()..],
            None => line,
        }
    }
}

/// javac diagnostics, both raw and as relayed by Maven
pub mod javac {
    use super::*;

    /// `/abs/src/Foo.java:[12,8] cannot find symbol`
    pub static MAVEN_HEADER: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^(?P<path>\S.*?\.java):\[(?P<line>\d+)(?:,\d+)?\]\s*(?:error:\s*)?(?P<msg>.*)$")
            .expect("Invalid regex pattern")
    });

    /// `src/Foo.java:12: error: cannot find symbol`
    pub static JAVAC_HEADER: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^(?P<path>\S.*?\.java):(?P<line>\d+):\s*error:\s*(?P<msg>.*)$")
            .expect("Invalid regex pattern")
    });

    /// `error: cannot find symbol` with no file attached
    pub static BARE_ERROR: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^\s*error:\s*(?P<msg>.+)$").expect("Invalid regex pattern"));

    pub static SYMBOL: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"^\s*symbol:\s+(?P<kind>class|interface|enum|method|variable|package|static)\s+(?P<name>.+?)\s*$",
        )
        .expect("Invalid regex pattern")
    });

    pub static LOCATION: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^\s*location:\s+(?P<place>.+?)\s*$").expect("Invalid regex pattern")
    });

    pub static CANNOT_FIND_SYMBOL: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"cannot find symbol").expect("Invalid regex pattern"));

    pub static MISSING_PACKAGE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"package (?P<package>[\w.]+) does not exist").expect("Invalid regex pattern")
    });

    pub static CANNOT_ACCESS: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"cannot access (?P<class>[\w.]+)|static import only from classes and interfaces")
            .expect("Invalid regex pattern")
    });

    pub static ABSTRACT_METHOD: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"(?P<class>\w+) is not abstract and does not override abstract method (?P<method>\w+)\((?P<params>[^)]*)\) in (?P<owner>[\w.]+)",
        )
        .expect("Invalid regex pattern")
    });

    pub static WEAKER_ACCESS: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"attempting to assign weaker access privileges").expect("Invalid regex pattern")
    });

    pub static SYNTAX: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"'[^']+' expected|<identifier> expected|illegal start of|not a statement|reached end of file while parsing|class, interface, enum, or record expected|unclosed string literal|'else' without 'if'",
        )
        .expect("Invalid regex pattern")
    });

    pub static SEMICOLON_EXPECTED: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"';' expected").expect("Invalid regex pattern"));

    pub static END_OF_FILE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"reached end of file while parsing").expect("Invalid regex pattern")
    });

    pub static SURPLUS_BRACE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"class, interface, enum, or record expected").expect("Invalid regex pattern")
    });
}

/// Cucumber-JVM reporting of undefined steps
pub mod cucumber {
    use super::*;

    pub static UNDEFINED_STEP: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r#"The step (?:"(?P<dq>.+)"|'(?P<sq>.+)') is undefined"#)
            .expect("Invalid regex pattern")
    });

    pub static UNDEFINED_STEP_LINE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?i)^\s*undefined step:\s*(?P<text>.+?)\s*$").expect("Invalid regex pattern")
    });

    pub static SNIPPET_BANNER: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"You can implement (?:(?:missing|these) steps with the snippets below|this step(?: and \d+ other step(?:\(s\)|s)?)? using the snippet(?:\(s\)|s)? below)",
        )
        .expect("Invalid regex pattern")
    });

    /// An unescaped `{string}`, `{int}` or `{}` in a Cucumber expression
    pub static PARAMETER_TYPE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?:^|[^\\])\{[\w-]*\}").expect("Invalid regex pattern")
    });

    /// `@Then("user should be logged in")`, in snippets and step definition sources
    pub static STEP_ANNOTATION: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r#"@(?P<keyword>Given|When|Then|And|But)\(\s*"(?P<expr>(?:[^"\\]|\\.)*)"\s*\)"#)
            .expect("Invalid regex pattern")
    });
}

/// Surefire / JUnit failed test blocks
pub mod surefire {
    use super::*;

    pub static FAILED_TEST: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^\s*(?P<name>.+?)\s+Time elapsed:.*<<<\s*(?P<kind>FAILURE|ERROR)!")
            .expect("Invalid regex pattern")
    });

    pub static EXCEPTION_LINE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"^\s*(?P<exception>(?:[a-z_][\w$]*\.)*[A-Z][\w$]*(?:Error|Exception|Failure))(?::\s*(?P<message>.*))?$",
        )
        .expect("Invalid regex pattern")
    });
}

/// Java source-level patterns used by the rewrite rules
pub mod java {
    use super::*;

    pub static PACKAGE_DECLARATION: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?m)^[ \t]*package\s+[\w.]+\s*;[^\n]*$").expect("Invalid regex pattern")
    });

    pub static IMPORT: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?m)^[ \t]*import\s+(?:static\s+)?(?P<path>[\w.]+(?:\.\*)?)\s*;")
            .expect("Invalid regex pattern")
    });

    /// `import cucumber.api.java.en.Given;`, pre-4.0 Cucumber-JVM packages
    pub static LEGACY_CUCUMBER_IMPORT: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?m)^(?P<lead>[ \t]*import\s+(?:static\s+)?)cucumber\.api\.(?P<rest>[\w.]+(?:\.\*)?)\s*;")
            .expect("Invalid regex pattern")
    });

    pub static METHOD_DECLARATION: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"\b(?:void|int|long|boolean|double|float|char|byte|short|[A-Z][\w.]*(?:<[^;(){}]*>)?(?:\[\])*)\s+(?P<name>[a-zA-Z_$][\w$]*)\s*\(",
        )
        .expect("Invalid regex pattern")
    });

    pub static ACCESS_MODIFIER: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"\b(?:private|protected|public)\s+").expect("Invalid regex pattern")
    });

    /// Leading modifiers of a member declaration
    pub static MEMBER_MODIFIERS: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^(?P<indent>[ \t]*)(?P<mods>(?:(?:public|protected|private|static|final|abstract|synchronized)\s+)*)")
            .expect("Invalid regex pattern")
    });

    /// Names of methods declared in a Java source
    pub fn declared_methods(content: &str) -> impl Iterator<Item = &str> {
        METHOD_DECLARATION
            .captures_iter(content)
            .filter_map(|caps| caps.name("name"))
            .map(|m| m.as_str())
            .filter(|name| !matches!(*name, "if" | "for" | "while" | "switch" | "catch" | "return" | "new"))
    }

    /// Declared type of field `name`, if the source declares one
    pub fn field_type(content: &str, name: &str) -> Option<String> {
        let pattern = format!(
            r"(?m)^[ \t]*(?:(?:private|protected|public|static|final|transient|volatile)\s+)*(?P<type>[\w.]+(?:<[^;=(){{}}]*>)?(?:\[\])*)\s+{}\s*(?:=[^;]*)?;",
            regex::escape(name)
        );
        let field = Regex::new(&pattern).ok()?;
        field
            .captures_iter(content)
            .map(|caps| caps["type"].to_string())
            .find(|ty| !matches!(ty.as_str(), "return" | "throw" | "new" | "else" | "package" | "import"))
    }
}

/// Step text normalization
pub mod step_text {
    use super::*;

    pub static LEADING_KEYWORD: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^(?:(?:Given|When|Then|And|But|\*)\s+)+").expect("Invalid regex pattern")
    });

    pub static WHITESPACE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\s+").expect("Invalid regex pattern"));

    pub static TRAILING_PUNCTUATION: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"[\s.,;:!?]+$").expect("Invalid regex pattern"));

    /// Strip the Gherkin keyword, collapse whitespace, drop trailing punctuation
    pub fn normalize(text: &str) -> String {
        let collapsed = WHITESPACE.replace_all(text.trim(), " ");
        let stripped = LEADING_KEYWORD.replace(&collapsed, "");
        TRAILING_PUNCTUATION.replace(&stripped, "").to_string()
    }
}

/// Phrasing patterns used to guess what a step is for.
/// All patterns expect lower-cased input.
pub mod step_phrasing {
    use super::*;

    pub static SETUP: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"\b(?:is|am|are) on\b|\b(?:exists?|launched|opened)\b|\b(?:is|am|are) (?:logged|signed) in\b|\bgiven\b|^(?:a|an|the) .+ (?:exists|is available)",
        )
        .expect("Invalid regex pattern")
    });

    pub static POSSESSION: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"\b(?:has|have) (?:a|an|the|no|valid|an? existing)\b").expect("Invalid regex pattern")
    });

    pub static MODAL: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\b(?:should|must)\b").expect("Invalid regex pattern"));

    /// Setup phrasing; "has a" only counts when no modal makes it an expectation
    pub fn describes_setup(text: &str) -> bool {
        SETUP.is_match(text) || (POSSESSION.is_match(text) && !MODAL.is_match(text))
    }

    pub static INTERACTION: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"\b(?:clicks|enters|types|selects|submits|navigates|fills|presses|chooses|checks|unchecks|hovers|scrolls|uploads|logs in|logs out|signs in|opens)\b|\bi (?:click|enter|type|select|submit|navigate|fill|press|choose|open)\b",
        )
        .expect("Invalid regex pattern")
    });

    pub static OUTCOME: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"\b(?:should|must|displayed|visible|contains?|sees?|shown|appears?|is (?:enabled|disabled))\b",
        )
        .expect("Invalid regex pattern")
    });

    pub static WAIT: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"\b(?:waits?|until|loads?|loaded|finishes loading)\b").expect("Invalid regex pattern")
    });

    pub static ERROR_ASSERT: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"\b(?:error|invalid|fail(?:s|ed|ure)?|denied|rejected|warning)\b")
            .expect("Invalid regex pattern")
    });

    pub static SUCCESS_ASSERT: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"\b(?:success(?:ful|fully)?|logged in|signed in|welcome|redirected|confirmation|completed)\b",
        )
        .expect("Invalid regex pattern")
    });

    pub static ENABLED_ASSERT: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"\b(?:enabled|disabled|clickable|editable)\b").expect("Invalid regex pattern")
    });

    pub static CONTAINS_ASSERT: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"\b(?:contains?|containing|text|reads|equals?|titled)\b")
            .expect("Invalid regex pattern")
    });

    pub static VISIBILITY_ASSERT: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"\b(?:visible|displayed|shown|appears?|sees?|present)\b")
            .expect("Invalid regex pattern")
    });

    pub static NAVIGATION: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"\b(?:navigates?|go(?:es)? to|opens?|visits?|(?:is|am|are) on|lands? on)\b")
            .expect("Invalid regex pattern")
    });

    pub static TYPE_TEXT: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"\b(?:enters?|types?|fills?(?: in)?|inputs?|provides?)\b")
            .expect("Invalid regex pattern")
    });

    pub static CLICK: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"\b(?:clicks?|press(?:es)?|taps?|submits?|selects?|chooses?)\b")
            .expect("Invalid regex pattern")
    });
}

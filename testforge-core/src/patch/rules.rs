//! The rewrite rule catalogue
//!
//! Each rule is a predicate over a [`Diagnostic`] and a pure transform of the
//! offending file's content. Transforms are idempotent: applied to their own
//! output they return it unchanged.

use super::PatchRule;
use super::imports;
use crate::diagnostics::{Diagnostic, DiagnosticCategory, SymbolKind};
use crate::steps::{ScenarioStep, StepStub, insert_stubs};
use regex_utils::{javac, java};

const INDENT: &str = "    ";

/// The default catalogue, in dispatch order
pub fn catalogue() -> Vec<PatchRule> {
    vec![
        PatchRule {
            name: "relocate-legacy-cucumber-import",
            matches: is_legacy_cucumber_import,
            apply: relocate_legacy_cucumber_import,
        },
        PatchRule {
            name: "add-missing-import",
            matches: is_known_missing_class,
            apply: add_missing_import,
        },
        PatchRule {
            name: "widen-access",
            matches: is_weaker_access,
            apply: widen_access,
        },
        PatchRule {
            name: "implement-abstract-method",
            matches: is_unimplemented_abstract_method,
            apply: implement_abstract_method,
        },
        PatchRule {
            name: "generate-accessor",
            matches: is_missing_accessor,
            apply: generate_accessor,
        },
        PatchRule {
            name: "add-missing-semicolon",
            matches: is_missing_semicolon,
            apply: add_missing_semicolon,
        },
        PatchRule {
            name: "balance-braces",
            matches: is_unbalanced_braces,
            apply: balance_braces,
        },
        PatchRule {
            name: "stub-undefined-step",
            matches: is_undefined_step,
            apply: stub_undefined_step,
        },
    ]
}

// relocate-legacy-cucumber-import

fn is_legacy_cucumber_import(diagnostic: &Diagnostic) -> bool {
    diagnostic.category == DiagnosticCategory::MissingImport
        && (diagnostic
            .symbol_of(SymbolKind::Package)
            .is_some_and(|package| package.starts_with("cucumber.api"))
            || diagnostic.raw_message.contains("cucumber.api"))
}

fn relocate_legacy_cucumber_import(content: &str, _: &Diagnostic) -> String {
    java::LEGACY_CUCUMBER_IMPORT
        .replace_all(content, |caps: &regex::Captures<'_>| {
            format!("{}{};", &caps["lead"], imports::relocate_legacy(&caps["rest"]))
        })
        .into_owned()
}

// add-missing-import

fn missing_class(diagnostic: &Diagnostic) -> Option<&'static str> {
    if !matches!(
        diagnostic.category,
        DiagnosticCategory::UnresolvedSymbol | DiagnosticCategory::MissingImport
    ) {
        return None;
    }
    let class = diagnostic.symbol_of(SymbolKind::Class)?;
    let simple = class.rsplit('.').next().unwrap_or(class);
    imports::lookup(simple)
}

fn is_known_missing_class(diagnostic: &Diagnostic) -> bool {
    missing_class(diagnostic).is_some()
}

fn add_missing_import(content: &str, diagnostic: &Diagnostic) -> String {
    match missing_class(diagnostic) {
        Some(fqcn) => insert_import(content, fqcn),
        None => content.to_string(),
    }
}

/// Insert `import fqcn;` on the line after the package declaration
pub fn insert_import(content: &str, fqcn: &str) -> String {
    let package = fqcn.rsplit_once('.').map(|(package, _)| package).unwrap_or("");
    let wildcard = format!("{}.*", package);
    let present = java::IMPORT
        .captures_iter(content)
        .any(|caps| &caps["path"] == fqcn || caps["path"] == wildcard);
    if present {
        return content.to_string();
    }

    let line = format!("import {};", fqcn);
    match java::PACKAGE_DECLARATION.find(content) {
        Some(declaration) => {
            let (head, tail) = content.split_at(declaration.end());
            format!("{}\n{}{}", head, line, tail)
        }
        None => format!("{}\n{}", line, content),
    }
}

// widen-access

fn is_weaker_access(diagnostic: &Diagnostic) -> bool {
    diagnostic.line.is_some() && javac::WEAKER_ACCESS.is_match(&diagnostic.raw_message)
}

fn widen_access(content: &str, diagnostic: &Diagnostic) -> String {
    let Some(line) = diagnostic.line else {
        return content.to_string();
    };
    map_line(content, line, |text| {
        let Some(caps) = java::MEMBER_MODIFIERS.captures(text) else {
            return text.to_string();
        };
        let modifiers = &caps["mods"];
        if modifiers.contains("public") {
            return text.to_string();
        }

        let indent = &caps["indent"];
        let rest = &text[caps[0].len()..];
        let kept = java::ACCESS_MODIFIER.replace_all(modifiers, "");
        format!("{}public {}{}", indent, kept, rest)
    })
}

// implement-abstract-method

fn abstract_signature(diagnostic: &Diagnostic) -> Option<(&str, Vec<&str>)> {
    if diagnostic.category != DiagnosticCategory::MissingMethod {
        return None;
    }
    let signature = diagnostic.symbol_of(SymbolKind::Method)?;
    let (name, params) = signature.split_once('(')?;
    let params = params.strip_suffix(')')?;
    Some((name, split_params(params)))
}

/// Split a parameter list on commas outside generic brackets
fn split_params(params: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in params.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(params[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(params[start..].trim());
    parts.into_iter().filter(|p| !p.is_empty()).collect()
}

fn is_unimplemented_abstract_method(diagnostic: &Diagnostic) -> bool {
    abstract_signature(diagnostic).is_some()
}

fn implement_abstract_method(content: &str, diagnostic: &Diagnostic) -> String {
    let Some((name, params)) = abstract_signature(diagnostic) else {
        return content.to_string();
    };
    if java::declared_methods(content).any(|declared| declared == name) {
        return content.to_string();
    }

    let params = params
        .iter()
        .enumerate()
        .map(|(i, ty)| format!("{} arg{}", ty, i))
        .collect::<Vec<_>>()
        .join(", ");
    let method = format!(
        "{INDENT}public void {name}({params}) {{\n{INDENT}{INDENT}throw new UnsupportedOperationException(\"{name}\");\n{INDENT}}}"
    );
    append_member(content, &method)
}

// generate-accessor

/// (getter name, field name) for an unresolved `getX()`/`isX()` call within the same class
fn accessor_target(diagnostic: &Diagnostic) -> Option<(&str, String)> {
    if diagnostic.category != DiagnosticCategory::UnresolvedSymbol {
        return None;
    }
    let within_class = diagnostic
        .raw_message
        .lines()
        .filter_map(|line| javac::LOCATION.captures(line))
        .any(|caps| caps["place"].starts_with("class "));
    if !within_class {
        return None;
    }

    let getter = diagnostic.symbol_of(SymbolKind::Method)?.strip_suffix("()")?;
    let property = getter.strip_prefix("get").or_else(|| getter.strip_prefix("is"))?;
    let mut chars = property.chars();
    let first = chars.next().filter(char::is_ascii_uppercase)?;
    let field = format!("{}{}", first.to_ascii_lowercase(), chars.as_str());
    Some((getter, field))
}

fn is_missing_accessor(diagnostic: &Diagnostic) -> bool {
    accessor_target(diagnostic).is_some()
}

fn generate_accessor(content: &str, diagnostic: &Diagnostic) -> String {
    let Some((getter, field)) = accessor_target(diagnostic) else {
        return content.to_string();
    };
    if java::declared_methods(content).any(|declared| declared == getter) {
        return content.to_string();
    }
    let Some(ty) = java::field_type(content, &field) else {
        return content.to_string();
    };

    let method = format!("{INDENT}public {ty} {getter}() {{\n{INDENT}{INDENT}return {field};\n{INDENT}}}");
    append_member(content, &method)
}

// add-missing-semicolon

fn is_missing_semicolon(diagnostic: &Diagnostic) -> bool {
    diagnostic.category == DiagnosticCategory::SyntaxError
        && diagnostic.line.is_some()
        && javac::SEMICOLON_EXPECTED.is_match(diagnostic.headline())
}

fn add_missing_semicolon(content: &str, diagnostic: &Diagnostic) -> String {
    let Some(reported) = diagnostic.line else {
        return content.to_string();
    };

    // javac points just past the last token of the unterminated statement
    let lines: Vec<&str> = content.split_inclusive('\n').collect();
    let target = (1..=reported.min(lines.len())).rev().find(|&n| {
        let code = lines[n - 1].trim();
        !code.is_empty() && !code.starts_with("//") && !code.starts_with('*') && !code.starts_with("/*")
    });
    let Some(target) = target else {
        return content.to_string();
    };

    map_line(content, target, |text| {
        let code = text.trim_end();
        if code.ends_with([';', '{', '}', ',', '(']) || code.trim_start().starts_with('@') {
            text.to_string()
        } else {
            format!("{};{}", code, &text[code.len()..])
        }
    })
}

// balance-braces

fn is_unbalanced_braces(diagnostic: &Diagnostic) -> bool {
    let headline = diagnostic.headline();
    diagnostic.category == DiagnosticCategory::SyntaxError
        && (javac::END_OF_FILE.is_match(headline) || javac::SURPLUS_BRACE.is_match(headline))
}

fn balance_braces(content: &str, _: &Diagnostic) -> String {
    let balance = brace_balance(content);

    if balance > 0 {
        let mut balanced = content.trim_end().to_string();
        for depth in (0..balance as usize).rev() {
            balanced.push('\n');
            balanced.push_str(&INDENT.repeat(depth));
            balanced.push('}');
        }
        balanced.push('\n');
        return balanced;
    }

    let mut balanced = content.trim_end().to_string();
    for _ in 0..balance.unsigned_abs() {
        if !balanced.ends_with('}') {
            break;
        }
        balanced.pop();
        balanced.truncate(balanced.trim_end().len());
    }
    if balanced.len() == content.trim_end().len() {
        return content.to_string();
    }
    balanced.push('\n');
    balanced
}

/// Opening minus closing braces outside comments and literals
fn brace_balance(content: &str) -> i64 {
    #[derive(PartialEq)]
    enum Mode {
        Code,
        LineComment,
        BlockComment,
        Str,
        Char,
    }

    let mut mode = Mode::Code;
    let mut balance = 0i64;
    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        match mode {
            Mode::Code => match c {
                '{' => balance += 1,
                '}' => balance -= 1,
                '"' => mode = Mode::Str,
                '\'' => mode = Mode::Char,
                '/' if chars.peek() == Some(&'/') => mode = Mode::LineComment,
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    mode = Mode::BlockComment;
                }
                _ => {}
            },
            Mode::LineComment if c == '\n' => mode = Mode::Code,
            Mode::BlockComment if c == '*' && chars.peek() == Some(&'/') => {
                chars.next();
                mode = Mode::Code;
            }
            Mode::Str | Mode::Char if c == '\\' => {
                chars.next();
            }
            Mode::Str if c == '"' || c == '\n' => mode = Mode::Code,
            Mode::Char if c == '\'' || c == '\n' => mode = Mode::Code,
            _ => {}
        }
    }
    balance
}

// stub-undefined-step

fn is_undefined_step(diagnostic: &Diagnostic) -> bool {
    diagnostic.category == DiagnosticCategory::UndefinedStep
        && diagnostic.symbol_of(SymbolKind::Step).is_some_and(|step| !step.is_empty())
}

fn stub_undefined_step(content: &str, diagnostic: &Diagnostic) -> String {
    let Some(step) = diagnostic.symbol_of(SymbolKind::Step) else {
        return content.to_string();
    };
    insert_stubs_with_imports(content, &[StepStub::new(ScenarioStep::new(step))])
}

/// Insert step stubs along with the annotation imports they rely on
pub fn insert_stubs_with_imports(content: &str, stubs: &[StepStub]) -> String {
    let stubbed = insert_stubs(content, stubs);
    if stubbed == content {
        return stubbed;
    }
    stubs.iter().fold(stubbed, |acc, stub| {
        insert_import(&acc, &format!("io.cucumber.java.en.{}", stub.keyword))
    })
}

// helpers

/// Rewrite one 1-based line, keeping its line terminator
fn map_line(content: &str, line: usize, rewrite: impl FnOnce(&str) -> String) -> String {
    let mut out = String::with_capacity(content.len() + 8);
    let mut rewrite = Some(rewrite);
    for (index, raw) in content.split_inclusive('\n').enumerate() {
        let body = raw.trim_end_matches(['\n', '\r']);
        let ending = &raw[body.len()..];
        match rewrite.take_if(|_| index + 1 == line) {
            Some(rewrite) => out.push_str(&rewrite(body)),
            None => out.push_str(body),
        }
        out.push_str(ending);
    }
    out
}

/// Insert a member before the final closing brace of the file
fn append_member(content: &str, member: &str) -> String {
    match content.rfind('}') {
        Some(close) => {
            let head = content[..close].trim_end();
            format!("{}\n\n{}\n{}", head, member, &content[close..])
        }
        None => content.to_string(),
    }
}

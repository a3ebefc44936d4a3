//! Structured diagnostics parsed from build and test tool output

pub mod extractor;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use extractor::{DiagnosticExtractor, extract};

/// Which external invocation produced the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Compile,
    Test,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compile => write!(f, "compile"),
            Self::Test => write!(f, "test"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DiagnosticCategory {
    MissingImport,
    MissingMethod,
    UnresolvedSymbol,
    SyntaxError,
    UndefinedStep,
    AssertionFailure,
    Other,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MissingImport => "missing import",
            Self::MissingMethod => "missing method",
            Self::UnresolvedSymbol => "unresolved symbol",
            Self::SyntaxError => "syntax error",
            Self::UndefinedStep => "undefined step",
            Self::AssertionFailure => "assertion failure",
            Self::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// What the captured symbol names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Class,
    Method,
    Variable,
    Package,
    Step,
    Test,
}

/// One parsed problem from a single build or test invocation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Offending file, relative to the project root; empty when the output named none
    pub source_path: String,

    /// 1-based line number
    pub line: Option<usize>,

    pub category: DiagnosticCategory,

    /// Verbatim text of the matched line group, tool prefixes removed
    pub raw_message: String,

    /// Symbol, step text or test name captured from the message
    pub symbol: Option<String>,

    pub symbol_kind: Option<SymbolKind>,
}

impl Diagnostic {
    pub fn new(category: DiagnosticCategory, raw_message: impl Into<String>) -> Self {
        Self {
            source_path: String::new(),
            line: None,
            category,
            raw_message: raw_message.into(),
            symbol: None,
            symbol_kind: None,
        }
    }

    pub fn at(mut self, source_path: impl Into<String>, line: Option<usize>) -> Self {
        self.source_path = source_path.into();
        self.line = line;
        self
    }

    pub fn with_symbol(mut self, kind: SymbolKind, name: impl Into<String>) -> Self {
        self.symbol_kind = Some(kind);
        self.symbol = Some(name.into());
        self
    }

    /// The captured symbol, if it is of the given kind
    pub fn symbol_of(&self, kind: SymbolKind) -> Option<&str> {
        match self.symbol_kind {
            Some(k) if k == kind => self.symbol.as_deref(),
            _ => None,
        }
    }

    pub fn has_source(&self) -> bool {
        !self.source_path.is_empty()
    }

    /// First line of the raw message
    pub fn headline(&self) -> &str {
        self.raw_message.lines().next().unwrap_or("")
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.has_source(), self.line) {
            (true, Some(line)) => write!(f, "{}:{}: ", self.source_path, line)?,
            (true, None) => write!(f, "{}: ", self.source_path)?,
            _ => {}
        }
        write!(f, "[{}] {}", self.category, self.headline())?;
        if let Some(symbol) = &self.symbol {
            write!(f, " ({})", symbol)?;
        }
        Ok(())
    }
}

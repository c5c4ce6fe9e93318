//! Error taxonomy shared by every translation stage.
//!
//! Every failure aborts the translation it occurred in; there is no partial
//! output and no local recovery. Nested translations (parameter values,
//! template placeholders) hand their error to the enclosing translation
//! unchanged.

use core::fmt;
use thiserror::Error;

/// Which namespace an unresolved symbol was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Field,
    Node,
    Variable,
    Codelist,
    Label,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SymbolKind::Field => "field",
            SymbolKind::Node => "node",
            SymbolKind::Variable => "variable",
            SymbolKind::Codelist => "codelist",
            SymbolKind::Label => "label",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslationError {
    /// Operand types are incompatible with an operator, function or list.
    #[error("type mismatch{}: expected {expected}, found {actual}", fragment_suffix(.fragment))]
    TypeMismatch {
        expected: String,
        actual: String,
        /// Source text of the production that rejected the operand, attached on the
        /// way out of the translator.
        fragment: Option<String>,
    },

    /// The symbol resolver or the call stack does not know the referenced name.
    #[error("unresolved {kind} `{symbol}`")]
    UnresolvedSymbol { kind: SymbolKind, symbol: String },

    /// Context or call stack underflow, or an unexpected top-of-stack shape.
    #[error("malformed translation state: {0}")]
    MalformedContextState(String),

    /// A construct requires a field of a specific declared type.
    #[error("field `{field}` of type `{field_type}` does not support {construct}")]
    UnsupportedFieldType { field: String, field_type: String, construct: &'static str },

    /// The EFX front end rejected the input.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// A target-language path could not be decomposed into steps.
    #[error("malformed path `{path}`: {message}")]
    MalformedPath { path: String, message: String },

    /// A `like` pattern is not a valid regular expression.
    #[error("invalid pattern {pattern}: {message}")]
    InvalidPattern { pattern: String, message: String },

    /// A parameterized expression was invoked with the wrong number of arguments.
    #[error("expected {expected} argument(s) but {actual} were supplied")]
    ArgumentCount { expected: usize, actual: usize },
}

fn fragment_suffix(fragment: &Option<String>) -> String {
    match fragment {
        Some(text) => format!(" in `{text}`"),
        None => String::new(),
    }
}

impl TranslationError {
    pub fn type_mismatch(expected: impl fmt::Display, actual: impl fmt::Display) -> Self {
        Self::TypeMismatch { expected: expected.to_string(), actual: actual.to_string(), fragment: None }
    }

    pub fn unresolved(kind: SymbolKind, symbol: impl Into<String>) -> Self {
        Self::UnresolvedSymbol { kind, symbol: symbol.into() }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedContextState(message.into())
    }

    /// Attach the offending source text to a type mismatch that does not carry one yet.
    /// Other variants pass through untouched.
    #[must_use]
    pub fn in_fragment(self, text: &str) -> Self {
        match self {
            Self::TypeMismatch { expected, actual, fragment: None } => {
                Self::TypeMismatch { expected, actual, fragment: Some(text.trim().to_string()) }
            }
            other => other,
        }
    }
}

pub type Result<T> = core::result::Result<T, TranslationError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn first_fragment_wins() {
        let err = TranslationError::type_mismatch("numeric", "text")
            .in_fragment("BT-00-Text + 1")
            .in_fragment("BT-00-Text + 1 == 2");
        assert_eq!(
            err.to_string(),
            "type mismatch in `BT-00-Text + 1`: expected numeric, found text"
        );
    }

    #[rstest]
    fn unresolved_symbol_message() {
        let err = TranslationError::unresolved(SymbolKind::Field, "BT-99-Missing");
        assert_eq!(err.to_string(), "unresolved field `BT-99-Missing`");
    }
}

//! Parser Types and Constants
//!
//! Error types, limits and options shared by the scanner and parser.

use std::fmt;
use thiserror::Error;

// Parser limits to prevent stack exhaustion
pub const MAX_PARSER_DEPTH: usize = 200; // Max nesting of ${...} constructs

/// Characters of context kept on each side of a failing token
pub const CONTEXT_LEN: usize = 10;

/// Options controlling a single parse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Maximum nesting depth of `${...}` constructs
    pub max_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_depth: MAX_PARSER_DEPTH,
        }
    }
}

/// Errors produced while parsing a template
#[derive(Debug, Error)]
pub enum ParseError {
    /// Malformed token sequence with no more precise diagnosis
    #[error("bad substitution")]
    BadSubstitution,

    /// An argument position held neither text nor a nested `${`
    #[error("unable to parse substitution")]
    Argument,

    #[error("nesting too deep: more than {limit} levels of ${{...}}")]
    NestingTooDeep { limit: usize },

    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

impl ParseError {
    /// Line number of the failure, when the error tracks one.
    pub fn line(&self) -> usize {
        match self {
            ParseError::Syntax(e) => e.line,
            _ => 0,
        }
    }
}

/// The precise cause carried by a [`SyntaxError`]
#[derive(Debug, Error)]
pub enum SyntaxCause {
    #[error("unable to parse variable name")]
    VariableName,

    #[error("missing closing brace")]
    MissingBrace,

    #[error("{0}")]
    Nested(Box<ParseError>),
}

/// A parse failure located by line number and a window of source text
#[derive(Debug, Error)]
pub struct SyntaxError {
    /// 1-based line; 0 when not tracked
    pub line: usize,
    /// Up to [`CONTEXT_LEN`] characters either side of the failing token
    pub context: String,
    #[source]
    pub cause: SyntaxCause,
}

impl SyntaxError {
    pub fn new(cause: SyntaxCause, line: usize, context: impl Into<String>) -> Self {
        Self {
            line,
            context: context.into(),
            cause,
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line > 0 {
            write!(
                f,
                "{} on line {}\n\tLook for:\"...{}...\"",
                self.cause, self.line, self.context
            )
        } else {
            write!(f, "{}\n\tLook for:\"...{}...\"", self.cause, self.context)
        }
    }
}

//! Parser module for parameter-expansion templates
//!
//! This module contains the scanner and the recursive-descent parser.

pub mod types;
pub mod scanner;
pub mod parser;

// Re-exports
pub use types::{ParseError, ParserOptions, SyntaxCause, SyntaxError, MAX_PARSER_DEPTH};
pub use scanner::{Accept, ScanConfig, ScanMode, Scanner, Token};
pub use parser::{parse, parse_with_options, Parser};

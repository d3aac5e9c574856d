//! envsubst - shell-style parameter expansion for free text
//!
//! This library parses `${name}`, `${name:-default}`, `${name/pat/repl}`,
//! `${#name}` and the other bash parameter-expansion forms embedded in
//! arbitrary text into an AST, and expands that AST against a variable source.

pub mod ast;
pub mod interpreter;
pub mod parser;

pub use ast::types::*;
pub use interpreter::{eval, eval_env, ExpandError, ExpandOptions, Interpreter, Lookup, ProcessEnv};
pub use parser::{parse, parse_with_options, ParseError, Parser, ParserOptions, SyntaxError};

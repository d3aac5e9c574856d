//! Interpreter Types
//!
//! The variable source consulted during expansion, and expansion options.

use std::collections::HashMap;

use crate::parser::ParserOptions;

/// Source of variable values. `None` means the variable is unset.
pub trait Lookup {
    fn lookup(&self, name: &str) -> Option<String>;
}

impl Lookup for HashMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl<F> Lookup for F
where
    F: Fn(&str) -> Option<String>,
{
    fn lookup(&self, name: &str) -> Option<String> {
        self(name)
    }
}

/// Variables of the current process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Lookup for ProcessEnv {
    fn lookup(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Options controlling expansion
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpandOptions {
    /// set -u: treat references to unset variables as an error
    pub nounset: bool,
    /// Options for parsing the template
    pub parser: ParserOptions,
}

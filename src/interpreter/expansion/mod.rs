//! Expansion helpers
//!
//! String-level operations used by the interpreter when it applies a
//! `${...}` operator to a variable's value.

pub mod parameter_ops;
pub mod pattern;

pub use parameter_ops::*;
pub use pattern::pattern_to_regex;

//! Interpreter module
//!
//! This module expands parsed templates against a variable source.

pub mod errors;
pub mod expansion;
pub mod interpreter;
pub mod types;

pub use errors::*;
pub use interpreter::{eval, eval_env, Interpreter};
pub use types::*;

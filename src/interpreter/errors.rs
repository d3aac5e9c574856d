//! Expansion Errors
//!
//! Errors raised while expanding a template:
//! - parse failures of the template itself
//! - `${var:?message}` on an unset or empty variable
//! - nounset: any plain reference to an unset variable
//! - substring offsets that are not integers or run backwards

use thiserror::Error;

use crate::parser::ParseError;

/// Message used by `${var:?}` when no word is given
pub const DEFAULT_UNSET_MESSAGE: &str = "parameter null or not set";

#[derive(Debug, Error)]
pub enum ExpandError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// `${name:?message}`
    #[error("{name}: {message}")]
    Unset { name: String, message: String },

    /// Reference to an unset variable with nounset enabled
    #[error("{name}: unbound variable")]
    Unbound { name: String },

    #[error("{name}: {expr}: invalid substring expression")]
    BadSubstring { name: String, expr: String },

    #[error("{name}: {message}")]
    Substring { name: String, message: String },

    #[error("{name}: unsupported operator '{op}'")]
    UnsupportedOperator { name: String, op: String },
}

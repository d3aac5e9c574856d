//! Abstract Syntax Tree (AST) for parameter-expansion templates
//!
//! Architecture:
//!   Input → Scanner → Parser → AST → Interpreter → Output

pub mod types;

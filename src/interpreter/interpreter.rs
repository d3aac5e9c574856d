//! Template Interpreter
//!
//! Walks a parsed [`Tree`], copying text runs to the output and replacing
//! each function node with the result of its operator applied to the value
//! of its parameter.

use std::collections::HashMap;

use crate::ast::types::{FuncNode, Node, Tree};
use crate::interpreter::errors::{ExpandError, DEFAULT_UNSET_MESSAGE};
use crate::interpreter::expansion::{
    apply_case_modification, apply_pattern_removal, apply_pattern_replacement,
    apply_substring_op, should_use_default, value_length, CaseDirection, PatternAnchor,
    PatternRemovalSide,
};
use crate::interpreter::types::{ExpandOptions, Lookup, ProcessEnv};
use crate::parser::parse_with_options;

/// Expand `input` against `lookup` with default options.
pub fn eval<L: Lookup>(input: &str, lookup: L) -> Result<String, ExpandError> {
    Interpreter::new(lookup).eval(input)
}

/// Expand `input` against the process environment.
pub fn eval_env(input: &str) -> Result<String, ExpandError> {
    eval(input, ProcessEnv)
}

/// Expands templates against a variable source.
///
/// Values assigned by `${var=word}` and `${var:=word}` are kept in the
/// interpreter and shadow the source for the rest of its life.
pub struct Interpreter<L> {
    lookup: L,
    options: ExpandOptions,
    assigned: HashMap<String, String>,
}

impl<L: Lookup> Interpreter<L> {
    pub fn new(lookup: L) -> Self {
        Self::with_options(lookup, ExpandOptions::default())
    }

    pub fn with_options(lookup: L, options: ExpandOptions) -> Self {
        Self {
            lookup,
            options,
            assigned: HashMap::new(),
        }
    }

    /// Variables assigned so far by `=` and `:=`.
    pub fn assigned(&self) -> &HashMap<String, String> {
        &self.assigned
    }

    /// Parse and expand a template.
    pub fn eval(&mut self, input: &str) -> Result<String, ExpandError> {
        let tree = parse_with_options(input, self.options.parser)?;
        self.expand(&tree)
    }

    /// Expand an already parsed template.
    pub fn expand(&mut self, tree: &Tree) -> Result<String, ExpandError> {
        let mut out = String::new();
        self.expand_node(&tree.root, &mut out)?;
        Ok(out)
    }

    fn expand_node(&mut self, node: &Node, out: &mut String) -> Result<(), ExpandError> {
        for part in node.flatten() {
            match part {
                Node::Text(text) => out.push_str(&text.value),
                Node::Func(func) => {
                    let value = self.expand_func(func)?;
                    out.push_str(&value);
                }
                Node::List(_) | Node::Empty => {}
            }
        }
        Ok(())
    }

    fn get(&self, name: &str) -> Option<String> {
        self.assigned
            .get(name)
            .cloned()
            .or_else(|| self.lookup.lookup(name))
    }

    /// Value of `name`, failing under nounset when it is unset.
    fn require(&self, name: &str) -> Result<String, ExpandError> {
        match self.get(name) {
            Some(value) => Ok(value),
            None if self.options.nounset => Err(ExpandError::Unbound {
                name: name.to_string(),
            }),
            None => Ok(String::new()),
        }
    }

    /// Expand the arguments `args` and concatenate them.
    fn expand_word(&mut self, args: &[Node]) -> Result<String, ExpandError> {
        let mut word = String::new();
        for arg in args {
            self.expand_node(arg, &mut word)?;
        }
        Ok(word)
    }

    fn expand_arg(&mut self, args: &[Node], index: usize) -> Result<String, ExpandError> {
        match args.get(index) {
            Some(arg) => self.expand_word(std::slice::from_ref(arg)),
            None => Ok(String::new()),
        }
    }

    fn expand_func(&mut self, func: &FuncNode) -> Result<String, ExpandError> {
        tracing::trace!(param = %func.param, op = %func.name, "expanding function");
        let name = func.param.as_str();
        let args = func.args.as_slice();

        match func.name.as_str() {
            "" => self.require(name),
            "#" if args.is_empty() => Ok(value_length(&self.require(name)?).to_string()),

            ":-" => {
                let value = self.get(name);
                if should_use_default(value.as_deref(), true) {
                    self.expand_word(args)
                } else {
                    Ok(value.unwrap_or_default())
                }
            }
            op @ ("=" | ":=") => {
                let value = self.get(name);
                if should_use_default(value.as_deref(), op == ":=") {
                    let word = self.expand_word(args)?;
                    self.assigned.insert(name.to_string(), word.clone());
                    Ok(word)
                } else {
                    Ok(value.unwrap_or_default())
                }
            }
            ":?" => {
                let value = self.get(name);
                if should_use_default(value.as_deref(), true) {
                    let word = self.expand_word(args)?;
                    let message = if word.is_empty() {
                        DEFAULT_UNSET_MESSAGE.to_string()
                    } else {
                        word
                    };
                    Err(ExpandError::Unset {
                        name: name.to_string(),
                        message,
                    })
                } else {
                    Ok(value.unwrap_or_default())
                }
            }
            ":+" => {
                let value = self.get(name);
                if should_use_default(value.as_deref(), true) {
                    Ok(String::new())
                } else {
                    self.expand_word(args)
                }
            }

            ":" => {
                let value = self.require(name)?;
                let offset = self.expand_arg(args, 0)?;
                let offset = parse_offset(name, &offset)?;
                let length = match args.get(1) {
                    Some(_) => {
                        let length = self.expand_arg(args, 1)?;
                        Some(parse_offset(name, &length)?)
                    }
                    None => None,
                };
                apply_substring_op(&value, offset, length).map_err(|message| {
                    ExpandError::Substring {
                        name: name.to_string(),
                        message,
                    }
                })
            }

            op @ ("#" | "##" | "%" | "%%") => {
                let value = self.require(name)?;
                let pattern = self.expand_arg(args, 0)?;
                let side = if op.starts_with('#') {
                    PatternRemovalSide::Prefix
                } else {
                    PatternRemovalSide::Suffix
                };
                Ok(apply_pattern_removal(&value, &pattern, side, op.len() == 2))
            }

            op @ ("/" | "//" | "/#" | "/%") => {
                let value = self.require(name)?;
                let pattern = self.expand_arg(args, 0)?;
                let replacement = self.expand_arg(args, 1)?;
                let anchor = match op {
                    "/#" => PatternAnchor::Start,
                    "/%" => PatternAnchor::End,
                    _ => PatternAnchor::None,
                };
                Ok(apply_pattern_replacement(
                    &value,
                    &pattern,
                    &replacement,
                    op == "//",
                    anchor,
                ))
            }

            op => match CaseDirection::from_operator(op) {
                Some(direction) => Ok(apply_case_modification(&self.require(name)?, direction)),
                None => Err(ExpandError::UnsupportedOperator {
                    name: name.to_string(),
                    op: op.to_string(),
                }),
            },
        }
    }
}

fn parse_offset(name: &str, expr: &str) -> Result<i64, ExpandError> {
    expr.trim().parse().map_err(|_| ExpandError::BadSubstring {
        name: name.to_string(),
        expr: expr.to_string(),
    })
}

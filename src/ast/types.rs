//! AST Types for Parameter-Expansion Templates
//!
//! A parsed template is a right-nested chain of literal text runs and
//! `${...}` function nodes. The tree is immutable once the parser hands it out.

use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use std::fmt;

// =============================================================================
// NODES
// =============================================================================

/// A node of the template AST
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Node {
    /// Literal text
    Text(TextNode),
    /// One `${...}` construct
    Func(FuncNode),
    /// A node followed by everything after it
    List(ListNode),
    /// No remaining content. Distinct from an empty text run.
    Empty,
}

/// Literal text, emitted verbatim by the evaluator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextNode {
    pub value: String,
}

/// A single `${...}` construct.
///
/// `param` is the variable name and `name` the operator token exactly as
/// written (`""` for a bare `${x}`, `":-"`, `"//"`, `"#"`, `",,"`, ...).
/// Each argument is either a [`TextNode`] or a nested [`FuncNode`]; it is
/// never a [`ListNode`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FuncNode {
    pub param: String,
    pub name: String,
    pub args: Vec<Node>,
}

/// Exactly two children: a node and the rest of the sequence.
///
/// Long templates nest one `ListNode` per segment, so clone, compare, drop,
/// debug and serialize all walk the right spine in a loop.
pub struct ListNode {
    pub nodes: Box<[Node; 2]>,
}

impl ListNode {
    /// Every non-list member of the chain, in order.
    pub fn members(&self) -> Vec<&Node> {
        let [first, rest] = &*self.nodes;
        let mut out = first.flatten();
        out.extend(rest.flatten());
        out
    }
}

impl Clone for ListNode {
    fn clone(&self) -> Self {
        let members = self.members().into_iter().cloned().collect();
        match Node::chain(members) {
            Node::List(list) => list,
            single => ListNode {
                nodes: Box::new([single, Node::Empty]),
            },
        }
    }
}

impl PartialEq for ListNode {
    fn eq(&self, other: &Self) -> bool {
        self.members() == other.members()
    }
}

impl Eq for ListNode {}

impl fmt::Debug for ListNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListNode")
            .field("nodes", &self.members())
            .finish()
    }
}

impl Serialize for ListNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ListNode", 1)?;
        state.serialize_field("nodes", &self.members())?;
        state.end()
    }
}

impl Drop for ListNode {
    fn drop(&mut self) {
        let mut rest = std::mem::replace(&mut self.nodes[1], Node::Empty);
        while let Node::List(mut list) = rest {
            rest = std::mem::replace(&mut list.nodes[1], Node::Empty);
        }
    }
}

impl Node {
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text(TextNode { value: value.into() })
    }

    pub fn func(param: impl Into<String>, name: impl Into<String>, args: Vec<Node>) -> Self {
        Node::Func(FuncNode {
            param: param.into(),
            name: name.into(),
            args,
        })
    }

    /// Chain `first` in front of `rest`. An empty `rest` yields `first` alone.
    pub fn list(first: Node, rest: Node) -> Self {
        match rest {
            Node::Empty => first,
            rest => Node::List(ListNode {
                nodes: Box::new([first, rest]),
            }),
        }
    }

    /// Build the right-nested chain for a flat sequence of nodes.
    pub fn chain(nodes: Vec<Node>) -> Self {
        nodes
            .into_iter()
            .rev()
            .fold(Node::Empty, |rest, node| Node::list(node, rest))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Node::Empty)
    }

    /// Flatten a right-nested chain into its members, in order.
    pub fn flatten(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        let mut cur = self;
        loop {
            match cur {
                Node::List(list) => {
                    let [first, rest] = &*list.nodes;
                    out.extend(first.flatten());
                    cur = rest;
                }
                Node::Empty => break,
                other => {
                    out.push(other);
                    break;
                }
            }
        }
        out
    }
}

impl FuncNode {
    pub fn new(param: impl Into<String>) -> Self {
        Self {
            param: param.into(),
            ..Default::default()
        }
    }
}

// =============================================================================
// TREE
// =============================================================================

/// The result of a successful parse
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tree {
    pub root: Node,
    /// Original input, kept for diagnostics
    #[serde(skip)]
    pub source: String,
}

impl Tree {
    pub fn new(root: Node, source: impl Into<String>) -> Self {
        Self {
            root,
            source: source.into(),
        }
    }
}

// =============================================================================
// RENDERING
// =============================================================================

/// Escape top-level text so the scanner reads it back unchanged.
fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '$' => out.push_str("$$"),
            '\\' => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a replacement-operator argument.
fn escape_replace_arg(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '$' => out.push_str("$$"),
            '/' => out.push_str("\\/"),
            '\\' => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out
}

fn fmt_arg(f: &mut fmt::Formatter<'_>, arg: &Node, replace: bool) -> fmt::Result {
    match arg {
        Node::Text(text) if replace => f.write_str(&escape_replace_arg(&text.value)),
        Node::Text(text) => f.write_str(&text.value),
        other => write!(f, "{}", other),
    }
}

impl fmt::Display for FuncNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name == "#" && self.args.is_empty() {
            return write!(f, "${{#{}}}", self.param);
        }
        write!(f, "${{{}{}", self.param, self.name)?;
        let (separator, replace) = if self.name == ":" {
            (":", false)
        } else if self.name.starts_with('/') {
            ("/", true)
        } else {
            ("", false)
        };
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(separator)?;
            }
            fmt_arg(f, arg, replace)?;
        }
        if replace && self.args.len() == 1 {
            f.write_str("/")?;
        }
        f.write_str("}")
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Text(text) => f.write_str(&escape_text(&text.value)),
            Node::Func(func) => write!(f, "{}", func),
            Node::List(list) => list
                .members()
                .into_iter()
                .try_for_each(|node| write!(f, "{}", node)),
            Node::Empty => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_with_empty_rest_collapses() {
        let node = Node::list(Node::text("a"), Node::Empty);
        assert_eq!(node, Node::text("a"));
    }

    #[test]
    fn test_chain_is_right_nested() {
        let node = Node::chain(vec![
            Node::text("hello "),
            Node::func("string", "#", vec![]),
            Node::text(" world"),
        ]);
        let Node::List(outer) = &node else {
            panic!("expected list, got {:?}", node);
        };
        assert_eq!(outer.nodes[0], Node::text("hello "));
        assert!(matches!(outer.nodes[1], Node::List(_)));
        assert_eq!(node.flatten().len(), 3);
    }

    #[test]
    fn test_chain_of_nothing_is_empty() {
        assert!(Node::chain(vec![]).is_empty());
    }

    #[test]
    fn test_render_text_escapes() {
        assert_eq!(Node::text("${x} \\ $").to_string(), "$${x} \\\\ $$");
    }

    #[test]
    fn test_render_funcs() {
        assert_eq!(Node::func("x", "", vec![]).to_string(), "${x}");
        assert_eq!(Node::func("x", "#", vec![]).to_string(), "${#x}");
        assert_eq!(
            Node::func("x", ":", vec![Node::text("1"), Node::text("2")]).to_string(),
            "${x:1:2}"
        );
        assert_eq!(
            Node::func("x", "//", vec![Node::text("a/b")]).to_string(),
            "${x//a\\/b/}"
        );
        assert_eq!(
            Node::func("x", "/", vec![Node::text("${y}"), Node::text("$")]).to_string(),
            "${x/$${y}/$$}"
        );
    }

    fn long_chain(len: usize) -> Node {
        Node::chain(
            (0..len)
                .map(|i| {
                    if i % 2 == 0 {
                        Node::func("a", "", vec![])
                    } else {
                        Node::text("-")
                    }
                })
                .collect(),
        )
    }

    #[test]
    fn test_long_chain_without_deep_stack() {
        let node = long_chain(200_000);
        let copy = node.clone();
        assert_eq!(node, copy);
        assert_ne!(node, long_chain(199_999));
        assert_eq!(node.flatten().len(), 200_000);

        let rendered = node.to_string();
        assert_eq!(rendered.len(), 100_000 * "${a}-".len());

        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "List");
        assert_eq!(json["nodes"].as_array().map(Vec::len), Some(200_000));

        let debug = format!("{:?}", copy);
        assert!(debug.starts_with("List(ListNode"));

        drop(node);
        drop(copy);
    }

    #[test]
    fn test_clone_keeps_shape() {
        let node = Node::chain(vec![Node::text("a"), Node::text("b"), Node::text("c")]);
        let copy = node.clone();
        let Node::List(list) = &copy else {
            panic!("expected list, got {:?}", copy);
        };
        assert_eq!(list.nodes[0], Node::text("a"));
        assert!(matches!(list.nodes[1], Node::List(_)));
    }

    #[test]
    fn test_serialize_tagged() {
        let json = serde_json::to_value(Node::text("hi")).unwrap();
        assert_eq!(json["type"], "Text");
        assert_eq!(json["value"], "hi");
    }
}

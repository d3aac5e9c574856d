//! Recursive-Descent Parser for Parameter-Expansion Templates
//!
//! The parser drives the [`Scanner`], reconfiguring it at every grammar
//! position, and assembles the AST. Each operator family has its own
//! sub-parser; which one runs is decided by the [`OPERATORS`] table from the
//! character following the parameter name.

use crate::ast::types::{FuncNode, Node, Tree};
use crate::parser::scanner::{Accept, ScanConfig, ScanMode, Scanner, Token};
use crate::parser::types::{ParseError, ParserOptions, SyntaxCause, SyntaxError};

/// Operator families of `${name<op>...}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    /// `:` then either a default operator or a substring offset
    DefaultOrSubstr,
    /// `=` `:=` `:-` `:?` `:+`
    Default,
    /// `,` `,,` `^` `^^`
    Casing,
    /// `/` `//` `/#` `/%`
    Replace,
    /// `#` `##` or `%` `%%`, with the predicate for the operator token
    Remove(Accept),
}

/// Dispatch table: lookahead character after the parameter name
const OPERATORS: &[(char, Family)] = &[
    (':', Family::DefaultOrSubstr),
    ('=', Family::Default),
    (',', Family::Casing),
    ('^', Family::Casing),
    ('/', Family::Replace),
    ('#', Family::Remove(Accept::HashFunc)),
    ('%', Family::Remove(Accept::PercentFunc)),
];

/// Characters that turn a leading `:` into a default operator
const DEFAULT_SUFFIXES: &[char] = &['=', '-', '?', '+'];

fn family_for(c: char) -> Option<Family> {
    OPERATORS
        .iter()
        .find(|(key, _)| *key == c)
        .map(|(_, family)| *family)
}

// Scanner configurations used at fixed grammar positions
const ANY: ScanConfig = ScanConfig::new(
    ScanMode::IDENT.union(ScanMode::LBRACK).union(ScanMode::ESCAPE),
    Accept::Rune,
);
const PARAM_NAME: ScanConfig = ScanConfig::new(ScanMode::IDENT, Accept::Ident);
const CLOSE: ScanConfig = ScanConfig::new(ScanMode::RBRACK, Accept::Ident);

/// Parse a template with default options.
pub fn parse(input: &str) -> Result<Tree, ParseError> {
    Parser::new(input).parse()
}

/// Parse a template with explicit options.
pub fn parse_with_options(input: &str, options: ParserOptions) -> Result<Tree, ParseError> {
    Parser::with_options(input, options).parse()
}

/// Parser for one template. Consumed by [`Parser::parse`].
pub struct Parser<'a> {
    input: &'a str,
    scanner: Scanner<'a>,
    options: ParserOptions,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::with_options(input, ParserOptions::default())
    }

    pub fn with_options(input: &'a str, options: ParserOptions) -> Self {
        Self {
            input,
            scanner: Scanner::new(input),
            options,
            depth: 0,
        }
    }

    pub fn parse(mut self) -> Result<Tree, ParseError> {
        tracing::debug!("Parsing template '{}'", self.input);
        let root = self.parse_any()?;
        tracing::debug!("Parsed template '{}' => {:?}", self.input, root);
        Ok(Tree::new(root, self.input))
    }

    /// Parse the remaining input as a sequence of text runs and functions.
    fn parse_any(&mut self) -> Result<Node, ParseError> {
        let mut nodes = Vec::new();
        loop {
            match self.scanner.scan(ANY) {
                Token::Ident => nodes.push(Node::text(self.scanner.string())),
                Token::Lbrack => nodes.push(self.parse_func()?),
                Token::Eof => break,
                _ => return Err(ParseError::BadSubstitution),
            }
        }
        Ok(Node::chain(nodes))
    }

    /// Parse the body of a `${...}` whose opening marker was just consumed.
    fn parse_func(&mut self) -> Result<Node, ParseError> {
        if self.depth >= self.options.max_depth {
            return Err(ParseError::NestingTooDeep {
                limit: self.options.max_depth,
            });
        }
        self.depth += 1;
        let result = self.parse_func_body();
        self.depth -= 1;
        result
    }

    fn parse_func_body(&mut self) -> Result<Node, ParseError> {
        if self.scanner.peek() == Some('#') {
            return self.parse_len_func();
        }

        let name = match self.scanner.scan(PARAM_NAME) {
            Token::Ident => self.scanner.string().to_string(),
            _ => return Err(self.syntax(SyntaxCause::VariableName)),
        };

        if let Some(family) = self.scanner.peek().and_then(family_for) {
            tracing::trace!(param = %name, ?family, "dispatching operator");
            return match family {
                Family::DefaultOrSubstr => self.parse_default_or_substr(name),
                Family::Default => self.parse_default_func(name),
                Family::Casing => self.parse_casing_func(name),
                Family::Replace => self.parse_replace_func(name),
                Family::Remove(accept) => self.parse_remove_func(name, accept),
            };
        }

        match self.scanner.scan(CLOSE) {
            Token::Rbrack => Ok(Node::Func(FuncNode::new(name))),
            _ => Err(self.syntax(SyntaxCause::MissingBrace)),
        }
    }

    /// Parse one operator argument: literal text or a nested `${...}`.
    fn parse_param(&mut self, accept: Accept, mode: ScanMode) -> Result<Node, ParseError> {
        match self.scanner.scan(ScanConfig::new(mode | ScanMode::LBRACK, accept)) {
            Token::Lbrack => self.parse_func(),
            Token::Ident | Token::Rbrack => Ok(Node::text(self.scanner.string())),
            _ => Err(ParseError::Argument),
        }
    }

    fn parse_default_or_substr(&mut self, name: String) -> Result<Node, ParseError> {
        self.scanner.read();
        let next = self.scanner.peek();
        self.scanner.unread();
        match next {
            Some(c) if DEFAULT_SUFFIXES.contains(&c) => self.parse_default_func(name),
            _ => self.parse_substr_func(name),
        }
    }

    /// `${param:offset}` and `${param:offset:length}`
    fn parse_substr_func(&mut self, name: String) -> Result<Node, ParseError> {
        let mut node = FuncNode::new(name);
        node.name = self.scan_operator(Accept::OneColon)?;

        node.args
            .push(self.parse_param(Accept::NotColonClose, ScanMode::IDENT)?);

        match self
            .scanner
            .scan(ScanConfig::new(ScanMode::IDENT | ScanMode::RBRACK, Accept::Colon))
        {
            Token::Rbrack => return Ok(Node::Func(node)),
            Token::Ident => {}
            _ => return Err(ParseError::BadSubstitution),
        }

        node.args
            .push(self.parse_param(Accept::NotClosing, ScanMode::IDENT)?);

        self.consume_rbrack()?;
        Ok(Node::Func(node))
    }

    /// `${param#word}` `${param##word}` `${param%word}` `${param%%word}`
    fn parse_remove_func(&mut self, name: String, accept: Accept) -> Result<Node, ParseError> {
        let mut node = FuncNode::new(name);
        node.name = self.scan_operator(accept)?;

        node.args
            .push(self.parse_param(Accept::NotClosing, ScanMode::IDENT)?);

        self.consume_rbrack()?;
        Ok(Node::Func(node))
    }

    /// `${param/pattern/string}` `${param//pattern/string}`
    /// `${param/#pattern/string}` `${param/%pattern/string}`
    fn parse_replace_func(&mut self, name: String) -> Result<Node, ParseError> {
        let mut node = FuncNode::new(name);
        node.name = self.scan_operator(Accept::ReplaceFunc)?;

        node.args.push(
            self.parse_param(Accept::NotSlash, ScanMode::IDENT | ScanMode::ESCAPE)?,
        );

        match self
            .scanner
            .scan(ScanConfig::new(ScanMode::IDENT, Accept::Slash))
        {
            Token::Ident => {}
            _ => return Err(ParseError::BadSubstitution),
        }

        // empty replacement
        if self.scanner.peek() == Some('}') {
            self.consume_rbrack()?;
            return Ok(Node::Func(node));
        }

        node.args.push(
            self.parse_param(Accept::NotClosing, ScanMode::IDENT | ScanMode::ESCAPE)?,
        );

        self.consume_rbrack()?;
        Ok(Node::Func(node))
    }

    /// `${param=word}` `${param:=word}` `${param:-word}` `${param:?word}` `${param:+word}`
    ///
    /// The word may mix text and nested functions, so it can produce any
    /// number of arguments.
    fn parse_default_func(&mut self, name: String) -> Result<Node, ParseError> {
        let mut node = FuncNode::new(name);
        let accept = if self.scanner.peek() == Some('=') {
            Accept::OneEqual
        } else {
            Accept::DefaultFunc
        };
        node.name = self.scan_operator(accept)?;

        loop {
            if self.scanner.peek() == Some('}') {
                self.consume_rbrack()?;
                return Ok(Node::Func(node));
            }
            let param = self
                .parse_param(Accept::NotClosing, ScanMode::IDENT)
                .map_err(|err| match err {
                    ParseError::NestingTooDeep { .. } => err,
                    err => self.syntax(SyntaxCause::Nested(Box::new(err))),
                })?;
            node.args.push(param);
        }
    }

    /// `${param,}` `${param,,}` `${param^}` `${param^^}`
    fn parse_casing_func(&mut self, name: String) -> Result<Node, ParseError> {
        let mut node = FuncNode::new(name);
        node.name = self.scan_operator(Accept::CasingFunc)?;

        self.consume_rbrack()?;
        Ok(Node::Func(node))
    }

    /// `${#param}`
    fn parse_len_func(&mut self) -> Result<Node, ParseError> {
        let mut node = FuncNode::default();
        node.name = self.scan_operator(Accept::OneHash)?;

        node.param = match self.scanner.scan(PARAM_NAME) {
            Token::Ident => self.scanner.string().to_string(),
            _ => return Err(ParseError::BadSubstitution),
        };

        self.consume_rbrack()?;
        Ok(Node::Func(node))
    }

    /// Scan an operator token recognized by `accept`.
    fn scan_operator(&mut self, accept: Accept) -> Result<String, ParseError> {
        match self.scanner.scan(ScanConfig::new(ScanMode::IDENT, accept)) {
            Token::Ident => Ok(self.scanner.string().to_string()),
            _ => Err(ParseError::BadSubstitution),
        }
    }

    fn consume_rbrack(&mut self) -> Result<(), ParseError> {
        match self.scanner.scan(CLOSE) {
            Token::Rbrack => Ok(()),
            _ => Err(ParseError::BadSubstitution),
        }
    }

    fn syntax(&self, cause: SyntaxCause) -> ParseError {
        ParseError::Syntax(SyntaxError::new(
            cause,
            self.scanner.line(),
            self.scanner.context(),
        ))
    }
}

//! Scanner for Parameter-Expansion Templates
//!
//! The scanner hands out one token per call. What counts as a token depends on
//! the [`ScanConfig`] the parser passes in: a [`ScanMode`] bit-set choosing
//! which token shapes are legal at this grammar position, and an [`Accept`]
//! predicate deciding which characters may extend an identifier-like run.
//! One scanning routine therefore serves every operator sub-grammar.
//!
//! Escapes (`$$`, `\/`, `\\`) are resolved by copying accepted characters into
//! the token buffer as they are read. The source text itself is never
//! modified, so positions and the diagnostic context always refer to the input.

use std::ops::BitOr;

use super::types::CONTEXT_LEN;

/// Lexical tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Illegal,
    Eof,
    /// A run of accepted characters
    Ident,
    /// `${`
    Lbrack,
    /// `}`
    Rbrack,
}

/// Bit-set of token shapes the scanner may recognize
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanMode(u8);

impl ScanMode {
    pub const IDENT: ScanMode = ScanMode(1);
    pub const LBRACK: ScanMode = ScanMode(1 << 1);
    pub const RBRACK: ScanMode = ScanMode(1 << 2);
    pub const ESCAPE: ScanMode = ScanMode(1 << 3);

    pub const fn union(self, other: ScanMode) -> ScanMode {
        ScanMode(self.0 | other.0)
    }

    pub fn contains(self, other: ScanMode) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ScanMode {
    type Output = ScanMode;

    fn bitor(self, rhs: ScanMode) -> ScanMode {
        self.union(rhs)
    }
}

/// Acceptance predicates.
///
/// Each decides from a character and its 1-based byte index within the
/// current token whether the character extends the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accept {
    /// Anything
    Rune,
    /// Letters, digits and `_`
    Ident,
    /// `:` anywhere
    Colon,
    /// `#` as the first character only (length operator)
    OneHash,
    /// Anything but `}`
    NotClosing,
    /// `#` or `##`
    HashFunc,
    /// `%` or `%%`
    PercentFunc,
    /// `:` then one of `= - ? +`
    DefaultFunc,
    /// `/` then optionally one of `/ # %`
    ReplaceFunc,
    /// A single `=`
    OneEqual,
    /// A single `:`
    OneColon,
    /// Anything but `:` and `}`
    NotColonClose,
    /// `/` anywhere
    Slash,
    /// Anything but `/`
    NotSlash,
    /// `,` `,,` `^` or `^^`
    CasingFunc,
}

impl Accept {
    pub fn accepts(self, r: char, i: usize) -> bool {
        match self {
            Accept::Rune => true,
            Accept::Ident => r.is_alphanumeric() || r == '_',
            Accept::Colon => r == ':',
            Accept::OneHash => r == '#' && i == 1,
            Accept::NotClosing => r != '}',
            Accept::HashFunc => r == '#' && i < 3,
            Accept::PercentFunc => r == '%' && i < 3,
            Accept::DefaultFunc => match i {
                1 => r == ':',
                2 => matches!(r, '=' | '-' | '?' | '+'),
                _ => false,
            },
            Accept::ReplaceFunc => match i {
                1 => r == '/',
                2 => matches!(r, '/' | '#' | '%'),
                _ => false,
            },
            Accept::OneEqual => i == 1 && r == '=',
            Accept::OneColon => i == 1 && r == ':',
            Accept::NotColonClose => r != ':' && r != '}',
            Accept::Slash => r == '/',
            Accept::NotSlash => r != '/',
            Accept::CasingFunc => (r == ',' || r == '^') && i < 3,
        }
    }
}

/// Per-call scanner configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    pub mode: ScanMode,
    pub accept: Accept,
}

impl ScanConfig {
    pub const fn new(mode: ScanMode, accept: Accept) -> Self {
        Self { mode, accept }
    }
}

/// Single-use cursor over one template
pub struct Scanner<'a> {
    src: &'a str,
    /// Read position (byte offset)
    pos: usize,
    /// Start of the current token
    start: usize,
    /// 1-based line number
    line: usize,
    /// Text of the current token with escapes resolved
    text: String,
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            start: 0,
            line: 1,
            text: String::new(),
        }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    /// Read the next character, or `None` at the end of the input.
    pub fn read(&mut self) -> Option<char> {
        let r = self.src[self.pos..].chars().next()?;
        self.pos += r.len_utf8();
        if r == '\n' {
            self.line += 1;
        }
        Some(r)
    }

    /// Step back over the character before the read position.
    pub fn unread(&mut self) {
        if let Some(r) = self.src[..self.pos].chars().next_back() {
            self.pos -= r.len_utf8();
            if r == '\n' {
                self.line -= 1;
            }
        }
    }

    /// The next character, without moving the cursor or the line count.
    pub fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    /// Text of the most recently scanned token.
    pub fn string(&self) -> &str {
        &self.text
    }

    /// Up to [`CONTEXT_LEN`] characters either side of the most recent token.
    pub fn context(&self) -> &'a str {
        let before = self.src[..self.start]
            .char_indices()
            .rev()
            .take(CONTEXT_LEN)
            .last()
            .map_or(self.start, |(i, _)| i);
        let after = self.src[self.pos..]
            .char_indices()
            .nth(CONTEXT_LEN)
            .map_or(self.src.len(), |(i, _)| self.pos + i);
        &self.src[before..after]
    }

    /// Scan one token under `cfg`.
    pub fn scan(&mut self, cfg: ScanConfig) -> Token {
        self.start = self.pos;
        self.text.clear();
        let Some(r) = self.read() else {
            return Token::Eof;
        };
        if self.scan_lbrack(r, cfg.mode) {
            self.text.push_str("${");
            return Token::Lbrack;
        }
        if self.scan_rbrack(r, cfg.mode) {
            self.text.push('}');
            return Token::Rbrack;
        }
        if self.scan_ident(r, cfg) {
            return Token::Ident;
        }
        tracing::trace!(rune = %r, line = self.line, "illegal rune");
        Token::Illegal
    }

    fn scan_ident(&mut self, first: char, cfg: ScanConfig) -> bool {
        if !cfg.mode.contains(ScanMode::IDENT) {
            return false;
        }
        if !self.take(first, cfg) {
            return false;
        }
        loop {
            let Some(r) = self.read() else {
                break;
            };
            if self.scan_lbrack(r, cfg.mode) {
                self.unread();
                self.unread();
                break;
            }
            if !self.take(r, cfg) {
                self.unread();
                break;
            }
        }
        true
    }

    /// Append `r` (or the character it escapes) to the token if allowed.
    fn take(&mut self, r: char, cfg: ScanConfig) -> bool {
        if self.scan_escaped(r, cfg.mode) {
            if let Some(escaped) = self.read() {
                self.text.push(escaped);
            }
            return true;
        }
        if !cfg.accept.accepts(r, self.text.len() + r.len_utf8()) {
            return false;
        }
        self.text.push(r);
        true
    }

    /// Recognize `${`, consuming the `{` on success.
    fn scan_lbrack(&mut self, r: char, mode: ScanMode) -> bool {
        if !mode.contains(ScanMode::LBRACK) || r != '$' {
            return false;
        }
        if self.peek() == Some('{') {
            self.read();
            return true;
        }
        false
    }

    fn scan_rbrack(&self, r: char, mode: ScanMode) -> bool {
        mode.contains(ScanMode::RBRACK) && r == '}'
    }

    /// Whether `r` starts an escape pair (`$$`, `\/` or `\\`).
    fn scan_escaped(&self, r: char, mode: ScanMode) -> bool {
        if !mode.contains(ScanMode::ESCAPE) {
            return false;
        }
        match (r, self.peek()) {
            ('$', Some('$')) => true,
            ('\\', Some('/' | '\\')) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: ScanConfig = ScanConfig::new(
        ScanMode::IDENT.union(ScanMode::LBRACK).union(ScanMode::ESCAPE),
        Accept::Rune,
    );

    #[test]
    fn test_scan_text_then_lbrack() {
        let mut s = Scanner::new("hello ${x}");
        assert_eq!(s.scan(TEXT), Token::Ident);
        assert_eq!(s.string(), "hello ");
        assert_eq!(s.scan(TEXT), Token::Lbrack);
        assert_eq!(s.string(), "${");
    }

    #[test]
    fn test_scan_eof() {
        let mut s = Scanner::new("");
        assert_eq!(s.scan(TEXT), Token::Eof);
    }

    #[test]
    fn test_dollar_without_brace_is_text() {
        let mut s = Scanner::new("$x $");
        assert_eq!(s.scan(TEXT), Token::Ident);
        assert_eq!(s.string(), "$x $");
    }

    #[test]
    fn test_double_dollar_collapses() {
        let mut s = Scanner::new("$${string}");
        assert_eq!(s.scan(TEXT), Token::Ident);
        assert_eq!(s.string(), "${string}");
        assert_eq!(s.scan(TEXT), Token::Eof);
    }

    #[test]
    fn test_backslash_escapes_collapse() {
        let mut s = Scanner::new(r"a\/b\\c\d");
        assert_eq!(s.scan(TEXT), Token::Ident);
        assert_eq!(s.string(), r"a/b\c\d");
    }

    #[test]
    fn test_escaped_char_skips_predicate() {
        let cfg = ScanConfig::new(ScanMode::IDENT | ScanMode::ESCAPE, Accept::NotSlash);
        let mut s = Scanner::new(r"\/position/length");
        assert_eq!(s.scan(cfg), Token::Ident);
        assert_eq!(s.string(), "/position");
        assert_eq!(s.peek(), Some('/'));
    }

    #[test]
    fn test_rbrack_only_when_enabled() {
        let mut s = Scanner::new("}");
        assert_eq!(s.scan(TEXT), Token::Ident);
        let mut s = Scanner::new("}");
        let cfg = ScanConfig::new(ScanMode::RBRACK, Accept::Ident);
        assert_eq!(s.scan(cfg), Token::Rbrack);
    }

    #[test]
    fn test_operator_predicates_by_position() {
        let cfg = ScanConfig::new(ScanMode::IDENT, Accept::DefaultFunc);
        let mut s = Scanner::new(":-default");
        assert_eq!(s.scan(cfg), Token::Ident);
        assert_eq!(s.string(), ":-");

        let cfg = ScanConfig::new(ScanMode::IDENT, Accept::HashFunc);
        let mut s = Scanner::new("###");
        assert_eq!(s.scan(cfg), Token::Ident);
        assert_eq!(s.string(), "##");

        let cfg = ScanConfig::new(ScanMode::IDENT, Accept::ReplaceFunc);
        let mut s = Scanner::new("/%a");
        assert_eq!(s.scan(cfg), Token::Ident);
        assert_eq!(s.string(), "/%");
    }

    #[test]
    fn test_illegal_when_first_rune_rejected() {
        let cfg = ScanConfig::new(ScanMode::IDENT, Accept::Ident);
        let mut s = Scanner::new("$}");
        assert_eq!(s.scan(cfg), Token::Illegal);
    }

    #[test]
    fn test_peek_restores_line() {
        let mut s = Scanner::new("\n\nx");
        assert_eq!(s.peek(), Some('\n'));
        assert_eq!(s.line(), 1);
        s.read();
        s.read();
        assert_eq!(s.line(), 3);
        s.unread();
        assert_eq!(s.line(), 2);
        assert_eq!(s.peek(), Some('\n'));
        assert_eq!(s.line(), 2);
    }

    #[test]
    fn test_context_window() {
        let src = "0123456789abcdefghij${x}0123456789abcdefghij";
        let mut s = Scanner::new(src);
        let cfg = ScanConfig::new(ScanMode::IDENT, Accept::Ident);
        assert_eq!(s.scan(cfg), Token::Ident);
        assert_eq!(s.scan(TEXT), Token::Lbrack);
        assert_eq!(s.context(), "abcdefghij${x}01234567");
    }

    #[test]
    fn test_context_clamps_at_edges() {
        let mut s = Scanner::new("ab${");
        assert_eq!(s.scan(TEXT), Token::Ident);
        assert_eq!(s.context(), "ab${");
    }
}

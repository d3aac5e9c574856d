//! Pattern Matching
//!
//! Converts shell glob patterns to regex equivalents for the removal and
//! replacement operators (`${var%pattern}`, `${var/pattern/string}`, ...).
//!
//! Invalid patterns follow bash:
//! - Unknown POSIX classes (e.g. `[:foo:]`) produce empty match groups
//! - Unclosed character classes (`[abc`) are treated as a literal `[`
//! - Inverted ranges (`[z-a]`) fail regex compilation; callers fall back to
//!   leaving the value unchanged

use std::collections::HashMap;

lazy_static::lazy_static! {
    /// Valid POSIX character class names
    static ref POSIX_CLASSES: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("alnum", "a-zA-Z0-9");
        m.insert("alpha", "a-zA-Z");
        m.insert("blank", " \\t");
        m.insert("cntrl", "\\x00-\\x1F\\x7F");
        m.insert("digit", "0-9");
        m.insert("graph", "!-~");
        m.insert("lower", "a-z");
        m.insert("print", " -~");
        m.insert("punct", "!-/:-@\\[-`{-~");
        m.insert("space", " \\t\\n\\r\\f\\v");
        m.insert("upper", "A-Z");
        m.insert("word", "a-zA-Z0-9_");
        m.insert("xdigit", "0-9A-Fa-f");
        m
    };
}

/// Convert a shell glob pattern to a regex string.
/// `greedy` selects whether `*` matches as much as possible.
pub fn pattern_to_regex(pattern: &str, greedy: bool) -> String {
    let mut regex = String::new();
    let chars: Vec<char> = pattern.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\\' => {
                // \X means literal X
                match chars.get(i + 1) {
                    Some(&next) => {
                        if is_regex_special(next) {
                            regex.push('\\');
                        }
                        regex.push(next);
                        i += 2;
                    }
                    None => {
                        regex.push_str("\\\\");
                        i += 1;
                    }
                }
            }
            '*' => {
                regex.push_str(if greedy { ".*" } else { ".*?" });
                i += 1;
            }
            '?' => {
                regex.push('.');
                i += 1;
            }
            '[' => match find_char_class_end(&chars, i) {
                Some(end) => {
                    let content: String = chars[i + 1..end].iter().collect();
                    regex.push_str(&convert_char_class(&content));
                    i = end + 1;
                }
                None => {
                    regex.push_str("\\[");
                    i += 1;
                }
            },
            _ => {
                if is_regex_special(c) {
                    regex.push('\\');
                }
                regex.push(c);
                i += 1;
            }
        }
    }
    regex
}

fn is_regex_special(c: char) -> bool {
    "\\^$.|+(){}[]*?".contains(c)
}

/// Find the `]` closing the class opened at `start`.
fn find_char_class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut i = start + 1;

    if i < chars.len() && (chars[i] == '^' || chars[i] == '!') {
        i += 1;
    }

    // A ] right after [ or [^ is literal
    if i < chars.len() && chars[i] == ']' {
        i += 1;
    }

    while i < chars.len() {
        if chars[i] == '\\' && i + 1 < chars.len() {
            i += 2;
            continue;
        }
        if chars[i] == ']' {
            return Some(i);
        }
        if chars[i] == '[' && chars.get(i + 1) == Some(&':') {
            let rest: String = chars[i + 2..].iter().collect();
            if let Some(close) = rest.find(":]") {
                i += 2 + rest[..close].chars().count() + 2;
                continue;
            }
        }
        i += 1;
    }
    None
}

/// Convert the content of a shell `[...]` class to a regex class.
fn convert_char_class(content: &str) -> String {
    let mut result = String::from("[");
    let chars: Vec<char> = content.chars().collect();
    let mut i = 0;

    if !chars.is_empty() && (chars[0] == '^' || chars[0] == '!') {
        result.push('^');
        i += 1;
    }

    while i < chars.len() {
        let c = chars[i];

        if c == '[' && chars.get(i + 1) == Some(&':') {
            let rest: String = chars[i + 2..].iter().collect();
            if let Some(close) = rest.find(":]") {
                let name = &rest[..close];
                result.push_str(POSIX_CLASSES.get(name).copied().unwrap_or(""));
                i += 2 + name.chars().count() + 2;
                continue;
            }
        }

        match c {
            '\\' => {
                if let Some(&next) = chars.get(i + 1) {
                    result.push('\\');
                    result.push(next);
                    i += 2;
                } else {
                    result.push_str("\\\\");
                    i += 1;
                }
            }
            '[' => {
                result.push_str("\\[");
                i += 1;
            }
            ']' => {
                // only reachable as the leading literal ]
                result.push_str("\\]");
                i += 1;
            }
            _ => {
                result.push(c);
                i += 1;
            }
        }
    }

    result.push(']');
    result
}

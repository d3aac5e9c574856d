//! Parameter Operation Handlers
//!
//! Pure string operations behind each `${...}` operator:
//! - Default family (`:-` `=` `:=` `:?` `:+`) decisions
//! - Pattern removal and replacement
//! - Length, substring and case modification

use regex_lite::{NoExpand, Regex};

use crate::interpreter::expansion::pattern::pattern_to_regex;

/// Which end of the value a removal operator trims
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternRemovalSide {
    Prefix,
    Suffix,
}

/// Where a replacement pattern must match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternAnchor {
    /// `/` and `//`
    None,
    /// `/#`
    Start,
    /// `/%`
    End,
}

/// Case conversion applied by `,` `,,` `^` `^^`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseDirection {
    LowerFirst,
    LowerAll,
    UpperFirst,
    UpperAll,
}

impl CaseDirection {
    pub fn from_operator(op: &str) -> Option<Self> {
        match op {
            "," => Some(CaseDirection::LowerFirst),
            ",," => Some(CaseDirection::LowerAll),
            "^" => Some(CaseDirection::UpperFirst),
            "^^" => Some(CaseDirection::UpperAll),
            _ => None,
        }
    }
}

/// Returns true if the variable is unset, or if check_empty is true and it is empty.
pub fn should_use_default(value: Option<&str>, check_empty: bool) -> bool {
    match value {
        None => true,
        Some(v) => check_empty && v.is_empty(),
    }
}

/// Character length of a value.
pub fn value_length(value: &str) -> usize {
    value.chars().count()
}

/// Remove the shortest (or, when `greedy`, longest) match of a glob pattern
/// from one end of `value`.
pub fn apply_pattern_removal(
    value: &str,
    pattern: &str,
    side: PatternRemovalSide,
    greedy: bool,
) -> String {
    let body = pattern_to_regex(pattern, greedy);
    match side {
        PatternRemovalSide::Prefix => {
            let Ok(re) = Regex::new(&format!("(?s)^(?:{})", body)) else {
                return value.to_string();
            };
            re.replace(value, "").to_string()
        }
        PatternRemovalSide::Suffix => {
            let Ok(re) = Regex::new(&format!("(?s)^(?:{})$", body)) else {
                return value.to_string();
            };
            // candidate start offsets, from longest suffix to shortest
            let mut starts: Vec<usize> = value.char_indices().map(|(i, _)| i).collect();
            starts.push(value.len());
            if !greedy {
                starts.reverse();
            }
            for start in starts {
                if re.is_match(&value[start..]) {
                    return value[..start].to_string();
                }
            }
            value.to_string()
        }
    }
}

/// Replace matches of a glob pattern in `value`.
///
/// Patterns compile with `(?s)` so `*` and `?` also match newlines.
pub fn apply_pattern_replacement(
    value: &str,
    pattern: &str,
    replacement: &str,
    replace_all: bool,
    anchor: PatternAnchor,
) -> String {
    if pattern.is_empty() {
        return match anchor {
            PatternAnchor::Start => format!("{}{}", replacement, value),
            PatternAnchor::End => format!("{}{}", value, replacement),
            PatternAnchor::None => value.to_string(),
        };
    }

    let body = pattern_to_regex(pattern, true);
    let final_pattern = match anchor {
        PatternAnchor::Start => format!("(?s)^(?:{})", body),
        PatternAnchor::End => format!("(?s)(?:{})$", body),
        PatternAnchor::None => format!("(?s){}", body),
    };

    match Regex::new(&final_pattern) {
        Ok(re) => {
            if replace_all {
                re.replace_all(value, NoExpand(replacement)).to_string()
            } else {
                re.replace(value, NoExpand(replacement)).to_string()
            }
        }
        Err(_) => value.to_string(),
    }
}

/// Apply substring extraction to a value.
/// offset: starting position (negative counts from the end)
/// length: optional length (negative marks an end position counted from the end)
pub fn apply_substring_op(value: &str, offset: i64, length: Option<i64>) -> Result<String, String> {
    let chars: Vec<char> = value.chars().collect();
    let len = chars.len() as i64;

    let start = if offset < 0 {
        (len + offset).max(0) as usize
    } else {
        offset as usize
    };

    if start >= chars.len() {
        return Ok(String::new());
    }

    let end = match length {
        Some(l) if l < 0 => {
            let computed = len + l;
            if computed < start as i64 {
                return Err("substring expression < 0".to_string());
            }
            computed as usize
        }
        Some(l) => start.saturating_add(l as usize).min(chars.len()),
        None => chars.len(),
    };

    Ok(chars[start..end].iter().collect())
}

/// Apply case modification to a value.
pub fn apply_case_modification(value: &str, direction: CaseDirection) -> String {
    let mut chars = value.chars();
    match direction {
        CaseDirection::UpperAll => value.to_uppercase(),
        CaseDirection::LowerAll => value.to_lowercase(),
        CaseDirection::UpperFirst => match chars.next() {
            None => String::new(),
            Some(c) => c.to_uppercase().to_string() + chars.as_str(),
        },
        CaseDirection::LowerFirst => match chars.next() {
            None => String::new(),
            Some(c) => c.to_lowercase().to_string() + chars.as_str(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_use_default() {
        assert!(should_use_default(None, false));
        assert!(should_use_default(None, true));
        assert!(should_use_default(Some(""), true));
        assert!(!should_use_default(Some(""), false));
        assert!(!should_use_default(Some("x"), true));
    }

    #[test]
    fn test_prefix_removal() {
        let v = "foo.tar.gz";
        assert_eq!(apply_pattern_removal(v, "*.", PatternRemovalSide::Prefix, false), "tar.gz");
        assert_eq!(apply_pattern_removal(v, "*.", PatternRemovalSide::Prefix, true), "gz");
        assert_eq!(apply_pattern_removal(v, "bar", PatternRemovalSide::Prefix, true), v);
    }

    #[test]
    fn test_suffix_removal() {
        let v = "foo.tar.gz";
        assert_eq!(apply_pattern_removal(v, ".*", PatternRemovalSide::Suffix, false), "foo.tar");
        assert_eq!(apply_pattern_removal(v, ".*", PatternRemovalSide::Suffix, true), "foo");
        assert_eq!(apply_pattern_removal(v, "gz", PatternRemovalSide::Suffix, false), "foo.tar.");
    }

    #[test]
    fn test_pattern_replacement() {
        let v = "hello world";
        assert_eq!(apply_pattern_replacement(v, "o", "0", false, PatternAnchor::None), "hell0 world");
        assert_eq!(apply_pattern_replacement(v, "o", "0", true, PatternAnchor::None), "hell0 w0rld");
        assert_eq!(apply_pattern_replacement(v, "hello", "bye", false, PatternAnchor::Start), "bye world");
        assert_eq!(apply_pattern_replacement(v, "world", "$1", false, PatternAnchor::Start), v);
        assert_eq!(apply_pattern_replacement(v, "w*", "$1", false, PatternAnchor::End), "hello $1");
    }

    #[test]
    fn test_replacement_with_empty_pattern() {
        assert_eq!(apply_pattern_replacement("x", "", "a", true, PatternAnchor::None), "x");
        assert_eq!(apply_pattern_replacement("x", "", "a", false, PatternAnchor::Start), "ax");
        assert_eq!(apply_pattern_replacement("x", "", "a", false, PatternAnchor::End), "xa");
    }

    #[test]
    fn test_wildcards_match_newlines() {
        let v = "a\nb:c";
        assert_eq!(apply_pattern_removal(v, "*:", PatternRemovalSide::Prefix, false), "c");
        assert_eq!(apply_pattern_removal(v, ":*", PatternRemovalSide::Suffix, false), "a\nb");
        assert_eq!(apply_pattern_removal(v, "?*", PatternRemovalSide::Suffix, true), "");
        assert_eq!(apply_pattern_replacement("a\nb", "?", "-", true, PatternAnchor::None), "---");
        assert_eq!(apply_pattern_replacement("a\nb", "a?", "x", false, PatternAnchor::Start), "xb");
        assert_eq!(apply_pattern_replacement("a\nb", "?b", "x", false, PatternAnchor::End), "ax");
    }

    #[test]
    fn test_substring() {
        assert_eq!(apply_substring_op("hello", 1, None).unwrap(), "ello");
        assert_eq!(apply_substring_op("hello", 1, Some(3)).unwrap(), "ell");
        assert_eq!(apply_substring_op("hello", -3, None).unwrap(), "llo");
        assert_eq!(apply_substring_op("hello", 1, Some(-1)).unwrap(), "ell");
        assert_eq!(apply_substring_op("hello", 10, None).unwrap(), "");
        assert!(apply_substring_op("hello", 3, Some(-4)).is_err());
    }

    #[test]
    fn test_case_modification() {
        assert_eq!(apply_case_modification("hello", CaseDirection::UpperFirst), "Hello");
        assert_eq!(apply_case_modification("hello", CaseDirection::UpperAll), "HELLO");
        assert_eq!(apply_case_modification("HELLO", CaseDirection::LowerFirst), "hELLO");
        assert_eq!(apply_case_modification("HELLO", CaseDirection::LowerAll), "hello");
        assert_eq!(apply_case_modification("", CaseDirection::UpperFirst), "");
    }

    #[test]
    fn test_case_direction_from_operator() {
        assert_eq!(CaseDirection::from_operator(",,"), Some(CaseDirection::LowerAll));
        assert_eq!(CaseDirection::from_operator("^"), Some(CaseDirection::UpperFirst));
        assert_eq!(CaseDirection::from_operator(":-"), None);
    }
}

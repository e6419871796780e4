//! Name shapes shared by the lexer and the serializer.

use regex::Regex;
use std::sync::LazyLock;

/// Names that can be written with dotted notation (`.name`).
///
/// One-character names lex as identifiers too, so they are written with
/// dots rather than brackets.
static SIMPLE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").expect("valid simple name pattern"));

/// Names that can be written in bracket notation (`["name.v1"]`).
static NAME_STRING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9_-]|\.)+$").expect("valid name string pattern"));

/// Words the lexer reserves for reference namespaces and loop keywords.
pub const RESERVED_WORDS: &[&str] = &[
    "variables",
    "values",
    "datasources",
    "resources",
    "children",
    "elem",
    "i",
];

pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

/// Whether `name` lexes back as a single identifier token.
///
/// Boolean literals are matched as prefixes, so `trueName` would lex as
/// `true` followed by `Name`.
pub fn is_identifier(name: &str) -> bool {
    SIMPLE_NAME_RE.is_match(name)
        && !is_reserved_word(name)
        && !name.starts_with("true")
        && !name.starts_with("false")
}

/// Whether `name` can be used inside a bracket accessor.
pub fn is_name_string(name: &str) -> bool {
    NAME_STRING_RE.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifiers() {
        assert!(is_identifier("myVar"));
        assert!(is_identifier("_private"));
        assert!(is_identifier("save-order-function"));
        assert!(is_identifier("a"));
        assert!(is_identifier("_"));
        assert!(!is_identifier("1st"));
        assert!(!is_identifier("values"));
        assert!(!is_identifier("trueValue"));
        assert!(!is_identifier("with.dot"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn test_name_strings() {
        assert!(is_name_string("my-name"));
        assert!(is_name_string("state.v1"));
        assert!(is_name_string("1st"));
        assert!(!is_name_string("has space"));
        assert!(!is_name_string("quote\""));
        assert!(!is_name_string(""));
    }
}

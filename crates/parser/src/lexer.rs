//! Lexer for substitution expressions.
//!
//! Turns the text between `${` and `}` into a flat list of [`Token`]s:
//!
//! - Punctuation (`[ ] ( ) , . =`)
//! - Literals (strings, integers, floats, booleans)
//! - Identifiers and the reserved words `variables`, `values`,
//!   `datasources`, `resources`, `children`, `elem` and `i`
//!
//! Lexing never stops at the first bad character. Unexpected characters and
//! unterminated strings are collected as [`LexError`]s and the remaining
//! input is still tokenised, so a caller gets every problem in one pass.
//!
//! # Example
//!
//! ```rust
//! use blueprint_substitutions_parser::lexer::{lex, TokenKind};
//! use blueprint_substitutions_parser::position::PositionContext;
//!
//! let tokens = lex("variables.env", &PositionContext::default()).unwrap();
//! let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
//! assert_eq!(
//!     kinds,
//!     vec![TokenKind::KeywordVariables, TokenKind::Period, TokenKind::Ident]
//! );
//! ```

use crate::error::{LexError, SubstitutionError};
use crate::names::is_name_string;
use crate::position::{PositionContext, RelativePosition};
use chumsky::prelude::*;
use std::fmt;
use std::ops::Range;

/// The kind of a lexed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    OpenBracket,
    CloseBracket,
    OpenParen,
    CloseParen,
    Comma,
    Period,
    Equals,
    IntLiteral,
    FloatLiteral,
    BoolLiteral,
    StringLiteral,
    /// A string directly after `[` that is a valid bracket accessor name.
    NameStringLiteral,
    Ident,
    KeywordVariables,
    KeywordValues,
    KeywordDatasources,
    KeywordResources,
    KeywordChildren,
    KeywordElem,
    KeywordI,
}

impl TokenKind {
    pub fn keyword(word: &str) -> Option<TokenKind> {
        match word {
            "variables" => Some(TokenKind::KeywordVariables),
            "values" => Some(TokenKind::KeywordValues),
            "datasources" => Some(TokenKind::KeywordDatasources),
            "resources" => Some(TokenKind::KeywordResources),
            "children" => Some(TokenKind::KeywordChildren),
            "elem" => Some(TokenKind::KeywordElem),
            "i" => Some(TokenKind::KeywordI),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::OpenBracket => "openBracket",
            TokenKind::CloseBracket => "closeBracket",
            TokenKind::OpenParen => "openParen",
            TokenKind::CloseParen => "closeParen",
            TokenKind::Comma => "comma",
            TokenKind::Period => "period",
            TokenKind::Equals => "equals",
            TokenKind::IntLiteral => "intLiteral",
            TokenKind::FloatLiteral => "floatLiteral",
            TokenKind::BoolLiteral => "boolLiteral",
            TokenKind::StringLiteral => "stringLiteral",
            TokenKind::NameStringLiteral => "nameStringLiteral",
            TokenKind::Ident => "identifier",
            TokenKind::KeywordVariables => "keywordVariables",
            TokenKind::KeywordValues => "keywordValues",
            TokenKind::KeywordDatasources => "keywordDataSources",
            TokenKind::KeywordResources => "keywordResources",
            TokenKind::KeywordChildren => "keywordChildren",
            TokenKind::KeywordElem => "keywordElem",
            TokenKind::KeywordI => "keywordI",
        };
        write!(f, "{}", name)
    }
}

/// A token with its text and position relative to the lexed input.
///
/// String values have `\"` unescaped. `span` is the byte range of the
/// token in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub position: RelativePosition,
    pub span: Range<usize>,
}

/// Span type for the character-level lexer.
pub type Span = SimpleSpan<usize>;

/// A value paired with its span.
pub type Spanned<T> = (T, Span);

/// Character-level lexemes, before keyword and name-string tagging.
#[derive(Clone, Debug, PartialEq)]
pub enum RawToken<'src> {
    Punct(TokenKind),
    Float(&'src str),
    Int(&'src str),
    Bool(&'src str),
    Word(&'src str),
    /// Contents of a closed string literal, still escaped.
    Str(&'src str),
    UnterminatedStr,
    Unexpected(char),
}

/// Create the character-level lexer.
///
/// Every character is consumed by some alternative, falling back to
/// [`RawToken::Unexpected`], so the parser never fails on its own.
pub fn lexer<'src>(
) -> impl Parser<'src, &'src str, Vec<Spanned<RawToken<'src>>>, extra::Err<Rich<'src, char, Span>>> {
    let punctuation = choice((
        just('[').to(RawToken::Punct(TokenKind::OpenBracket)),
        just(']').to(RawToken::Punct(TokenKind::CloseBracket)),
        just('(').to(RawToken::Punct(TokenKind::OpenParen)),
        just(')').to(RawToken::Punct(TokenKind::CloseParen)),
        just(',').to(RawToken::Punct(TokenKind::Comma)),
        just('.').to(RawToken::Punct(TokenKind::Period)),
        just('=').to(RawToken::Punct(TokenKind::Equals)),
    ));

    // Floats need digits on both sides of the point.
    let float = just('-')
        .or_not()
        .then(text::digits(10))
        .then(just('.'))
        .then(text::digits(10))
        .to_slice()
        .map(RawToken::Float);

    let int = just('-')
        .or_not()
        .then(text::digits(10))
        .to_slice()
        .map(RawToken::Int);

    let boolean = just("true")
        .or(just("false"))
        .to_slice()
        .map(RawToken::Bool);

    let word = any()
        .filter(|c: &char| c.is_ascii_alphabetic() || *c == '_')
        .then(
            any()
                .filter(|c: &char| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
                .repeated(),
        )
        .to_slice()
        .map(RawToken::Word);

    // `\"` is the only escape. Any other backslash is content, so `"x\\"`
    // is unterminated, the same as in `${...}` splitting.
    let string = just('"')
        .ignore_then(
            choice((just('\\').then(just('"')).ignored(), none_of('"').ignored()))
                .repeated()
                .to_slice(),
        )
        .then(just('"').or_not())
        .map(|(body, close): (&str, Option<char>)| match close {
            Some(_) => RawToken::Str(body),
            None => RawToken::UnterminatedStr,
        });

    let unexpected = any().map(RawToken::Unexpected);

    choice((punctuation, float, int, boolean, word, string, unexpected))
        .map_with(|tok, e| (tok, e.span()))
        .padded()
        .repeated()
        .collect()
        .padded()
}

/// Tracks the relative position of increasing byte offsets.
struct PositionTracker<'src> {
    chars: std::iter::Peekable<std::str::CharIndices<'src>>,
    position: RelativePosition,
}

impl<'src> PositionTracker<'src> {
    fn new(text: &'src str) -> Self {
        Self {
            chars: text.char_indices().peekable(),
            position: RelativePosition::default(),
        }
    }

    fn seek(&mut self, offset: usize) -> RelativePosition {
        while let Some(&(index, ch)) = self.chars.peek() {
            if index >= offset {
                break;
            }
            self.position.advance(ch);
            self.chars.next();
        }
        self.position
    }
}

/// Lex `text`, returning every token that could be produced along with
/// every error found.
pub fn lex_with_errors(text: &str, ctx: &PositionContext) -> (Vec<Token>, Vec<LexError>) {
    let mut tracker = PositionTracker::new(text);
    let mut tokens: Vec<Token> = Vec::new();
    let mut errors = Vec::new();

    let raw_tokens = match lexer().parse(text).into_result() {
        Ok(raw_tokens) => raw_tokens,
        Err(parse_errors) => {
            for err in parse_errors {
                let location = ctx.location(tracker.seek(err.span().start));
                errors.push(match err.found() {
                    Some(ch) => LexError::UnexpectedCharacter {
                        character: *ch,
                        location,
                    },
                    None => LexError::UnexpectedEndOfInput {
                        evaluating: "substitution".to_string(),
                        location,
                    },
                });
            }
            return (tokens, errors);
        }
    };

    for (raw, span) in raw_tokens {
        let position = tracker.seek(span.start);
        let (kind, value) = match raw {
            RawToken::Punct(kind) => (kind, text[span.start..span.end].to_string()),
            RawToken::Float(s) => (TokenKind::FloatLiteral, s.to_string()),
            RawToken::Int(s) => (TokenKind::IntLiteral, s.to_string()),
            RawToken::Bool(s) => (TokenKind::BoolLiteral, s.to_string()),
            RawToken::Word(s) => (TokenKind::keyword(s).unwrap_or(TokenKind::Ident), s.to_string()),
            RawToken::Str(body) => {
                let after_bracket = tokens
                    .last()
                    .is_some_and(|prev| prev.kind == TokenKind::OpenBracket);
                let kind = if after_bracket && is_name_string(body) {
                    TokenKind::NameStringLiteral
                } else {
                    TokenKind::StringLiteral
                };
                (kind, body.replace("\\\"", "\""))
            }
            RawToken::UnterminatedStr => {
                errors.push(LexError::UnexpectedEndOfInput {
                    evaluating: "string literal".to_string(),
                    location: ctx.location(position),
                });
                continue;
            }
            RawToken::Unexpected(character) => {
                errors.push(LexError::UnexpectedCharacter {
                    character,
                    location: ctx.location(position),
                });
                continue;
            }
        };
        tokens.push(Token {
            kind,
            value,
            position,
            span: span.start..span.end,
        });
    }

    if !errors.is_empty() {
        tracing::debug!(count = errors.len(), "lexing substitution produced errors");
    }
    (tokens, errors)
}

/// Lex `text`, failing with every collected error if any character could
/// not be tokenised.
pub fn lex(text: &str, ctx: &PositionContext) -> Result<Vec<Token>, SubstitutionError> {
    let (tokens, errors) = lex_with_errors(text, ctx);
    if errors.is_empty() {
        Ok(tokens)
    } else {
        Err(SubstitutionError::lex(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::{ColumnAccuracy, SourcePosition};
    use pretty_assertions::assert_eq;

    fn kinds(text: &str) -> Vec<TokenKind> {
        lex(text, &PositionContext::default())
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn values(text: &str) -> Vec<String> {
        lex(text, &PositionContext::default())
            .unwrap()
            .into_iter()
            .map(|t| t.value)
            .collect()
    }

    #[test]
    fn test_numeric_literals() {
        assert_eq!(kinds("1.5"), vec![TokenKind::FloatLiteral]);
        assert_eq!(kinds("10"), vec![TokenKind::IntLiteral]);
        assert_eq!(kinds("-3.0"), vec![TokenKind::FloatLiteral]);
        assert_eq!(kinds("-3"), vec![TokenKind::IntLiteral]);
        assert_eq!(values("-3.0"), vec!["-3.0"]);
    }

    #[test]
    fn test_float_requires_digits_after_point() {
        assert_eq!(kinds("3."), vec![TokenKind::IntLiteral, TokenKind::Period]);
    }

    #[test]
    fn test_variable_reference() {
        assert_eq!(
            kinds("variables.myVar"),
            vec![
                TokenKind::KeywordVariables,
                TokenKind::Period,
                TokenKind::Ident
            ]
        );
        assert_eq!(values("variables.myVar")[2], "myVar");
    }

    #[test]
    fn test_name_string_after_bracket() {
        assert_eq!(
            kinds(r#"resources["my-name"].field"#),
            vec![
                TokenKind::KeywordResources,
                TokenKind::OpenBracket,
                TokenKind::NameStringLiteral,
                TokenKind::CloseBracket,
                TokenKind::Period,
                TokenKind::Ident
            ]
        );
    }

    #[test]
    fn test_string_not_after_bracket_stays_string() {
        assert_eq!(
            kinds(r#"trim("my-name")"#),
            vec![
                TokenKind::Ident,
                TokenKind::OpenParen,
                TokenKind::StringLiteral,
                TokenKind::CloseParen
            ]
        );
    }

    #[test]
    fn test_invalid_name_in_bracket_stays_string() {
        assert_eq!(
            kinds(r#"["has space"]"#),
            vec![
                TokenKind::OpenBracket,
                TokenKind::StringLiteral,
                TokenKind::CloseBracket
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(values(r#""say \"hi\"""#), vec![r#"say "hi""#]);
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            kinds("values datasources children elem i item-1 _x"),
            vec![
                TokenKind::KeywordValues,
                TokenKind::KeywordDatasources,
                TokenKind::KeywordChildren,
                TokenKind::KeywordElem,
                TokenKind::KeywordI,
                TokenKind::Ident,
                TokenKind::Ident
            ]
        );
    }

    #[test]
    fn test_bool_prefix_match() {
        assert_eq!(kinds("true"), vec![TokenKind::BoolLiteral]);
        assert_eq!(
            kinds("trueish"),
            vec![TokenKind::BoolLiteral, TokenKind::Ident]
        );
    }

    #[test]
    fn test_function_call_with_named_argument() {
        assert_eq!(
            kinds(r#"object(key = "value", n = 2)"#),
            vec![
                TokenKind::Ident,
                TokenKind::OpenParen,
                TokenKind::Ident,
                TokenKind::Equals,
                TokenKind::StringLiteral,
                TokenKind::Comma,
                TokenKind::Ident,
                TokenKind::Equals,
                TokenKind::IntLiteral,
                TokenKind::CloseParen
            ]
        );
    }

    #[test]
    fn test_positions_across_lines() {
        let tokens = lex("\n  values.x\n    [0]", &PositionContext::default()).unwrap();
        assert_eq!(tokens[0].position, RelativePosition::new(1, 2));
        assert_eq!(tokens[3].position, RelativePosition::new(2, 4));
        assert_eq!(tokens[4].position, RelativePosition::new(2, 5));
    }

    #[test]
    fn test_unexpected_characters_are_all_reported() {
        let (tokens, errors) = lex_with_errors("variables.x $ %", &PositionContext::default());
        assert_eq!(tokens.len(), 3);
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors[0],
            LexError::UnexpectedCharacter {
                character: '$',
                location: PositionContext::default().location(RelativePosition::new(0, 12)),
            }
        );
    }

    #[test]
    fn test_unterminated_string() {
        let ctx = PositionContext::default();
        let (tokens, errors) = lex_with_errors(r#"variables["unterminated}"#, &ctx);
        assert_eq!(
            tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![TokenKind::KeywordVariables, TokenKind::OpenBracket]
        );
        assert_eq!(errors.len(), 1);
        match &errors[0] {
            LexError::UnexpectedEndOfInput {
                evaluating,
                location,
            } => {
                assert_eq!(evaluating, "string literal");
                assert_eq!((location.line, location.column), (1, 11));
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert!(errors[0].to_string().contains("unexpected end of input"));
    }

    #[test]
    fn test_locations_use_parent_context() {
        let ctx = PositionContext::from_parent(Some(SourcePosition::new(5, 10)), true, 0);
        let (_, errors) = lex_with_errors("values.x ~", &ctx);
        let location = errors[0].location();
        assert_eq!((location.line, location.column), (5, 10));
        assert_eq!(location.column_accuracy, ColumnAccuracy::Approximate);
    }

    #[test]
    fn test_whitespace_only() {
        assert!(kinds("   \n\t ").is_empty());
    }
}

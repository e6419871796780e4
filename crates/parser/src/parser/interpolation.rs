//! Splitting interpolated strings into literal text and substitutions.

use super::parse_substitution_with_context;
use crate::ast::{StringOrSubstitution, StringOrSubstitutions};
use crate::error::{LexError, SubstitutionError};
use crate::options::ParseOptions;
use crate::position::{RelativePosition, SourceMeta};

/// An `${` that has not been closed yet.
#[derive(Clone, Copy)]
struct OpenSubstitution {
    dollar: RelativePosition,
    content_byte: usize,
    content_start: RelativePosition,
}

/// Parse a field value that may contain `${...}` substitutions.
///
/// Literal text is kept verbatim. A `}` inside a quoted string in a
/// substitution does not close it. Every substitution is parsed even when
/// an earlier one fails, and all failures are returned together as
/// [`SubstitutionError::InvalidSubstitutions`].
///
/// # Example
///
/// ```rust
/// use blueprint_substitutions_parser::{parse_substitution_values, ParseOptions};
///
/// let parsed = parse_substitution_values(
///     "orders-${variables.env}-table",
///     &ParseOptions::default(),
/// )
/// .unwrap();
/// assert_eq!(parsed.values.len(), 3);
/// assert_eq!(parsed.substitutions().count(), 1);
/// ```
pub fn parse_substitution_values(
    value: &str,
    options: &ParseOptions,
) -> Result<StringOrSubstitutions, SubstitutionError> {
    let ctx = options.position_context();
    let line_info = options.output_line_info;
    let meta = |start: RelativePosition, end: RelativePosition| {
        line_info.then(|| SourceMeta::spanning(ctx.absolute(start), ctx.absolute(end)))
    };

    let mut parts = Vec::new();
    let mut errors = Vec::new();
    let mut position = RelativePosition::default();

    if !value.contains("${") {
        for ch in value.chars() {
            position.advance(ch);
        }
        return Ok(StringOrSubstitutions {
            values: vec![StringOrSubstitution::String {
                value: value.to_string(),
                source_meta: meta(RelativePosition::default(), position),
            }],
            source_meta: meta(RelativePosition::default(), position),
        });
    }

    let mut literal_start = (0usize, RelativePosition::default());
    let mut open: Option<OpenSubstitution> = None;
    let mut in_string = false;
    let mut prev: Option<char> = None;

    for (byte, ch) in value.char_indices() {
        match open {
            None => {
                if prev == Some('$') && ch == '{' {
                    // `$` is one byte and sits directly before `{` on this line.
                    let dollar_byte = byte - 1;
                    let dollar = RelativePosition::new(position.line, position.column - 1);
                    if dollar_byte > literal_start.0 {
                        parts.push(StringOrSubstitution::String {
                            value: value[literal_start.0..dollar_byte].to_string(),
                            source_meta: meta(literal_start.1, dollar),
                        });
                    }
                    let mut content_start = position;
                    content_start.advance(ch);
                    open = Some(OpenSubstitution {
                        dollar,
                        content_byte: byte + 1,
                        content_start,
                    });
                    in_string = false;
                }
            }
            Some(sub) => {
                if ch == '"' && prev != Some('\\') {
                    in_string = !in_string;
                } else if ch == '}' && !in_string {
                    let mut end = position;
                    end.advance(ch);
                    let content = &value[sub.content_byte..byte];
                    match parse_substitution_with_context(
                        content,
                        &ctx.nested(sub.content_start),
                        line_info,
                    ) {
                        Ok(substitution) => parts.push(StringOrSubstitution::Substitution {
                            value: substitution,
                            source_meta: meta(sub.dollar, end),
                        }),
                        Err(err) => errors.push(err),
                    }
                    open = None;
                    literal_start = (byte + 1, end);
                }
            }
        }
        position.advance(ch);
        prev = Some(ch);
    }

    match open {
        Some(sub) => {
            let content = &value[sub.content_byte..];
            match parse_substitution_with_context(content, &ctx.nested(sub.content_start), line_info)
            {
                Err(err) => errors.push(err),
                Ok(_) => errors.push(SubstitutionError::Lex(LexError::UnexpectedEndOfInput {
                    evaluating: "substitution".to_string(),
                    location: ctx.location(sub.dollar),
                })),
            }
        }
        None if literal_start.0 < value.len() => {
            parts.push(StringOrSubstitution::String {
                value: value[literal_start.0..].to_string(),
                source_meta: meta(literal_start.1, position),
            });
        }
        None => {}
    }

    if !errors.is_empty() {
        tracing::debug!(
            context = options.substitution_context.as_deref().unwrap_or(""),
            count = errors.len(),
            "invalid substitutions in value"
        );
        return Err(SubstitutionError::InvalidSubstitutions {
            context: options.substitution_context.clone(),
            position: options.parent_position,
            column_accuracy: ctx.column_accuracy,
            errors,
        });
    }

    Ok(StringOrSubstitutions {
        values: parts,
        source_meta: meta(RelativePosition::default(), position),
    })
}

//! Error types and error reporting for substitutions.
//!
//! Each stage has its own leaf error type:
//!
//! - [`LexError`] - unexpected characters and unterminated strings
//! - [`ParseError`] - token sequences that do not form a substitution
//! - [`SerializeError`] - trees that cannot be rendered back to text
//!
//! Stages collect every problem they find in an expression before
//! returning, so the error callers see is a [`SubstitutionError`] that may
//! hold an ordered list of causes. [`SubstitutionError::diagnostics`]
//! flattens it for display.
//!
//! # Pretty Printing
//!
//! [`ErrorReporter`] renders diagnostics with
//! [ariadne](https://crates.io/crates/ariadne) against the source text:
//!
//! ```rust
//! use blueprint_substitutions_parser::error::ErrorReporter;
//! use blueprint_substitutions_parser::{parse_substitution_values, ParseOptions};
//!
//! let source = "${variables.env$}";
//! let err = parse_substitution_values(source, &ParseOptions::default()).unwrap_err();
//! let reporter = ErrorReporter::new("value.txt", source);
//! let mut out = Vec::new();
//! reporter.write_error(&err, &mut out).unwrap();
//! ```

use crate::lexer::TokenKind;
use crate::position::{ColumnAccuracy, Location, SourcePosition};
use ariadne::{Color, Label, Report, ReportKind, Source};
use std::fmt;
use std::io;
use thiserror::Error;

/// Reason code attached to load errors for interpolated strings.
pub const REASON_INVALID_REFERENCE_SUBSTITUTION: &str = "invalid_reference_substitution";

/// Errors produced while lexing a substitution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error(
        "lex error at {location}: validation failed due to an unexpected character \
         \"{character}\" having been encountered in a reference substitution"
    )]
    UnexpectedCharacter { character: char, location: Location },

    #[error(
        "lex error at {location}: validation failed due to an unexpected end of input \
         having been encountered when evaluating a {evaluating}"
    )]
    UnexpectedEndOfInput {
        evaluating: String,
        location: Location,
    },
}

impl LexError {
    pub fn location(&self) -> Location {
        match self {
            LexError::UnexpectedCharacter { location, .. }
            | LexError::UnexpectedEndOfInput { location, .. } => *location,
        }
    }
}

/// A positional parse failure.
///
/// `found` is the kind of the offending token, `None` at end of input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error {}: {message}", parse_error_at(.found, .location))]
pub struct ParseError {
    pub message: String,
    pub found: Option<TokenKind>,
    pub location: Location,
}

fn parse_error_at(found: &Option<TokenKind>, location: &Location) -> String {
    match found {
        Some(kind) => format!("at {} with token type \"{}\"", location, kind),
        None => format!("at end of input ({})", location),
    }
}

/// Errors produced while rendering a substitution tree back to text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SerializeError {
    #[error(
        "serialise error: invalid {kind} name \"{name}\", names must be identifiers \
         or contain only letters, digits, \"_\", \"-\" and \".\""
    )]
    InvalidName { kind: String, name: String },

    #[error("serialise error: invalid field name \"{name}\" in property path")]
    InvalidFieldName { name: String },

    #[error(
        "serialise error: invalid property path \"{raw_path}\" for {element}: {}",
        join_messages(.errors)
    )]
    InvalidPath {
        element: String,
        raw_path: String,
        errors: Vec<SerializeError>,
    },

    #[error("serialise error: child reference \"{child_name}\" must have a property path")]
    EmptyChildPath { child_name: String },

    #[error("serialise error: argument {index} of function \"{function}\" is missing a value")]
    MissingArgumentValue { function: String, index: usize },

    #[error("serialise error: \"{name}\" is not a valid function name")]
    InvalidFunctionName { name: String },

    #[error("serialise error: \"{name}\" is not a valid argument name for function \"{function}\"")]
    InvalidArgumentName { function: String, name: String },

    #[error("serialise error: float literal {value} cannot be represented in a substitution")]
    NonFiniteFloat { value: f64 },

    #[error("serialise error: string literal \"{value}\" ends with a backslash that would escape its closing quote")]
    TrailingBackslash { value: String },
}

fn join_messages(errors: &[SerializeError]) -> String {
    errors
        .iter()
        .map(|err| err.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// The stage an aggregated error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStage {
    Lex,
    Parse,
    Serialize,
}

impl fmt::Display for ErrorStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorStage::Lex => "lex errors",
            ErrorStage::Parse => "parse errors",
            ErrorStage::Serialize => "serialise errors",
        })
    }
}

/// The error returned by the public parse and serialise entry points.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubstitutionError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Serialize(#[from] SerializeError),
    /// Several failures from one stage, in the order they were found.
    #[error("{stage}: {message}{}", list_causes(.errors))]
    Multiple {
        stage: ErrorStage,
        message: String,
        errors: Vec<SubstitutionError>,
    },
    /// One or more substitutions in an interpolated string failed to load.
    #[error(
        "load errors: validation failed due to one or more invalid reference substitutions \
         having been provided{}{}",
        for_context(.context),
        list_causes(.errors)
    )]
    InvalidSubstitutions {
        context: Option<String>,
        position: Option<SourcePosition>,
        column_accuracy: ColumnAccuracy,
        errors: Vec<SubstitutionError>,
    },
}

impl SubstitutionError {
    /// Combines causes from one stage, unwrapping a lone cause.
    pub fn combine(
        stage: ErrorStage,
        message: impl Into<String>,
        mut errors: Vec<SubstitutionError>,
    ) -> Self {
        if errors.len() == 1 {
            return errors.remove(0);
        }
        SubstitutionError::Multiple {
            stage,
            message: message.into(),
            errors,
        }
    }

    pub fn lex(errors: Vec<LexError>) -> Self {
        SubstitutionError::Multiple {
            stage: ErrorStage::Lex,
            message: "lexical analysis failed for substitution".to_string(),
            errors: errors.into_iter().map(SubstitutionError::Lex).collect(),
        }
    }

    /// Reason code for load errors, `None` for other failures.
    pub fn reason_code(&self) -> Option<&'static str> {
        match self {
            SubstitutionError::InvalidSubstitutions { .. } => {
                Some(REASON_INVALID_REFERENCE_SUBSTITUTION)
            }
            _ => None,
        }
    }

    /// Every leaf error with its location, depth first.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        self.collect_diagnostics(None, &mut out);
        out
    }

    fn collect_diagnostics(&self, fallback: Option<Location>, out: &mut Vec<Diagnostic>) {
        match self {
            SubstitutionError::Lex(err) => out.push(Diagnostic {
                message: err.to_string(),
                location: Some(err.location()),
            }),
            SubstitutionError::Parse(err) => out.push(Diagnostic {
                message: err.message.clone(),
                location: Some(err.location),
            }),
            SubstitutionError::Serialize(err) => out.push(Diagnostic {
                message: err.to_string(),
                location: fallback,
            }),
            SubstitutionError::Multiple { errors, .. } => {
                for err in errors {
                    err.collect_diagnostics(fallback, out);
                }
            }
            SubstitutionError::InvalidSubstitutions {
                position,
                column_accuracy,
                errors,
                ..
            } => {
                let fallback = position.map(|pos| Location {
                    line: pos.line,
                    column: pos.column,
                    column_accuracy: *column_accuracy,
                });
                for err in errors {
                    err.collect_diagnostics(fallback, out);
                }
            }
        }
    }
}

fn list_causes(errors: &[SubstitutionError]) -> String {
    errors.iter().map(|err| format!("\n\t- {}", err)).collect()
}

fn for_context(context: &Option<String>) -> String {
    match context {
        Some(context) => format!(" for \"{}\"", context),
        None => String::new(),
    }
}

/// A flattened leaf error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub location: Option<Location>,
}

/// Error reporter that uses ariadne for pretty error output.
///
/// Locations are absolute, so `source` should be the text the positions
/// were computed against: the whole document when a parent position was
/// given, otherwise the value itself.
pub struct ErrorReporter<'src> {
    source_name: String,
    source: &'src str,
}

impl<'src> ErrorReporter<'src> {
    pub fn new(source_name: impl Into<String>, source: &'src str) -> Self {
        Self {
            source_name: source_name.into(),
            source,
        }
    }

    /// Report every diagnostic in `error` to stderr.
    pub fn report_error(&self, error: &SubstitutionError) -> io::Result<()> {
        self.write_error(error, io::stderr())
    }

    pub fn write_error<W: io::Write>(&self, error: &SubstitutionError, mut out: W) -> io::Result<()> {
        for diagnostic in error.diagnostics() {
            let offset = diagnostic
                .location
                .map(|loc| self.char_offset(loc.line, loc.column))
                .unwrap_or(0);
            let span = offset..(offset + 1).min(self.source.chars().count().max(offset));

            let mut label = Label::new((&self.source_name, span)).with_color(Color::Red);
            if let Some(loc) = diagnostic.location {
                label = label.with_message(format!("at {}", loc));
            }

            let mut report = Report::build(ReportKind::Error, &self.source_name, offset)
                .with_message(&diagnostic.message)
                .with_label(label);

            if let Some(code) = error.reason_code() {
                report = report.with_note(format!("reason: {}", code));
            }
            if diagnostic
                .location
                .is_some_and(|loc| loc.column_accuracy == ColumnAccuracy::Approximate)
            {
                report = report.with_help("the column for this error is approximate");
            }

            report
                .finish()
                .write((&self.source_name, Source::from(self.source)), &mut out)?;
        }
        Ok(())
    }

    /// Character offset of a 1-based line and column, clamped to the source.
    fn char_offset(&self, line: usize, column: usize) -> usize {
        let mut offset = 0;
        for (index, text) in self.source.split('\n').enumerate() {
            let len = text.chars().count();
            if index + 1 == line {
                return offset + column.saturating_sub(1).min(len);
            }
            offset += len + 1;
        }
        self.source.chars().count()
    }
}

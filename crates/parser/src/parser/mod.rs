//! Parser for substitution expressions.
//!
//! A hand-written recursive descent parser over the tokens produced by
//! [`crate::lexer`]. Rules are tried in a fixed order and rewind the
//! [`TokenStream`] when they do not apply, so the first rule whose leading
//! tokens match wins.
//!
//! # Grammar
//!
//! ```text
//! substitution     = functionCall | variableRef | valueRef | elemRef | elemIndexRef
//!                  | dataSourceRef | childRef | resourceRef | literal ;
//! functionCall     = ident "(" [ arg { "," arg } ] ")" { pathItem } ;
//! arg              = [ ident "=" ] substitution ;
//! variableRef      = "variables" nameAccessor ;
//! valueRef         = "values" nameAccessor { pathItem } ;
//! elemRef          = "elem" { pathItem } ;
//! elemIndexRef     = "i" | "elem" "." "i" ;
//! dataSourceRef    = "datasources" nameAccessor nameAccessor [ indexAccessor ] ;
//! childRef         = "children" nameAccessor nameAccessor { pathItem } ;
//! resourceRef      = ( "resources" nameAccessor | ident ) [ indexAccessor ] { pathItem } ;
//! pathItem         = nameAccessor | indexAccessor ;
//! nameAccessor     = "." ident | "[" nameStringLiteral "]" ;
//! indexAccessor    = "[" [ intLiteral ] "]" ;
//! literal          = boolLiteral | floatLiteral | intLiteral | stringLiteral ;
//! ```
//!
//! An empty index accessor (`[]`) selects index 0.
//!
//! # Error Recovery
//!
//! Function arguments and path items are independent of each other, so a
//! failure in one is recorded and the parser skips ahead to the next
//! argument or accessor. All errors found this way are returned together.

mod functions;
mod interpolation;
mod references;
mod stream;


pub use interpolation::parse_substitution_values;
pub use stream::TokenStream;

use crate::ast::{Literal, Substitution};
use crate::error::{ParseError, SubstitutionError};
use crate::lexer::{lex, Token, TokenKind};
use crate::options::ParseOptions;
use crate::position::{PositionContext, SourceMeta};

/// Message used when no rule matches the current token.
pub(crate) const UNEXPECTED_TOKEN_MESSAGE: &str =
    "failed to parse substitution, found unexpected or missing token";

/// Parser for one substitution, the text between `${` and `}`.
pub struct Parser<'t> {
    stream: TokenStream<'t>,
    ctx: PositionContext,
    output_line_info: bool,
}

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t [Token], ctx: PositionContext, output_line_info: bool) -> Self {
        Self {
            stream: TokenStream::new(tokens),
            ctx,
            output_line_info,
        }
    }

    /// Parse the tokens as exactly one substitution.
    pub fn parse(mut self) -> Result<Substitution, SubstitutionError> {
        if self.stream.at_end() {
            return Err(self.error_at_current("expected a substitution, found empty input"));
        }
        let substitution = self.substitution()?;
        if !self.stream.at_end() {
            return Err(self.error_at_current(
                "unexpected token found after the end of the substitution",
            ));
        }
        Ok(substitution)
    }

    fn substitution(&mut self) -> Result<Substitution, SubstitutionError> {
        if let Some(function) = self.function_call()? {
            return Ok(Substitution::Function(function));
        }
        if let Some(variable) = self.variable_reference()? {
            return Ok(Substitution::Variable(variable));
        }
        if let Some(value) = self.value_reference()? {
            return Ok(Substitution::ValueReference(value));
        }
        if let Some(elem) = self.elem_reference()? {
            return Ok(elem);
        }
        if let Some(index) = self.elem_index_reference() {
            return Ok(Substitution::ElemIndexReference(index));
        }
        if let Some(data_source) = self.data_source_reference()? {
            return Ok(Substitution::DataSourceProperty(data_source));
        }
        if let Some(child) = self.child_reference()? {
            return Ok(Substitution::Child(child));
        }
        if let Some(resource) = self.resource_reference()? {
            return Ok(Substitution::ResourceProperty(resource));
        }
        if let Some(literal) = self.literal()? {
            return Ok(literal);
        }
        Err(self.error_at_current(UNEXPECTED_TOKEN_MESSAGE))
    }

    fn literal(&mut self) -> Result<Option<Substitution>, SubstitutionError> {
        let Some(token) = self.stream.peek() else {
            return Ok(None);
        };
        let source_meta = self.source_meta(token);
        let literal = match token.kind {
            TokenKind::BoolLiteral => Substitution::BoolLiteral(Literal {
                value: token.value == "true",
                source_meta,
            }),
            TokenKind::FloatLiteral => {
                let value = token.value.parse::<f64>().map_err(|_| {
                    self.error_at(Some(token), format!("invalid float literal \"{}\"", token.value))
                })?;
                Substitution::FloatLiteral(Literal { value, source_meta })
            }
            TokenKind::IntLiteral => {
                let value = token.value.parse::<i64>().map_err(|_| {
                    self.error_at(
                        Some(token),
                        format!("integer literal \"{}\" is out of range", token.value),
                    )
                })?;
                Substitution::IntLiteral(Literal { value, source_meta })
            }
            TokenKind::StringLiteral | TokenKind::NameStringLiteral => {
                Substitution::StringLiteral(Literal {
                    value: token.value.clone(),
                    source_meta,
                })
            }
            _ => return Ok(None),
        };
        self.stream.advance();
        Ok(Some(literal))
    }

    fn source_meta(&self, token: &Token) -> Option<SourceMeta> {
        self.output_line_info
            .then(|| SourceMeta::at(self.ctx.absolute(token.position)))
    }

    /// Error located at `token`, or at the end of the input when `None`.
    fn error_at(&self, token: Option<&Token>, message: impl Into<String>) -> SubstitutionError {
        let position = token
            .or_else(|| self.stream.last())
            .map(|t| t.position)
            .unwrap_or_default();
        SubstitutionError::Parse(ParseError {
            message: message.into(),
            found: token.map(|t| t.kind),
            location: self.ctx.location(position),
        })
    }

    fn error_at_current(&self, message: impl Into<String>) -> SubstitutionError {
        self.error_at(self.stream.peek(), message)
    }
}

/// Lex and parse a single substitution (without the `${` and `}`).
///
/// # Example
///
/// ```rust
/// use blueprint_substitutions_parser::{parse_substitution, ParseOptions, Substitution};
///
/// let sub = parse_substitution("variables.env", &ParseOptions::default()).unwrap();
/// assert_eq!(sub, Substitution::variable("env"));
/// ```
pub fn parse_substitution(
    text: &str,
    options: &ParseOptions,
) -> Result<Substitution, SubstitutionError> {
    parse_substitution_with_context(text, &options.position_context(), options.output_line_info)
}

pub(crate) fn parse_substitution_with_context(
    text: &str,
    ctx: &PositionContext,
    output_line_info: bool,
) -> Result<Substitution, SubstitutionError> {
    let tokens = lex(text, ctx)?;
    let result = Parser::new(&tokens, *ctx, output_line_info).parse();
    if let Err(err) = &result {
        tracing::debug!(substitution = text, error = %err, "failed to parse substitution");
    }
    result
}

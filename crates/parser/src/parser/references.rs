//! Reference rules: variables, values, elem, data sources, children and
//! resources, plus the accessors they share.

use super::Parser;
use crate::ast::{
    Substitution, SubstitutionChild, SubstitutionDataSourceProperty,
    SubstitutionElemIndexReference, SubstitutionElemReference, SubstitutionPathItem,
    SubstitutionResourceProperty, SubstitutionValueReference, SubstitutionVariable,
};
use crate::error::{ErrorStage, SubstitutionError};
use crate::lexer::TokenKind;

const NAME_ACCESSOR_HINT: &str = "(i.e. [\"{name}\"] or .{name})";

impl<'t> Parser<'t> {
    pub(super) fn variable_reference(
        &mut self,
    ) -> Result<Option<SubstitutionVariable>, SubstitutionError> {
        let Some(keyword) = self.stream.eat(TokenKind::KeywordVariables) else {
            return Ok(None);
        };
        let variable_name = self.name_accessor().ok_or_else(|| {
            self.error_at_current(format!(
                "expected a valid name accessor {} for a variable reference",
                NAME_ACCESSOR_HINT
            ))
        })?;
        Ok(Some(SubstitutionVariable {
            variable_name,
            source_meta: self.source_meta(keyword),
        }))
    }

    pub(super) fn value_reference(
        &mut self,
    ) -> Result<Option<SubstitutionValueReference>, SubstitutionError> {
        let Some(keyword) = self.stream.eat(TokenKind::KeywordValues) else {
            return Ok(None);
        };
        let value_name = self.name_accessor().ok_or_else(|| {
            self.error_at_current(format!(
                "expected a valid name accessor {} for a value reference",
                NAME_ACCESSOR_HINT
            ))
        })?;
        let path = self.property_path("value reference")?;
        Ok(Some(SubstitutionValueReference {
            value_name,
            path,
            source_meta: self.source_meta(keyword),
        }))
    }

    /// `elem` with a path, or `elem.i` for the loop index.
    pub(super) fn elem_reference(&mut self) -> Result<Option<Substitution>, SubstitutionError> {
        let Some(keyword) = self.stream.eat(TokenKind::KeywordElem) else {
            return Ok(None);
        };
        let source_meta = self.source_meta(keyword);

        let is_index = self.stream.peek_kind() == Some(TokenKind::Period)
            && self.stream.peek_nth(1).map(|t| t.kind) == Some(TokenKind::KeywordI);
        if is_index {
            self.stream.advance();
            self.stream.advance();
            return Ok(Some(Substitution::ElemIndexReference(
                SubstitutionElemIndexReference { source_meta },
            )));
        }

        let path = self.property_path("element reference")?;
        Ok(Some(Substitution::ElemReference(SubstitutionElemReference {
            path,
            source_meta,
        })))
    }

    pub(super) fn elem_index_reference(&mut self) -> Option<SubstitutionElemIndexReference> {
        let keyword = self.stream.eat(TokenKind::KeywordI)?;
        Some(SubstitutionElemIndexReference {
            source_meta: self.source_meta(keyword),
        })
    }

    pub(super) fn data_source_reference(
        &mut self,
    ) -> Result<Option<SubstitutionDataSourceProperty>, SubstitutionError> {
        let Some(keyword) = self.stream.eat(TokenKind::KeywordDatasources) else {
            return Ok(None);
        };
        let data_source_name = self.name_accessor().ok_or_else(|| {
            self.error_at_current(format!(
                "expected a valid name accessor {} for a data source reference",
                NAME_ACCESSOR_HINT
            ))
        })?;
        let field_name = self.name_accessor().ok_or_else(|| {
            self.error_at_current(format!(
                "expected a valid field name accessor {} for data source \"{}\"",
                NAME_ACCESSOR_HINT, data_source_name
            ))
        })?;
        let primitive_arr_index = self.index_accessor()?;
        Ok(Some(SubstitutionDataSourceProperty {
            data_source_name,
            field_name,
            primitive_arr_index,
            source_meta: self.source_meta(keyword),
        }))
    }

    pub(super) fn child_reference(
        &mut self,
    ) -> Result<Option<SubstitutionChild>, SubstitutionError> {
        let Some(keyword) = self.stream.eat(TokenKind::KeywordChildren) else {
            return Ok(None);
        };
        let child_name = self.name_accessor().ok_or_else(|| {
            self.error_at_current(format!(
                "expected a valid name accessor {} for a child reference",
                NAME_ACCESSOR_HINT
            ))
        })?;
        let export_name = self.name_accessor().ok_or_else(|| {
            self.error_at_current(format!(
                "expected a valid exported field name accessor {} for child \"{}\"",
                NAME_ACCESSOR_HINT, child_name
            ))
        })?;
        let mut path = vec![SubstitutionPathItem::FieldName(export_name)];
        path.extend(self.property_path("child reference")?);
        Ok(Some(SubstitutionChild {
            child_name,
            path,
            source_meta: self.source_meta(keyword),
        }))
    }

    /// `resources.name` or a bare identifier naming a resource.
    pub(super) fn resource_reference(
        &mut self,
    ) -> Result<Option<SubstitutionResourceProperty>, SubstitutionError> {
        let (start, resource_name) = if let Some(keyword) = self.stream.eat(TokenKind::KeywordResources)
        {
            let name = self.name_accessor().ok_or_else(|| {
                self.error_at_current(format!(
                    "expected a valid name accessor {} for a resource reference",
                    NAME_ACCESSOR_HINT
                ))
            })?;
            (keyword, name)
        } else if let Some(ident) = self.stream.eat(TokenKind::Ident) {
            (ident, ident.value.clone())
        } else {
            return Ok(None);
        };

        let each_template_index = self.index_accessor()?;
        let path = self.property_path("resource reference")?;
        Ok(Some(SubstitutionResourceProperty {
            resource_name,
            each_template_index,
            path,
            source_meta: self.source_meta(start),
        }))
    }

    /// `.ident` or `["name"]`. Consumes nothing when it does not match.
    pub(super) fn name_accessor(&mut self) -> Option<String> {
        let checkpoint = self.stream.current_pos();
        if self.stream.eat(TokenKind::Period).is_some() {
            if let Some(name) = self.stream.eat(TokenKind::Ident) {
                return Some(name.value.clone());
            }
        } else if self.stream.eat(TokenKind::OpenBracket).is_some() {
            if let Some(name) = self.stream.eat(TokenKind::NameStringLiteral) {
                if self.stream.eat(TokenKind::CloseBracket).is_some() {
                    return Some(name.value.clone());
                }
            }
        }
        self.stream.rewind(checkpoint);
        None
    }

    /// `[0]` or `[]`. Consumes nothing when the tokens are not an index
    /// accessor; consumes the accessor when its index is invalid.
    pub(super) fn index_accessor(&mut self) -> Result<Option<usize>, SubstitutionError> {
        let checkpoint = self.stream.current_pos();
        if self.stream.eat(TokenKind::OpenBracket).is_none() {
            return Ok(None);
        }
        let index_token = self.stream.eat(TokenKind::IntLiteral);
        if self.stream.eat(TokenKind::CloseBracket).is_none() {
            self.stream.rewind(checkpoint);
            return Ok(None);
        }
        match index_token {
            None => Ok(Some(0)),
            Some(token) => token.value.parse::<usize>().map(Some).map_err(|_| {
                self.error_at(
                    Some(token),
                    format!(
                        "invalid index \"{}\", indexes must be non-negative integers",
                        token.value
                    ),
                )
            }),
        }
    }

    /// Zero or more path items. Malformed accessors are recorded and
    /// skipped so later accessors are still checked.
    pub(super) fn property_path(
        &mut self,
        reference_kind: &str,
    ) -> Result<Vec<SubstitutionPathItem>, SubstitutionError> {
        let mut path = Vec::new();
        let mut errors = Vec::new();

        loop {
            if let Some(name) = self.name_accessor() {
                path.push(SubstitutionPathItem::FieldName(name));
                continue;
            }
            match self.index_accessor() {
                Ok(Some(index)) => {
                    path.push(SubstitutionPathItem::ArrayIndex(index));
                    continue;
                }
                Ok(None) => {}
                Err(err) => {
                    errors.push(err);
                    continue;
                }
            }

            match self.stream.peek_kind() {
                Some(TokenKind::Period) => {
                    self.stream.advance();
                    errors.push(self.error_at_current(
                        "expected a field name identifier after \".\" in a property path",
                    ));
                    if self
                        .stream
                        .peek_kind()
                        .is_some_and(|kind| !is_structural(kind))
                    {
                        self.stream.advance();
                    }
                }
                Some(TokenKind::OpenBracket) => {
                    self.stream.advance();
                    errors.push(self.error_at_current(
                        "expected a valid field name string literal or integer index \
                         in a bracket accessor",
                    ));
                    self.stream.synchronize_bracket();
                }
                _ => break,
            }
        }

        if errors.is_empty() {
            Ok(path)
        } else {
            Err(SubstitutionError::combine(
                ErrorStage::Parse,
                format!("failed to parse the property path of a {}", reference_kind),
                errors,
            ))
        }
    }
}

/// Tokens that separate or close parts of an expression.
fn is_structural(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Comma
            | TokenKind::CloseParen
            | TokenKind::OpenParen
            | TokenKind::OpenBracket
            | TokenKind::CloseBracket
            | TokenKind::Period
            | TokenKind::Equals
    )
}

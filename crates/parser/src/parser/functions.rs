//! Function call rules.

use super::Parser;
use crate::ast::{SubstitutionFunctionArg, SubstitutionFunctionExpr};
use crate::error::{ErrorStage, SubstitutionError};
use crate::lexer::TokenKind;

impl<'t> Parser<'t> {
    /// `name(arg, name = arg)` followed by an optional property path.
    ///
    /// Only commits once an identifier is followed by `(`, otherwise the
    /// identifier is left for the bare resource rule.
    pub(super) fn function_call(
        &mut self,
    ) -> Result<Option<SubstitutionFunctionExpr>, SubstitutionError> {
        let checkpoint = self.stream.current_pos();
        let Some(name) = self.stream.eat(TokenKind::Ident) else {
            return Ok(None);
        };
        if self.stream.eat(TokenKind::OpenParen).is_none() {
            self.stream.rewind(checkpoint);
            return Ok(None);
        }

        let mut arguments = Vec::new();
        let mut errors = Vec::new();
        let mut index = 0;

        loop {
            if self.stream.eat(TokenKind::CloseParen).is_some() {
                break;
            }
            if self.stream.at_end() {
                errors.push(self.error_at_current(format!(
                    "expected \")\" to close the arguments of function \"{}\"",
                    name.value
                )));
                break;
            }
            if index > 0 && self.stream.eat(TokenKind::Comma).is_none() {
                errors.push(self.error_at_current(format!(
                    "expected \",\" after argument {} of function \"{}\"",
                    index - 1,
                    name.value
                )));
                self.stream.synchronize_argument();
                if self.stream.eat(TokenKind::Comma).is_none() {
                    continue;
                }
            }

            match self.function_argument(&name.value, index) {
                Ok(argument) => arguments.push(argument),
                Err(err) => {
                    errors.push(err);
                    self.stream.synchronize_argument();
                }
            }
            index += 1;
        }

        let path = match self.property_path("function call") {
            Ok(path) => path,
            Err(err) => {
                errors.push(err);
                Vec::new()
            }
        };

        if !errors.is_empty() {
            return Err(SubstitutionError::combine(
                ErrorStage::Parse,
                format!("failed to parse call to function \"{}\"", name.value),
                errors,
            ));
        }

        Ok(Some(SubstitutionFunctionExpr {
            function_name: name.value.clone(),
            arguments,
            path,
            source_meta: self.source_meta(name),
        }))
    }

    fn function_argument(
        &mut self,
        function_name: &str,
        index: usize,
    ) -> Result<SubstitutionFunctionArg, SubstitutionError> {
        let checkpoint = self.stream.current_pos();
        if let Some(arg_name) = self.stream.eat(TokenKind::Ident) {
            if self.stream.eat(TokenKind::Equals).is_some() {
                if self.at_argument_end() {
                    return Err(self.error_at_current(format!(
                        "expected a value for named argument \"{}\" of function \"{}\"",
                        arg_name.value, function_name
                    )));
                }
                let value = self.substitution()?;
                return Ok(SubstitutionFunctionArg {
                    name: Some(arg_name.value.clone()),
                    value: Some(Box::new(value)),
                    source_meta: self.source_meta(arg_name),
                });
            }
            self.stream.rewind(checkpoint);
        }

        if self.at_argument_end() {
            return Err(self.error_at_current(format!(
                "expected a value for argument {} of function \"{}\"",
                index, function_name
            )));
        }
        let value = self.substitution()?;
        Ok(SubstitutionFunctionArg::positional(value))
    }

    fn at_argument_end(&self) -> bool {
        matches!(
            self.stream.peek_kind(),
            None | Some(TokenKind::Comma) | Some(TokenKind::CloseParen)
        )
    }
}

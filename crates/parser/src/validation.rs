//! Semantic checks on parsed substitutions.
//!
//! Parsing accepts any function name and named arguments anywhere. These
//! checks report what a parsed substitution cannot mean in the place it
//! is used: unknown functions, named arguments outside `object`, `elem`
//! and `i` outside an each template, and elements referencing themselves.
//! Unknown functions are warnings since plugins can add functions.

use crate::ast::{Substitution, SubstitutionFunctionExpr};
use crate::core_functions::{accepts_named_arguments, is_core_function, OBJECT_FUNCTION};
use crate::element::element_id;
use crate::position::SourcePosition;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SemanticError {
    pub message: String,
    pub position: Option<SourcePosition>,
    pub severity: Severity,
    pub hint: Option<String>,
}

/// Where a substitution is being used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationContext {
    /// Element ID of the element containing the substitution.
    pub used_in: Option<String>,
    /// The substitution belongs to a resource expanded with `each`, so
    /// `elem` and `i` are available.
    pub in_each_template: bool,
    /// Functions provided by plugins in addition to the core functions.
    pub extra_functions: Vec<String>,
}

/// Checks that need more than the grammar: function names, named
/// arguments, loop references and self references.
pub fn validate_substitution(
    substitution: &Substitution,
    ctx: &ValidationContext,
) -> Vec<SemanticError> {
    let mut errors = Vec::new();
    validate_node(substitution, ctx, &mut errors);
    errors
}

fn validate_node(sub: &Substitution, ctx: &ValidationContext, errors: &mut Vec<SemanticError>) {
    let position = sub.source_meta().map(|m| m.position);
    match sub {
        Substitution::Function(call) => validate_function(call, ctx, errors),
        Substitution::ElemReference(_) | Substitution::ElemIndexReference(_)
            if !ctx.in_each_template =>
        {
            errors.push(SemanticError {
                message: format!(
                    "{} can only be used in a resource expanded from a template with \"each\"",
                    sub.kind_name()
                ),
                position,
                severity: Severity::Error,
                hint: None,
            });
        }
        _ => {}
    }

    if let (Some((kind, name)), Some(used_in)) = (sub.referenced_element(), &ctx.used_in) {
        if element_id(kind, name) == *used_in {
            errors.push(SemanticError {
                message: format!("{} \"{}\" cannot reference itself", kind, name),
                position,
                severity: Severity::Error,
                hint: None,
            });
        }
    }
}

fn validate_function(
    call: &SubstitutionFunctionExpr,
    ctx: &ValidationContext,
    errors: &mut Vec<SemanticError>,
) {
    let position = call.source_meta.map(|m| m.position);
    let name = call.function_name.as_str();

    if !is_core_function(name) && !ctx.extra_functions.iter().any(|f| f == name) {
        errors.push(SemanticError {
            message: format!("Function \"{}\" is not a core function", name),
            position,
            severity: Severity::Warning,
            hint: Some("The function must be provided by a plugin loaded at deploy time".to_string()),
        });
    }

    for arg in &call.arguments {
        if let Some(arg_name) = &arg.name {
            if !accepts_named_arguments(name) {
                errors.push(SemanticError {
                    message: format!(
                        "Named argument \"{}\" provided for function \"{}\"",
                        arg_name, name
                    ),
                    position: arg.source_meta.map(|m| m.position).or(position),
                    severity: Severity::Error,
                    hint: Some(format!(
                        "Named arguments are only supported in the \"{}\" function",
                        OBJECT_FUNCTION
                    )),
                });
            }
        }
        if let Some(value) = &arg.value {
            validate_node(value, ctx, errors);
        }
    }
}

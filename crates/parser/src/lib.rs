//! # blueprint-substitutions-parser
//!
//! Lexer, parser, serializer and validator for blueprint substitutions.
//!
//! A blueprint field value can embed `${...}` substitutions that reference
//! other elements of the blueprint or call functions:
//!
//! ```text
//! name: "orders-${variables.environment}"
//! arn: "${resources.ordersTable.state.tableArn}"
//! hosts: "${map(variables.hosts, replace_g("http://", "https://"))}"
//! ```
//!
//! This crate provides:
//!
//! - **Parsing** of a single expression or a whole interpolated string into
//!   a typed AST
//! - **Source positions** relative to the blueprint document the value came
//!   from, including approximate columns for YAML block scalars
//! - **Serialization** of an AST back to canonical `${...}` text
//! - **Validation** of function names, named arguments and loop references
//!
//! ## Quick Start
//!
//! ```rust
//! use blueprint_substitutions_parser::{
//!     parse_substitution_values, serialize_substitutions, ParseOptions,
//! };
//!
//! let parsed = parse_substitution_values(
//!     "${resources.ordersTable.spec.id}-${trim(values.suffix)}",
//!     &ParseOptions::default(),
//! )
//! .unwrap();
//! assert_eq!(parsed.substitutions().count(), 2);
//!
//! let text = serialize_substitutions(&parsed, None).unwrap();
//! assert_eq!(text, "${resources.ordersTable.spec.id}-${trim(values.suffix)}");
//! ```
//!
//! ## Expression Overview
//!
//! | Expression | Meaning |
//! |------------|---------|
//! | `variables.env` | Blueprint variable |
//! | `values.tags[0]` | Computed value with a property path |
//! | `datasources.network.subnets[1]` | Data source export field |
//! | `resources.orders.spec.id` | Resource property (the `resources.` prefix is optional) |
//! | `resources.orders[2].spec.id` | Property of one resource expanded from a template |
//! | `children.core.tableName` | Export of a child blueprint |
//! | `elem.id`, `i` | Current element and index inside an `each` template |
//! | `trim(values.name)` | Function call, `object(key = ...)` for named arguments |
//!
//! ## Module Overview
//!
//! - [`ast`] - Substitution tree types
//! - [`lexer`] - Tokenization using chumsky combinators
//! - [`parser`] - Recursive descent parser and interpolated string splitting
//! - [`serializer`] - AST back to substitution text
//! - [`validation`] - Semantic checks that need more than the grammar
//! - [`error`] - Error types with pretty printing via ariadne
//!
//! ## Error Handling
//!
//! Errors from every stage are collected rather than stopping at the first
//! failure:
//!
//! ```rust
//! use blueprint_substitutions_parser::{parse_substitution_values, ParseOptions};
//!
//! let options = ParseOptions::default().with_context("spec.tableName");
//! let err = parse_substitution_values("${variables.}-${values[}", &options).unwrap_err();
//! assert_eq!(err.diagnostics().len(), 2);
//! assert_eq!(err.reason_code(), Some("invalid_reference_substitution"));
//! ```

pub mod ast;
pub mod core_functions;
pub mod element;
pub mod error;
pub mod lexer;
pub mod names;
pub mod options;
pub mod parser;
pub mod position;
pub mod serializer;
pub mod validation;

// Re-export commonly used types
pub use ast::{
    StringOrSubstitution, StringOrSubstitutions, Substitution, SubstitutionFunctionArg,
    SubstitutionPathItem,
};
pub use element::{element_id, parse_element_id, ElementKind};
pub use error::{ErrorReporter, SubstitutionError};
pub use options::ParseOptions;
pub use parser::{parse_substitution, parse_substitution_values};
pub use position::{ColumnAccuracy, SourceMeta, SourcePosition};
pub use serializer::{serialize_substitution, serialize_substitutions};
pub use validation::{validate_substitution, ValidationContext};

#[cfg(test)]
mod tests {
    use super::*;
    use chumsky::prelude::*;

    #[test]
    fn test_parse_and_serialize() {
        let sub = parse_substitution("resources.orders.spec.id", &ParseOptions::default()).unwrap();
        assert_eq!(serialize_substitution(&sub).unwrap(), "resources.orders.spec.id");
    }

    #[test]
    fn test_lexer_integration() {
        let tokens = lexer::lexer().parse(r#"join(values.parts, ",")"#);
        assert!(tokens.has_output());
    }
}

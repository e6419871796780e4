//! # blueprint-substitutions
//!
//! Substitution expressions and reference chains for blueprints.
//!
//! ## Features
//!
//! | Feature | Crate | Description |
//! |---------|-------|-------------|
//! | `parser` | [`blueprint-substitutions-parser`] | Lexer, AST, parser, serializer, validator |
//! | `graph`  | [`blueprint-refgraph`]             | Reference chains, cycle detection, deep copy |
//!
//! `default = ["full"]` enables all of the above.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! blueprint-substitutions = "0.1"
//! ```
//!
//! ```rust
//! use blueprint_substitutions::graph::ReferenceChainCollector;
//! use blueprint_substitutions::{parse_substitution_values, serialize_substitutions, ParseOptions};
//!
//! let options = ParseOptions::default().with_context("resources.table.spec.name");
//! let value = parse_substitution_values("orders-${variables.env}", &options).unwrap();
//! assert_eq!(serialize_substitutions(&value, None).unwrap(), "orders-${variables.env}");
//!
//! let mut collector: ReferenceChainCollector<()> = ReferenceChainCollector::new();
//! for sub in value.substitutions() {
//!     blueprint_substitutions::graph::collect_substitution_references(
//!         &mut collector,
//!         "resources.table",
//!         "spec.name",
//!         sub,
//!         |_| None,
//!     )
//!     .unwrap();
//! }
//! assert!(collector.validate().is_ok());
//! ```
//!
//! [`blueprint-substitutions-parser`]: blueprint_substitutions_parser
//! [`blueprint-refgraph`]: blueprint_refgraph

#[cfg(feature = "parser")]
pub use blueprint_substitutions_parser as parser;

#[cfg(feature = "parser")]
pub use blueprint_substitutions_parser::{
    parse_substitution, parse_substitution_values, serialize_substitution,
    serialize_substitutions, validate_substitution, ParseOptions, StringOrSubstitutions,
    Substitution, SubstitutionError,
};

#[cfg(feature = "graph")]
pub use blueprint_refgraph as graph;

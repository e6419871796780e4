//! # blueprint-refgraph
//!
//! Reference chains between blueprint elements, built from the references
//! found in substitutions.
//!
//! This crate provides tools to record which elements depend on which,
//! detect circular references before deployment ordering is attempted, and
//! hand independent copies of the chains to algorithms that mutate them.
//!
//! ## Features
//!
//! - **Collection**: Nodes keyed by element name with bidirectional edges,
//!   materialised paths and tags
//! - **Cycle Detection**: Every distinct cycle reported once, rooted at the
//!   node on the current path where it closes
//! - **Deep Copy**: Structurally independent copies that keep shared nodes
//!   shared
//! - **Reference Extraction**: Element references from parsed
//!   substitutions, tagged by where they were used
//! - **Export**: JSON and petgraph representations
//!
//! ## Example
//!
//! ```rust
//! use blueprint_refgraph::{collect_substitution_references, ReferenceChainCollector};
//! use blueprint_substitutions_parser::{parse_substitution, ParseOptions};
//!
//! let mut collector: ReferenceChainCollector<()> = ReferenceChainCollector::new();
//! let options = ParseOptions::default();
//!
//! let table_name = parse_substitution("resources.queue.spec.name", &options).unwrap();
//! collect_substitution_references(&mut collector, "resources.table", "spec.name", &table_name, |_| None)
//!     .unwrap();
//!
//! let queue_name = parse_substitution("resources.table.spec.name", &options).unwrap();
//! collect_substitution_references(&mut collector, "resources.queue", "spec.name", &queue_name, |_| None)
//!     .unwrap();
//!
//! let err = collector.validate().unwrap_err();
//! assert_eq!(err.roots().collect::<Vec<_>>(), vec!["resources.table"]);
//! ```

mod collector;
mod copy;
mod cycles;
mod error;
pub mod export;
mod node;
pub mod references;
pub mod tags;

pub use collector::ReferenceChainCollector;
pub use copy::{deep_copy_reference_chains, ReferenceChains};
pub use cycles::Cycle;
pub use error::{CircularReferenceError, CollectError};
pub use export::{EdgeRepr, GraphRepr, NodeRepr};
pub use node::ReferenceChainNode;
pub use references::{
    collect_depends_on, collect_substitution_references, extract_element_references, extract_from_values,
    ElementReference,
};

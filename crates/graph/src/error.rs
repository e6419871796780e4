//! Error types for reference collection and cycle validation.

use crate::cycles::Cycle;
use thiserror::Error;

/// Errors that can occur when collecting a reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectError {
    /// Every node is identified by its element name
    #[error("cannot collect a reference chain node without an element name")]
    EmptyElementName,

    /// The referring element name was given but empty
    #[error("element \"{element_name}\" was collected with an empty referrer name")]
    EmptyReferrerName { element_name: String },
}

/// One or more cycles were found in the collected references.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "validation failed due to circular references being found in the blueprint: {}",
    describe_cycles(.cycles)
)]
pub struct CircularReferenceError {
    pub cycles: Vec<Cycle>,
}

impl CircularReferenceError {
    /// Element names at which each cycle was discovered.
    pub fn roots(&self) -> impl Iterator<Item = &str> {
        self.cycles.iter().map(|cycle| cycle.root.as_str())
    }
}

fn describe_cycles(cycles: &[Cycle]) -> String {
    cycles
        .iter()
        .map(|cycle| cycle.path.join(" -> "))
        .collect::<Vec<_>>()
        .join("; ")
}

//! Node type for reference chains.

use crate::tags;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// One blueprint element in a set of reference chains.
///
/// Edges are stored as element names so nodes can live in a flat arena
/// keyed by name. Every name in `references` has this node's name in its
/// own `referenced_by`, and the reverse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceChainNode<E> {
    /// Unique name of the element, usually an element ID such as
    /// `resources.ordersTable`.
    pub element_name: String,
    /// Schema-level definition of the element. `None` for a node created
    /// as a referrer before the element itself was collected.
    pub element: Option<E>,
    /// Elements this element depends on.
    pub references: IndexSet<String>,
    /// Elements that depend on this element.
    pub referenced_by: IndexSet<String>,
    /// Materialised paths (`a/b/c`) through which this element was reached.
    pub paths: IndexSet<String>,
    /// Free-form tags describing how the element was referenced.
    pub tags: IndexSet<String>,
}

impl<E> ReferenceChainNode<E> {
    pub fn new(element_name: impl Into<String>, element: Option<E>) -> Self {
        Self {
            element_name: element_name.into(),
            element,
            references: IndexSet::new(),
            referenced_by: IndexSet::new(),
            paths: IndexSet::new(),
            tags: IndexSet::new(),
        }
    }

    /// Nothing depends on this element.
    pub fn is_leaf_dependant(&self) -> bool {
        self.referenced_by.is_empty()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Whether `used_in` must be deployed after this element, because a
    /// substitution in it references this element or it lists this element
    /// in `dependsOn`. Links alone are not hard dependencies.
    pub fn is_hard_dependency_of(&self, used_in: &str) -> bool {
        tags::is_hard_dependency_of(&self.tags, used_in)
    }

    /// Whether `element_name` appears anywhere above this node in a
    /// materialised path.
    pub fn has_ancestor(&self, element_name: &str) -> bool {
        self.paths
            .iter()
            .any(|path| path.split('/').rev().skip(1).any(|part| part == element_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ancestors_from_paths() {
        let mut node: ReferenceChainNode<()> = ReferenceChainNode::new("c", None);
        node.paths.insert("a/b/c".to_string());
        assert!(node.has_ancestor("a"));
        assert!(node.has_ancestor("b"));
        assert!(!node.has_ancestor("c"));
        assert!(node.is_leaf_dependant());
    }
}

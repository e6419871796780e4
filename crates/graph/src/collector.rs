//! Collecting references into a set of reference chains.

use crate::error::CollectError;
use crate::node::ReferenceChainNode;
use indexmap::IndexMap;

/// Builds reference chains from references discovered while validating
/// or resolving a blueprint.
///
/// Nodes are kept in an arena keyed by element name, in the order they
/// were first seen. One collector is meant for a single validation pass
/// and is not synchronised; concurrent resolvers should each use their
/// own collector and [`merge`](Self::merge) them before cycle detection.
///
/// # Example
///
/// ```rust
/// use blueprint_refgraph::ReferenceChainCollector;
///
/// let mut collector = ReferenceChainCollector::new();
/// collector.collect("resources.api", Some("api"), None, &[]).unwrap();
/// collector
///     .collect("resources.table", Some("table"), Some("resources.api"), &[])
///     .unwrap();
///
/// let api = collector.chain("resources.api").unwrap();
/// assert!(api.references.contains("resources.table"));
/// assert!(!collector.has_circular_references());
/// ```
#[derive(Debug, Clone)]
pub struct ReferenceChainCollector<E> {
    pub(crate) nodes: IndexMap<String, ReferenceChainNode<E>>,
}

impl<E> Default for ReferenceChainCollector<E> {
    fn default() -> Self {
        Self {
            nodes: IndexMap::new(),
        }
    }
}

impl<E> ReferenceChainCollector<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `element_name`, and that `referenced_by` depends on it.
    ///
    /// Nodes are created on first sight, for the referrer as well. Calling
    /// this again for a known element reuses its node: the first payload
    /// is kept, new edges and tags are added to it.
    ///
    /// A new edge extends the element's paths from the referrer's paths as
    /// they are at that moment. Paths of nodes further down are not
    /// updated, so they depend on the order references are collected in.
    pub fn collect(
        &mut self,
        element_name: &str,
        element: Option<E>,
        referenced_by: Option<&str>,
        tags: &[String],
    ) -> Result<(), CollectError> {
        if element_name.is_empty() {
            return Err(CollectError::EmptyElementName);
        }
        if referenced_by == Some("") {
            return Err(CollectError::EmptyReferrerName {
                element_name: element_name.to_string(),
            });
        }

        if let Some(referrer) = referenced_by {
            if !self.nodes.contains_key(referrer) {
                tracing::trace!(element = referrer, "creating node for referrer");
                self.nodes.insert(
                    referrer.to_string(),
                    ReferenceChainNode::new(referrer, None),
                );
            }
        }

        let node = self
            .nodes
            .entry(element_name.to_string())
            .or_insert_with(|| ReferenceChainNode::new(element_name, None));
        if node.element.is_none() {
            node.element = element;
        }
        node.tags.extend(tags.iter().cloned());

        if let Some(referrer) = referenced_by {
            self.add_edge(referrer, element_name);
        }
        Ok(())
    }

    /// Add `from -> to`, extending the materialised paths of `to`. Both
    /// nodes must exist.
    fn add_edge(&mut self, from: &str, to: &str) {
        let Some(parent) = self.nodes.get_mut(from) else {
            return;
        };
        if !parent.references.insert(to.to_string()) {
            return;
        }
        tracing::debug!(from, to, "collected reference");

        let new_paths: Vec<String> = if parent.paths.is_empty() {
            vec![format!("{}/{}", from, to)]
        } else {
            parent
                .paths
                .iter()
                .map(|path| format!("{}/{}", path, to))
                .collect()
        };

        if let Some(child) = self.nodes.get_mut(to) {
            child.referenced_by.insert(from.to_string());
            child.paths.extend(new_paths);
        }
    }

    /// Drop the edge `from -> to` from both nodes. Returns whether the
    /// edge existed.
    pub fn remove_reference(&mut self, from: &str, to: &str) -> bool {
        let removed = self
            .nodes
            .get_mut(from)
            .is_some_and(|node| node.references.shift_remove(to));
        if let Some(node) = self.nodes.get_mut(to) {
            node.referenced_by.shift_remove(from);
        }
        removed
    }

    /// Fold `other` into this collector, as if its references had been
    /// collected here after the existing ones.
    pub fn merge(&mut self, other: ReferenceChainCollector<E>) {
        let mut edges = Vec::new();
        for (name, node) in other.nodes {
            for target in &node.references {
                edges.push((name.clone(), target.clone()));
            }
            let existing = self
                .nodes
                .entry(name.clone())
                .or_insert_with(|| ReferenceChainNode::new(name.as_str(), None));
            if existing.element.is_none() {
                existing.element = node.element;
            }
            existing.tags.extend(node.tags);
        }
        for (from, to) in edges {
            if !self.nodes.contains_key(&to) {
                self.nodes.insert(to.clone(), ReferenceChainNode::new(to.as_str(), None));
            }
            self.add_edge(&from, &to);
        }
    }

    pub fn chain(&self, element_name: &str) -> Option<&ReferenceChainNode<E>> {
        self.nodes.get(element_name)
    }

    pub fn chain_mut(&mut self, element_name: &str) -> Option<&mut ReferenceChainNode<E>> {
        self.nodes.get_mut(element_name)
    }

    /// All nodes in the order they were first collected.
    pub fn chains(&self) -> impl Iterator<Item = &ReferenceChainNode<E>> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, element_name: &str) -> bool {
        self.nodes.contains_key(element_name)
    }

    /// Elements that `element_name` depends on.
    pub fn references_of(&self, element_name: &str) -> Vec<&ReferenceChainNode<E>> {
        self.neighbours(element_name, |node| &node.references)
    }

    /// Elements that depend on `element_name`.
    pub fn referenced_by_of(&self, element_name: &str) -> Vec<&ReferenceChainNode<E>> {
        self.neighbours(element_name, |node| &node.referenced_by)
    }

    fn neighbours(
        &self,
        element_name: &str,
        edges: impl Fn(&ReferenceChainNode<E>) -> &indexmap::IndexSet<String>,
    ) -> Vec<&ReferenceChainNode<E>> {
        self.nodes
            .get(element_name)
            .map(|node| {
                edges(node)
                    .iter()
                    .filter_map(|name| self.nodes.get(name))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Nodes that nothing depends on, the starting points for ordering
    /// elements by their dependencies.
    pub fn chains_by_leaf_dependants(&self) -> Vec<&ReferenceChainNode<E>> {
        self.nodes
            .values()
            .filter(|node| node.is_leaf_dependant())
            .collect()
    }
}

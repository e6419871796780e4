//! Independent copies of reference chains.
//!
//! Ordering algorithms mark and unlink nodes as they go. They run on a copy
//! so the collector's chains stay intact for later passes.

use crate::collector::ReferenceChainCollector;
use crate::cycles::{find_cycles_in, Cycle};
use crate::node::ReferenceChainNode;
use indexmap::IndexMap;
use std::collections::HashSet;

/// A copy of the nodes reachable from a set of roots.
///
/// Nodes are copied once each and keyed by element name, so two copied
/// parents of one element share the same copied child.
#[derive(Debug, Clone)]
pub struct ReferenceChains<E> {
    nodes: IndexMap<String, ReferenceChainNode<E>>,
    roots: Vec<String>,
}

impl<E> ReferenceChains<E> {
    /// The copied roots, in the order they were requested.
    pub fn roots(&self) -> impl Iterator<Item = &ReferenceChainNode<E>> {
        self.roots.iter().filter_map(|name| self.nodes.get(name))
    }

    pub fn get(&self, element_name: &str) -> Option<&ReferenceChainNode<E>> {
        self.nodes.get(element_name)
    }

    pub fn get_mut(&mut self, element_name: &str) -> Option<&mut ReferenceChainNode<E>> {
        self.nodes.get_mut(element_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReferenceChainNode<E>> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn references_of(&self, element_name: &str) -> Vec<&ReferenceChainNode<E>> {
        self.nodes
            .get(element_name)
            .map(|node| {
                node.references
                    .iter()
                    .filter_map(|name| self.nodes.get(name))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Drop the edge `from -> to` from both copied nodes.
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

    pub fn find_cycles(&self) -> Vec<Cycle> {
        find_cycles_in(&self.nodes)
    }
}

/// Copy every node connected to `roots`, following edges in both
/// directions. Unknown roots are skipped.
pub fn deep_copy_reference_chains<E: Clone>(
    collector: &ReferenceChainCollector<E>,
    roots: &[&str],
) -> ReferenceChains<E> {
    let mut copied: HashSet<&str> = HashSet::new();
    let mut pending: Vec<&str> = Vec::new();
    let mut copied_roots = Vec::with_capacity(roots.len());

    for &root in roots {
        match collector.nodes.get_key_value(root) {
            Some((name, _)) => {
                copied_roots.push(name.clone());
                pending.push(name.as_str());
            }
            None => tracing::debug!(element = root, "skipping unknown root in deep copy"),
        }
    }

    while let Some(name) = pending.pop() {
        if !copied.insert(name) {
            continue;
        }
        if let Some(node) = collector.nodes.get(name) {
            pending.extend(
                node.references
                    .iter()
                    .chain(node.referenced_by.iter())
                    .map(String::as_str)
                    .filter(|neighbour| !copied.contains(neighbour)),
            );
        }
    }

    // Keep the collector's insertion order so walks over the copy visit
    // nodes in the same order as walks over the original.
    let nodes = collector
        .nodes
        .iter()
        .filter(|(name, _)| copied.contains(name.as_str()))
        .map(|(name, node)| (name.clone(), node.clone()))
        .collect();

    ReferenceChains {
        nodes,
        roots: copied_roots,
    }
}

impl<E: Clone> ReferenceChainCollector<E> {
    /// Copy of the chains starting from the nodes nothing depends on.
    pub fn deep_copy_leaf_dependants(&self) -> ReferenceChains<E> {
        let leaves: Vec<&str> = self
            .chains_by_leaf_dependants()
            .iter()
            .map(|node| node.element_name.as_str())
            .collect();
        deep_copy_reference_chains(self, &leaves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::ptr;

    fn shared_child() -> ReferenceChainCollector<String> {
        let mut collector = ReferenceChainCollector::new();
        collector.collect("P", Some("p".to_string()), None, &[]).unwrap();
        collector.collect("Q", Some("q".to_string()), None, &[]).unwrap();
        collector.collect("X", Some("x".to_string()), Some("P"), &[]).unwrap();
        collector.collect("X", Some("x".to_string()), Some("Q"), &[]).unwrap();
        collector.collect("Y", Some("y".to_string()), Some("X"), &[]).unwrap();
        collector
    }

    #[test]
    fn test_shared_child_is_copied_once() {
        let collector = shared_child();
        let copy = deep_copy_reference_chains(&collector, &["P", "Q"]);

        assert_eq!(copy.len(), 4);
        let from_p = copy.references_of("P");
        let from_q = copy.references_of("Q");
        assert_eq!(from_p.len(), 1);
        assert!(ptr::eq(from_p[0], from_q[0]));
        assert_eq!(from_p[0].element, Some("x".to_string()));
        assert_eq!(
            from_p[0].referenced_by.iter().cloned().collect::<Vec<_>>(),
            vec!["P", "Q"]
        );
    }

    #[test]
    fn test_copy_is_independent() {
        let collector = shared_child();
        let mut copy = collector.deep_copy_leaf_dependants();
        assert_eq!(
            copy.roots().map(|n| n.element_name.as_str()).collect::<Vec<_>>(),
            vec!["P", "Q"]
        );

        assert!(copy.remove_reference("P", "X"));
        if let Some(node) = copy.get_mut("Y") {
            node.tags.insert("visited".to_string());
        }

        let original_x = collector.chain("X").unwrap();
        assert!(original_x.referenced_by.contains("P"));
        assert!(!collector.chain("Y").unwrap().has_tag("visited"));
        assert!(!copy.get("X").unwrap().referenced_by.contains("P"));
    }

    #[test]
    fn test_copy_keeps_cycles_and_order() {
        let mut collector: ReferenceChainCollector<()> = ReferenceChainCollector::new();
        collector.collect("B", None, Some("A"), &[]).unwrap();
        collector.collect("A", None, Some("B"), &[]).unwrap();
        collector.collect("D", None, Some("C"), &[]).unwrap();

        let copy = deep_copy_reference_chains(&collector, &["B", "missing"]);
        let names: Vec<_> = copy.iter().map(|n| n.element_name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(copy.find_cycles(), collector.find_cycles());
    }
}

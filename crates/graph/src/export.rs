//! Serialization types for graph export.
//!
//! This module contains the data structures used to hand collected
//! reference chains to external tools (JSON, petgraph algorithms).

use crate::collector::ReferenceChainCollector;
use crate::cycles::Cycle;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};

/// Serializable representation of a collector's reference chains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphRepr {
    pub nodes: Vec<NodeRepr>,
    pub edges: Vec<EdgeRepr>,
    pub cycles: Vec<Cycle>,
}

/// Serializable representation of a node. Payloads are not exported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRepr {
    pub name: String,
    pub has_element: bool,
    pub paths: Vec<String>,
    pub tags: Vec<String>,
}

/// A `references` edge between two nodes, by index into `nodes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeRepr {
    pub source: usize,
    pub target: usize,
}

impl<E> From<&ReferenceChainCollector<E>> for GraphRepr {
    fn from(collector: &ReferenceChainCollector<E>) -> Self {
        let nodes = collector
            .chains()
            .map(|node| NodeRepr {
                name: node.element_name.clone(),
                has_element: node.element.is_some(),
                paths: node.paths.iter().cloned().collect(),
                tags: node.tags.iter().cloned().collect(),
            })
            .collect();

        let edges = collector
            .nodes
            .values()
            .enumerate()
            .flat_map(|(source, node)| {
                node.references.iter().filter_map(move |target| {
                    collector
                        .nodes
                        .get_index_of(target)
                        .map(|target| EdgeRepr { source, target })
                })
            })
            .collect();

        Self {
            nodes,
            edges,
            cycles: collector.find_cycles(),
        }
    }
}

impl GraphRepr {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl<E> ReferenceChainCollector<E> {
    /// Build a petgraph graph of element names with one edge per reference.
    ///
    /// Node indexes follow insertion order, so `NodeIndex::new(i)` is the
    /// `i`th collected element.
    pub fn to_digraph(&self) -> DiGraph<String, ()> {
        let mut graph = DiGraph::with_capacity(self.nodes.len(), 0);
        for name in self.nodes.keys() {
            graph.add_node(name.clone());
        }
        for (source, node) in self.nodes.values().enumerate() {
            for target in &node.references {
                if let Some(target) = self.nodes.get_index_of(target) {
                    graph.add_edge(NodeIndex::new(source), NodeIndex::new(target), ());
                }
            }
        }
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_graph_repr() {
        let mut collector = ReferenceChainCollector::new();
        collector.collect("resources.a", Some(()), None, &[]).unwrap();
        collector
            .collect("resources.b", Some(()), Some("resources.a"), &["subRef:resources.a".to_string()])
            .unwrap();

        let repr = GraphRepr::from(&collector);
        assert_eq!(repr.nodes.len(), 2);
        assert_eq!(repr.nodes[1].paths, vec!["resources.a/resources.b"]);
        assert_eq!(repr.edges.len(), 1);
        assert_eq!((repr.edges[0].source, repr.edges[0].target), (0, 1));
        assert!(repr.cycles.is_empty());

        let json = repr.to_json().unwrap();
        assert!(json.contains("\"subRef:resources.a\""));
    }

    #[test]
    fn test_to_digraph() {
        let mut collector: ReferenceChainCollector<()> = ReferenceChainCollector::new();
        collector.collect("b", None, Some("a"), &[]).unwrap();
        collector.collect("c", None, Some("b"), &[]).unwrap();

        let graph = collector.to_digraph();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph[NodeIndex::new(0)], "a");
        let order: Vec<_> = petgraph::algo::toposort(&graph, None)
            .unwrap()
            .into_iter()
            .map(|idx| graph[idx].as_str())
            .collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }
}

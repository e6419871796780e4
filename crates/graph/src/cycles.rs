//! Cycle detection over collected references.

use crate::collector::ReferenceChainCollector;
use crate::error::CircularReferenceError;
use crate::node::ReferenceChainNode;
use indexmap::IndexMap;
use petgraph::algo::is_cyclic_directed;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A cycle found in the reference chains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cycle {
    /// Node through which the cycle was discovered.
    pub root: String,
    /// Element names around the cycle, starting and ending at `root`.
    pub path: Vec<String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// Depth-first search from every unvisited node in insertion order.
///
/// Reaching a node that is still on the current path closes a cycle,
/// rooted at that node. Each root is reported once, for the first cycle
/// found through it.
pub(crate) fn find_cycles_in<E>(nodes: &IndexMap<String, ReferenceChainNode<E>>) -> Vec<Cycle> {
    let mut marks: HashMap<&str, Mark> = HashMap::with_capacity(nodes.len());
    let mut roots: HashSet<&str> = HashSet::new();
    let mut cycles = Vec::new();

    for start in nodes.keys() {
        if marks.contains_key(start.as_str()) {
            continue;
        }
        marks.insert(start.as_str(), Mark::InProgress);
        let mut stack: Vec<(&str, usize)> = vec![(start.as_str(), 0)];

        while let Some(&(name, next)) = stack.last() {
            let child = nodes
                .get(name)
                .and_then(|node| node.references.get_index(next));
            let Some(child) = child else {
                marks.insert(name, Mark::Done);
                stack.pop();
                continue;
            };
            if let Some(top) = stack.last_mut() {
                top.1 += 1;
            }

            match marks.get(child.as_str()).copied() {
                None if nodes.contains_key(child) => {
                    marks.insert(child.as_str(), Mark::InProgress);
                    stack.push((child.as_str(), 0));
                }
                Some(Mark::InProgress) if roots.insert(child.as_str()) => {
                    let start_at = stack
                        .iter()
                        .position(|(n, _)| *n == child.as_str())
                        .unwrap_or(0);
                    let mut path: Vec<String> =
                        stack[start_at..].iter().map(|(n, _)| n.to_string()).collect();
                    path.push(child.clone());
                    tracing::debug!(root = child.as_str(), path = ?path, "found circular reference");
                    cycles.push(Cycle {
                        root: child.clone(),
                        path,
                    });
                }
                _ => {}
            }
        }
    }

    cycles
}

impl<E> ReferenceChainCollector<E> {
    /// One node per distinct cycle, the node through which it was found.
    /// Empty when the references are acyclic.
    pub fn find_circular_references(&self) -> Vec<&ReferenceChainNode<E>> {
        find_cycles_in(&self.nodes)
            .iter()
            .filter_map(|cycle| self.nodes.get(&cycle.root))
            .collect()
    }

    /// Every distinct cycle with the element path around it.
    pub fn find_cycles(&self) -> Vec<Cycle> {
        find_cycles_in(&self.nodes)
    }

    pub fn has_circular_references(&self) -> bool {
        is_cyclic_directed(&self.to_digraph())
    }

    /// Fail with every cycle when the references are not acyclic.
    pub fn validate(&self) -> Result<(), CircularReferenceError> {
        let cycles = self.find_cycles();
        if cycles.is_empty() {
            Ok(())
        } else {
            tracing::warn!(count = cycles.len(), "circular references found");
            Err(CircularReferenceError { cycles })
        }
    }
}

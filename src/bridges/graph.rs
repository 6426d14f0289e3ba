//! Undirected residue graph and its connected components.
use super::pairs::ResiduePair;
use crate::residues::ResidueNode;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

/// A simple undirected graph over residues, stored as an adjacency map.
///
/// Nodes only ever enter the graph through an edge, so every node has degree >= 1.
#[derive(Debug, Clone, Default)]
pub struct ResidueGraph {
    adjacency: HashMap<ResidueNode, HashSet<ResidueNode>>,
}

impl ResidueGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph from aromatic-methionine pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = &'a ResiduePair>) -> Self {
        let mut graph = Self::new();
        for pair in pairs {
            graph.add_edge(pair.aromatic.clone(), pair.methionine.clone());
        }
        graph
    }

    /// Add an undirected edge. Adding an existing edge is a no-op, and so is a self-loop.
    pub fn add_edge(&mut self, a: ResidueNode, b: ResidueNode) {
        if a == b {
            return;
        }
        self.adjacency
            .entry(a.clone())
            .or_default()
            .insert(b.clone());
        self.adjacency.entry(b).or_default().insert(a);
    }

    /// Number of residues with at least one edge.
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of distinct undirected edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(|n| n.len()).sum::<usize>() / 2
    }

    /// Whether the graph has no edges.
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Neighbors of a node, if it is in the graph.
    pub fn neighbors(&self, node: &ResidueNode) -> Option<&HashSet<ResidueNode>> {
        self.adjacency.get(node)
    }

    /// All connected components, found with an iterative breadth-first search.
    ///
    /// Each component is sorted, and components are ordered by their smallest member
    /// so the output does not depend on hash iteration order.
    pub fn connected_components(&self) -> Vec<BTreeSet<ResidueNode>> {
        let mut seen: HashSet<&ResidueNode> = HashSet::with_capacity(self.adjacency.len());
        let mut components = Vec::new();

        let mut starts: Vec<&ResidueNode> = self.adjacency.keys().collect();
        starts.sort();

        for start in starts {
            if !seen.insert(start) {
                continue;
            }
            let mut component = BTreeSet::new();
            let mut queue = VecDeque::from([start]);
            while let Some(node) = queue.pop_front() {
                component.insert(node.clone());
                for next in &self.adjacency[node] {
                    if seen.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
            components.push(component);
        }
        components
    }
}

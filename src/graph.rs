use std::{fmt, hash::Hash};

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::model::Identifier;

/// A node of the interaction graph
///
/// Patrons and books share one graph but stay distinct: patron `7` and book
/// `7` are different nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum NodeRef {
    /// A registered patron
    Patron(Identifier),
    /// A catalogued book
    Book(Identifier),
}

impl NodeRef {
    /// Stable string key, e.g. `patron:10` or `book:1`
    #[must_use]
    pub fn key(&self) -> String {
        self.to_string()
    }

    /// The bare identifier
    #[must_use]
    pub const fn id(&self) -> &Identifier {
        match self {
            Self::Patron(id) | Self::Book(id) => id,
        }
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Patron(id) => write!(f, "patron:{id}"),
            Self::Book(id) => write!(f, "book:{id}"),
        }
    }
}

/// Undirected graph without weights or parallel edges
///
/// Adjacency sets keep edge insertion order so neighbour listings are stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractionGraph<N: Hash + Eq = NodeRef> {
    /// Node -> neighbours, both in insertion order
    adjacency: IndexMap<N, IndexSet<N>>,
}

impl<N: Hash + Eq> Default for InteractionGraph<N> {
    fn default() -> Self {
        Self { adjacency: IndexMap::new() }
    }
}

impl<N: Hash + Eq + Clone> InteractionGraph<N> {
    /// Creates an empty graph
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a node; a no-op if it already exists
    pub fn add_node(&mut self, node: N) {
        self.adjacency.entry(node).or_default();
    }

    /// Connects `a` and `b` in both directions
    ///
    /// # Returns
    /// * `true` if the edge is new
    /// * `false` if it already existed or `a == b`
    pub fn add_edge(&mut self, a: N, b: N) -> bool {
        if a == b {
            self.add_node(a);
            return false;
        }
        let forward = self.adjacency.entry(a.clone()).or_default().insert(b.clone());
        let backward = self.adjacency.entry(b).or_default().insert(a);
        forward || backward
    }

    /// Neighbours of `node` in edge insertion order; empty for unknown nodes
    pub fn neighbors_of(&self, node: &N) -> impl Iterator<Item = &N> {
        self.adjacency.get(node).into_iter().flatten()
    }

    /// Returns true if `node` has been registered
    #[must_use]
    pub fn contains_node(&self, node: &N) -> bool {
        self.adjacency.contains_key(node)
    }

    /// Returns true if `a` and `b` are connected
    #[must_use]
    pub fn has_edge(&self, a: &N, b: &N) -> bool {
        self.adjacency.get(a).is_some_and(|neighbors| neighbors.contains(b))
    }

    /// Number of registered nodes
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected edges
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(IndexSet::len).sum::<usize>() / 2
    }

    /// Nodes in registration order
    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.adjacency.keys()
    }

    /// Each undirected edge once, as `(first registered, other)`
    pub fn edges(&self) -> impl Iterator<Item = (&N, &N)> {
        self.adjacency.iter().enumerate().flat_map(move |(index, (node, neighbors))| {
            neighbors
                .iter()
                .filter(move |other| {
                    self.adjacency.get_index_of(*other).is_some_and(|other_index| other_index > index)
                })
                .map(move |other| (node, other))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patron(n: i64) -> NodeRef {
        NodeRef::Patron(n.into())
    }

    fn book(n: i64) -> NodeRef {
        NodeRef::Book(n.into())
    }

    #[test]
    fn test_add_edge_is_symmetric_and_idempotent() {
        let mut graph = InteractionGraph::new();
        assert!(graph.add_edge(patron(10), book(1)));
        assert!(!graph.add_edge(patron(10), book(1)));
        assert!(!graph.add_edge(book(1), patron(10)));

        assert!(graph.has_edge(&patron(10), &book(1)));
        assert!(graph.has_edge(&book(1), &patron(10)));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_neighbors_follow_insertion_order() {
        let mut graph = InteractionGraph::new();
        graph.add_edge(patron(11), book(1));
        graph.add_edge(patron(10), book(1));
        graph.add_edge(patron(12), book(1));

        let neighbors: Vec<_> = graph.neighbors_of(&book(1)).cloned().collect();
        assert_eq!(neighbors, vec![patron(11), patron(10), patron(12)]);
        assert_eq!(graph.neighbors_of(&book(99)).count(), 0);
    }

    #[test]
    fn test_patron_and_book_with_same_id_are_distinct() {
        let mut graph = InteractionGraph::new();
        graph.add_node(patron(1));
        graph.add_node(book(1));
        graph.add_node(book(1));
        assert_eq!(graph.node_count(), 2);
        assert_eq!(patron(1).key(), "patron:1");
        assert_eq!(book(1).key(), "book:1");
    }

    #[test]
    fn test_self_loop_is_ignored() {
        let mut graph = InteractionGraph::new();
        assert!(!graph.add_edge(book(3), book(3)));
        assert!(graph.contains_node(&book(3)));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_edges_lists_each_edge_once() {
        let mut graph = InteractionGraph::new();
        graph.add_node(patron(10));
        graph.add_node(book(1));
        graph.add_node(book(2));
        graph.add_edge(patron(10), book(1));
        graph.add_edge(book(2), patron(10));

        let edges: Vec<_> = graph.edges().map(|(a, b)| (a.clone(), b.clone())).collect();
        assert_eq!(edges, vec![(patron(10), book(1)), (patron(10), book(2))]);
    }
}

//! Undirected simple graphs and the stage types a graph moves through.
//!
//! A graph is created by the topology step as a [`RawGraph`], gains
//! positional metadata as a [`StructuredGraph`], colours as a
//! [`ColoredGraph`], and tags as a [`TaggedGraph`]. Each stage consumes the
//! previous one, so a graph can only be tagged once.

mod stages;

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;

pub use stages::{
    Centroid, ColoredGraph, IndexedGraph, Layout, NodeOrdering, RawGraph, Structure,
    StructuredGraph, TaggedGraph,
};

/// Stable node identifier within one graph.
///
/// Identifiers need not be contiguous; they are renumbered to `0..n` only
/// when a graph is serialised.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NodeId(usize);

impl NodeId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(raw: usize) -> Self {
        Self(raw)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An undirected graph without self-loops or parallel edges.
///
/// Nodes and neighbour sets are kept ordered so every traversal is
/// deterministic.
///
/// # Examples
/// ```
/// use colorlogic_core::{Graph, NodeId};
///
/// let mut graph = Graph::with_nodes(3);
/// assert!(graph.add_edge(NodeId::new(0), NodeId::new(1)));
/// assert!(!graph.add_edge(NodeId::new(1), NodeId::new(0)));
/// assert!(!graph.add_edge(NodeId::new(2), NodeId::new(2)));
/// assert_eq!(graph.edge_count(), 1);
/// assert_eq!(graph.degree(NodeId::new(1)), 1);
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Graph {
    adjacency: BTreeMap<NodeId, BTreeSet<NodeId>>,
}

impl Graph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates `count` isolated nodes with identifiers `0..count`.
    #[must_use]
    pub fn with_nodes(count: usize) -> Self {
        Self {
            adjacency: (0..count).map(|id| (NodeId(id), BTreeSet::new())).collect(),
        }
    }

    /// Inserts an isolated node, returning `false` when it already exists.
    pub fn add_node(&mut self, id: NodeId) -> bool {
        if self.adjacency.contains_key(&id) {
            return false;
        }
        self.adjacency.insert(id, BTreeSet::new());
        true
    }

    /// Inserts the undirected edge `{a, b}`, adding missing endpoints.
    ///
    /// Returns `false` for self-loops and for edges that already exist.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) -> bool {
        if a == b {
            return false;
        }
        let inserted = self.adjacency.entry(a).or_default().insert(b);
        self.adjacency.entry(b).or_default().insert(a);
        inserted
    }

    /// Returns whether `{a, b}` is an edge.
    #[must_use]
    pub fn contains_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.adjacency
            .get(&a)
            .is_some_and(|neighbours| neighbours.contains(&b))
    }

    /// Returns whether `id` is a node of the graph.
    #[must_use]
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.adjacency.contains_key(&id)
    }

    /// Iterates node identifiers in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency.keys().copied()
    }

    /// Iterates the direct neighbours of `id` in ascending order.
    ///
    /// Unknown nodes have no neighbours.
    pub fn neighbours(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency.get(&id).into_iter().flatten().copied()
    }

    /// Returns the number of neighbours of `id`.
    #[must_use]
    pub fn degree(&self, id: NodeId) -> usize {
        self.adjacency.get(&id).map_or(0, BTreeSet::len)
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Returns the number of undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(BTreeSet::len).sum::<usize>() / 2
    }

    /// Iterates every undirected edge once as `(low, high)`.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.adjacency.iter().flat_map(|(&node, neighbours)| {
            neighbours
                .range(node..)
                .filter(move |&&other| other != node)
                .map(move |&other| (node, other))
        })
    }

    /// Returns an identifier one past the largest existing identifier.
    #[must_use]
    pub fn next_id(&self) -> NodeId {
        self.adjacency
            .keys()
            .next_back()
            .map_or(NodeId(0), |last| NodeId(last.0.saturating_add(1)))
    }

    /// Collects every node within `radius` hops of `id`, excluding `id`.
    ///
    /// A radius of one yields the direct neighbours; zero yields nothing.
    #[must_use]
    pub fn within_radius(&self, id: NodeId, radius: usize) -> BTreeSet<NodeId> {
        let mut seen = BTreeSet::from([id]);
        let mut frontier = VecDeque::from([(id, 0_usize)]);
        while let Some((node, depth)) = frontier.pop_front() {
            if depth == radius {
                continue;
            }
            for next in self.neighbours(node) {
                if seen.insert(next) {
                    frontier.push_back((next, depth + 1));
                }
            }
        }
        seen.remove(&id);
        seen
    }

    /// Returns a breadth-first visiting order covering every component.
    ///
    /// Components are entered from their smallest identifier.
    #[must_use]
    pub fn traversal_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.node_count());
        let mut seen = BTreeSet::new();
        for start in self.nodes() {
            if !seen.insert(start) {
                continue;
            }
            let mut frontier = VecDeque::from([start]);
            while let Some(node) = frontier.pop_front() {
                order.push(node);
                for next in self.neighbours(node) {
                    if seen.insert(next) {
                        frontier.push_back(next);
                    }
                }
            }
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    fn path(count: usize) -> Graph {
        let mut graph = Graph::with_nodes(count);
        for id in 1..count {
            graph.add_edge(NodeId(id - 1), NodeId(id));
        }
        graph
    }

    #[rstest]
    #[case(0, &[])]
    #[case(1, &[1])]
    #[case(2, &[1, 2])]
    #[case(9, &[1, 2, 3, 4])]
    fn within_radius_walks_hops(#[case] radius: usize, #[case] expected: &[usize]) {
        let graph = path(5);
        let found: Vec<usize> = graph
            .within_radius(NodeId(0), radius)
            .into_iter()
            .map(NodeId::get)
            .collect();
        assert_eq!(found, expected);
    }

    #[test]
    fn edges_are_reported_once() {
        let graph = path(4);
        let edges: Vec<(usize, usize)> = graph.edges().map(|(a, b)| (a.get(), b.get())).collect();
        assert_eq!(edges, vec![(0, 1), (1, 2), (2, 3)]);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn traversal_order_covers_disconnected_components() {
        let mut graph = Graph::with_nodes(5);
        graph.add_edge(NodeId(0), NodeId(3));
        graph.add_edge(NodeId(1), NodeId(4));
        let order: Vec<usize> = graph.traversal_order().into_iter().map(NodeId::get).collect();
        assert_eq!(order, vec![0, 3, 1, 4, 2]);
    }

    #[test]
    fn next_id_skips_past_the_largest_identifier() {
        let mut graph = Graph::new();
        assert_eq!(graph.next_id(), NodeId(0));
        graph.add_node(NodeId(7));
        assert_eq!(graph.next_id(), NodeId(8));
    }
}

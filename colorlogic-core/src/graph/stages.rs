//! Stage types for the generation pipeline.

use std::collections::{BTreeMap, HashMap};

use crate::color::Color;

use super::{Graph, NodeId};

/// Shape information a topology generator knows about its own output.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Layout {
    /// No positional information.
    #[default]
    Unordered,
    /// Nodes in path order.
    Path(Vec<NodeId>),
    /// Nodes in ring order.
    Ring {
        /// Nodes in ring order, the last adjacent to the first.
        order: Vec<NodeId>,
        /// Whether node roles alternate around the ring.
        alternating: bool,
    },
}

/// A freshly built topology.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawGraph {
    graph: Graph,
    layout: Layout,
}

impl RawGraph {
    /// Pairs a topology with the layout its generator recorded.
    #[must_use]
    pub const fn new(graph: Graph, layout: Layout) -> Self {
        Self { graph, layout }
    }

    /// Returns the topology.
    #[must_use]
    pub const fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Returns the recorded layout.
    #[must_use]
    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Splits the raw graph into topology and layout.
    #[must_use]
    pub fn into_parts(self) -> (Graph, Layout) {
        (self.graph, self.layout)
    }
}

/// A node ordering used to place colour runs contiguously.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NodeOrdering {
    nodes: Vec<NodeId>,
    closed: bool,
}

impl NodeOrdering {
    /// Creates an ordering; a closed ordering wraps from its last node to its first.
    #[must_use]
    pub const fn new(nodes: Vec<NodeId>, closed: bool) -> Self {
        Self { nodes, closed }
    }

    /// Returns the ordered nodes.
    #[must_use]
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Returns whether runs may wrap around the end of the ordering.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }
}

/// One centroid cluster: a hub wired to a group of member nodes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Centroid {
    hub: NodeId,
    members: Vec<NodeId>,
}

impl Centroid {
    pub(crate) const fn new(hub: NodeId, members: Vec<NodeId>) -> Self {
        Self { hub, members }
    }

    /// Returns the hub node.
    #[must_use]
    pub const fn hub(&self) -> NodeId {
        self.hub
    }

    /// Returns the member nodes, hub excluded.
    #[must_use]
    pub fn members(&self) -> &[NodeId] {
        &self.members
    }
}

/// Metadata attached by the structure step and consumed by colouring.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Structure {
    ordering: Option<NodeOrdering>,
    centroids: Vec<Centroid>,
    pins: BTreeMap<NodeId, Color>,
}

impl Structure {
    /// Returns the recorded node ordering, if any.
    #[must_use]
    pub const fn ordering(&self) -> Option<&NodeOrdering> {
        self.ordering.as_ref()
    }

    /// Returns the centroid clusters.
    #[must_use]
    pub fn centroids(&self) -> &[Centroid] {
        &self.centroids
    }

    /// Returns nodes whose colour is fixed before quota placement.
    #[must_use]
    pub const fn pins(&self) -> &BTreeMap<NodeId, Color> {
        &self.pins
    }

    pub(crate) fn set_ordering(&mut self, ordering: NodeOrdering) {
        self.ordering = Some(ordering);
    }

    pub(crate) fn push_centroid(&mut self, centroid: Centroid) {
        self.centroids.push(centroid);
    }

    pub(crate) fn pin(&mut self, node: NodeId, color: Color) {
        self.pins.insert(node, color);
    }
}

/// A topology carrying structure metadata, ready for colouring.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StructuredGraph {
    graph: Graph,
    structure: Structure,
}

impl StructuredGraph {
    /// Pairs a topology with structure metadata.
    #[must_use]
    pub const fn new(graph: Graph, structure: Structure) -> Self {
        Self { graph, structure }
    }

    /// Returns the topology.
    #[must_use]
    pub const fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Returns the structure metadata.
    #[must_use]
    pub const fn structure(&self) -> &Structure {
        &self.structure
    }

    pub(crate) fn into_parts(self) -> (Graph, Structure) {
        (self.graph, self.structure)
    }
}

/// A graph in which every node carries exactly one colour.
///
/// # Examples
/// ```
/// use colorlogic_core::{Color, ColoredGraph, NodeId};
///
/// let graph = ColoredGraph::from_edges(vec![Color::RED, Color::GREEN], &[(0, 1)]);
/// assert_eq!(graph.color(NodeId::new(1)), Some(Color::GREEN));
/// assert_eq!(graph.count_color(Color::RED), 1);
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ColoredGraph {
    graph: Graph,
    colors: BTreeMap<NodeId, Color>,
    split: usize,
}

impl ColoredGraph {
    /// Attaches colours to a topology.
    ///
    /// Returns `None` unless `colors` names exactly the nodes of `graph`.
    #[must_use]
    pub fn new(graph: Graph, colors: BTreeMap<NodeId, Color>) -> Option<Self> {
        let matches = colors.len() == graph.node_count() && graph.nodes().eq(colors.keys().copied());
        matches.then_some(Self {
            graph,
            colors,
            split: 0,
        })
    }

    /// Builds a graph with nodes `0..colors.len()` and the given edges.
    ///
    /// Edges with an endpoint outside the node range are skipped.
    #[must_use]
    pub fn from_edges(colors: Vec<Color>, edges: &[(usize, usize)]) -> Self {
        let mut graph = Graph::with_nodes(colors.len());
        for &(a, b) in edges {
            if a < colors.len() && b < colors.len() {
                graph.add_edge(NodeId(a), NodeId(b));
            }
        }
        let colors = colors
            .into_iter()
            .enumerate()
            .map(|(id, color)| (NodeId(id), color))
            .collect();
        Self {
            graph,
            colors,
            split: 0,
        }
    }

    /// Assembles a graph whose colouring is total by construction.
    pub(crate) const fn from_parts(
        graph: Graph,
        colors: BTreeMap<NodeId, Color>,
        split: usize,
    ) -> Self {
        Self {
            graph,
            colors,
            split,
        }
    }

    /// Returns the topology.
    #[must_use]
    pub const fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Returns the colour of `id`.
    #[must_use]
    pub fn color(&self, id: NodeId) -> Option<Color> {
        self.colors.get(&id).copied()
    }

    /// Iterates `(node, colour)` pairs in node order.
    pub fn colors(&self) -> impl Iterator<Item = (NodeId, Color)> + '_ {
        self.colors.iter().map(|(&id, &color)| (id, color))
    }

    /// Counts nodes of colour `color`.
    #[must_use]
    pub fn count_color(&self, color: Color) -> usize {
        self.colors.values().filter(|&&c| c == color).count()
    }

    /// Returns the split this graph was generated for.
    #[must_use]
    pub const fn split(&self) -> usize {
        self.split
    }
}

/// A coloured graph with per-node tags and an aggregate graph label.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TaggedGraph {
    colored: ColoredGraph,
    tags: BTreeMap<NodeId, bool>,
    tagged_nodes: usize,
    label: bool,
}

impl TaggedGraph {
    pub(crate) fn new(colored: ColoredGraph, tags: BTreeMap<NodeId, bool>, label: bool) -> Self {
        let tagged_nodes = tags.values().filter(|&&tag| tag).count();
        Self {
            colored,
            tags,
            tagged_nodes,
            label,
        }
    }

    /// Returns the coloured graph the tags were computed on.
    #[must_use]
    pub const fn colored(&self) -> &ColoredGraph {
        &self.colored
    }

    /// Returns the tag of `id`.
    #[must_use]
    pub fn tag(&self, id: NodeId) -> Option<bool> {
        self.tags.get(&id).copied()
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn total_nodes(&self) -> usize {
        self.tags.len()
    }

    /// Returns the number of nodes tagged `true`.
    #[must_use]
    pub const fn tagged_nodes(&self) -> usize {
        self.tagged_nodes
    }

    /// Returns the graph label.
    #[must_use]
    pub const fn label(&self) -> bool {
        self.label
    }

    /// Renumbers nodes to `0..n` in identifier order.
    ///
    /// Tags, colours, and the label are carried over unchanged.
    #[must_use]
    pub fn relabel(&self) -> IndexedGraph {
        let graph = self.colored.graph();
        let index: HashMap<NodeId, usize> = graph
            .nodes()
            .enumerate()
            .map(|(position, id)| (id, position))
            .collect();
        let mut colors = Vec::with_capacity(index.len());
        let mut tags = Vec::with_capacity(index.len());
        let mut neighbours = Vec::with_capacity(index.len());
        for id in graph.nodes() {
            colors.push(self.colored.color(id).unwrap_or_default());
            tags.push(self.tag(id).unwrap_or(false));
            neighbours.push(
                graph
                    .neighbours(id)
                    .filter_map(|other| index.get(&other).copied())
                    .collect(),
            );
        }
        IndexedGraph {
            label: self.label,
            colors,
            tags,
            neighbours,
        }
    }
}

/// A tagged graph renumbered to contiguous indices for serialisation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IndexedGraph {
    label: bool,
    colors: Vec<Color>,
    tags: Vec<bool>,
    neighbours: Vec<Vec<usize>>,
}

impl IndexedGraph {
    /// Returns the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.colors.len()
    }

    /// Returns the graph label.
    #[must_use]
    pub const fn label(&self) -> bool {
        self.label
    }

    /// Returns per-node colours indexed by position.
    #[must_use]
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Returns per-node tags indexed by position.
    #[must_use]
    pub fn tags(&self) -> &[bool] {
        &self.tags
    }

    /// Returns the neighbour indices of every node.
    #[must_use]
    pub fn neighbours(&self) -> &[Vec<usize>] {
        &self.neighbours
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colored_graph_rejects_partial_colourings() {
        let graph = Graph::with_nodes(2);
        let colors = BTreeMap::from([(NodeId(0), Color::RED)]);
        assert!(ColoredGraph::new(graph, colors).is_none());
    }

    #[test]
    fn relabel_compacts_sparse_identifiers() {
        let mut graph = Graph::new();
        graph.add_edge(NodeId(10), NodeId(40));
        graph.add_edge(NodeId(40), NodeId(25));
        let colors = BTreeMap::from([
            (NodeId(10), Color::RED),
            (NodeId(25), Color::GREEN),
            (NodeId(40), Color::new(2)),
        ]);
        let colored = ColoredGraph::new(graph, colors).expect("colouring is total");
        let tags = BTreeMap::from([(NodeId(10), true), (NodeId(25), false), (NodeId(40), false)]);
        let tagged = TaggedGraph::new(colored, tags, true);

        let indexed = tagged.relabel();
        assert_eq!(indexed.node_count(), 3);
        assert_eq!(indexed.colors(), &[Color::RED, Color::GREEN, Color::new(2)]);
        assert_eq!(indexed.tags(), &[true, false, false]);
        assert_eq!(indexed.neighbours(), &[vec![2], vec![2], vec![0, 1]]);
        assert!(indexed.label());
    }
}

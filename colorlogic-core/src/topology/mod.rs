//! Topology generation.
//!
//! [`TopologyBuilder`] validates a [`GeneratorSpec`] against a [`NodeRange`]
//! once, then produces any number of independent [`RawGraph`]s. The builder
//! holds no state between calls beyond its configuration; all randomness is
//! taken from the caller's RNG.

mod degree;
mod random;

use rand::Rng;

use crate::error::{ConfigError, GenerationError};
use crate::graph::{Graph, Layout, NodeId, RawGraph};

/// Inclusive bounds for the number of nodes drawn per graph.
///
/// # Examples
/// ```
/// use colorlogic_core::NodeRange;
///
/// let range = NodeRange::new(5, 10).expect("bounds are ordered");
/// assert_eq!((range.min(), range.max()), (5, 10));
/// assert!(NodeRange::new(0, 3).is_err());
/// assert!(NodeRange::new(4, 3).is_err());
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "(usize, usize)", into = "(usize, usize)")
)]
pub struct NodeRange {
    min: usize,
    max: usize,
}

impl NodeRange {
    /// Creates a range.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidNodeRange`] unless `0 < min <= max`.
    pub const fn new(min: usize, max: usize) -> Result<Self, ConfigError> {
        if min == 0 || min > max {
            return Err(ConfigError::InvalidNodeRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Returns the smallest node count.
    #[must_use]
    pub const fn min(self) -> usize {
        self.min
    }

    /// Returns the largest node count.
    #[must_use]
    pub const fn max(self) -> usize {
        self.max
    }

    /// Draws a node count uniformly from the range.
    pub fn sample<R: Rng + ?Sized>(self, rng: &mut R) -> usize {
        rng.gen_range(self.min..=self.max)
    }
}

impl TryFrom<(usize, usize)> for NodeRange {
    type Error = ConfigError;

    fn try_from((min, max): (usize, usize)) -> Result<Self, Self::Error> {
        Self::new(min, max)
    }
}

impl From<NodeRange> for (usize, usize) {
    fn from(range: NodeRange) -> Self {
        (range.min, range.max)
    }
}

/// How an Erdos-Renyi graph decides its edge count.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum EdgeDensity {
    /// Every pair is an edge with this probability.
    Probability(f64),
    /// Exactly `m * n` edges are drawn.
    EdgesPerNode(usize),
}

/// Classic random-graph models.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "name", rename_all = "snake_case")
)]
pub enum RandomModel {
    /// Erdos-Renyi.
    #[cfg_attr(feature = "serde", serde(rename = "erdos"))]
    ErdosRenyi {
        /// Edge probability or edge budget.
        density: EdgeDensity,
    },
    /// Barabasi-Albert preferential attachment.
    #[cfg_attr(feature = "serde", serde(rename = "barabasi"))]
    BarabasiAlbert {
        /// Edges added per new node.
        m: usize,
    },
}

/// Topology generator families.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "kind", rename_all = "snake_case")
)]
pub enum GeneratorSpec {
    /// Isolated nodes.
    Empty,
    /// Nodes wired to a drawn degree sequence.
    Degree {
        /// Candidate target degrees.
        degrees: Vec<usize>,
        /// Draw one degree per node instead of one per graph.
        #[cfg_attr(feature = "serde", serde(default))]
        variable_degree: bool,
    },
    /// A simple path.
    Line,
    /// A random graph model.
    Random {
        /// The model and its parameter.
        model: RandomModel,
    },
    /// A ring.
    Cycle {
        /// Alternate two node roles around the ring.
        #[cfg_attr(feature = "serde", serde(default))]
        pair: bool,
    },
}

impl GeneratorSpec {
    /// Returns the Barabasi-Albert attachment count, when that model is selected.
    #[must_use]
    pub const fn attachment(&self) -> Option<usize> {
        match self {
            Self::Random {
                model: RandomModel::BarabasiAlbert { m },
            } => Some(*m),
            _ => None,
        }
    }

    fn validate(&self, nodes: NodeRange) -> Result<(), ConfigError> {
        match self {
            Self::Empty | Self::Line | Self::Cycle { .. } => Ok(()),
            Self::Degree { degrees, .. } => validate_degrees(degrees, nodes),
            Self::Random { model } => validate_random(*model, nodes),
        }
    }
}

fn validate_degrees(degrees: &[usize], nodes: NodeRange) -> Result<(), ConfigError> {
    if degrees.is_empty() {
        return Err(ConfigError::InvalidParameter {
            parameter: "degrees",
            reason: "at least one candidate degree is required".into(),
        });
    }
    if let Some(&too_large) = degrees.iter().find(|&&d| d >= nodes.min()) {
        return Err(ConfigError::InvalidParameter {
            parameter: "degrees",
            reason: format!(
                "degree {too_large} cannot be realised in a graph of {} nodes",
                nodes.min()
            ),
        });
    }
    Ok(())
}

fn validate_random(model: RandomModel, nodes: NodeRange) -> Result<(), ConfigError> {
    match model {
        RandomModel::ErdosRenyi {
            density: EdgeDensity::Probability(p),
        } => {
            if (0.0..=1.0).contains(&p) {
                Ok(())
            } else {
                Err(ConfigError::InvalidProbability { parameter: "p" })
            }
        }
        RandomModel::ErdosRenyi {
            density: EdgeDensity::EdgesPerNode(m),
        } => {
            if m.saturating_mul(2) > nodes.min() - 1 {
                return Err(ConfigError::InvalidParameter {
                    parameter: "m",
                    reason: format!(
                        "{m} edges per node exceed the pairs available among {} nodes",
                        nodes.min()
                    ),
                });
            }
            Ok(())
        }
        RandomModel::BarabasiAlbert { m } => {
            if m == 0 || m >= nodes.min() {
                return Err(ConfigError::InvalidParameter {
                    parameter: "m",
                    reason: format!("attachment count must be in [1, {})", nodes.min()),
                });
            }
            Ok(())
        }
    }
}

/// Builds raw topologies for one generator family.
///
/// # Examples
/// ```
/// use colorlogic_core::{GeneratorSpec, NodeRange, TopologyBuilder};
/// use rand::{SeedableRng, rngs::SmallRng};
///
/// let builder = TopologyBuilder::new(GeneratorSpec::Line, NodeRange::new(4, 4)?)?;
/// let mut rng = SmallRng::seed_from_u64(7);
/// let raw = builder.build(&mut rng)?;
/// assert_eq!(raw.graph().node_count(), 4);
/// assert_eq!(raw.graph().edge_count(), 3);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct TopologyBuilder {
    spec: GeneratorSpec,
    nodes: NodeRange,
}

impl TopologyBuilder {
    /// Validates `spec` against `nodes`.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when a generator parameter cannot be honoured
    /// for every node count in `nodes`.
    pub fn new(spec: GeneratorSpec, nodes: NodeRange) -> Result<Self, ConfigError> {
        spec.validate(nodes)?;
        Ok(Self { spec, nodes })
    }

    /// Returns the generator specification.
    #[must_use]
    pub const fn spec(&self) -> &GeneratorSpec {
        &self.spec
    }

    /// Returns the node-count bounds.
    #[must_use]
    pub const fn nodes(&self) -> NodeRange {
        self.nodes
    }

    /// Builds one graph with a node count drawn from the configured range.
    ///
    /// # Errors
    /// Returns [`GenerationError::DegreeSequenceNotGraphical`] when a drawn
    /// degree sequence cannot be wired.
    pub fn build<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<RawGraph, GenerationError> {
        let node_count = self.nodes.sample(rng);
        let raw = match &self.spec {
            GeneratorSpec::Empty => RawGraph::new(Graph::with_nodes(node_count), Layout::Unordered),
            GeneratorSpec::Degree {
                degrees,
                variable_degree,
            } => {
                let sequence =
                    degree::draw_degree_sequence(node_count, degrees, *variable_degree, rng);
                RawGraph::new(
                    degree::wire_degree_sequence(&sequence, rng)?,
                    Layout::Unordered,
                )
            }
            GeneratorSpec::Line => {
                let (graph, order) = chain(node_count, false);
                RawGraph::new(graph, Layout::Path(order))
            }
            GeneratorSpec::Random { model } => {
                let graph = match *model {
                    RandomModel::ErdosRenyi {
                        density: EdgeDensity::Probability(p),
                    } => random::erdos_renyi_probability(node_count, p, rng),
                    RandomModel::ErdosRenyi {
                        density: EdgeDensity::EdgesPerNode(m),
                    } => random::erdos_renyi_edges(node_count, m.saturating_mul(node_count), rng),
                    RandomModel::BarabasiAlbert { m } => {
                        random::barabasi_albert(node_count, m, rng)
                    }
                };
                RawGraph::new(graph, Layout::Unordered)
            }
            GeneratorSpec::Cycle { pair } => {
                let (graph, order) = chain(node_count, true);
                RawGraph::new(
                    graph,
                    Layout::Ring {
                        order,
                        alternating: *pair,
                    },
                )
            }
        };
        Ok(raw)
    }

    /// Yields a fresh graph on every call to `next`.
    ///
    /// The sequence never ends; take as many graphs as needed.
    pub fn graphs<'a, R: Rng + ?Sized>(
        &'a self,
        rng: &'a mut R,
    ) -> impl Iterator<Item = Result<RawGraph, GenerationError>> + 'a {
        std::iter::repeat_with(move || self.build(&mut *rng))
    }
}

fn chain(node_count: usize, closed: bool) -> (Graph, Vec<NodeId>) {
    let mut graph = Graph::with_nodes(node_count);
    let order: Vec<NodeId> = (0..node_count).map(NodeId::new).collect();
    for pair in order.windows(2) {
        if let [a, b] = pair {
            graph.add_edge(*a, *b);
        }
    }
    if closed {
        if let (Some(&first), Some(&last)) = (order.first(), order.last()) {
            graph.add_edge(last, first);
        }
    }
    (graph, order)
}

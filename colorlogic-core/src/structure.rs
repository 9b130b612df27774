//! Structure assignment: positional and group metadata consumed by colouring.

use rand::{Rng, seq::SliceRandom};

use crate::color::{Color, check_color};
use crate::error::{ConfigError, GenerationError};
use crate::graph::{Centroid, Layout, NodeOrdering, RawGraph, Structure, StructuredGraph};
use crate::topology::NodeRange;

/// Parameters of the centroid structure.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CentroidSpec {
    /// Range for the number of centroid clusters per graph.
    pub centroids: NodeRange,
    /// Range for the number of members per cluster, hub excluded.
    pub nodes_per_centroid: NodeRange,
    /// Probability of an edge between two members of the same cluster.
    pub connectivity: f64,
    /// Probability of an edge between two cluster hubs.
    #[cfg_attr(feature = "serde", serde(default))]
    pub inter_connectivity: f64,
    /// Pin every cluster member to this colour.
    #[cfg_attr(feature = "serde", serde(default))]
    pub only_color: Option<Color>,
}

/// Structure families.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "kind", rename_all = "snake_case")
)]
pub enum StructureSpec {
    /// No metadata; colours are placed independently.
    #[default]
    Normal,
    /// Record an open node ordering for contiguous colour runs.
    Line,
    /// Record a closed node ordering; runs may wrap.
    Cycle,
    /// Carve centroid clusters out of the graph.
    Centroid(CentroidSpec),
}

/// Attaches [`Structure`] metadata to raw graphs.
///
/// Alternating rings are always pinned to the two pair colours, whatever the
/// structure family.
#[derive(Clone, Debug, PartialEq)]
pub struct StructureAssigner {
    spec: StructureSpec,
    pair_colors: (Color, Color),
}

impl StructureAssigner {
    /// Validates `spec` against the palette and node range.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when a probability is out of range, a colour is
    /// outside the palette, or even the smallest centroid carve-out cannot fit
    /// in the largest graph.
    pub fn new(
        spec: StructureSpec,
        pair_colors: (Color, Color),
        number_colors: usize,
        nodes: NodeRange,
    ) -> Result<Self, ConfigError> {
        check_color(pair_colors.0, number_colors, "pair_colors")?;
        check_color(pair_colors.1, number_colors, "pair_colors")?;
        if let StructureSpec::Centroid(centroid) = &spec {
            validate_centroid(centroid, number_colors, nodes)?;
        }
        Ok(Self { spec, pair_colors })
    }

    /// Returns the structure specification.
    #[must_use]
    pub const fn spec(&self) -> &StructureSpec {
        &self.spec
    }

    /// Attaches metadata to `raw`, consuming it.
    ///
    /// # Errors
    /// Returns [`GenerationError::CentroidCarveOut`] when the drawn clusters
    /// need more nodes than the graph has.
    pub fn assign<R: Rng + ?Sized>(
        &self,
        raw: RawGraph,
        rng: &mut R,
    ) -> Result<StructuredGraph, GenerationError> {
        let (mut graph, layout) = raw.into_parts();
        let mut structure = Structure::default();

        if let Layout::Ring {
            order,
            alternating: true,
        } = &layout
        {
            let (even, odd) = self.pair_colors;
            for (position, &node) in order.iter().enumerate() {
                structure.pin(node, if position % 2 == 0 { even } else { odd });
            }
        }

        match &self.spec {
            StructureSpec::Normal => {}
            StructureSpec::Line | StructureSpec::Cycle => {
                let nodes = match layout {
                    Layout::Path(order) | Layout::Ring { order, .. } => order,
                    Layout::Unordered => graph.traversal_order(),
                };
                let closed = matches!(self.spec, StructureSpec::Cycle);
                structure.set_ordering(NodeOrdering::new(nodes, closed));
            }
            StructureSpec::Centroid(centroid) => {
                carve_centroids(centroid, &mut graph, &mut structure, rng)?;
            }
        }

        Ok(StructuredGraph::new(graph, structure))
    }
}

fn validate_centroid(
    spec: &CentroidSpec,
    number_colors: usize,
    nodes: NodeRange,
) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&spec.connectivity) {
        return Err(ConfigError::InvalidProbability {
            parameter: "connectivity",
        });
    }
    if !(0.0..=1.0).contains(&spec.inter_connectivity) {
        return Err(ConfigError::InvalidProbability {
            parameter: "inter_connectivity",
        });
    }
    if let Some(color) = spec.only_color {
        check_color(color, number_colors, "only_color")?;
    }
    let smallest = spec
        .centroids
        .min()
        .saturating_mul(spec.nodes_per_centroid.min().saturating_add(1));
    if smallest > nodes.max() {
        return Err(ConfigError::InvalidParameter {
            parameter: "centroids",
            reason: format!(
                "the smallest carve-out needs {smallest} nodes but graphs have at most {}",
                nodes.max()
            ),
        });
    }
    Ok(())
}

fn carve_centroids<R: Rng + ?Sized>(
    spec: &CentroidSpec,
    graph: &mut crate::graph::Graph,
    structure: &mut Structure,
    rng: &mut R,
) -> Result<(), GenerationError> {
    let count = spec.centroids.sample(rng);
    let sizes: Vec<usize> = (0..count)
        .map(|_| spec.nodes_per_centroid.sample(rng))
        .collect();
    let requested: usize = sizes.iter().map(|size| size + 1).sum();
    let available = graph.node_count();
    if requested > available {
        return Err(GenerationError::CentroidCarveOut {
            requested,
            available,
        });
    }

    let mut pool: Vec<_> = graph.nodes().collect();
    pool.shuffle(rng);
    let mut remaining = pool.as_slice();
    let mut hubs = Vec::with_capacity(count);
    for size in sizes {
        let Some((&hub, rest)) = remaining.split_first() else {
            break;
        };
        let (members, rest) = rest.split_at(size.min(rest.len()));
        remaining = rest;

        for (offset, &member) in members.iter().enumerate() {
            graph.add_edge(hub, member);
            for &other in members.iter().skip(offset + 1) {
                if rng.gen_bool(spec.connectivity) {
                    graph.add_edge(member, other);
                }
            }
            if let Some(color) = spec.only_color {
                structure.pin(member, color);
            }
        }
        hubs.push(hub);
        structure.push_centroid(Centroid::new(hub, members.to_vec()));
    }

    for (offset, &hub) in hubs.iter().enumerate() {
        for &other in hubs.iter().skip(offset + 1) {
            if rng.gen_bool(spec.inter_connectivity) {
                graph.add_edge(hub, other);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::{SeedableRng, rngs::SmallRng};
    use rstest::{fixture, rstest};

    use crate::graph::{Graph, NodeId};

    fn range(min: usize, max: usize) -> NodeRange {
        NodeRange::new(min, max).expect("test range is valid")
    }

    #[fixture]
    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(17)
    }

    fn centroid_spec(count: usize, members: usize) -> CentroidSpec {
        CentroidSpec {
            centroids: range(count, count),
            nodes_per_centroid: range(members, members),
            connectivity: 1.0,
            inter_connectivity: 0.0,
            only_color: Some(Color::GREEN),
        }
    }

    #[rstest]
    fn alternating_rings_are_pinned_to_pair_colours(mut rng: SmallRng) {
        let order: Vec<NodeId> = (0..4).map(NodeId::new).collect();
        let raw = RawGraph::new(
            Graph::with_nodes(4),
            Layout::Ring {
                order,
                alternating: true,
            },
        );
        let assigner = StructureAssigner::new(
            StructureSpec::Normal,
            (Color::RED, Color::GREEN),
            2,
            range(4, 4),
        )
        .expect("spec is valid");
        let structured = assigner.assign(raw, &mut rng).expect("assignment succeeds");
        let pins: Vec<Color> = structured.structure().pins().values().copied().collect();
        assert_eq!(pins, vec![Color::RED, Color::GREEN, Color::RED, Color::GREEN]);
    }

    #[rstest]
    #[case::line(StructureSpec::Line, false)]
    #[case::cycle(StructureSpec::Cycle, true)]
    fn orderings_fall_back_to_traversal(
        mut rng: SmallRng,
        #[case] spec: StructureSpec,
        #[case] closed: bool,
    ) {
        let mut graph = Graph::with_nodes(3);
        graph.add_edge(NodeId::new(0), NodeId::new(2));
        let assigner =
            StructureAssigner::new(spec, (Color::RED, Color::GREEN), 2, range(3, 3))
                .expect("spec is valid");
        let structured = assigner
            .assign(RawGraph::new(graph, Layout::Unordered), &mut rng)
            .expect("assignment succeeds");
        let ordering = structured.structure().ordering().expect("ordering recorded");
        assert_eq!(ordering.is_closed(), closed);
        assert_eq!(
            ordering.nodes(),
            &[NodeId::new(0), NodeId::new(2), NodeId::new(1)]
        );
    }

    #[rstest]
    fn centroids_wire_hubs_and_pin_members(mut rng: SmallRng) {
        let assigner = StructureAssigner::new(
            StructureSpec::Centroid(centroid_spec(2, 3)),
            (Color::RED, Color::GREEN),
            3,
            range(10, 10),
        )
        .expect("spec is valid");
        let raw = RawGraph::new(Graph::with_nodes(10), Layout::Unordered);
        let structured = assigner.assign(raw, &mut rng).expect("carve-out fits");
        let structure = structured.structure();
        assert_eq!(structure.centroids().len(), 2);
        assert_eq!(structure.pins().len(), 6);
        for centroid in structure.centroids() {
            assert_eq!(centroid.members().len(), 3);
            for &member in centroid.members() {
                assert!(structured.graph().contains_edge(centroid.hub(), member));
                assert_eq!(structure.pins().get(&member), Some(&Color::GREEN));
            }
        }
    }

    #[rstest]
    fn oversized_carve_out_is_a_generation_error(mut rng: SmallRng) {
        let assigner = StructureAssigner::new(
            StructureSpec::Centroid(centroid_spec(2, 3)),
            (Color::RED, Color::GREEN),
            3,
            range(6, 8),
        )
        .expect("carve-out fits the largest graph");
        let raw = RawGraph::new(Graph::with_nodes(6), Layout::Unordered);
        let err = assigner.assign(raw, &mut rng).expect_err("8 nodes needed");
        assert_eq!(
            err,
            GenerationError::CentroidCarveOut {
                requested: 8,
                available: 6
            }
        );
    }

    #[test]
    fn impossible_carve_out_is_a_configuration_error() {
        let err = StructureAssigner::new(
            StructureSpec::Centroid(centroid_spec(3, 4)),
            (Color::RED, Color::GREEN),
            3,
            range(5, 9),
        )
        .expect_err("15 nodes can never fit");
        assert!(matches!(
            err,
            ConfigError::InvalidParameter {
                parameter: "centroids",
                ..
            }
        ));
    }
}

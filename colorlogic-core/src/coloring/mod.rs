//! Colour assignment under per-split distribution constraints.
//!
//! Every graph belongs to one split. A split may fix exact counts for some
//! colours (`color_distribution`, overridden by `force_color`); the remaining
//! nodes are filled from a residual distribution over the colours without an
//! exact count. Placement order for one graph is:
//!
//! 1. nodes pinned by the structure step keep their colour and are charged
//!    against any quota;
//! 2. the contiguous colour, when configured and an ordering exists, is laid
//!    down as one run along the ordering;
//! 3. remaining exact counts go to randomly chosen free nodes;
//! 4. every other node draws from the residual distribution.

mod quota;
mod split;

use std::collections::BTreeMap;

use rand::{
    Rng,
    distributions::{Distribution, WeightedIndex},
    seq::SliceRandom,
};

use crate::color::{Color, check_color};
use crate::error::{ConfigError, GenerationError};
use crate::graph::{ColoredGraph, NodeId, NodeOrdering, StructuredGraph};
use crate::topology::NodeRange;

use self::quota::QuotaCounter;
pub use self::split::SplitSchedule;

/// Colour policy for one split.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SplitPolicy {
    /// Exact number of nodes per listed colour.
    #[cfg_attr(feature = "serde", serde(default))]
    pub color_distribution: Option<BTreeMap<Color, usize>>,
    /// Exact counts that take precedence over `color_distribution`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub force_color: BTreeMap<Color, usize>,
    /// Relative weights over the whole palette for the residual fill.
    ///
    /// Uniform when unset. Colours with an exact count never take part in the
    /// residual fill, whatever their weight.
    #[cfg_attr(feature = "serde", serde(default))]
    pub weights: Option<Vec<f64>>,
}

impl SplitPolicy {
    /// Merges `color_distribution` and `force_color` into exact counts.
    #[must_use]
    pub fn quotas(&self) -> BTreeMap<Color, usize> {
        let mut quotas = self.color_distribution.clone().unwrap_or_default();
        quotas.extend(self.force_color.iter().map(|(&color, &count)| (color, count)));
        quotas
    }
}

/// Colouring configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColoringSpec {
    /// Fraction of the dataset in each split, in split order.
    #[cfg_attr(feature = "serde", serde(default = "default_graph_split"))]
    pub graph_split: Vec<f64>,
    /// One policy per split; empty means unconstrained everywhere.
    #[cfg_attr(feature = "serde", serde(default))]
    pub policies: Vec<SplitPolicy>,
    /// Colour whose exact count is placed as one run along the node ordering.
    #[cfg_attr(feature = "serde", serde(default))]
    pub contiguous_color: Option<Color>,
    /// Colours pinned around an alternating ring.
    #[cfg_attr(feature = "serde", serde(default = "default_pair_colors"))]
    pub pair_colors: (Color, Color),
}

impl Default for ColoringSpec {
    fn default() -> Self {
        Self {
            graph_split: default_graph_split(),
            policies: Vec::new(),
            contiguous_color: None,
            pair_colors: default_pair_colors(),
        }
    }
}

fn default_graph_split() -> Vec<f64> {
    vec![1.0]
}

const fn default_pair_colors() -> (Color, Color) {
    (Color::RED, Color::GREEN)
}

/// Residual distribution over the colours without an exact count.
#[derive(Clone, Debug, PartialEq)]
struct Residual {
    colors: Vec<Color>,
    index: WeightedIndex<f64>,
}

impl Residual {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Color> {
        self.colors.get(self.index.sample(rng)).copied()
    }
}

#[derive(Clone, Debug, PartialEq)]
struct ResolvedPolicy {
    quotas: BTreeMap<Color, usize>,
    residual: Option<Residual>,
}

/// Assigns one colour to every node of a structured graph.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorAssigner {
    schedule: SplitSchedule,
    policies: Vec<ResolvedPolicy>,
    contiguous_color: Option<Color>,
}

impl ColorAssigner {
    /// Validates `spec` for a dataset of `number_graphs` graphs.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when the palette is empty, a referenced colour
    /// is outside it, split proportions are malformed, the number of policies
    /// does not match the number of splits, a split's exact counts exceed
    /// `nodes.min()`, or residual weights are unusable.
    pub fn new(
        spec: &ColoringSpec,
        number_colors: usize,
        nodes: NodeRange,
        number_graphs: usize,
    ) -> Result<Self, ConfigError> {
        if number_colors == 0 {
            return Err(ConfigError::ZeroColors);
        }
        let schedule = SplitSchedule::new(&spec.graph_split, number_graphs)?;
        if !spec.policies.is_empty() && spec.policies.len() != schedule.len() {
            return Err(ConfigError::SplitPolicyMismatch {
                splits: schedule.len(),
                policies: spec.policies.len(),
            });
        }
        if let Some(color) = spec.contiguous_color {
            check_color(color, number_colors, "contiguous_color")?;
        }

        let unconstrained = SplitPolicy::default();
        let policies = (0..schedule.len())
            .map(|split| {
                let policy = spec.policies.get(split).unwrap_or(&unconstrained);
                resolve_policy(split, policy, number_colors, nodes)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            schedule,
            policies,
            contiguous_color: spec.contiguous_color,
        })
    }

    /// Returns the split schedule.
    #[must_use]
    pub const fn schedule(&self) -> &SplitSchedule {
        &self.schedule
    }

    /// Returns the exact colour counts enforced for graphs of `split`.
    #[must_use]
    pub fn quotas(&self, split: usize) -> Option<&BTreeMap<Color, usize>> {
        self.policies.get(split).map(|policy| &policy.quotas)
    }

    /// Colours graph `index` of the dataset.
    ///
    /// # Errors
    /// Returns [`GenerationError`] when pinned nodes exceed a quota, too few
    /// free nodes remain for an exact count, or free nodes remain with no
    /// residual colour to draw from.
    pub fn assign<R: Rng + ?Sized>(
        &self,
        index: usize,
        structured: StructuredGraph,
        rng: &mut R,
    ) -> Result<ColoredGraph, GenerationError> {
        let split = self.schedule.split_of(index);
        let (graph, structure) = structured.into_parts();
        let mut colors: BTreeMap<NodeId, Color> = structure
            .pins()
            .iter()
            .filter(|(id, _)| graph.contains_node(**id))
            .map(|(&id, &color)| (id, color))
            .collect();

        let unconstrained = ResolvedPolicy {
            quotas: BTreeMap::new(),
            residual: None,
        };
        let policy = self.policies.get(split).unwrap_or(&unconstrained);
        let mut counter = QuotaCounter::new(&policy.quotas);
        counter.claim_pins(colors.values())?;

        if let (Some(color), Some(ordering)) = (self.contiguous_color, structure.ordering()) {
            let needed = counter.take(color);
            if needed > 0 {
                for node in contiguous_run(ordering, &colors, color, needed, rng)? {
                    colors.insert(node, color);
                }
            }
        }

        let mut free: Vec<NodeId> = graph
            .nodes()
            .filter(|id| !colors.contains_key(id))
            .collect();
        free.shuffle(rng);
        let mut rest = free.as_slice();
        for (color, count) in counter.into_outstanding() {
            if rest.len() < count {
                return Err(GenerationError::QuotaUnsatisfiable {
                    color,
                    requested: count,
                    available: rest.len(),
                });
            }
            let (chosen, tail) = rest.split_at(count);
            colors.extend(chosen.iter().map(|&node| (node, color)));
            rest = tail;
        }

        if !rest.is_empty() {
            let no_residual = GenerationError::NoResidualColor {
                free_nodes: rest.len(),
            };
            let Some(residual) = &policy.residual else {
                return Err(no_residual);
            };
            for &node in rest {
                let color = residual.sample(rng).ok_or_else(|| no_residual.clone())?;
                colors.insert(node, color);
            }
        }

        Ok(ColoredGraph::from_parts(graph, colors, split))
    }
}

fn resolve_policy(
    split: usize,
    policy: &SplitPolicy,
    number_colors: usize,
    nodes: NodeRange,
) -> Result<ResolvedPolicy, ConfigError> {
    let quotas = policy.quotas();
    for &color in quotas.keys() {
        check_color(color, number_colors, "color_distribution")?;
    }
    let requested: usize = quotas.values().sum();
    if requested > nodes.min() {
        return Err(ConfigError::QuotaExceedsNodes {
            split,
            requested,
            min_nodes: nodes.min(),
        });
    }

    let weights = match &policy.weights {
        Some(weights) => {
            if weights.len() != number_colors {
                return Err(ConfigError::InvalidParameter {
                    parameter: "weights",
                    reason: format!(
                        "expected {number_colors} weights but {} were given",
                        weights.len()
                    ),
                });
            }
            if weights.iter().any(|w| !w.is_finite() || w.is_sign_negative()) {
                return Err(ConfigError::InvalidParameter {
                    parameter: "weights",
                    reason: "weights must be finite and non-negative".into(),
                });
            }
            weights.clone()
        }
        None => vec![1.0; number_colors],
    };

    let (colors, residual_weights): (Vec<Color>, Vec<f64>) = weights
        .into_iter()
        .enumerate()
        .map(|(index, weight)| (Color::new(index), weight))
        .filter(|(color, weight)| !quotas.contains_key(color) && *weight > 0.0)
        .unzip();
    let residual = if colors.is_empty() {
        None
    } else {
        let index = WeightedIndex::new(residual_weights).map_err(|err| {
            ConfigError::InvalidParameter {
                parameter: "weights",
                reason: err.to_string(),
            }
        })?;
        Some(Residual { colors, index })
    };

    Ok(ResolvedPolicy { quotas, residual })
}

/// Picks `needed` consecutive unpinned nodes along `ordering`.
///
/// Pinned nodes are skipped, so the run is contiguous among the nodes still
/// free to take the colour. Closed orderings may wrap.
fn contiguous_run<R: Rng + ?Sized>(
    ordering: &NodeOrdering,
    pinned: &BTreeMap<NodeId, Color>,
    color: Color,
    needed: usize,
    rng: &mut R,
) -> Result<Vec<NodeId>, GenerationError> {
    let free: Vec<NodeId> = ordering
        .nodes()
        .iter()
        .copied()
        .filter(|id| !pinned.contains_key(id))
        .collect();
    if needed > free.len() {
        return Err(GenerationError::QuotaUnsatisfiable {
            color,
            requested: needed,
            available: free.len(),
        });
    }
    let run = if ordering.is_closed() {
        let start = rng.gen_range(0..free.len());
        free.iter()
            .cycle()
            .skip(start)
            .take(needed)
            .copied()
            .collect()
    } else {
        let start = rng.gen_range(0..=free.len() - needed);
        free.iter().skip(start).take(needed).copied().collect()
    };
    Ok(run)
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::{SeedableRng, rngs::SmallRng};
    use rstest::{fixture, rstest};

    use crate::graph::{Graph, Layout, RawGraph};
    use crate::structure::{StructureAssigner, StructureSpec};

    fn range(min: usize, max: usize) -> NodeRange {
        NodeRange::new(min, max).expect("test range is valid")
    }

    #[fixture]
    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(23)
    }

    fn structured(count: usize, spec: StructureSpec, layout: Layout) -> StructuredGraph {
        let assigner = StructureAssigner::new(
            spec,
            (Color::RED, Color::GREEN),
            3,
            range(count, count),
        )
        .expect("structure is valid");
        let mut rng = SmallRng::seed_from_u64(0);
        assigner
            .assign(RawGraph::new(Graph::with_nodes(count), layout), &mut rng)
            .expect("structure applies")
    }

    fn policy(quotas: &[(usize, usize)]) -> SplitPolicy {
        SplitPolicy {
            color_distribution: Some(
                quotas
                    .iter()
                    .map(|&(color, count)| (Color::new(color), count))
                    .collect(),
            ),
            ..SplitPolicy::default()
        }
    }

    #[rstest]
    fn exact_counts_are_met(mut rng: SmallRng) {
        let spec = ColoringSpec {
            policies: vec![policy(&[(0, 3), (2, 1)])],
            ..ColoringSpec::default()
        };
        let assigner = ColorAssigner::new(&spec, 3, range(10, 10), 5).expect("spec is valid");
        for index in 0..5 {
            let graph = structured(10, StructureSpec::Normal, Layout::Unordered);
            let colored = assigner.assign(index, graph, &mut rng).expect("quotas fit");
            assert_eq!(colored.count_color(Color::RED), 3);
            assert_eq!(colored.count_color(Color::new(2)), 1);
            assert_eq!(colored.count_color(Color::GREEN), 6);
        }
    }

    #[test]
    fn force_color_overrides_distribution() {
        let split = SplitPolicy {
            force_color: BTreeMap::from([(Color::RED, 5)]),
            ..policy(&[(0, 1), (1, 2)])
        };
        assert_eq!(
            split.quotas(),
            BTreeMap::from([(Color::RED, 5), (Color::GREEN, 2)])
        );
    }

    #[rstest]
    fn splits_use_their_own_policies(mut rng: SmallRng) {
        let spec = ColoringSpec {
            graph_split: vec![0.5, 0.5],
            policies: vec![policy(&[(1, 4)]), policy(&[(1, 0)])],
            ..ColoringSpec::default()
        };
        let assigner = ColorAssigner::new(&spec, 2, range(4, 4), 4).expect("spec is valid");
        let greens: Vec<usize> = (0..4)
            .map(|index| {
                let graph = structured(4, StructureSpec::Normal, Layout::Unordered);
                let colored = assigner.assign(index, graph, &mut rng).expect("fits");
                assert_eq!(colored.split(), index / 2);
                colored.count_color(Color::GREEN)
            })
            .collect();
        assert_eq!(greens, vec![4, 4, 0, 0]);
    }

    #[rstest]
    fn contiguous_colour_forms_one_run(mut rng: SmallRng) {
        let spec = ColoringSpec {
            policies: vec![policy(&[(1, 3)])],
            contiguous_color: Some(Color::GREEN),
            ..ColoringSpec::default()
        };
        let assigner = ColorAssigner::new(&spec, 2, range(8, 8), 1).expect("spec is valid");
        let order: Vec<NodeId> = (0..8).map(NodeId::new).collect();
        let graph = structured(8, StructureSpec::Line, Layout::Path(order));
        let colored = assigner.assign(0, graph, &mut rng).expect("run fits");
        let positions: Vec<usize> = colored
            .colors()
            .filter(|&(_, color)| color == Color::GREEN)
            .map(|(id, _)| id.get())
            .collect();
        assert_eq!(positions.len(), 3);
        assert_eq!(positions[2] - positions[0], 2);
    }

    #[rstest]
    fn pinned_nodes_are_charged_against_quotas(mut rng: SmallRng) {
        let spec = ColoringSpec {
            policies: vec![policy(&[(0, 1)])],
            ..ColoringSpec::default()
        };
        let assigner = ColorAssigner::new(&spec, 2, range(4, 4), 1).expect("spec is valid");
        let order: Vec<NodeId> = (0..4).map(NodeId::new).collect();
        let ring = Layout::Ring {
            order,
            alternating: true,
        };
        let err = assigner
            .assign(0, structured(4, StructureSpec::Normal, ring), &mut rng)
            .expect_err("two red pins exceed a quota of one");
        assert!(matches!(err, GenerationError::PinnedExceedsQuota { .. }));
    }

    #[rstest]
    fn fully_constrained_palette_needs_exact_fit(mut rng: SmallRng) {
        let spec = ColoringSpec {
            policies: vec![policy(&[(0, 2), (1, 2)])],
            ..ColoringSpec::default()
        };
        let assigner = ColorAssigner::new(&spec, 2, range(4, 6), 1).expect("spec is valid");
        let err = assigner
            .assign(0, structured(6, StructureSpec::Normal, Layout::Unordered), &mut rng)
            .expect_err("two nodes have no residual colour");
        assert_eq!(err, GenerationError::NoResidualColor { free_nodes: 2 });
    }

    #[rstest]
    #[case::zero_colors(0, vec![], ConfigError::ZeroColors)]
    #[case::too_many(
        2,
        vec![policy(&[(0, 6)])],
        ConfigError::QuotaExceedsNodes { split: 0, requested: 6, min_nodes: 5 }
    )]
    #[case::mismatch(
        2,
        vec![SplitPolicy::default(), SplitPolicy::default()],
        ConfigError::SplitPolicyMismatch { splits: 1, policies: 2 }
    )]
    fn invalid_policies_are_rejected(
        #[case] number_colors: usize,
        #[case] policies: Vec<SplitPolicy>,
        #[case] expected: ConfigError,
    ) {
        let spec = ColoringSpec {
            policies,
            ..ColoringSpec::default()
        };
        let err = ColorAssigner::new(&spec, number_colors, range(5, 8), 10)
            .expect_err("policy must be rejected");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn weights_restrict_the_residual_fill(mut rng: SmallRng) {
        let spec = ColoringSpec {
            policies: vec![SplitPolicy {
                weights: Some(vec![0.0, 0.0, 1.0]),
                ..SplitPolicy::default()
            }],
            ..ColoringSpec::default()
        };
        let assigner = ColorAssigner::new(&spec, 3, range(6, 6), 1).expect("spec is valid");
        let colored = assigner
            .assign(0, structured(6, StructureSpec::Normal, Layout::Unordered), &mut rng)
            .expect("residual colour exists");
        assert_eq!(colored.count_color(Color::new(2)), 6);
    }
}

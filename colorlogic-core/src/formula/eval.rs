//! Formula evaluation over coloured graphs.

use std::collections::{BTreeMap, BTreeSet};

use crate::color::Color;
use crate::graph::{ColoredGraph, NodeId, TaggedGraph};

use super::{Condition, Formula, GraphLabelRule, PropertySearch};

impl PropertySearch {
    /// Evaluates every global predicate once for the whole graph.
    fn global_results(&self, counts: &BTreeMap<Color, usize>) -> Vec<bool> {
        self.global_prop
            .iter()
            .map(|color| counts.get(color).copied().unwrap_or(0) >= self.required_count(*color))
            .collect()
    }

    fn holds(&self, graph: &ColoredGraph, id: NodeId, globals: &[bool]) -> bool {
        let nearby: BTreeSet<Color> = if self.local_prop.is_empty() {
            BTreeSet::new()
        } else {
            graph
                .graph()
                .within_radius(id, self.radius)
                .into_iter()
                .filter_map(|other| graph.color(other))
                .collect()
        };
        let mut predicates = self
            .local_prop
            .iter()
            .map(|color| nearby.contains(color))
            .chain(globals.iter().copied());
        match self.condition {
            Condition::And => predicates.all(|holds| holds),
            Condition::Or => predicates.any(|holds| holds),
        }
    }
}

fn color_counts(graph: &ColoredGraph) -> BTreeMap<Color, usize> {
    let mut counts = BTreeMap::new();
    for (_, color) in graph.colors() {
        *counts.entry(color).or_default() += 1;
    }
    counts
}

impl Formula {
    /// Computes the tag of every node of `graph`.
    ///
    /// # Examples
    /// ```
    /// use colorlogic_core::{Color, ColoredGraph, Formula, NodeId};
    ///
    /// let graph = ColoredGraph::from_edges(
    ///     vec![Color::RED, Color::GREEN, Color::RED],
    ///     &[(0, 1)],
    /// );
    /// let tags = Formula::red_exists_green(1).tag_nodes(&graph);
    /// assert!(tags[&NodeId::new(0)]);
    /// assert!(!tags[&NodeId::new(1)]);
    /// assert!(!tags[&NodeId::new(2)]);
    /// ```
    #[must_use]
    pub fn tag_nodes(&self, graph: &ColoredGraph) -> BTreeMap<NodeId, bool> {
        let topology = graph.graph();
        match self {
            Self::Formula1 {
                anchor,
                target,
                min_count,
                radius,
            } => graph
                .colors()
                .map(|(id, color)| {
                    let tag = color == *anchor
                        && (*min_count == 0
                            || topology
                                .within_radius(id, *radius)
                                .into_iter()
                                .filter(|&other| graph.color(other) == Some(*target))
                                .count()
                                >= *min_count);
                    (id, tag)
                })
                .collect(),
            Self::Formula3 { anchor, search } => {
                let globals = search.global_results(&color_counts(graph));
                graph
                    .colors()
                    .map(|(id, color)| (id, color == *anchor && search.holds(graph, id, &globals)))
                    .collect()
            }
            Self::Formula4 {
                anchor,
                nested,
                nested_constraint,
                self_satisfy,
            } => {
                let satisfying: BTreeSet<NodeId> = nested
                    .tag_nodes(graph)
                    .into_iter()
                    .filter_map(|(id, tag)| tag.then_some(id))
                    .collect();
                graph
                    .colors()
                    .map(|(id, color)| {
                        if color != *anchor {
                            return (id, false);
                        }
                        let adjacent = topology
                            .neighbours(id)
                            .filter(|other| satisfying.contains(other))
                            .count();
                        let own = usize::from(!*self_satisfy && satisfying.contains(&id));
                        let count = satisfying.len() - adjacent - own;
                        (id, count >= *nested_constraint)
                    })
                    .collect()
            }
            Self::ColorNoConnectedColor { search } => {
                let globals = search.global_results(&color_counts(graph));
                graph
                    .colors()
                    .map(|(id, _)| (id, search.holds(graph, id, &globals)))
                    .collect()
            }
        }
    }
}

/// Evaluates a formula and aggregates its tags into a graph label.
///
/// # Examples
/// ```
/// use colorlogic_core::{Color, ColoredGraph, Formula, GraphLabelRule, Tagger};
///
/// let tagger = Tagger::new(Formula::red_exists_green(1), GraphLabelRule::Any);
/// let graph = ColoredGraph::from_edges(
///     vec![Color::RED, Color::GREEN, Color::RED, Color::GREEN],
///     &[(0, 1), (1, 2), (2, 3), (3, 0)],
/// );
/// let tagged = tagger.evaluate(graph);
/// assert_eq!(tagged.tagged_nodes(), 2);
/// assert!(tagged.label());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Tagger {
    formula: Formula,
    label_rule: GraphLabelRule,
}

impl Tagger {
    /// Pairs a resolved formula with a graph label rule.
    #[must_use]
    pub const fn new(formula: Formula, label_rule: GraphLabelRule) -> Self {
        Self {
            formula,
            label_rule,
        }
    }

    /// Returns the formula.
    #[must_use]
    pub const fn formula(&self) -> &Formula {
        &self.formula
    }

    /// Returns the graph label rule.
    #[must_use]
    pub const fn label_rule(&self) -> GraphLabelRule {
        self.label_rule
    }

    /// Tags every node of `graph` and computes the graph label.
    #[must_use]
    pub fn evaluate(&self, graph: ColoredGraph) -> TaggedGraph {
        let tags = self.formula.tag_nodes(&graph);
        let tagged = tags.values().filter(|&&tag| tag).count();
        let label = self.label_rule.label(tagged, tags.len());
        TaggedGraph::new(graph, tags, label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    const RED: Color = Color::RED;
    const GREEN: Color = Color::GREEN;
    const BLUE: Color = Color::new(2);

    fn tags(formula: &Formula, graph: &ColoredGraph) -> Vec<bool> {
        formula.tag_nodes(graph).into_values().collect()
    }

    fn search(local: &[Color], global: &[Color], condition: Condition) -> PropertySearch {
        PropertySearch {
            local_prop: local.to_vec(),
            global_prop: global.to_vec(),
            condition,
            ..PropertySearch::default()
        }
    }

    /// `R - G - R   B` (node 3 isolated).
    fn path_with_isolate() -> ColoredGraph {
        ColoredGraph::from_edges(vec![RED, GREEN, RED, BLUE], &[(0, 1), (1, 2)])
    }

    #[test]
    fn all_red_graph_without_green_is_untagged() {
        let graph = ColoredGraph::from_edges(vec![RED; 5], &[]);
        let tagger = Tagger::new(Formula::red_exists_green(1), GraphLabelRule::Any);
        let tagged = tagger.evaluate(graph);
        assert_eq!(tagged.tagged_nodes(), 0);
        assert_eq!(tagged.total_nodes(), 5);
        assert!(!tagged.label());
    }

    #[test]
    fn zero_greens_tags_every_anchor() {
        let graph = ColoredGraph::from_edges(vec![RED, BLUE, RED], &[]);
        assert_eq!(
            tags(&Formula::red_exists_green(0), &graph),
            vec![true, false, true]
        );
    }

    #[rstest]
    #[case::radius_one(1, vec![false, false, false, false, false])]
    #[case::radius_two(2, vec![true, false, false, false, false])]
    fn formula1_radius_widens_the_neighbourhood(
        #[case] radius: usize,
        #[case] expected: Vec<bool>,
    ) {
        let graph = ColoredGraph::from_edges(
            vec![RED, BLUE, GREEN, BLUE, BLUE],
            &[(0, 1), (1, 2), (2, 3), (3, 4)],
        );
        let formula = Formula::Formula1 {
            anchor: RED,
            target: GREEN,
            min_count: 1,
            radius,
        };
        assert_eq!(tags(&formula, &graph), expected);
    }

    #[rstest]
    #[case::local_and(search(&[GREEN], &[], Condition::And), vec![true, false, true, false])]
    #[case::local_missing(search(&[BLUE], &[], Condition::And), vec![false, false, false, false])]
    #[case::global_and(search(&[GREEN], &[BLUE], Condition::And), vec![true, false, true, false])]
    #[case::global_or(search(&[BLUE], &[BLUE], Condition::Or), vec![true, false, true, false])]
    #[case::empty_and(search(&[], &[], Condition::And), vec![true, false, true, false])]
    #[case::empty_or(search(&[], &[], Condition::Or), vec![false, false, false, false])]
    fn formula3_combines_predicates(#[case] search: PropertySearch, #[case] expected: Vec<bool>) {
        let formula = Formula::Formula3 {
            anchor: RED,
            search,
        };
        assert_eq!(tags(&formula, &path_with_isolate()), expected);
    }

    #[test]
    fn global_counts_honour_constraints() {
        let mut strict = search(&[], &[RED], Condition::And);
        strict.global_constraint.insert(RED, 3);
        let formula = Formula::Formula3 {
            anchor: RED,
            search: strict,
        };
        assert_eq!(
            tags(&formula, &path_with_isolate()),
            vec![false, false, false, false]
        );
    }

    #[test]
    fn color_no_connected_color_ignores_anchor() {
        let formula = Formula::ColorNoConnectedColor {
            search: search(&[RED], &[], Condition::And),
        };
        assert_eq!(
            tags(&formula, &path_with_isolate()),
            vec![false, true, false, false]
        );
    }

    #[rstest]
    #[case::excluding_self(false, 1, vec![true, false, true, true])]
    #[case::including_self(true, 2, vec![true, false, true, false])]
    #[case::unreachable(false, 2, vec![false, false, false, false])]
    fn formula4_counts_satisfying_non_neighbours(
        #[case] self_satisfy: bool,
        #[case] nested_constraint: usize,
        #[case] expected: Vec<bool>,
    ) {
        // R0 - G1 - R2 - R3: the nested formula holds on nodes 0 and 2.
        let graph = ColoredGraph::from_edges(vec![RED, GREEN, RED, RED], &[(0, 1), (1, 2), (2, 3)]);
        let formula = Formula::Formula4 {
            anchor: RED,
            nested: Box::new(Formula::red_exists_green(1)),
            nested_constraint,
            self_satisfy,
        };
        assert_eq!(tags(&formula, &graph), expected);
    }
}

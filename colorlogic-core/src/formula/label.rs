//! Aggregation of node tags into a graph label.

/// Rule deciding the graph label from the number of tagged nodes.
///
/// # Examples
/// ```
/// use colorlogic_core::GraphLabelRule;
///
/// assert!(GraphLabelRule::Any.label(1, 5));
/// assert!(!GraphLabelRule::AtLeast(2).label(1, 5));
/// assert!(GraphLabelRule::All.label(5, 5));
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum GraphLabelRule {
    /// Label 1 when at least one node is tagged.
    #[default]
    Any,
    /// Label 1 when at least `k` nodes are tagged.
    AtLeast(usize),
    /// Label 1 when every node of a non-empty graph is tagged.
    All,
}

impl GraphLabelRule {
    /// Computes the label for `tagged` tagged nodes out of `total`.
    #[must_use]
    pub const fn label(self, tagged: usize, total: usize) -> bool {
        match self {
            Self::Any => tagged > 0,
            Self::AtLeast(threshold) => tagged >= threshold,
            Self::All => total > 0 && tagged == total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case::any_none(GraphLabelRule::Any, 0, 4, false)]
    #[case::any_one(GraphLabelRule::Any, 1, 4, true)]
    #[case::at_least_zero(GraphLabelRule::AtLeast(0), 0, 4, true)]
    #[case::at_least_short(GraphLabelRule::AtLeast(3), 2, 4, false)]
    #[case::all_partial(GraphLabelRule::All, 3, 4, false)]
    #[case::all_empty(GraphLabelRule::All, 0, 0, false)]
    fn label_rules(
        #[case] rule: GraphLabelRule,
        #[case] tagged: usize,
        #[case] total: usize,
        #[case] expected: bool,
    ) {
        assert_eq!(rule.label(tagged, total), expected);
    }
}

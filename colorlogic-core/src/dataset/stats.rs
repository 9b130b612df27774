//! Diagnostic statistics accumulated while a dataset is written.

use tracing::info;

use crate::graph::TaggedGraph;

/// Running totals over every graph written to a dataset.
///
/// The accumulator is owned by the writer, updated once per graph in output
/// order, and handed back to the caller when the dataset is finished. None of
/// these figures are part of the on-disk format.
///
/// # Examples
/// ```
/// use colorlogic_core::DatasetStatistics;
///
/// let mut stats = DatasetStatistics::default();
/// stats.record_counts(4, 2, true);
/// stats.record_counts(4, 0, false);
/// assert_eq!(stats.graphs(), 2);
/// assert_eq!(stats.mixed_graphs(), 1);
/// assert_eq!(stats.tagged_fraction(), Some(0.25));
/// assert_eq!(stats.mean_tagged_in_mixed(), Some(2.0));
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DatasetStatistics {
    graphs: usize,
    total_nodes: usize,
    tagged_nodes: usize,
    positive_graphs: usize,
    all_tagged: usize,
    none_tagged: usize,
    mixed_tagged_nodes: usize,
    mixed_nodes: usize,
}

impl DatasetStatistics {
    /// Records one tagged graph.
    pub fn record(&mut self, graph: &TaggedGraph) {
        self.record_counts(graph.total_nodes(), graph.tagged_nodes(), graph.label());
    }

    /// Records one graph from its node counts and label.
    pub fn record_counts(&mut self, total: usize, tagged: usize, label: bool) {
        self.graphs += 1;
        self.total_nodes += total;
        self.tagged_nodes += tagged;
        self.positive_graphs += usize::from(label);
        let none = tagged == 0;
        let all = total > 0 && tagged == total;
        self.none_tagged += usize::from(none);
        self.all_tagged += usize::from(all);
        if !none && !all {
            self.mixed_tagged_nodes += tagged;
            self.mixed_nodes += total;
        }
    }

    /// Returns the number of graphs recorded.
    #[must_use]
    pub const fn graphs(&self) -> usize {
        self.graphs
    }

    /// Returns the number of nodes across all graphs.
    #[must_use]
    pub const fn total_nodes(&self) -> usize {
        self.total_nodes
    }

    /// Returns the number of tagged nodes across all graphs.
    #[must_use]
    pub const fn tagged_nodes(&self) -> usize {
        self.tagged_nodes
    }

    /// Returns the number of graphs labelled 1.
    #[must_use]
    pub const fn positive_graphs(&self) -> usize {
        self.positive_graphs
    }

    /// Returns the number of non-empty graphs with every node tagged.
    #[must_use]
    pub const fn all_tagged_graphs(&self) -> usize {
        self.all_tagged
    }

    /// Returns the number of graphs with no node tagged.
    #[must_use]
    pub const fn none_tagged_graphs(&self) -> usize {
        self.none_tagged
    }

    /// Returns the number of graphs with both tagged and untagged nodes.
    #[must_use]
    pub const fn mixed_graphs(&self) -> usize {
        self.graphs - self.all_tagged - self.none_tagged
    }

    /// Fraction of all nodes that were tagged.
    #[must_use]
    pub fn tagged_fraction(&self) -> Option<f64> {
        ratio(self.tagged_nodes, self.total_nodes)
    }

    /// Fraction of graphs labelled 1.
    #[must_use]
    pub fn positive_fraction(&self) -> Option<f64> {
        ratio(self.positive_graphs, self.graphs)
    }

    /// Fraction of graphs with every node tagged.
    #[must_use]
    pub fn all_tagged_fraction(&self) -> Option<f64> {
        ratio(self.all_tagged, self.graphs)
    }

    /// Fraction of graphs with no node tagged.
    #[must_use]
    pub fn none_tagged_fraction(&self) -> Option<f64> {
        ratio(self.none_tagged, self.graphs)
    }

    /// Average number of tagged nodes among mixed graphs.
    #[must_use]
    pub fn mean_tagged_in_mixed(&self) -> Option<f64> {
        ratio(self.mixed_tagged_nodes, self.mixed_graphs())
    }

    /// Average node count among mixed graphs.
    #[must_use]
    pub fn mean_size_in_mixed(&self) -> Option<f64> {
        ratio(self.mixed_nodes, self.mixed_graphs())
    }

    pub(crate) fn log_summary(&self) {
        info!(
            graphs = self.graphs,
            total_nodes = self.total_nodes,
            tagged_nodes = self.tagged_nodes,
            tagged_fraction = self.tagged_fraction(),
            positive_graphs = self.positive_graphs,
            positive_fraction = self.positive_fraction(),
            all_tagged_graphs = self.all_tagged,
            none_tagged_graphs = self.none_tagged,
            mixed_graphs = self.mixed_graphs(),
            mean_tagged_in_mixed = self.mean_tagged_in_mixed(),
            mean_size_in_mixed = self.mean_size_in_mixed(),
            "dataset written"
        );
    }
}

#[expect(
    clippy::cast_precision_loss,
    clippy::float_arithmetic,
    reason = "diagnostic ratios are reported as floating-point fractions"
)]
fn ratio(numerator: usize, denominator: usize) -> Option<f64> {
    (denominator > 0).then(|| numerator as f64 / denominator as f64)
}

//! Benchmark parameter types.

use std::fmt;

/// Parameters for a tagging or generation benchmark run.
#[derive(Clone, Debug)]
pub struct GraphBenchParams {
    /// Number of graphs in the dataset.
    pub graphs: usize,
    /// Largest node count a graph may draw.
    pub max_nodes: usize,
    /// Name of the evaluated formula.
    pub formula: &'static str,
}

impl fmt::Display for GraphBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},graphs={},n<={}",
            self.formula, self.graphs, self.max_nodes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    fn params_render_as_benchmark_ids() {
        let params = GraphBenchParams {
            graphs: 100,
            max_nodes: 40,
            formula: "formula4",
        };
        assert_eq!(params.to_string(), "formula4,graphs=100,n<=40");
    }
}

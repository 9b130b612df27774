//! Dataset configurations shared by the benchmarks.

use colorlogic_core::{
    Color, Condition, ConfigError, DatasetConfig, FormulaSet, FormulaSpec, GeneratorSpec,
    NodeRange, PropertySearch, RandomModel,
};

use crate::params::GraphBenchParams;

/// Seed used by every benchmark dataset.
pub const SEED: u64 = 42;

/// Formulas benchmarked, from cheapest to most expensive.
pub const FORMULAS: &[&str] = &["formula1", "formula3", "formula4"];

/// Formula definitions referenced by [`FORMULAS`].
#[must_use]
pub fn formulas() -> FormulaSet {
    FormulaSet::default()
        .with_definition(
            "formula1",
            FormulaSpec::Formula1 {
                anchor: Color::RED,
                target: Color::GREEN,
                n_green: 1,
                radius: 2,
            },
        )
        .with_definition(
            "formula3",
            FormulaSpec::Formula3 {
                anchor: Color::RED,
                search: PropertySearch {
                    local_prop: vec![Color::GREEN],
                    global_prop: vec![Color::new(2)],
                    condition: Condition::And,
                    ..PropertySearch::default()
                },
            },
        )
        .with_definition(
            "formula4",
            FormulaSpec::Formula4 {
                anchor: Color::RED,
                nested: "formula3".into(),
                nested_constraint: 2,
                self_satisfy: false,
            },
        )
}

/// Builds a seeded Barabasi-Albert configuration described by `params`.
///
/// # Errors
/// Returns [`ConfigError::InvalidNodeRange`] when `params.max_nodes` is below
/// the fixed minimum of eight nodes.
pub fn barabasi_config(params: &GraphBenchParams) -> Result<DatasetConfig, ConfigError> {
    let nodes = NodeRange::new(8, params.max_nodes)?;
    Ok(DatasetConfig::new(
        params.graphs,
        nodes,
        GeneratorSpec::Random {
            model: RandomModel::BarabasiAlbert { m: 2 },
        },
        formulas(),
        params.formula,
    )
    .with_seed(SEED)
    .with_number_colors(5))
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case("formula1")]
    #[case("formula3")]
    #[case("formula4")]
    fn benchmark_configs_validate(#[case] formula: &'static str) {
        let params = GraphBenchParams {
            graphs: 4,
            max_nodes: 16,
            formula,
        };
        let config = barabasi_config(&params).expect("range is valid");
        assert!(config.validate().is_ok());
    }

    #[rstest]
    fn tiny_node_bounds_are_rejected() {
        let params = GraphBenchParams {
            graphs: 1,
            max_nodes: 4,
            formula: "formula1",
        };
        assert!(matches!(
            barabasi_config(&params),
            Err(ConfigError::InvalidNodeRange { min: 8, max: 4 })
        ));
    }
}

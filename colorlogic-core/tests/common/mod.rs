//! Fixtures shared by the integration suites.
#![allow(
    dead_code,
    reason = "each integration binary uses a different subset of the fixtures"
)]

use std::collections::BTreeMap;

use colorlogic_core::{
    Color, ColoringSpec, Condition, DatasetConfig, DatasetGenerator, DatasetStatistics,
    FormulaSet, FormulaSpec, GeneratorSpec, NodeRange, PropertySearch, SplitPolicy,
    write_dataset,
};
use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;

/// Proptest configuration honouring `PROPTEST_CASES`.
pub fn proptest_config(default_cases: u32) -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default_cases);
    ProptestConfig {
        cases,
        ..ProptestConfig::default()
    }
}

/// Formula definitions covering every formula family.
pub fn formulas() -> FormulaSet {
    FormulaSet::default()
        .with_definition(
            "formula1",
            FormulaSpec::Formula1 {
                anchor: Color::RED,
                target: Color::GREEN,
                n_green: 1,
                radius: 1,
            },
        )
        .with_definition(
            "formula3",
            FormulaSpec::Formula3 {
                anchor: Color::RED,
                search: PropertySearch {
                    local_prop: vec![Color::GREEN],
                    global_prop: vec![Color::new(2)],
                    condition: Condition::Or,
                    ..PropertySearch::default()
                },
            },
        )
        .with_definition(
            "formula4",
            FormulaSpec::Formula4 {
                anchor: Color::RED,
                nested: "formula3".into(),
                nested_constraint: 1,
                self_satisfy: false,
            },
        )
        .with_definition(
            "color_no_connected_color",
            FormulaSpec::ColorNoConnectedColor(PropertySearch {
                local_prop: vec![Color::RED],
                ..PropertySearch::default()
            }),
        )
}

/// Names of the formulas defined by [`formulas`].
pub const FORMULA_NAMES: [&str; 4] = [
    "formula1",
    "formula3",
    "formula4",
    "color_no_connected_color",
];

/// Generators exercised by the property suites.
pub fn generator_specs() -> Vec<GeneratorSpec> {
    vec![
        GeneratorSpec::Empty,
        GeneratorSpec::Line,
        GeneratorSpec::Cycle { pair: false },
        GeneratorSpec::Cycle { pair: true },
        GeneratorSpec::Degree {
            degrees: vec![1, 2],
            variable_degree: false,
        },
        GeneratorSpec::Random {
            model: colorlogic_core::RandomModel::BarabasiAlbert { m: 2 },
        },
        GeneratorSpec::Random {
            model: colorlogic_core::RandomModel::ErdosRenyi {
                density: colorlogic_core::EdgeDensity::Probability(0.3),
            },
        },
    ]
}

/// A seeded configuration with a small palette.
pub fn config(
    generator: GeneratorSpec,
    formula: &str,
    number_graphs: usize,
    seed: u64,
) -> DatasetConfig {
    DatasetConfig::new(
        number_graphs,
        NodeRange::new(4, 12).expect("valid range"),
        generator,
        formulas(),
        formula,
    )
    .with_seed(seed)
    .with_number_colors(4)
}

/// A colouring spec forcing `count` nodes of `color` in every graph.
pub fn forced(color: Color, count: usize) -> ColoringSpec {
    ColoringSpec {
        policies: vec![SplitPolicy {
            force_color: BTreeMap::from([(color, count)]),
            ..SplitPolicy::default()
        }],
        ..ColoringSpec::default()
    }
}

/// Validates `config` and renders the whole dataset to a string.
pub fn render(config: &DatasetConfig) -> (String, DatasetStatistics) {
    let plan = config.validate().expect("config is valid");
    let generator = DatasetGenerator::new(plan);
    let (bytes, stats) = write_dataset(&generator, Vec::new()).expect("dataset generates");
    (String::from_utf8(bytes).expect("output is ASCII"), stats)
}

//! Formula tagging benchmarks.
//!
//! Generates coloured graphs once and measures [`Tagger::evaluate`] alone, so
//! topology and colouring costs stay out of the loop.
#![allow(missing_docs, reason = "Criterion macros generate undocumented items")]
#![allow(
    clippy::expect_used,
    reason = "benchmark setup is infallible for valid constants"
)]
#![allow(
    clippy::excessive_nesting,
    reason = "Criterion bench_with_input + b.iter pattern requires deep nesting"
)]

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use colorlogic_benches::{
    fixtures::{FORMULAS, barabasi_config},
    params::GraphBenchParams,
};
use colorlogic_core::{ColoredGraph, DatasetGenerator, Tagger};

const GRAPHS: usize = 64;

const MAX_NODES: &[usize] = &[16, 64, 256];

fn tagging(c: &mut Criterion) {
    let mut group = c.benchmark_group("tagging");
    group.sample_size(20);

    for &formula in FORMULAS {
        for &max_nodes in MAX_NODES {
            let params = GraphBenchParams {
                graphs: GRAPHS,
                max_nodes,
                formula,
            };
            let plan = barabasi_config(&params)
                .expect("node range must be valid")
                .validate()
                .expect("benchmark config must validate");
            let tagger: Tagger = plan.tagger().clone();
            let generator = DatasetGenerator::new(plan);
            let graphs: Vec<ColoredGraph> = generator
                .graphs()
                .map(|graph| graph.expect("graph must generate").colored().clone())
                .collect();

            group.bench_with_input(BenchmarkId::from_parameter(&params), &graphs, |b, graphs| {
                b.iter(|| {
                    for graph in graphs {
                        let _tagged = tagger.evaluate(graph.clone());
                    }
                });
            });
        }
    }

    group.finish();
}

criterion_group!(benches, tagging);
criterion_main!(benches);

//! End-to-end dataset generation benchmarks.
//!
//! Measures generating, tagging, and serialising a whole dataset into memory.
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

use colorlogic_benches::{fixtures::barabasi_config, params::GraphBenchParams};
use colorlogic_core::{DatasetGenerator, write_dataset};

const GRAPH_COUNTS: &[usize] = &[64, 512];

fn generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("generation");
    group.sample_size(10);

    for &graphs in GRAPH_COUNTS {
        let params = GraphBenchParams {
            graphs,
            max_nodes: 64,
            formula: "formula4",
        };
        let plan = barabasi_config(&params)
            .expect("node range must be valid")
            .validate()
            .expect("benchmark config must validate");
        let generator = DatasetGenerator::new(plan);

        group.bench_with_input(
            BenchmarkId::from_parameter(&params),
            &generator,
            |b, generator| {
                b.iter(|| {
                    let (_bytes, _stats) = write_dataset(generator, Vec::new())
                        .expect("dataset must generate");
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, generation);
criterion_main!(benches);

//! Per-graph generation: topology, structure, colouring, then tagging.
//!
//! Graph `i` is drawn from its own RNG, seeded by mixing the base seed with
//! `i`, so every graph is a pure function of the plan, the seed, and its
//! index. Batches may therefore be generated in parallel and still be
//! emitted in index order with identical content.

use rand::{SeedableRng, rngs::SmallRng};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{info, instrument};

use crate::{
    config::DatasetPlan,
    error::{DatasetError, GenerationError},
    graph::TaggedGraph,
};

/// SplitMix64 increment (the 64-bit golden ratio) used for per-graph seed
/// derivation.
const GRAPH_SEED_SPACING: u64 = 0x9E37_79B9_7F4A_7C15;
const SPLITMIX_MULT_A: u64 = 0xBF58_476D_1CE4_E5B9;
const SPLITMIX_MULT_B: u64 = 0x94D0_49BB_1331_11EB;

#[cfg(feature = "parallel")]
const BATCH_SIZE: usize = 64;

#[inline]
fn mix_graph_seed(base_seed: u64, index: usize) -> u64 {
    splitmix64(base_seed ^ ((index as u64).wrapping_add(1).wrapping_mul(GRAPH_SEED_SPACING)))
}

#[inline]
fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(GRAPH_SEED_SPACING);
    state = (state ^ (state >> 30)).wrapping_mul(SPLITMIX_MULT_A);
    state = (state ^ (state >> 27)).wrapping_mul(SPLITMIX_MULT_B);
    state ^ (state >> 31)
}

/// Generates the graphs of a validated plan.
///
/// # Examples
/// ```
/// use colorlogic_core::{
///     Color, DatasetConfig, DatasetGenerator, FormulaSet, FormulaSpec, GeneratorSpec, NodeRange,
/// };
///
/// let formulas = FormulaSet::default().with_definition(
///     "formula1",
///     FormulaSpec::Formula1 { anchor: Color::RED, target: Color::GREEN, n_green: 1, radius: 1 },
/// );
/// let plan = DatasetConfig::new(
///     3,
///     NodeRange::new(4, 4)?,
///     GeneratorSpec::Cycle { pair: true },
///     formulas,
///     "formula1",
/// )
/// .with_seed(9)
/// .with_number_colors(2)
/// .validate()?;
/// let generator = DatasetGenerator::new(plan);
/// let graph = generator.generate(0)?;
/// assert_eq!(graph.tagged_nodes(), 2);
/// assert!(graph.label());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct DatasetGenerator {
    plan: DatasetPlan,
    base_seed: u64,
}

impl DatasetGenerator {
    /// Wraps `plan`, drawing a base seed from entropy when none is configured.
    #[must_use]
    pub fn new(plan: DatasetPlan) -> Self {
        let base_seed = plan.seed().unwrap_or_else(|| {
            let seed = rand::random();
            info!(seed, "no seed configured; drew one from entropy");
            seed
        });
        Self { plan, base_seed }
    }

    /// Returns the validated plan.
    #[must_use]
    pub const fn plan(&self) -> &DatasetPlan {
        &self.plan
    }

    /// Returns the base seed every graph seed is derived from.
    #[must_use]
    pub const fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// Generates and tags graph `index`.
    ///
    /// # Errors
    /// Returns [`GenerationError`] when the drawn graph cannot meet the
    /// structural or colour guarantees of the plan.
    #[instrument(name = "generator.graph", level = "trace", err, skip(self))]
    pub fn generate(&self, index: usize) -> Result<TaggedGraph, GenerationError> {
        let mut rng = SmallRng::seed_from_u64(mix_graph_seed(self.base_seed, index));
        let raw = self.plan.topology().build(&mut rng)?;
        let structured = self.plan.structure().assign(raw, &mut rng)?;
        let colored = self.plan.colors().assign(index, structured, &mut rng)?;
        Ok(self.plan.tagger().evaluate(colored))
    }

    fn generate_indexed(&self, index: usize) -> Result<TaggedGraph, DatasetError> {
        self.generate(index)
            .map_err(|source| DatasetError::Generation { index, source })
    }

    /// Lazily generates every graph in index order.
    pub fn graphs(&self) -> impl Iterator<Item = Result<TaggedGraph, DatasetError>> + '_ {
        (0..self.plan.number_graphs()).map(move |index| self.generate_indexed(index))
    }

    /// Feeds every graph to `sink` in index order, stopping at the first error.
    ///
    /// With the `parallel` feature graphs are generated in batches on the
    /// rayon pool; `sink` still observes them sequentially and in order.
    ///
    /// # Errors
    /// Returns the generation failure with the lowest index, or the first
    /// error returned by `sink`.
    pub fn try_for_each<F>(&self, mut sink: F) -> Result<(), DatasetError>
    where
        F: FnMut(usize, TaggedGraph) -> Result<(), DatasetError>,
    {
        #[cfg(feature = "parallel")]
        {
            let total = self.plan.number_graphs();
            let mut start = 0;
            while start < total {
                let end = total.min(start.saturating_add(BATCH_SIZE));
                let batch: Vec<Result<TaggedGraph, DatasetError>> = (start..end)
                    .into_par_iter()
                    .map(|index| self.generate_indexed(index))
                    .collect();
                for (index, graph) in (start..end).zip(batch) {
                    sink(index, graph?)?;
                }
                start = end;
            }
            Ok(())
        }
        #[cfg(not(feature = "parallel"))]
        {
            for (index, graph) in self.graphs().enumerate() {
                sink(index, graph?)?;
            }
            Ok(())
        }
    }
}

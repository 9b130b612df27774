//! Benchmark support crate for colorlogic.
//!
//! Provides fixed dataset configurations and parameter labels used by the
//! Criterion benchmarks for formula tagging and end-to-end generation.

pub mod fixtures;
pub mod params;

//! Command-line interface for generating and inspecting datasets.
//!
//! `generate` decodes a JSON configuration, applies command-line overrides,
//! and writes the dataset atomically. `inspect` loads a dataset file and
//! reports its shape.

mod commands;

pub use commands::{
    Cli, CliError, Command, ExecutionSummary, GenerateCommand, GenerateSummary, InspectCommand,
    InspectSummary, LayoutArg, dataset_file_name, generator_label, load_config, render_summary,
    run_cli,
};

#[cfg(test)]
mod tests;

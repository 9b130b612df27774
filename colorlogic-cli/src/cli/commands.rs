//! Command implementations and argument parsing for the colorlogic CLI.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use colorlogic_core::{
    ConfigError, DatasetConfig, DatasetError, DatasetGenerator, DatasetReader,
    DatasetStatistics, GeneratorSpec, LayoutHint, ReadError, ReadOptions, write_dataset_to_path,
};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

const DEFAULT_DATA_DIR: &str = "data";

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "colorlogic",
    about = "Generate and inspect coloured-graph logic datasets."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Generate a dataset from a JSON configuration file.
    Generate(GenerateCommand),
    /// Load a dataset file and report its shape.
    Inspect(InspectCommand),
}

/// Options accepted by the `generate` command.
#[derive(Debug, Args, Clone)]
pub struct GenerateCommand {
    /// Path to the JSON configuration.
    #[arg(long)]
    pub config: PathBuf,

    /// Override the configured seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the configured number of graphs.
    #[arg(long, value_parser = clap::value_parser!(usize))]
    pub graphs: Option<usize>,

    /// Write to this file instead of the conventional path under `--data-dir`.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Root directory of the conventional output path.
    #[arg(long = "data-dir", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// File-name prefix of the conventional output path (defaults to the
    /// generator kind).
    #[arg(long)]
    pub name: Option<String>,
}

/// Options accepted by the `inspect` command.
#[derive(Debug, Args, Clone)]
pub struct InspectCommand {
    /// Dataset file to load.
    pub path: PathBuf,

    /// Replace node tags with node degrees.
    #[arg(long = "degree-as-tag")]
    pub degree_as_tag: bool,

    /// Node-line layout of the file.
    #[arg(long, value_enum, default_value_t = LayoutArg::Auto)]
    pub layout: LayoutArg,
}

/// Node-line layouts selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LayoutArg {
    /// Detect from token counts.
    Auto,
    /// `tag degree neighbour...`
    Plain,
    /// `count feature... tag degree neighbour...`
    Featured,
}

impl From<LayoutArg> for LayoutHint {
    fn from(value: LayoutArg) -> Self {
        match value {
            LayoutArg::Auto => Self::Auto,
            LayoutArg::Plain => Self::Plain,
            LayoutArg::Featured => Self::Featured,
        }
    }
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// The configuration file could not be read.
    #[error("failed to open `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The configuration file is not a valid configuration document.
    #[error("failed to decode configuration `{path}`: {source}")]
    Decode {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying decoding error.
        #[source]
        source: serde_json::Error,
    },
    /// The configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Generation or writing failed.
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    /// Loading a dataset failed.
    #[error(transparent)]
    Read(#[from] ReadError),
}

impl CliError {
    /// Returns the stable code of the underlying library error, if any.
    #[must_use]
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::Config(err) | Self::Dataset(DatasetError::Config(err)) => {
                Some(err.code().as_str())
            }
            Self::Dataset(DatasetError::Generation { source, .. }) => Some(source.code().as_str()),
            Self::Read(ReadError::Format(err)) => Some(err.code().as_str()),
            _ => None,
        }
    }
}

/// Outcome of a `generate` run.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateSummary {
    /// File the dataset was written to.
    pub path: PathBuf,
    /// Base seed of the run.
    pub seed: u64,
    /// Statistics accumulated while writing.
    pub statistics: DatasetStatistics,
}

/// Outcome of an `inspect` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectSummary {
    /// File that was loaded.
    pub path: PathBuf,
    /// Number of graphs.
    pub graphs: usize,
    /// Number of distinct graph labels.
    pub classes: usize,
    /// Width of the one-hot node feature matrices.
    pub feature_width: usize,
    /// Total number of nodes.
    pub nodes: usize,
    /// Largest node degree across the dataset.
    pub max_degree: usize,
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionSummary {
    /// A dataset was generated.
    Generated(GenerateSummary),
    /// A dataset was inspected.
    Inspected(InspectSummary),
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when the configuration cannot be loaded or is
/// invalid, generation fails, or a dataset cannot be read.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use colorlogic_cli::cli::{Cli, Command, ExecutionSummary, InspectCommand, LayoutArg, run_cli};
/// # use tempfile::NamedTempFile;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let file = NamedTempFile::new()?;
/// std::fs::write(file.path(), "1\n2 1\n0 1 1\n1 1 0\n")?;
/// let cli = Cli {
///     command: Command::Inspect(InspectCommand {
///         path: file.path().to_path_buf(),
///         degree_as_tag: false,
///         layout: LayoutArg::Auto,
///     }),
/// };
/// let ExecutionSummary::Inspected(summary) = run_cli(cli)? else {
///     panic!("inspect yields an inspection summary");
/// };
/// assert_eq!(summary.graphs, 1);
/// assert_eq!(summary.max_degree, 1);
/// # Ok(())
/// # }
/// ```
#[instrument(
    name = "cli.run",
    err,
    skip(cli),
    fields(command = field::Empty),
)]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Generate(generate) => {
            Span::current().record("command", field::display("generate"));
            run_generate(generate).map(ExecutionSummary::Generated)
        }
        Command::Inspect(inspect) => {
            Span::current().record("command", field::display("inspect"));
            run_inspect(&inspect).map(ExecutionSummary::Inspected)
        }
    }
}

#[instrument(
    name = "cli.generate",
    err,
    skip(command),
    fields(config = %command.config.display(), output = field::Empty),
)]
pub(super) fn run_generate(command: GenerateCommand) -> Result<GenerateSummary, CliError> {
    let mut config = load_config(&command.config)?;
    if let Some(seed) = command.seed {
        config = config.with_seed(seed);
    }
    if let Some(graphs) = command.graphs {
        config = config.with_number_graphs(graphs);
    }
    let path = match command.output {
        Some(path) => path,
        None => {
            let name = command
                .name
                .as_deref()
                .unwrap_or_else(|| generator_label(config.generator()));
            command.data_dir.join(dataset_file_name(&config, name))
        }
    };
    Span::current().record("output", field::display(path.display()));

    let generator = DatasetGenerator::new(config.validate()?);
    let statistics = write_dataset_to_path(&generator, &path)?;
    info!(
        path = %path.display(),
        graphs = statistics.graphs(),
        seed = generator.base_seed(),
        "dataset generated"
    );
    Ok(GenerateSummary {
        path,
        seed: generator.base_seed(),
        statistics,
    })
}

#[instrument(name = "cli.inspect", err, skip(command), fields(path = %command.path.display()))]
pub(super) fn run_inspect(command: &InspectCommand) -> Result<InspectSummary, CliError> {
    let options = ReadOptions::default()
        .with_degree_as_tag(command.degree_as_tag)
        .with_layout(command.layout.into());
    let dataset = DatasetReader::new(options).read_path(&command.path)?;
    let graphs = dataset.graphs();
    Ok(InspectSummary {
        path: command.path.clone(),
        graphs: graphs.len(),
        classes: dataset.num_classes(),
        feature_width: dataset.feature_width(),
        nodes: graphs.iter().map(|graph| graph.node_count()).sum(),
        max_degree: graphs
            .iter()
            .map(|graph| graph.max_degree())
            .max()
            .unwrap_or(0),
    })
}

/// Reads and decodes a JSON configuration file.
///
/// # Errors
/// Returns [`CliError::Io`] when the file cannot be read and
/// [`CliError::Decode`] when it is not a valid configuration.
pub fn load_config(path: &Path) -> Result<DatasetConfig, CliError> {
    let raw = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CliError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Returns the short name of a generator family.
#[must_use]
pub const fn generator_label(spec: &GeneratorSpec) -> &'static str {
    match spec {
        GeneratorSpec::Empty => "empty",
        GeneratorSpec::Degree { .. } => "degree",
        GeneratorSpec::Line => "line",
        GeneratorSpec::Random { .. } => "random",
        GeneratorSpec::Cycle { .. } => "cycle",
    }
}

/// Builds the conventional relative output path for `config`.
///
/// The layout is `<formula>/<name>-<graphs>-<min>-<max>.txt`, with a trailing
/// `-<m>` before the extension for Barabasi-Albert generators.
///
/// # Examples
/// ```
/// # use colorlogic_cli::cli::dataset_file_name;
/// # use colorlogic_core::{DatasetConfig, FormulaSet, GeneratorSpec, NodeRange};
/// let config = DatasetConfig::new(
///     100,
///     NodeRange::new(4, 20).expect("valid range"),
///     GeneratorSpec::Line,
///     FormulaSet::default(),
///     "formula1",
/// );
/// assert_eq!(
///     dataset_file_name(&config, "line"),
///     std::path::Path::new("formula1/line-100-4-20.txt"),
/// );
/// ```
#[must_use]
pub fn dataset_file_name(config: &DatasetConfig, name: &str) -> PathBuf {
    let nodes = config.n_nodes();
    let mut stem = format!(
        "{name}-{}-{}-{}",
        config.number_graphs(),
        nodes.min(),
        nodes.max()
    );
    if let Some(m) = config.generator().attachment() {
        stem.push_str(&format!("-{m}"));
    }
    Path::new(config.formula()).join(format!("{stem}.txt"))
}

/// Renders `summary` to `writer` in a human-readable text format.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    match summary {
        ExecutionSummary::Generated(generated) => {
            let stats = &generated.statistics;
            writeln!(writer, "dataset: {}", generated.path.display())?;
            writeln!(writer, "seed: {}", generated.seed)?;
            writeln!(writer, "graphs: {}", stats.graphs())?;
            writeln!(
                writer,
                "tagged nodes: {}/{}",
                stats.tagged_nodes(),
                stats.total_nodes()
            )?;
            writeln!(writer, "positive graphs: {}", stats.positive_graphs())?;
            writeln!(
                writer,
                "all tagged: {}, none tagged: {}, mixed: {}",
                stats.all_tagged_graphs(),
                stats.none_tagged_graphs(),
                stats.mixed_graphs()
            )?;
        }
        ExecutionSummary::Inspected(inspected) => {
            writeln!(writer, "dataset: {}", inspected.path.display())?;
            writeln!(writer, "graphs: {}", inspected.graphs)?;
            writeln!(writer, "classes: {}", inspected.classes)?;
            writeln!(writer, "nodes: {}", inspected.nodes)?;
            writeln!(writer, "max degree: {}", inspected.max_degree)?;
            writeln!(writer, "feature width: {}", inspected.feature_width)?;
        }
    }
    Ok(())
}

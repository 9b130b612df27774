//! Serialisation of tagged graphs to the line-oriented dataset format.
//!
//! ```text
//! <number_of_graphs>
//! <n_nodes> <graph_label>
//! <node line>            (n_nodes times)
//! ```
//!
//! A plain node line is `color degree neighbour...`. A featured node line is
//! `feature_count feature... tag degree neighbour...`. Neighbours are indices
//! into the graph's contiguous renumbering.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, instrument};

use crate::error::DatasetError;
use crate::graph::{IndexedGraph, TaggedGraph};
use crate::pipeline::DatasetGenerator;

use super::stats::DatasetStatistics;

/// A per-node value written in featured node lines.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum NodeFeature {
    /// The node's colour.
    Color,
}

/// Layout of the node lines a writer produces.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum NodeLineMode {
    /// `color degree neighbour...`
    Plain,
    /// `feature_count feature... tag degree neighbour...`
    WithFeatures(Vec<NodeFeature>),
}

impl Default for NodeLineMode {
    fn default() -> Self {
        Self::WithFeatures(vec![NodeFeature::Color])
    }
}

/// Streams tagged graphs to a [`Write`] sink.
///
/// The graph count is written up front; [`DatasetWriter::finish`] refuses to
/// complete unless exactly that many graphs were written.
///
/// # Examples
/// ```
/// use colorlogic_core::{
///     Color, ColoredGraph, DatasetWriter, Formula, GraphLabelRule, NodeLineMode, Tagger,
/// };
///
/// let tagger = Tagger::new(Formula::red_exists_green(1), GraphLabelRule::Any);
/// let graph = tagger.evaluate(ColoredGraph::from_edges(
///     vec![Color::RED, Color::GREEN],
///     &[(0, 1)],
/// ));
/// let mut writer = DatasetWriter::new(Vec::new(), 1, NodeLineMode::Plain)?;
/// writer.write_graph(&graph)?;
/// let (bytes, stats) = writer.finish()?;
/// assert_eq!(String::from_utf8(bytes)?, "1\n2 1\n0 1 1\n1 1 0\n");
/// assert_eq!(stats.tagged_nodes(), 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct DatasetWriter<W: Write> {
    out: W,
    mode: NodeLineMode,
    declared: usize,
    stats: DatasetStatistics,
}

impl<W: Write> DatasetWriter<W> {
    /// Writes the graph-count header and prepares to accept graphs.
    ///
    /// # Errors
    /// Propagates failures from the underlying sink.
    pub fn new(mut out: W, number_graphs: usize, mode: NodeLineMode) -> io::Result<Self> {
        writeln!(out, "{number_graphs}")?;
        Ok(Self {
            out,
            mode,
            declared: number_graphs,
            stats: DatasetStatistics::default(),
        })
    }

    /// Returns the statistics accumulated so far.
    #[must_use]
    pub const fn statistics(&self) -> &DatasetStatistics {
        &self.stats
    }

    /// Renumbers `graph` and appends it to the output.
    ///
    /// # Errors
    /// Returns an [`io::ErrorKind::InvalidInput`] error when more graphs are
    /// written than were declared, and propagates sink failures.
    pub fn write_graph(&mut self, graph: &TaggedGraph) -> io::Result<()> {
        if self.stats.graphs() >= self.declared {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("only {} graphs were declared", self.declared),
            ));
        }
        let indexed = graph.relabel();
        writeln!(
            self.out,
            "{} {}",
            indexed.node_count(),
            u8::from(indexed.label())
        )?;
        for node in 0..indexed.node_count() {
            self.write_node(&indexed, node)?;
        }

        self.stats.record(graph);
        record_metrics(graph);
        debug!(
            index = self.stats.graphs() - 1,
            total = self.declared,
            nodes = graph.total_nodes(),
            tagged = graph.tagged_nodes(),
            "graph written"
        );
        Ok(())
    }

    fn write_node(&mut self, indexed: &IndexedGraph, node: usize) -> io::Result<()> {
        let color = indexed.colors().get(node).map_or(0, |color| color.get());
        let tag = indexed.tags().get(node).copied().unwrap_or(false);
        let neighbours = indexed.neighbours().get(node).map_or(&[][..], Vec::as_slice);

        match &self.mode {
            NodeLineMode::Plain => write!(self.out, "{color} {}", neighbours.len())?,
            NodeLineMode::WithFeatures(features) => {
                write!(self.out, "{}", features.len())?;
                for feature in features {
                    let value = match feature {
                        NodeFeature::Color => color,
                    };
                    write!(self.out, " {value}")?;
                }
                write!(self.out, " {} {}", u8::from(tag), neighbours.len())?;
            }
        }
        for neighbour in neighbours {
            write!(self.out, " {neighbour}")?;
        }
        writeln!(self.out)
    }

    /// Flushes the sink, logs the summary, and returns it with the statistics.
    ///
    /// # Errors
    /// Returns an [`io::ErrorKind::InvalidData`] error when fewer graphs were
    /// written than declared, and propagates flush failures.
    pub fn finish(mut self) -> io::Result<(W, DatasetStatistics)> {
        if self.stats.graphs() != self.declared {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "{} graphs were declared but {} were written",
                    self.declared,
                    self.stats.graphs()
                ),
            ));
        }
        self.out.flush()?;
        self.stats.log_summary();
        Ok((self.out, self.stats))
    }
}

#[cfg(feature = "metrics")]
fn record_metrics(graph: &TaggedGraph) {
    metrics::counter!("colorlogic_graphs_written").increment(1);
    metrics::counter!("colorlogic_nodes_tagged").increment(graph.tagged_nodes() as u64);
}

#[cfg(not(feature = "metrics"))]
fn record_metrics(_graph: &TaggedGraph) {}

/// Generates every graph of `generator`'s plan and writes it to `out`.
///
/// # Errors
/// Returns [`DatasetError::Generation`] for the first graph that cannot be
/// generated and [`DatasetError::Io`] when the sink fails. Output already
/// written to `out` is then incomplete and must be discarded.
#[instrument(
    name = "dataset.write",
    err,
    skip(generator, out),
    fields(
        graphs = generator.plan().number_graphs(),
        formula = %generator.plan().formula_name(),
        seed = generator.base_seed(),
    ),
)]
pub fn write_dataset<W: Write>(
    generator: &DatasetGenerator,
    out: W,
) -> Result<(W, DatasetStatistics), DatasetError> {
    let plan = generator.plan();
    let mut writer = DatasetWriter::new(out, plan.number_graphs(), plan.node_lines().clone())?;
    generator.try_for_each(|_, graph| {
        writer.write_graph(&graph)?;
        Ok(())
    })?;
    Ok(writer.finish()?)
}

/// Writes the dataset to `path`, replacing it only once every graph succeeded.
///
/// Graphs are first written to a temporary file in the destination
/// directory, which is renamed over `path` at the end. A failed run leaves any
/// existing file at `path` untouched.
///
/// # Errors
/// As [`write_dataset`], plus I/O failures creating the directory, the
/// temporary file, or the final rename.
pub fn write_dataset_to_path(
    generator: &DatasetGenerator,
    path: &Path,
) -> Result<DatasetStatistics, DatasetError> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(directory)?;
    let staging = NamedTempFile::new_in(directory)?;
    let (buffer, stats) = write_dataset(generator, BufWriter::new(staging))?;
    let staging = buffer.into_inner().map_err(io::IntoInnerError::into_error)?;
    staging.persist(path).map_err(|err| err.error)?;
    Ok(stats)
}

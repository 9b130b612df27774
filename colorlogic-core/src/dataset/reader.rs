//! Parsing of the line-oriented dataset format into an in-memory dataset.
//!
//! Node lines come in two layouts: plain (`tag degree neighbour...`,
//! optionally followed by real-valued attributes) and featured
//! (`feature_count feature... tag degree neighbour...`). The layout of each
//! graph block is detected from declared token counts rather than a fixed
//! column count.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;
use std::str::FromStr;

use tracing::{debug, instrument};

use crate::error::{FormatError, ReadError};

/// Which node-line layout the reader should expect.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LayoutHint {
    /// Detect the layout of each graph block from its token counts.
    #[default]
    Auto,
    /// Every line is plain.
    Plain,
    /// Every line carries a leading feature count.
    Featured,
}

/// Options controlling how a dataset is loaded.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ReadOptions {
    degree_as_tag: bool,
    layout: LayoutHint,
}

impl ReadOptions {
    /// Replaces node tags with node degrees.
    #[must_use]
    pub const fn with_degree_as_tag(mut self, degree_as_tag: bool) -> Self {
        self.degree_as_tag = degree_as_tag;
        self
    }

    /// Forces a node-line layout.
    #[must_use]
    pub const fn with_layout(mut self, layout: LayoutHint) -> Self {
        self.layout = layout;
        self
    }

    /// Returns whether degrees replace node tags.
    #[must_use]
    pub const fn degree_as_tag(&self) -> bool {
        self.degree_as_tag
    }

    /// Returns the layout hint.
    #[must_use]
    pub const fn layout(&self) -> LayoutHint {
        self.layout
    }
}

/// One graph loaded from a dataset file.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedGraph {
    node_count: usize,
    raw_label: i64,
    label: usize,
    node_tags: Vec<usize>,
    declared_features: Vec<Vec<i64>>,
    attributes: Option<Vec<Vec<f64>>>,
    neighbours: Vec<Vec<usize>>,
    edges: Vec<(usize, usize)>,
    max_degree: usize,
    features: Vec<Vec<f32>>,
}

impl LoadedGraph {
    /// Returns the declared node count.
    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.node_count
    }

    /// Returns the graph label as written in the file.
    #[must_use]
    pub const fn raw_label(&self) -> i64 {
        self.raw_label
    }

    /// Returns the dense index of the graph label.
    #[must_use]
    pub const fn label(&self) -> usize {
        self.label
    }

    /// Returns the per-node tags.
    ///
    /// These are dense tag indices, or node degrees when loaded with
    /// `degree_as_tag`.
    #[must_use]
    pub fn node_tags(&self) -> &[usize] {
        &self.node_tags
    }

    /// Returns the feature values declared on featured node lines.
    ///
    /// Plain lines contribute an empty list.
    #[must_use]
    pub fn declared_features(&self) -> &[Vec<i64>] {
        &self.declared_features
    }

    /// Returns trailing real-valued attributes, when any node line had them.
    #[must_use]
    pub fn attributes(&self) -> Option<&[Vec<f64>]> {
        self.attributes.as_deref()
    }

    /// Returns each node's neighbours in ascending order.
    #[must_use]
    pub fn neighbours(&self) -> &[Vec<usize>] {
        &self.neighbours
    }

    /// Returns every edge in both directions.
    ///
    /// The first half lists each undirected edge once as `(low, high)`; the
    /// second half repeats them reversed.
    #[must_use]
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Returns the largest node degree, zero for edgeless graphs.
    #[must_use]
    pub const fn max_degree(&self) -> usize {
        self.max_degree
    }

    /// Returns the one-hot feature matrix over the dataset's tag space.
    #[must_use]
    pub fn features(&self) -> &[Vec<f32>] {
        &self.features
    }
}

/// A dataset loaded from a file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dataset {
    graphs: Vec<LoadedGraph>,
    labels: Vec<i64>,
    tagset: Vec<usize>,
}

impl Dataset {
    /// Returns the loaded graphs in file order.
    #[must_use]
    pub fn graphs(&self) -> &[LoadedGraph] {
        &self.graphs
    }

    /// Returns the number of distinct graph labels.
    #[must_use]
    pub fn num_classes(&self) -> usize {
        self.labels.len()
    }

    /// Returns the raw graph label for each dense label index.
    #[must_use]
    pub fn labels(&self) -> &[i64] {
        &self.labels
    }

    /// Returns the width of the one-hot feature matrices.
    #[must_use]
    pub fn feature_width(&self) -> usize {
        self.tagset.len()
    }

    /// Consumes the dataset, returning its graphs.
    #[must_use]
    pub fn into_graphs(self) -> Vec<LoadedGraph> {
        self.graphs
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Layout {
    Plain,
    Featured,
}

#[derive(Debug, Default)]
struct ParsedNode {
    tag: i64,
    features: Vec<i64>,
    neighbours: Vec<usize>,
    attributes: Vec<f64>,
}

/// Assigns dense indices to values in first-seen order.
#[derive(Debug, Default)]
struct DenseIndex {
    index: BTreeMap<i64, usize>,
    values: Vec<i64>,
}

impl DenseIndex {
    fn get_or_insert(&mut self, value: i64) -> usize {
        *self.index.entry(value).or_insert_with(|| {
            self.values.push(value);
            self.values.len() - 1
        })
    }
}

struct LineCursor<R> {
    lines: Lines<R>,
    number: usize,
}

impl<R: BufRead> LineCursor<R> {
    const fn new(lines: Lines<R>) -> Self {
        Self { lines, number: 0 }
    }

    /// Returns the next non-blank line with its 1-based number.
    fn next_tokens(&mut self) -> Result<Option<(usize, Vec<String>)>, ReadError> {
        for line in self.lines.by_ref() {
            self.number += 1;
            let line = line?;
            let tokens: Vec<String> = line.split_whitespace().map(str::to_owned).collect();
            if !tokens.is_empty() {
                return Ok(Some((self.number, tokens)));
            }
        }
        Ok(None)
    }
}

/// Loads datasets written in the line-oriented format.
///
/// # Examples
/// ```
/// use colorlogic_core::{DatasetReader, ReadOptions};
///
/// let text = "1\n3 1\n1 0 1 1 1\n1 1 0 2 0 2\n1 0 0 1 1\n";
/// let dataset = DatasetReader::new(ReadOptions::default()).read(text.as_bytes())?;
/// let graph = &dataset.graphs()[0];
/// assert_eq!(graph.node_count(), 3);
/// assert_eq!(graph.neighbours(), &[vec![1], vec![0, 2], vec![1]]);
/// assert_eq!(graph.declared_features()[1], vec![1]);
/// assert_eq!(dataset.num_classes(), 1);
/// # Ok::<(), colorlogic_core::ReadError>(())
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DatasetReader {
    options: ReadOptions,
}

impl DatasetReader {
    /// Creates a reader with the given options.
    #[must_use]
    pub const fn new(options: ReadOptions) -> Self {
        Self { options }
    }

    /// Returns the reader options.
    #[must_use]
    pub const fn options(&self) -> ReadOptions {
        self.options
    }

    /// Opens and parses the dataset at `path`.
    ///
    /// # Errors
    /// Returns [`ReadError::Io`] when the file cannot be read and
    /// [`ReadError::Format`] when its content is malformed.
    #[instrument(name = "dataset.read", err, skip(self, path), fields(path = %path.display()))]
    pub fn read_path(&self, path: &Path) -> Result<Dataset, ReadError> {
        let file = File::open(path)?;
        self.read(BufReader::new(file))
    }

    /// Parses a dataset from `reader`.
    ///
    /// # Errors
    /// Returns [`ReadError::Io`] when the reader fails and
    /// [`ReadError::Format`] when the content is malformed.
    pub fn read<R: BufRead>(&self, reader: R) -> Result<Dataset, ReadError> {
        let mut cursor = LineCursor::new(reader.lines());
        let (line, header) = cursor.next_tokens()?.ok_or(FormatError::MissingHeader)?;
        let declared: usize = parse_header(line, &header, 1)?;

        let mut labels = DenseIndex::default();
        let mut tags = DenseIndex::default();
        let mut graphs = Vec::with_capacity(declared);
        let mut previous = None;
        for found in 0..declared {
            let missing = FormatError::MissingGraphs { declared, found };
            let (line, tokens) = cursor.next_tokens()?.ok_or_else(|| missing.clone())?;
            let node_count: usize = parse_header(line, &tokens, 2)?;
            let raw_label: i64 = parse_int(line, tokens.get(1).map_or("", String::as_str))?;

            let mut lines = Vec::with_capacity(node_count);
            for _ in 0..node_count {
                lines.push(cursor.next_tokens()?.ok_or_else(|| missing.clone())?);
            }
            let layout = match self.options.layout {
                LayoutHint::Auto => graph_layout(&lines, node_count, previous),
                LayoutHint::Plain => Some(Layout::Plain),
                LayoutHint::Featured => Some(Layout::Featured),
            };
            previous = layout.or(previous);
            let nodes = lines
                .iter()
                .enumerate()
                .map(|(node, (line, tokens))| parse_node(*line, node, tokens, node_count, layout))
                .collect::<Result<Vec<_>, _>>()?;

            graphs.push(assemble(
                node_count,
                raw_label,
                labels.get_or_insert(raw_label),
                nodes,
                &mut tags,
                self.options.degree_as_tag,
            ));
        }
        if let Some((line, _)) = cursor.next_tokens()? {
            return Err(FormatError::TrailingContent { line }.into());
        }

        let tagset = one_hot_encode(&mut graphs);
        debug!(
            graphs = graphs.len(),
            classes = labels.values.len(),
            tags = tagset.len(),
            "dataset loaded"
        );
        Ok(Dataset {
            graphs,
            labels: labels.values,
            tagset,
        })
    }
}

fn parse_header<T: FromStr>(
    line: usize,
    tokens: &[String],
    expected: usize,
) -> Result<T, FormatError> {
    if tokens.len() != expected {
        return Err(FormatError::HeaderTokenCount {
            line,
            expected,
            actual: tokens.len(),
        });
    }
    parse_int(line, tokens.first().map_or("", String::as_str))
}

fn parse_int<T: FromStr>(line: usize, token: &str) -> Result<T, FormatError> {
    token.parse().map_err(|_| FormatError::InvalidInteger {
        line,
        token: token.to_owned(),
    })
}

fn parse_ints<T: FromStr>(line: usize, tokens: &[String]) -> Result<Vec<T>, FormatError> {
    tokens.iter().map(|token| parse_int(line, token)).collect()
}

fn count_at(tokens: &[String], position: usize) -> Option<usize> {
    tokens.get(position).and_then(|token| token.parse().ok())
}

/// Token range holding the neighbour indices of a line read as `layout`.
///
/// Plain lines are `tag degree neighbour...` and may carry trailing
/// attributes; featured lines are `count feature... tag degree neighbour...`
/// and must end with their last neighbour.
fn neighbour_span(layout: Layout, tokens: &[String]) -> Option<(usize, usize)> {
    match layout {
        Layout::Plain => {
            let end = count_at(tokens, 1)?.checked_add(2)?;
            (tokens.len() >= end).then_some((2, end))
        }
        Layout::Featured => {
            let features = count_at(tokens, 0)?;
            let start = features.checked_add(3)?;
            let degree = count_at(tokens, features.checked_add(2)?)?;
            (tokens.len() == start.checked_add(degree)?).then_some((start, tokens.len()))
        }
    }
}

/// Whether `tokens` read as the neighbours of `node` form a plausible
/// adjacency list: in range, distinct, and never the node itself.
fn neighbours_valid(tokens: &[String], node: usize, node_count: usize) -> bool {
    let mut seen = BTreeSet::new();
    tokens.iter().all(|token| {
        token
            .parse::<usize>()
            .is_ok_and(|other| other < node_count && other != node && seen.insert(other))
    })
}

/// Whether every line of a graph block reads as `layout` with a plausible
/// adjacency list. `exact` forbids trailing attributes on plain lines.
fn block_fits(layout: Layout, exact: bool, lines: &[(usize, Vec<String>)], node_count: usize) -> bool {
    lines.iter().enumerate().all(|(node, (_, tokens))| {
        line_fits(layout, exact, node, tokens, node_count)
    })
}

fn line_fits(layout: Layout, exact: bool, node: usize, tokens: &[String], node_count: usize) -> bool {
    neighbour_span(layout, tokens).is_some_and(|(start, end)| {
        (!exact || end == tokens.len())
            && neighbours_valid(tokens.get(start..end).unwrap_or_default(), node, node_count)
    })
}

fn block_symmetric(layout: Layout, lines: &[(usize, Vec<String>)]) -> bool {
    let arcs: BTreeSet<(usize, usize)> = lines
        .iter()
        .enumerate()
        .flat_map(|(node, (_, tokens))| {
            let (start, end) = neighbour_span(layout, tokens).unwrap_or_default();
            tokens
                .get(start..end)
                .unwrap_or_default()
                .iter()
                .filter_map(|token| token.parse().ok())
                .map(move |other| (node, other))
        })
        .collect();
    arcs.iter().all(|&(a, b)| arcs.contains(&(b, a)))
}

/// Picks one layout for a whole graph block.
///
/// A layout fits only if no line lists itself or a neighbour twice. When
/// both layouts fit every line, the one yielding symmetric adjacency wins,
/// then the layout of the previous block, then plain. `None` means the
/// block mixes layouts or is malformed; lines are then classified one by one.
fn graph_layout(
    lines: &[(usize, Vec<String>)],
    node_count: usize,
    previous: Option<Layout>,
) -> Option<Layout> {
    let plain = block_fits(Layout::Plain, true, lines, node_count);
    let featured = block_fits(Layout::Featured, true, lines, node_count);
    match (plain, featured) {
        (true, true) => Some(
            match (
                block_symmetric(Layout::Plain, lines),
                block_symmetric(Layout::Featured, lines),
            ) {
                (true, false) => Layout::Plain,
                (false, true) => Layout::Featured,
                _ => previous.unwrap_or(Layout::Plain),
            },
        ),
        (true, false) => Some(Layout::Plain),
        (false, true) => Some(Layout::Featured),
        (false, false) => block_fits(Layout::Plain, false, lines, node_count).then_some(Layout::Plain),
    }
}

/// Classifies one line of a block whose lines disagree.
fn line_layout(node: usize, tokens: &[String], node_count: usize) -> Layout {
    let plain_exact = line_fits(Layout::Plain, true, node, tokens, node_count);
    if !plain_exact && neighbour_span(Layout::Featured, tokens).is_some() {
        Layout::Featured
    } else {
        Layout::Plain
    }
}

fn parse_node(
    line: usize,
    index: usize,
    tokens: &[String],
    node_count: usize,
    layout: Option<Layout>,
) -> Result<ParsedNode, FormatError> {
    let layout = layout.unwrap_or_else(|| line_layout(index, tokens, node_count));
    let (start, end) = neighbour_span(layout, tokens).ok_or(FormatError::NodeTokenCount {
        line,
        actual: tokens.len(),
    })?;
    let slice = |from: usize, to: usize| tokens.get(from..to).unwrap_or_default();
    let token_at = |position: usize| tokens.get(position).map_or("", String::as_str);
    let node = match layout {
        Layout::Plain => ParsedNode {
            tag: parse_int(line, token_at(0))?,
            features: Vec::new(),
            neighbours: parse_ints(line, slice(start, end))?,
            attributes: slice(end, tokens.len())
                .iter()
                .map(|token| {
                    token.parse().map_err(|_| FormatError::InvalidNumber {
                        line,
                        token: token.clone(),
                    })
                })
                .collect::<Result<_, _>>()?,
        },
        Layout::Featured => ParsedNode {
            tag: parse_int(line, token_at(start - 2))?,
            features: parse_ints(line, slice(1, start - 2))?,
            neighbours: parse_ints(line, slice(start, end))?,
            attributes: Vec::new(),
        },
    };
    if let Some(&neighbour) = node.neighbours.iter().find(|&&n| n >= node_count) {
        return Err(FormatError::NeighbourOutOfRange {
            line,
            neighbour,
            node_count,
        });
    }
    if node.neighbours.contains(&index) {
        return Err(FormatError::SelfLoop { line, node: index });
    }
    Ok(node)
}

fn assemble(
    node_count: usize,
    raw_label: i64,
    label: usize,
    nodes: Vec<ParsedNode>,
    tags: &mut DenseIndex,
    degree_as_tag: bool,
) -> LoadedGraph {
    let mut undirected = BTreeSet::new();
    for (node, parsed) in nodes.iter().enumerate() {
        for &other in &parsed.neighbours {
            undirected.insert((node.min(other), node.max(other)));
        }
    }
    let mut adjacency = vec![BTreeSet::new(); node_count];
    for &(a, b) in &undirected {
        if let Some(set) = adjacency.get_mut(a) {
            set.insert(b);
        }
        if let Some(set) = adjacency.get_mut(b) {
            set.insert(a);
        }
    }
    let neighbours: Vec<Vec<usize>> = adjacency
        .into_iter()
        .map(|set| set.into_iter().collect())
        .collect();
    let max_degree = neighbours.iter().map(Vec::len).max().unwrap_or(0);

    let mut edges: Vec<(usize, usize)> = undirected.into_iter().collect();
    let reversed: Vec<(usize, usize)> = edges.iter().map(|&(a, b)| (b, a)).collect();
    edges.extend(reversed);

    let has_attributes = nodes.iter().any(|node| !node.attributes.is_empty());
    let mut node_tags = Vec::with_capacity(node_count);
    let mut declared_features = Vec::with_capacity(node_count);
    let mut attributes = Vec::with_capacity(node_count);
    for parsed in nodes {
        node_tags.push(tags.get_or_insert(parsed.tag));
        declared_features.push(parsed.features);
        attributes.push(parsed.attributes);
    }
    if degree_as_tag {
        node_tags = neighbours.iter().map(Vec::len).collect();
    }

    LoadedGraph {
        node_count,
        raw_label,
        label,
        node_tags,
        declared_features,
        attributes: has_attributes.then_some(attributes),
        neighbours,
        edges,
        max_degree,
        features: Vec::new(),
    }
}

/// Fills every graph's one-hot matrix and returns the sorted tag space.
fn one_hot_encode(graphs: &mut [LoadedGraph]) -> Vec<usize> {
    let tagset: Vec<usize> = graphs
        .iter()
        .flat_map(|graph| graph.node_tags.iter().copied())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let position: BTreeMap<usize, usize> = tagset
        .iter()
        .enumerate()
        .map(|(index, &tag)| (tag, index))
        .collect();
    for graph in graphs {
        graph.features = graph
            .node_tags
            .iter()
            .map(|tag| {
                let mut row = vec![0.0_f32; tagset.len()];
                if let Some(cell) = position.get(tag).and_then(|&index| row.get_mut(index)) {
                    *cell = 1.0;
                }
                row
            })
            .collect();
    }
    tagset
}

//! Dataset configuration and its validation into an executable plan.
//!
//! [`DatasetConfig`] is the single configuration record. Nothing is generated
//! until [`DatasetConfig::validate`] has checked every parameter and produced
//! a [`DatasetPlan`].

use crate::{
    Result,
    coloring::{ColorAssigner, ColoringSpec},
    dataset::NodeLineMode,
    error::ConfigError,
    formula::{FormulaSet, GraphLabelRule, Tagger},
    structure::{StructureAssigner, StructureSpec},
    topology::{GeneratorSpec, NodeRange, TopologyBuilder},
};

const DEFAULT_NUMBER_COLORS: usize = 10;

#[cfg(feature = "serde")]
const fn default_number_colors() -> usize {
    DEFAULT_NUMBER_COLORS
}

/// Configures a dataset run.
///
/// # Examples
/// ```
/// use colorlogic_core::{
///     Color, DatasetConfig, FormulaSet, FormulaSpec, GeneratorSpec, NodeRange,
/// };
///
/// let formulas = FormulaSet::default().with_definition(
///     "formula1",
///     FormulaSpec::Formula1 {
///         anchor: Color::RED,
///         target: Color::GREEN,
///         n_green: 1,
///         radius: 1,
///     },
/// );
/// let plan = DatasetConfig::new(
///     8,
///     NodeRange::new(4, 6)?,
///     GeneratorSpec::Cycle { pair: true },
///     formulas,
///     "formula1",
/// )
/// .with_seed(42)
/// .with_number_colors(2)
/// .validate()?;
/// assert_eq!(plan.number_graphs(), 8);
/// assert_eq!(plan.seed(), Some(42));
/// # Ok::<(), colorlogic_core::ConfigError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DatasetConfig {
    #[cfg_attr(feature = "serde", serde(default))]
    seed: Option<u64>,
    number_graphs: usize,
    n_nodes: NodeRange,
    #[cfg_attr(feature = "serde", serde(default = "default_number_colors"))]
    number_colors: usize,
    generator: GeneratorSpec,
    #[cfg_attr(feature = "serde", serde(default))]
    structure: StructureSpec,
    #[cfg_attr(feature = "serde", serde(default))]
    coloring: ColoringSpec,
    formulas: FormulaSet,
    formula: String,
    #[cfg_attr(feature = "serde", serde(default))]
    label_rule: GraphLabelRule,
    #[cfg_attr(feature = "serde", serde(default))]
    node_lines: NodeLineMode,
}

impl DatasetConfig {
    /// Creates a configuration with default structure, colouring, label rule,
    /// node-line mode, and a palette of ten colours.
    #[must_use]
    pub fn new(
        number_graphs: usize,
        n_nodes: NodeRange,
        generator: GeneratorSpec,
        formulas: FormulaSet,
        formula: impl Into<String>,
    ) -> Self {
        Self {
            seed: None,
            number_graphs,
            n_nodes,
            number_colors: DEFAULT_NUMBER_COLORS,
            generator,
            structure: StructureSpec::default(),
            coloring: ColoringSpec::default(),
            formulas,
            formula: formula.into(),
            label_rule: GraphLabelRule::default(),
            node_lines: NodeLineMode::default(),
        }
    }

    /// Fixes the base seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Overrides the number of graphs.
    #[must_use]
    pub const fn with_number_graphs(mut self, number_graphs: usize) -> Self {
        self.number_graphs = number_graphs;
        self
    }

    /// Overrides the palette size.
    #[must_use]
    pub const fn with_number_colors(mut self, number_colors: usize) -> Self {
        self.number_colors = number_colors;
        self
    }

    /// Sets the structure family.
    #[must_use]
    pub fn with_structure(mut self, structure: StructureSpec) -> Self {
        self.structure = structure;
        self
    }

    /// Sets the colouring policy.
    #[must_use]
    pub fn with_coloring(mut self, coloring: ColoringSpec) -> Self {
        self.coloring = coloring;
        self
    }

    /// Sets the graph label rule.
    #[must_use]
    pub const fn with_label_rule(mut self, label_rule: GraphLabelRule) -> Self {
        self.label_rule = label_rule;
        self
    }

    /// Sets the node-line mode of the output.
    #[must_use]
    pub fn with_node_lines(mut self, node_lines: NodeLineMode) -> Self {
        self.node_lines = node_lines;
        self
    }

    /// Returns the base seed, if fixed.
    #[must_use]
    pub const fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Returns the number of graphs.
    #[must_use]
    pub const fn number_graphs(&self) -> usize {
        self.number_graphs
    }

    /// Returns the node-count bounds.
    #[must_use]
    pub const fn n_nodes(&self) -> NodeRange {
        self.n_nodes
    }

    /// Returns the palette size.
    #[must_use]
    pub const fn number_colors(&self) -> usize {
        self.number_colors
    }

    /// Returns the topology generator.
    #[must_use]
    pub const fn generator(&self) -> &GeneratorSpec {
        &self.generator
    }

    /// Returns the name of the root formula.
    #[must_use]
    pub fn formula(&self) -> &str {
        &self.formula
    }

    /// Checks every parameter and assembles the per-graph pipeline.
    ///
    /// # Errors
    /// Returns the first [`ConfigError`] found: an empty palette, a generator
    /// parameter that cannot be honoured, a structure, colouring, or formula
    /// colour outside the palette, malformed split proportions or policies,
    /// exact counts exceeding the smallest graph, or an unknown or recursive
    /// formula name.
    pub fn validate(&self) -> Result<DatasetPlan> {
        if self.number_colors == 0 {
            return Err(ConfigError::ZeroColors);
        }
        let topology = TopologyBuilder::new(self.generator.clone(), self.n_nodes)?;
        let structure = StructureAssigner::new(
            self.structure.clone(),
            self.coloring.pair_colors,
            self.number_colors,
            self.n_nodes,
        )?;
        let colors = ColorAssigner::new(
            &self.coloring,
            self.number_colors,
            self.n_nodes,
            self.number_graphs,
        )?;
        let formula = self.formulas.resolve(&self.formula, self.number_colors)?;
        Ok(DatasetPlan {
            seed: self.seed,
            number_graphs: self.number_graphs,
            topology,
            structure,
            colors,
            tagger: Tagger::new(formula, self.label_rule),
            node_lines: self.node_lines.clone(),
            formula_name: self.formula.clone(),
        })
    }
}

/// A validated configuration, ready to generate graphs.
#[derive(Clone, Debug, PartialEq)]
pub struct DatasetPlan {
    seed: Option<u64>,
    number_graphs: usize,
    topology: TopologyBuilder,
    structure: StructureAssigner,
    colors: ColorAssigner,
    tagger: Tagger,
    node_lines: NodeLineMode,
    formula_name: String,
}

impl DatasetPlan {
    /// Returns the configured base seed, if any.
    #[must_use]
    pub const fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Returns the number of graphs to generate.
    #[must_use]
    pub const fn number_graphs(&self) -> usize {
        self.number_graphs
    }

    /// Returns the topology stage.
    #[must_use]
    pub const fn topology(&self) -> &TopologyBuilder {
        &self.topology
    }

    /// Returns the structure stage.
    #[must_use]
    pub const fn structure(&self) -> &StructureAssigner {
        &self.structure
    }

    /// Returns the colouring stage.
    #[must_use]
    pub const fn colors(&self) -> &ColorAssigner {
        &self.colors
    }

    /// Returns the tagging stage.
    #[must_use]
    pub const fn tagger(&self) -> &Tagger {
        &self.tagger
    }

    /// Returns the node-line mode of the output.
    #[must_use]
    pub const fn node_lines(&self) -> &NodeLineMode {
        &self.node_lines
    }

    /// Returns the name of the root formula.
    #[must_use]
    pub fn formula_name(&self) -> &str {
        &self.formula_name
    }
}

//! Named formula definitions and their resolution into [`Formula`] trees.

use std::collections::BTreeMap;

use crate::color::Color;
use crate::error::ConfigError;

use super::{Formula, PropertySearch};
#[cfg(feature = "serde")]
use super::default_radius;

/// One named formula definition as written in a configuration file.
///
/// `formula4` refers to its nested sub-formula by name; the reference is
/// resolved by [`FormulaSet::resolve`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum FormulaSpec {
    /// Anchor colour with enough target-coloured neighbours.
    Formula1 {
        /// Colour the node itself must have.
        #[cfg_attr(feature = "serde", serde(default = "red"))]
        anchor: Color,
        /// Colour searched in the neighbourhood.
        #[cfg_attr(feature = "serde", serde(default = "green"))]
        target: Color,
        /// Minimum number of target-coloured neighbours.
        #[cfg_attr(feature = "serde", serde(default = "one"))]
        n_green: usize,
        /// Hop radius of the neighbourhood.
        #[cfg_attr(feature = "serde", serde(default = "default_radius"))]
        radius: usize,
    },
    /// Anchor colour combined with local and global predicates.
    Formula3 {
        /// Colour the node itself must have.
        #[cfg_attr(feature = "serde", serde(default = "red"))]
        anchor: Color,
        /// The predicates and their combination.
        #[cfg_attr(feature = "serde", serde(default))]
        search: PropertySearch,
    },
    /// Anchor colour with enough non-neighbours satisfying a nested formula.
    Formula4 {
        /// Colour the node itself must have.
        #[cfg_attr(feature = "serde", serde(default = "red"))]
        anchor: Color,
        /// Name of the nested definition.
        nested: String,
        /// Minimum number of satisfying non-neighbours.
        #[cfg_attr(feature = "serde", serde(default = "one"))]
        nested_constraint: usize,
        /// Whether the node itself may count towards the constraint.
        #[cfg_attr(feature = "serde", serde(default))]
        self_satisfy: bool,
    },
    /// Local and global predicates without an anchor colour.
    ColorNoConnectedColor(PropertySearch),
}

#[cfg(feature = "serde")]
const fn red() -> Color {
    Color::RED
}

#[cfg(feature = "serde")]
const fn green() -> Color {
    Color::GREEN
}

#[cfg(feature = "serde")]
const fn one() -> usize {
    1
}

/// A collection of named formula definitions.
///
/// # Examples
/// ```
/// use colorlogic_core::{FormulaSet, FormulaSpec, PropertySearch};
///
/// let set = FormulaSet::default()
///     .with_definition("inner", FormulaSpec::ColorNoConnectedColor(PropertySearch::default()))
///     .with_definition(
///         "outer",
///         FormulaSpec::Formula4 {
///             anchor: colorlogic_core::Color::RED,
///             nested: "inner".into(),
///             nested_constraint: 2,
///             self_satisfy: false,
///         },
///     );
/// let formula = set.resolve("outer", 3).expect("definitions are acyclic");
/// assert_eq!(formula.depth(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct FormulaSet {
    definitions: BTreeMap<String, FormulaSpec>,
}

impl FormulaSet {
    /// Wraps existing definitions.
    #[must_use]
    pub const fn new(definitions: BTreeMap<String, FormulaSpec>) -> Self {
        Self { definitions }
    }

    /// Adds or replaces the definition called `name`.
    #[must_use]
    pub fn with_definition(mut self, name: impl Into<String>, spec: FormulaSpec) -> Self {
        self.definitions.insert(name.into(), spec);
        self
    }

    /// Returns the definition called `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FormulaSpec> {
        self.definitions.get(name)
    }

    /// Iterates definition names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    /// Resolves `root` into a formula tree and validates it.
    ///
    /// # Errors
    /// Returns [`ConfigError::UnknownFormula`] when a name has no definition,
    /// [`ConfigError::RecursiveFormula`] when nesting refers back to a
    /// definition already on the chain, and any palette violation reported by
    /// [`Formula::validate`].
    pub fn resolve(&self, root: &str, number_colors: usize) -> Result<Formula, ConfigError> {
        let mut chain = Vec::new();
        let formula = self.resolve_inner(root, &mut chain)?;
        formula.validate(number_colors)?;
        Ok(formula)
    }

    fn resolve_inner<'a>(
        &'a self,
        name: &'a str,
        chain: &mut Vec<&'a str>,
    ) -> Result<Formula, ConfigError> {
        if chain.contains(&name) {
            let mut names = chain.clone();
            names.push(name);
            return Err(ConfigError::RecursiveFormula {
                chain: names.join(" -> "),
            });
        }
        let spec = self
            .definitions
            .get(name)
            .ok_or_else(|| ConfigError::UnknownFormula { name: name.into() })?;

        let formula = match spec {
            FormulaSpec::Formula1 {
                anchor,
                target,
                n_green,
                radius,
            } => Formula::Formula1 {
                anchor: *anchor,
                target: *target,
                min_count: *n_green,
                radius: *radius,
            },
            FormulaSpec::Formula3 { anchor, search } => Formula::Formula3 {
                anchor: *anchor,
                search: search.clone(),
            },
            FormulaSpec::Formula4 {
                anchor,
                nested,
                nested_constraint,
                self_satisfy,
            } => {
                chain.push(name);
                let inner = self.resolve_inner(nested, chain)?;
                chain.pop();
                Formula::Formula4 {
                    anchor: *anchor,
                    nested: Box::new(inner),
                    nested_constraint: *nested_constraint,
                    self_satisfy: *self_satisfy,
                }
            }
            FormulaSpec::ColorNoConnectedColor(search) => Formula::ColorNoConnectedColor {
                search: search.clone(),
            },
        };
        Ok(formula)
    }
}

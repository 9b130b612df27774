//! Neighbourhood-logic formulas and their evaluation.
//!
//! A [`Formula`] is a closed union of the supported formula families. Each
//! variant carries only its own parameters; `formula4` owns its nested
//! sub-formula, so a resolved formula is a finite tree. Formulas are built
//! from named [`FormulaSpec`] definitions by [`FormulaSet::resolve`], which
//! rejects unknown names and cyclic nesting.
//!
//! Evaluation is a pure function of the coloured graph: the same graph and
//! formula always yield the same tags.

mod eval;
mod label;
mod spec;

use std::collections::BTreeMap;

use crate::color::{Color, check_color};
use crate::error::ConfigError;

pub use self::eval::Tagger;
pub use self::label::GraphLabelRule;
pub use self::spec::{FormulaSet, FormulaSpec};

/// How local and global predicates are combined.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Condition {
    /// Every predicate must hold; vacuously true without predicates.
    #[default]
    And,
    /// At least one predicate must hold; false without predicates.
    Or,
}

/// Local and global colour-existence predicates shared by `formula3` and
/// `color_no_connected_color`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PropertySearch {
    /// Colours that must appear within `radius` hops of the node.
    #[cfg_attr(feature = "serde", serde(default))]
    pub local_prop: Vec<Color>,
    /// Colours that must appear anywhere in the graph.
    #[cfg_attr(feature = "serde", serde(default))]
    pub global_prop: Vec<Color>,
    /// Minimum graph-wide count per global colour; missing entries mean one.
    #[cfg_attr(feature = "serde", serde(default))]
    pub global_constraint: BTreeMap<Color, usize>,
    /// Combination applied across all predicates.
    #[cfg_attr(feature = "serde", serde(default))]
    pub condition: Condition,
    /// Hop radius of the local neighbourhood.
    #[cfg_attr(feature = "serde", serde(default = "default_radius"))]
    pub radius: usize,
}

impl Default for PropertySearch {
    fn default() -> Self {
        Self {
            local_prop: Vec::new(),
            global_prop: Vec::new(),
            global_constraint: BTreeMap::new(),
            condition: Condition::And,
            radius: default_radius(),
        }
    }
}

pub(crate) const fn default_radius() -> usize {
    1
}

impl PropertySearch {
    /// Returns the minimum graph-wide count required for `color`.
    #[must_use]
    pub fn required_count(&self, color: Color) -> usize {
        self.global_constraint.get(&color).copied().unwrap_or(1)
    }

    fn validate(&self, number_colors: usize) -> Result<(), ConfigError> {
        for &color in &self.local_prop {
            check_color(color, number_colors, "local_prop")?;
        }
        for &color in self.global_prop.iter().chain(self.global_constraint.keys()) {
            check_color(color, number_colors, "global_prop")?;
        }
        validate_radius(self.radius)
    }
}

fn validate_radius(radius: usize) -> Result<(), ConfigError> {
    if radius == 0 {
        return Err(ConfigError::InvalidParameter {
            parameter: "radius",
            reason: "neighbourhood radius must be at least 1".into(),
        });
    }
    Ok(())
}

/// A resolved formula, ready for evaluation.
#[derive(Clone, Debug, PartialEq)]
pub enum Formula {
    /// `anchor(x)` and at least `min_count` nodes within `radius` hops have
    /// colour `target`.
    Formula1 {
        /// Colour the node itself must have.
        anchor: Color,
        /// Colour searched in the neighbourhood.
        target: Color,
        /// Minimum number of `target` nodes; zero is vacuously satisfied.
        min_count: usize,
        /// Hop radius of the neighbourhood.
        radius: usize,
    },
    /// `anchor(x)` and a combination of local and global predicates.
    Formula3 {
        /// Colour the node itself must have.
        anchor: Color,
        /// The predicates and their combination.
        search: PropertySearch,
    },
    /// `anchor(x)` and at least `nested_constraint` non-neighbours of `x`
    /// satisfy `nested`.
    Formula4 {
        /// Colour the node itself must have.
        anchor: Color,
        /// Sub-formula evaluated independently on every node.
        nested: Box<Formula>,
        /// Minimum number of satisfying non-neighbours.
        nested_constraint: usize,
        /// Whether `x` itself may count towards the constraint.
        self_satisfy: bool,
    },
    /// Local and global predicates without an anchor colour.
    ColorNoConnectedColor {
        /// The predicates and their combination.
        search: PropertySearch,
    },
}

impl Formula {
    /// Builds a `formula1` with the conventional RED anchor and GREEN target.
    ///
    /// # Examples
    /// ```
    /// use colorlogic_core::{Color, Formula};
    ///
    /// let formula = Formula::red_exists_green(1);
    /// assert_eq!(formula.anchor(), Some(Color::RED));
    /// ```
    #[must_use]
    pub const fn red_exists_green(min_count: usize) -> Self {
        Self::Formula1 {
            anchor: Color::RED,
            target: Color::GREEN,
            min_count,
            radius: 1,
        }
    }

    /// Returns the colour a node must have to be tagged, if the family has one.
    #[must_use]
    pub const fn anchor(&self) -> Option<Color> {
        match self {
            Self::Formula1 { anchor, .. }
            | Self::Formula3 { anchor, .. }
            | Self::Formula4 { anchor, .. } => Some(*anchor),
            Self::ColorNoConnectedColor { .. } => None,
        }
    }

    /// Returns the family name used in configuration files.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Formula1 { .. } => "formula1",
            Self::Formula3 { .. } => "formula3",
            Self::Formula4 { .. } => "formula4",
            Self::ColorNoConnectedColor { .. } => "color_no_connected_color",
        }
    }

    /// Returns the nesting depth; non-nesting families have depth one.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Formula4 { nested, .. } => nested.depth().saturating_add(1),
            _ => 1,
        }
    }

    /// Checks every colour and radius against the palette.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when a colour is outside `[0, number_colors)`
    /// or a radius is zero.
    pub fn validate(&self, number_colors: usize) -> Result<(), ConfigError> {
        match self {
            Self::Formula1 {
                anchor,
                target,
                radius,
                ..
            } => {
                check_color(*anchor, number_colors, "anchor")?;
                check_color(*target, number_colors, "target")?;
                validate_radius(*radius)
            }
            Self::Formula3 { anchor, search } => {
                check_color(*anchor, number_colors, "anchor")?;
                search.validate(number_colors)
            }
            Self::Formula4 { anchor, nested, .. } => {
                check_color(*anchor, number_colors, "anchor")?;
                nested.validate(number_colors)
            }
            Self::ColorNoConnectedColor { search } => search.validate(number_colors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_counts_nested_levels() {
        let inner = Formula::red_exists_green(1);
        let outer = Formula::Formula4 {
            anchor: Color::RED,
            nested: Box::new(Formula::Formula4 {
                anchor: Color::GREEN,
                nested: Box::new(inner),
                nested_constraint: 1,
                self_satisfy: false,
            }),
            nested_constraint: 2,
            self_satisfy: false,
        };
        assert_eq!(outer.depth(), 3);
        assert_eq!(outer.kind(), "formula4");
    }

    #[test]
    fn validation_reaches_nested_formulas() {
        let formula = Formula::Formula4 {
            anchor: Color::RED,
            nested: Box::new(Formula::ColorNoConnectedColor {
                search: PropertySearch {
                    local_prop: vec![Color::new(7)],
                    ..PropertySearch::default()
                },
            }),
            nested_constraint: 1,
            self_satisfy: false,
        };
        let err = formula.validate(3).expect_err("colour 7 is outside the palette");
        assert!(matches!(
            err,
            ConfigError::ColorOutOfRange {
                context: "local_prop",
                ..
            }
        ));
    }

    #[test]
    fn missing_global_constraints_default_to_one() {
        let search = PropertySearch {
            global_constraint: BTreeMap::from([(Color::RED, 4)]),
            ..PropertySearch::default()
        };
        assert_eq!(search.required_count(Color::RED), 4);
        assert_eq!(search.required_count(Color::GREEN), 1);
    }
}

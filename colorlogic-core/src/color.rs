//! Categorical node colours.

use std::fmt;

use crate::error::ConfigError;

/// A categorical colour drawn from a palette `[0, number_colors)`.
///
/// # Examples
/// ```
/// use colorlogic_core::Color;
///
/// assert_eq!(Color::RED.get(), 0);
/// assert_eq!(Color::GREEN, Color::new(1));
/// assert_eq!(Color::new(4).to_string(), "4");
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Color(usize);

impl Color {
    /// Conventional anchor colour.
    pub const RED: Self = Self(0);
    /// Conventional neighbour colour searched by formula1.
    pub const GREEN: Self = Self(1);

    /// Wraps a raw palette index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the raw palette index.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub(crate) const fn check_color(
    color: Color,
    number_colors: usize,
    context: &'static str,
) -> Result<(), ConfigError> {
    if color.0 < number_colors {
        Ok(())
    } else {
        Err(ConfigError::ColorOutOfRange {
            color,
            number_colors,
            context,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_color_rejects_colours_outside_palette() {
        assert!(check_color(Color::new(2), 3, "test").is_ok());
        let err = check_color(Color::new(3), 3, "test").expect_err("3 is outside [0, 3)");
        assert!(matches!(
            err,
            ConfigError::ColorOutOfRange {
                number_colors: 3,
                ..
            }
        ));
    }
}

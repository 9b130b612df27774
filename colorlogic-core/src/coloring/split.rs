//! Assignment of graph indices to dataset splits.

use crate::error::ConfigError;

const PROPORTION_TOLERANCE: f64 = 1e-6;

/// Maps each graph index to the split it belongs to.
///
/// Split `s` receives `round(proportion[s] * number_graphs)` graphs, taken in
/// index order; the last split absorbs any rounding remainder.
///
/// # Examples
/// ```
/// use colorlogic_core::SplitSchedule;
///
/// let schedule = SplitSchedule::new(&[0.2, 0.8], 10).expect("proportions sum to one");
/// assert_eq!(schedule.counts(), vec![2, 8]);
/// assert_eq!(schedule.split_of(1), 0);
/// assert_eq!(schedule.split_of(2), 1);
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SplitSchedule {
    ends: Vec<usize>,
}

impl SplitSchedule {
    /// Builds the schedule for `number_graphs` graphs.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidSplit`] when `proportions` is empty,
    /// holds a negative or non-finite entry, or does not sum to one.
    pub fn new(proportions: &[f64], number_graphs: usize) -> Result<Self, ConfigError> {
        validate_proportions(proportions)?;
        let mut ends = Vec::with_capacity(proportions.len());
        let mut start = 0_usize;
        let last = proportions.len() - 1;
        for (split, &proportion) in proportions.iter().enumerate() {
            let end = if split == last {
                number_graphs
            } else {
                start
                    .saturating_add(share(proportion, number_graphs))
                    .min(number_graphs)
            };
            ends.push(end);
            start = end;
        }
        Ok(Self { ends })
    }

    /// Returns the number of splits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ends.len()
    }

    /// Returns `true` when the schedule holds no splits.
    ///
    /// Validated schedules always hold at least one.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ends.is_empty()
    }

    /// Returns the split that graph `index` belongs to.
    ///
    /// Indices past the configured graph count fall into the last split.
    #[must_use]
    pub fn split_of(&self, index: usize) -> usize {
        self.ends
            .partition_point(|&end| end <= index)
            .min(self.ends.len().saturating_sub(1))
    }

    /// Returns the number of graphs in each split.
    #[must_use]
    pub fn counts(&self) -> Vec<usize> {
        let mut start = 0;
        self.ends
            .iter()
            .map(|&end| {
                let count = end - start;
                start = end;
                count
            })
            .collect()
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "split proportions are validated as a floating-point sum"
)]
fn validate_proportions(proportions: &[f64]) -> Result<(), ConfigError> {
    if proportions.is_empty() {
        return Err(ConfigError::InvalidSplit {
            reason: "at least one split is required".into(),
        });
    }
    if let Some(bad) = proportions
        .iter()
        .find(|p| !p.is_finite() || p.is_sign_negative())
    {
        return Err(ConfigError::InvalidSplit {
            reason: format!("proportion {bad} is not a non-negative number"),
        });
    }
    let total: f64 = proportions.iter().sum();
    if (total - 1.0).abs() > PROPORTION_TOLERANCE {
        return Err(ConfigError::InvalidSplit {
            reason: format!("proportions sum to {total}, expected 1"),
        });
    }
    Ok(())
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "graph counts per split are rounded from validated proportions"
)]
fn share(proportion: f64, number_graphs: usize) -> usize {
    (proportion * number_graphs as f64).round() as usize
}

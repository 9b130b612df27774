//! Per-graph bookkeeping of exact colour counts still to be placed.

use std::collections::BTreeMap;

use crate::color::Color;
use crate::error::GenerationError;

/// Exact colour counts outstanding for one graph.
///
/// A counter is created for each graph from its split's quotas, consumed by
/// the assignment, and dropped afterwards.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct QuotaCounter {
    remaining: BTreeMap<Color, usize>,
}

impl QuotaCounter {
    pub(crate) fn new(quotas: &BTreeMap<Color, usize>) -> Self {
        Self {
            remaining: quotas.clone(),
        }
    }

    /// Charges pinned colours against their quotas.
    ///
    /// Colours without a quota are ignored.
    pub(crate) fn claim_pins<'a>(
        &mut self,
        pins: impl IntoIterator<Item = &'a Color>,
    ) -> Result<(), GenerationError> {
        let mut pinned: BTreeMap<Color, usize> = BTreeMap::new();
        for &color in pins {
            *pinned.entry(color).or_default() += 1;
        }
        for (color, count) in pinned {
            let Some(remaining) = self.remaining.get_mut(&color) else {
                continue;
            };
            if count > *remaining {
                return Err(GenerationError::PinnedExceedsQuota {
                    color,
                    pinned: count,
                    quota: *remaining,
                });
            }
            *remaining -= count;
        }
        Ok(())
    }

    /// Removes and returns the outstanding count for `color`.
    ///
    /// The colour keeps its quota status; it simply has nothing left to place.
    pub(crate) fn take(&mut self, color: Color) -> usize {
        self.remaining
            .get_mut(&color)
            .map_or(0, std::mem::take)
    }

    /// Consumes the counter, yielding outstanding counts in colour order.
    pub(crate) fn into_outstanding(self) -> impl Iterator<Item = (Color, usize)> {
        self.remaining.into_iter().filter(|&(_, count)| count > 0)
    }
}

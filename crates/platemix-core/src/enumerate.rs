//! Combinatorial enumeration of fixed-total mixtures.
//!
//! A [`MixtureGrid`] describes every way of splitting a total volume between
//! three reagents in whole multiples of a step. With a total of 100 and a step
//! of 10 there are 11 levels per reagent and 66 mixtures.
//!
//! Mixtures are produced in a fixed order: the first reagent's level is the
//! outer loop, the second reagent's level the inner loop, and the third
//! reagent takes the remainder.
//!
//! # Example
//!
//! ```
//! use platemix_core::{MixtureGrid, ReagentSet, Volume};
//!
//! let grid = MixtureGrid::new(Volume::new(100), Volume::new(10), ReagentSet::default()).unwrap();
//! let mixtures = grid.enumerate();
//!
//! assert_eq!(mixtures.len(), 66);
//! assert_eq!(grid.mixture_count(), 66);
//! assert_eq!(mixtures[0].to_string(), "{Reagent_A: 0, Reagent_B: 0, Reagent_C: 100}");
//! assert_eq!(mixtures[65].to_string(), "{Reagent_A: 100, Reagent_B: 0, Reagent_C: 0}");
//! ```

use tracing::trace;

use crate::domain::{Mixture, ReagentSet, Volume};
use crate::error::{PlatemixError, Result};

/// Parameters of the mixture enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixtureGrid {
    total: Volume,
    step: Volume,
    reagents: ReagentSet,
    count: usize,
}

impl MixtureGrid {
    /// Creates an enumeration grid.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the step or total is zero, if the
    /// total is not a whole multiple of the step, or if the number of
    /// mixtures does not fit in a `usize`.
    pub fn new(total: Volume, step: Volume, reagents: ReagentSet) -> Result<Self> {
        if step.is_zero() {
            return Err(PlatemixError::Config(
                "mixture step must be greater than zero".to_string(),
            ));
        }
        if total.is_zero() {
            return Err(PlatemixError::Config(
                "mixture total volume must be greater than zero".to_string(),
            ));
        }
        if total.microliters() % step.microliters() != 0 {
            return Err(PlatemixError::Config(format!(
                "total volume {} is not divisible by step {}",
                total, step
            )));
        }
        let levels = total.microliters() / step.microliters();
        let count = triangular(levels).ok_or_else(|| {
            PlatemixError::Config(format!(
                "mixture grid with {} levels per reagent is too large",
                levels
            ))
        })?;
        Ok(MixtureGrid {
            total,
            step,
            reagents,
            count,
        })
    }

    pub fn total(&self) -> Volume {
        self.total
    }

    pub fn step(&self) -> Volume {
        self.step
    }

    pub fn reagents(&self) -> &ReagentSet {
        &self.reagents
    }

    /// Number of steps that make up the total.
    pub fn levels(&self) -> u32 {
        self.total.microliters() / self.step.microliters()
    }

    /// Number of mixtures the grid produces, without enumerating them.
    pub fn mixture_count(&self) -> usize {
        self.count
    }

    /// Lazily yields the mixtures in enumeration order.
    pub fn iter(&self) -> MixtureIter<'_> {
        MixtureIter {
            grid: self,
            first: 0,
            second: 0,
        }
    }

    /// Collects every mixture in enumeration order.
    pub fn enumerate(&self) -> Vec<Mixture> {
        self.iter().collect()
    }
}

// (n + 1)(n + 2) / 2, or None on overflow.
pub(crate) fn triangular(levels: u32) -> Option<usize> {
    let n = usize::try_from(levels).ok()?;
    let a = n.checked_add(1)?;
    let b = n.checked_add(2)?;
    // One of two consecutive integers is even.
    if a % 2 == 0 {
        (a / 2).checked_mul(b)
    } else {
        a.checked_mul(b / 2)
    }
}

/// Iterator over the mixtures of a [`MixtureGrid`].
#[derive(Debug, Clone)]
pub struct MixtureIter<'a> {
    grid: &'a MixtureGrid,
    first: u32,
    second: u32,
}

impl Iterator for MixtureIter<'_> {
    type Item = Mixture;

    fn next(&mut self) -> Option<Mixture> {
        let levels = self.grid.levels();
        if self.first > levels {
            return None;
        }

        let third = levels - self.first - self.second;
        let step = self.grid.step.microliters();
        let mixture = Mixture::new(
            &self.grid.reagents,
            [
                Volume::new(self.first * step),
                Volume::new(self.second * step),
                Volume::new(third * step),
            ],
        );

        if self.second == levels - self.first {
            self.first += 1;
            self.second = 0;
        } else {
            self.second += 1;
        }

        trace!(event = "mixture_generated", mixture = %mixture);
        Some(mixture)
    }
}

/// Enumerates every three-reagent mixture summing to `total` in steps of `step`.
///
/// Convenience wrapper around [`MixtureGrid`].
pub fn enumerate_mixtures(
    total: Volume,
    step: Volume,
    reagents: ReagentSet,
) -> Result<Vec<Mixture>> {
    Ok(MixtureGrid::new(total, step, reagents)?.enumerate())
}

//! Domain model for mixture preparation.
//!
//! - [`Volume`] - A non-negative fluid quantity in microliters
//! - [`Reagent`] / [`ReagentSet`] - Named fluids taking part in a mixture
//! - [`Mixture`] - Three reagent volumes summing to a fixed total
//! - [`PlateLayout`] / [`WellAllocator`] - Destination plate addressing

mod mixture;
mod plate;
mod reagent;
mod volume;

pub use mixture::{Component, Mixture};
pub use plate::{PlateLayout, WellAllocator, WellName, WellOrder};
pub use reagent::{Reagent, ReagentSet};
pub use volume::{Volume, VolumeRange};

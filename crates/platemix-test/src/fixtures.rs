//! Mixture and instrument-range fixtures.
//!
//! # Example
//!
//! ```
//! use platemix_test::fixtures::{low_high_ranges, mixture};
//!
//! let m = mixture(60, 40, 0);
//! assert_eq!(m.to_string(), "{Reagent_A: 60, Reagent_B: 40, Reagent_C: 0}");
//! assert_eq!(low_high_ranges().len(), 2);
//! ```

use platemix_core::{Mixture, ReagentSet, Volume, VolumeRange};

/// Index of the low-volume instrument in [`low_high_ranges`].
pub const LOW_VOLUME: usize = 0;

/// Index of the high-volume instrument in [`low_high_ranges`].
pub const HIGH_VOLUME: usize = 1;

/// Builds a mixture of the default reagents A, B and C.
pub fn mixture(a: u32, b: u32, c: u32) -> Mixture {
    Mixture::new(
        &ReagentSet::default(),
        [Volume::new(a), Volume::new(b), Volume::new(c)],
    )
}

/// The reference split: `(0, 50]` low volume, `(50, inf)` high volume.
pub fn low_high_ranges() -> [VolumeRange; 2] {
    [
        VolumeRange::new(Volume::ZERO, Some(Volume::new(50))),
        VolumeRange::new(Volume::new(50), None),
    ]
}

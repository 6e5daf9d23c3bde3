use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use crate::error::{PlatemixError, Result};

/// A fluid quantity in microliters.
///
/// Volumes are whole numbers; every mixture component is a multiple of the
/// enumeration step, so fractional volumes never arise.
///
/// # Example
///
/// ```
/// use platemix_core::Volume;
///
/// let a = Volume::new(40);
/// let b = Volume::new(60);
/// assert_eq!(a + b, Volume::new(100));
/// assert!(Volume::ZERO.is_zero());
/// assert_eq!(format!("{}", a), "40");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Volume(u32);

impl Volume {
    /// The empty volume.
    pub const ZERO: Volume = Volume(0);

    /// Creates a volume of `microliters`.
    pub const fn new(microliters: u32) -> Self {
        Volume(microliters)
    }

    /// Returns the volume in microliters.
    pub const fn microliters(self) -> u32 {
        self.0
    }

    /// Returns true for a zero volume.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for Volume {
    fn from(microliters: u32) -> Self {
        Volume(microliters)
    }
}

impl Add for Volume {
    type Output = Volume;

    fn add(self, rhs: Volume) -> Volume {
        Volume(self.0 + rhs.0)
    }
}

impl Sum for Volume {
    fn sum<I: Iterator<Item = Volume>>(iter: I) -> Volume {
        iter.fold(Volume::ZERO, Add::add)
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Half-open volume interval `(above, up_to]` handled by one instrument.
///
/// `up_to = None` means the range is unbounded above.
///
/// # Example
///
/// ```
/// use platemix_core::{Volume, VolumeRange};
///
/// let low = VolumeRange::new(Volume::ZERO, Some(Volume::new(50)));
/// assert!(low.contains(Volume::new(50)));
/// assert!(!low.contains(Volume::new(51)));
/// assert!(!low.contains(Volume::ZERO));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeRange {
    pub above: Volume,
    pub up_to: Option<Volume>,
}

impl VolumeRange {
    pub const fn new(above: Volume, up_to: Option<Volume>) -> Self {
        VolumeRange { above, up_to }
    }

    /// Returns true if `volume` falls inside the range.
    pub fn contains(&self, volume: Volume) -> bool {
        volume > self.above && self.up_to.map_or(true, |max| volume <= max)
    }

    /// Checks that `ranges` cover every positive volume exactly once.
    ///
    /// The ranges may be given in any order. Sorted by lower bound, the first
    /// must start at zero, each must start where the previous one ends, and
    /// only the last may be unbounded.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the first gap, overlap, empty
    /// range or missing upper coverage.
    pub fn check_partition(ranges: &[VolumeRange]) -> Result<()> {
        if ranges.is_empty() {
            return Err(PlatemixError::Config(
                "at least one instrument volume range is required".to_string(),
            ));
        }

        let mut sorted: Vec<VolumeRange> = ranges.to_vec();
        sorted.sort_by_key(|r| r.above);

        for range in &sorted {
            if let Some(max) = range.up_to {
                if max <= range.above {
                    return Err(PlatemixError::Config(format!(
                        "volume range {} is empty",
                        range
                    )));
                }
            }
        }

        if !sorted[0].above.is_zero() {
            return Err(PlatemixError::Config(format!(
                "no instrument handles volumes up to {}",
                sorted[0].above
            )));
        }

        for pair in sorted.windows(2) {
            let (lower, upper) = (pair[0], pair[1]);
            let Some(boundary) = lower.up_to else {
                return Err(PlatemixError::Config(format!(
                    "volume ranges {} and {} overlap",
                    lower, upper
                )));
            };
            if upper.above < boundary {
                return Err(PlatemixError::Config(format!(
                    "volume ranges {} and {} overlap",
                    lower, upper
                )));
            }
            if upper.above > boundary {
                return Err(PlatemixError::Config(format!(
                    "volume ranges {} and {} leave a gap",
                    lower, upper
                )));
            }
        }

        if let Some(max) = sorted[sorted.len() - 1].up_to {
            return Err(PlatemixError::Config(format!(
                "no instrument handles volumes above {}",
                max
            )));
        }
        Ok(())
    }
}

impl fmt::Display for VolumeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.up_to {
            Some(max) => write!(f, "({}, {}]", self.above, max),
            None => write!(f, "({}, inf)", self.above),
        }
    }
}

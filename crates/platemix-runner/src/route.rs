//! Volume-based instrument selection.

use platemix_core::{Result, Volume, VolumeRange};

/// Position of an instrument in the executor's instrument list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstrumentSlot(pub usize);

impl InstrumentSlot {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Maps transfer volumes to the instrument whose range contains them.
///
/// Ranges are half-open `(above, up_to]`, so a boundary volume belongs to
/// the lower instrument: with `(0, 50]` and `(50, inf)`, 50 goes low and 51
/// goes high.
///
/// # Example
///
/// ```
/// use platemix_core::{Volume, VolumeRange};
/// use platemix_runner::{InstrumentRouter, InstrumentSlot};
///
/// let router = InstrumentRouter::new(&[
///     VolumeRange::new(Volume::ZERO, Some(Volume::new(50))),
///     VolumeRange::new(Volume::new(50), None),
/// ])
/// .unwrap();
///
/// assert_eq!(router.select_instrument(Volume::new(50)), Some(InstrumentSlot(0)));
/// assert_eq!(router.select_instrument(Volume::new(51)), Some(InstrumentSlot(1)));
/// assert_eq!(router.select_instrument(Volume::ZERO), None);
/// ```
#[derive(Debug, Clone)]
pub struct InstrumentRouter {
    routes: Vec<(VolumeRange, InstrumentSlot)>,
}

impl InstrumentRouter {
    /// Builds a router where `ranges[i]` belongs to `InstrumentSlot(i)`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error unless the ranges partition all
    /// positive volumes.
    pub fn new(ranges: &[VolumeRange]) -> Result<Self> {
        VolumeRange::check_partition(ranges)?;
        let mut routes: Vec<(VolumeRange, InstrumentSlot)> = ranges
            .iter()
            .enumerate()
            .map(|(i, range)| (*range, InstrumentSlot(i)))
            .collect();
        routes.sort_by_key(|(range, _)| range.above);
        Ok(InstrumentRouter { routes })
    }

    /// Returns the instrument for `volume`, or `None` for a zero volume.
    pub fn select_instrument(&self, volume: Volume) -> Option<InstrumentSlot> {
        if volume.is_zero() {
            return None;
        }
        self.routes
            .iter()
            .find(|(range, _)| range.contains(volume))
            .map(|(_, slot)| *slot)
    }

    /// Number of routed instruments.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

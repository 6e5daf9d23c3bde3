//! Handles and identifiers exchanged with the robot.

use std::fmt;

use platemix_core::WellName;

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

handle!(
    /// Handle to loaded labware (plate, reservoir or tip rack).
    LabwareId,
    "labware"
);
handle!(
    /// Handle to a loaded trash bin.
    TrashId,
    "trash"
);
handle!(
    /// Handle to a loaded instrument.
    InstrumentId,
    "instrument"
);
handle!(
    /// Handle to a defined liquid.
    LiquidId,
    "liquid"
);

/// A deck position such as `A1` or `C3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeckSlot(String);

impl DeckSlot {
    pub fn new(slot: impl Into<String>) -> Self {
        DeckSlot(slot.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DeckSlot {
    fn from(slot: &str) -> Self {
        DeckSlot::new(slot)
    }
}

impl fmt::Display for DeckSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Instrument mount position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mount {
    Left,
    Right,
}

impl fmt::Display for Mount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mount::Left => f.write_str("left"),
            Mount::Right => f.write_str("right"),
        }
    }
}

/// A single well on a loaded piece of labware.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WellRef {
    pub labware: LabwareId,
    pub well: WellName,
}

impl WellRef {
    pub fn new(labware: LabwareId, well: impl Into<WellName>) -> Self {
        WellRef {
            labware,
            well: well.into(),
        }
    }
}

impl fmt::Display for WellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.labware, self.well)
    }
}

/// Tip handling requested from a single `transfer` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TipPolicy {
    /// Use the tip the caller already attached.
    #[default]
    Never,

    /// Pick up a fresh tip for every aspirate/dispense pair and drop it afterwards.
    Always,
}

//! Errors reported by the robot collaborator.

use thiserror::Error;

use crate::types::{InstrumentId, LabwareId};

/// Failure reported by a [`Robot`](crate::Robot) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RobotError {
    /// A tip was requested while one is already attached
    #[error("instrument {0} already has a tip attached")]
    TipAlreadyAttached(InstrumentId),

    /// A tip operation requires an attached tip
    #[error("instrument {0} has no tip attached")]
    NoTipAttached(InstrumentId),

    /// The instrument was never loaded
    #[error("unknown instrument {0}")]
    UnknownInstrument(InstrumentId),

    /// The labware was never loaded
    #[error("unknown labware {0}")]
    UnknownLabware(LabwareId),

    /// A deck slot is already occupied
    #[error("deck slot {0} is already occupied")]
    SlotOccupied(String),

    /// Any other hardware-reported failure
    #[error("hardware error: {0}")]
    Hardware(String),
}

/// Result type alias for robot operations
pub type Result<T> = std::result::Result<T, RobotError>;

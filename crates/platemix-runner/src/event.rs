//! Run progress events.
//!
//! Events are streamed over an unbounded channel while the run executes, so
//! a monitor can follow along without touching the robot. Sending never
//! blocks and a dropped receiver does not affect the run.

use platemix_core::{Mixture, Reagent, Volume, WellName};

use crate::executor::RunReport;

/// Something that happened during a run, in the order it happened.
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    /// Execution is about to start.
    RunStarted {
        mixture_count: usize,
        well_capacity: usize,
    },

    /// A mixture was assigned a well; its transfers follow.
    MixtureStarted {
        index: usize,
        well: WellName,
        mixture: Mixture,
    },

    /// A single transfer finished.
    TransferCompleted {
        index: usize,
        reagent: Reagent,
        volume: Volume,
        instrument: String,
    },

    /// Every mixture was placed.
    RunCompleted(RunReport),

    /// The run stopped early.
    RunAborted {
        /// Mixture being processed when the run stopped.
        index: usize,
        reason: String,
    },
}

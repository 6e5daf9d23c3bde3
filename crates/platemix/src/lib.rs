//! PlateMix - combinatorial reagent mixtures on liquid-handling robots
//!
//! Enumerates every three-reagent mixture with a fixed total volume and
//! dispenses each into its own well, picking the instrument by volume and
//! using a fresh tip for every transfer.
//!
//! # Example
//!
//! ```rust
//! use platemix::prelude::*;
//!
//! let config = ProtocolConfig::default().with_mixture_grid(100, 50);
//! let mut robot = DryRunRobot::new();
//! let report = run_protocol(config, &mut robot).unwrap();
//!
//! assert_eq!(report.mixtures_placed, 6);
//! assert_eq!(robot.comments()[5], "5, {Reagent_A: 100, Reagent_B: 0, Reagent_C: 0}");
//! ```

// Domain types
pub use platemix_core::{
    enumerate_mixtures, Component, Mixture, MixtureGrid, PlateLayout, PlatemixError, Reagent,
    ReagentSet, Volume, VolumeRange, WellAllocator, WellName, WellOrder,
};

// Configuration
pub use platemix_config::{
    ConfigError, InstrumentConfig, LabwareConfig, MetadataConfig, MixtureConfig, MountConfig,
    PlateConfig, ProtocolConfig, SourceConfig, TipHandling, TrashConfig,
};

// Robot collaborator
pub use platemix_robot::{
    DeckSlot, DryRunRobot, InstrumentId, LabwareId, LiquidId, Mount, Robot, RobotError, TipPolicy,
    TrashId, WellRef,
};

// Planning and execution
pub use platemix_runner::{
    plan_mixture, Executor, InstrumentRouter, InstrumentSlot, MixturePlan, Pipette,
    PlannedTransfer, Protocol, ReagentSources, RunError, RunEvent, RunReport,
};

#[cfg(feature = "console")]
pub use platemix_console as console;

mod runner;
pub use runner::{load_config, run_protocol, run_protocol_with_channel, DEFAULT_CONFIG_PATH};

pub mod prelude {
    pub use super::{load_config, run_protocol, run_protocol_with_channel};
    pub use super::{DryRunRobot, Robot, RobotError};
    pub use super::{Mixture, MixtureGrid, ReagentSet, Volume};
    pub use super::{ProtocolConfig, TipHandling};
    pub use super::{Protocol, RunError, RunEvent, RunReport};
}

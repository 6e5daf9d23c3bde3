//! Transfer planning and execution for PlateMix.
//!
//! The runner turns enumerated mixtures into robot commands:
//!
//! - [`InstrumentRouter`] picks the instrument for each transfer volume
//! - [`plan_mixture`] lists the transfers a mixture needs, skipping empty components
//! - [`Pipette`] wraps an instrument handle with its tip state and scoped tip use
//! - [`Executor`] places mixtures into consecutive wells and issues transfers
//! - [`Protocol`] sets up the deck from a [`ProtocolConfig`] and runs everything
//!
//! Logging levels:
//! - **INFO**: Run start/end and one event per mixture
//! - **DEBUG**: Individual transfers
//! - **WARN**: Tips released during initialization
//! - **ERROR**: Aborted runs

mod error;
mod event;
pub mod executor;
mod pipette;
mod plan;
mod protocol;
mod route;
mod sources;

pub use error::{Result, RunError};
pub use event::RunEvent;
pub use executor::{Executor, RunReport};
pub use pipette::Pipette;
pub use plan::{plan_mixture, MixturePlan, PlannedTransfer};
pub use protocol::Protocol;
pub use route::{InstrumentRouter, InstrumentSlot};
pub use sources::ReagentSources;

pub use platemix_config::{ProtocolConfig, TipHandling};

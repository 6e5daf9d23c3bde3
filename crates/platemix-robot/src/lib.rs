//! Robot control collaborator for PlateMix.
//!
//! The runner never talks to hardware directly. Everything physical goes
//! through the [`Robot`] trait: labware and instrument registration, liquid
//! definitions, tip handling, transfers and operator comments.
//!
//! [`DryRunRobot`] is an in-memory implementation that checks tip state and
//! logs every command, useful for validating a protocol before a real run.

mod dry_run;
mod error;
mod types;

pub use dry_run::DryRunRobot;
pub use error::{Result, RobotError};
pub use types::{DeckSlot, InstrumentId, LabwareId, LiquidId, Mount, TipPolicy, TrashId, WellRef};

use platemix_core::Volume;

/// Blocking interface to a liquid-handling robot.
///
/// Every call completes before it returns. Implementations own all hardware
/// state; callers query tip state through [`Robot::has_tip`] rather than
/// caching it across runs.
pub trait Robot {
    /// Moves every axis to its home position.
    fn home(&mut self) -> Result<()>;

    /// Loads a labware definition into a deck slot.
    fn load_labware(&mut self, definition: &str, slot: &DeckSlot) -> Result<LabwareId>;

    /// Loads a trash bin into a deck slot.
    fn load_trash_bin(&mut self, slot: &DeckSlot) -> Result<TrashId>;

    /// Loads an instrument on `mount`, drawing tips from `tip_racks` in order.
    fn load_instrument(
        &mut self,
        model: &str,
        mount: Mount,
        tip_racks: &[LabwareId],
    ) -> Result<InstrumentId>;

    /// Declares a named liquid.
    fn define_liquid(&mut self, name: &str) -> Result<LiquidId>;

    /// Records that `well` initially holds `volume` of `liquid`.
    fn load_liquid(&mut self, well: &WellRef, volume: Volume, liquid: LiquidId) -> Result<()>;

    /// Returns true if the instrument currently holds a tip.
    fn has_tip(&self, instrument: InstrumentId) -> Result<bool>;

    /// Picks up the next available tip.
    fn pick_up_tip(&mut self, instrument: InstrumentId) -> Result<()>;

    /// Drops the attached tip into `trash`.
    fn drop_tip(&mut self, instrument: InstrumentId, trash: TrashId) -> Result<()>;

    /// Moves `volume` from `source` to `dest`.
    fn transfer(
        &mut self,
        instrument: InstrumentId,
        volume: Volume,
        source: &WellRef,
        dest: &WellRef,
        tip_policy: TipPolicy,
    ) -> Result<()>;

    /// Writes a line to the run log.
    fn comment(&mut self, text: &str);
}

impl<R: Robot + ?Sized> Robot for &mut R {
    fn home(&mut self) -> Result<()> {
        (**self).home()
    }

    fn load_labware(&mut self, definition: &str, slot: &DeckSlot) -> Result<LabwareId> {
        (**self).load_labware(definition, slot)
    }

    fn load_trash_bin(&mut self, slot: &DeckSlot) -> Result<TrashId> {
        (**self).load_trash_bin(slot)
    }

    fn load_instrument(
        &mut self,
        model: &str,
        mount: Mount,
        tip_racks: &[LabwareId],
    ) -> Result<InstrumentId> {
        (**self).load_instrument(model, mount, tip_racks)
    }

    fn define_liquid(&mut self, name: &str) -> Result<LiquidId> {
        (**self).define_liquid(name)
    }

    fn load_liquid(&mut self, well: &WellRef, volume: Volume, liquid: LiquidId) -> Result<()> {
        (**self).load_liquid(well, volume, liquid)
    }

    fn has_tip(&self, instrument: InstrumentId) -> Result<bool> {
        (**self).has_tip(instrument)
    }

    fn pick_up_tip(&mut self, instrument: InstrumentId) -> Result<()> {
        (**self).pick_up_tip(instrument)
    }

    fn drop_tip(&mut self, instrument: InstrumentId, trash: TrashId) -> Result<()> {
        (**self).drop_tip(instrument, trash)
    }

    fn transfer(
        &mut self,
        instrument: InstrumentId,
        volume: Volume,
        source: &WellRef,
        dest: &WellRef,
        tip_policy: TipPolicy,
    ) -> Result<()> {
        (**self).transfer(instrument, volume, source, dest, tip_policy)
    }

    fn comment(&mut self, text: &str) {
        (**self).comment(text)
    }
}

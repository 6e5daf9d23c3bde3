//! In-memory robot that validates command sequences without hardware.

use std::collections::{HashMap, HashSet};

use platemix_core::Volume;
use tracing::{debug, info};

use crate::error::{Result, RobotError};
use crate::types::{DeckSlot, InstrumentId, LabwareId, LiquidId, Mount, TipPolicy, TrashId, WellRef};
use crate::Robot;

/// Tips held by a single rack.
const TIPS_PER_RACK: usize = 96;

#[derive(Debug)]
struct InstrumentState {
    model: String,
    mount: Mount,
    has_tip: bool,
    tips_available: usize,
    tips_used: usize,
}

/// A robot that performs no motion.
///
/// Tracks what a real controller would reject: double tip pick-ups, drops
/// or tip-less transfers, unknown handles, occupied deck slots and empty tip
/// racks. Each accepted command is logged at DEBUG level.
///
/// # Example
///
/// ```
/// use platemix_core::Volume;
/// use platemix_robot::{DeckSlot, DryRunRobot, Mount, Robot, TipPolicy, WellRef};
///
/// let mut robot = DryRunRobot::new();
/// let rack = robot.load_labware("tiprack_50ul", &DeckSlot::from("B2")).unwrap();
/// let plate = robot.load_labware("plate_96", &DeckSlot::from("C3")).unwrap();
/// let trash = robot.load_trash_bin(&DeckSlot::from("A3")).unwrap();
/// let pipette = robot.load_instrument("p50", Mount::Right, &[rack]).unwrap();
///
/// robot.pick_up_tip(pipette).unwrap();
/// robot
///     .transfer(
///         pipette,
///         Volume::new(20),
///         &WellRef::new(plate, "A1"),
///         &WellRef::new(plate, "B1"),
///         TipPolicy::Never,
///     )
///     .unwrap();
/// robot.drop_tip(pipette, trash).unwrap();
///
/// assert_eq!(robot.tips_used(pipette), Some(1));
/// assert!(robot.pick_up_tip(pipette).is_ok());
/// assert!(robot.pick_up_tip(pipette).is_err());
/// ```
#[derive(Debug, Default)]
pub struct DryRunRobot {
    occupied_slots: HashSet<String>,
    labware: HashMap<LabwareId, String>,
    trash_bins: HashSet<TrashId>,
    instruments: HashMap<InstrumentId, InstrumentState>,
    liquids: Vec<String>,
    preloaded_tips: HashSet<Mount>,
    next_handle: u32,
    homed: bool,
    transfers: usize,
    comments: Vec<String>,
}

impl DryRunRobot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts instruments loaded on `mount` with a tip already attached,
    /// as left behind by an interrupted run.
    pub fn with_tip_attached(mut self, mount: Mount) -> Self {
        self.preloaded_tips.insert(mount);
        self
    }

    /// Returns true once `home` has been called.
    pub fn is_homed(&self) -> bool {
        self.homed
    }

    /// Number of tips the instrument has consumed.
    pub fn tips_used(&self, instrument: InstrumentId) -> Option<usize> {
        self.instruments.get(&instrument).map(|s| s.tips_used)
    }

    /// Number of completed transfers.
    pub fn transfer_count(&self) -> usize {
        self.transfers
    }

    /// Comments written during the run, in order.
    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    /// Names of the defined liquids, in definition order.
    pub fn liquids(&self) -> &[String] {
        &self.liquids
    }

    fn next_handle(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }

    fn occupy(&mut self, slot: &DeckSlot) -> Result<()> {
        if !self.occupied_slots.insert(slot.as_str().to_string()) {
            return Err(RobotError::SlotOccupied(slot.to_string()));
        }
        Ok(())
    }

    fn instrument_mut(&mut self, instrument: InstrumentId) -> Result<&mut InstrumentState> {
        self.instruments
            .get_mut(&instrument)
            .ok_or(RobotError::UnknownInstrument(instrument))
    }

    fn check_well(&self, well: &WellRef) -> Result<()> {
        if !self.labware.contains_key(&well.labware) {
            return Err(RobotError::UnknownLabware(well.labware));
        }
        Ok(())
    }

    fn consume_tip(state: &mut InstrumentState) -> Result<()> {
        if state.tips_available == 0 {
            return Err(RobotError::Hardware(format!(
                "{} on {} mount is out of tips",
                state.model, state.mount
            )));
        }
        state.tips_available -= 1;
        state.tips_used += 1;
        Ok(())
    }
}

impl Robot for DryRunRobot {
    fn home(&mut self) -> Result<()> {
        self.homed = true;
        info!(event = "home");
        Ok(())
    }

    fn load_labware(&mut self, definition: &str, slot: &DeckSlot) -> Result<LabwareId> {
        self.occupy(slot)?;
        let id = LabwareId(self.next_handle());
        self.labware.insert(id, definition.to_string());
        debug!(event = "load_labware", definition, slot = %slot, id = %id);
        Ok(id)
    }

    fn load_trash_bin(&mut self, slot: &DeckSlot) -> Result<TrashId> {
        self.occupy(slot)?;
        let id = TrashId(self.next_handle());
        self.trash_bins.insert(id);
        debug!(event = "load_trash_bin", slot = %slot, id = %id);
        Ok(id)
    }

    fn load_instrument(
        &mut self,
        model: &str,
        mount: Mount,
        tip_racks: &[LabwareId],
    ) -> Result<InstrumentId> {
        for rack in tip_racks {
            if !self.labware.contains_key(rack) {
                return Err(RobotError::UnknownLabware(*rack));
            }
        }
        if self.instruments.values().any(|s| s.mount == mount) {
            return Err(RobotError::Hardware(format!(
                "{} mount already has an instrument",
                mount
            )));
        }
        let id = InstrumentId(self.next_handle());
        self.instruments.insert(
            id,
            InstrumentState {
                model: model.to_string(),
                mount,
                has_tip: self.preloaded_tips.contains(&mount),
                tips_available: tip_racks.len() * TIPS_PER_RACK,
                tips_used: 0,
            },
        );
        debug!(event = "load_instrument", model, mount = %mount, id = %id);
        Ok(id)
    }

    fn define_liquid(&mut self, name: &str) -> Result<LiquidId> {
        self.liquids.push(name.to_string());
        let id = LiquidId(self.liquids.len() as u32);
        debug!(event = "define_liquid", name, id = %id);
        Ok(id)
    }

    fn load_liquid(&mut self, well: &WellRef, volume: Volume, liquid: LiquidId) -> Result<()> {
        self.check_well(well)?;
        if liquid.0 == 0 || liquid.0 as usize > self.liquids.len() {
            return Err(RobotError::Hardware(format!("unknown liquid {}", liquid)));
        }
        debug!(event = "load_liquid", well = %well, volume = volume.microliters(), liquid = %liquid);
        Ok(())
    }

    fn has_tip(&self, instrument: InstrumentId) -> Result<bool> {
        self.instruments
            .get(&instrument)
            .map(|s| s.has_tip)
            .ok_or(RobotError::UnknownInstrument(instrument))
    }

    fn pick_up_tip(&mut self, instrument: InstrumentId) -> Result<()> {
        let state = self.instrument_mut(instrument)?;
        if state.has_tip {
            return Err(RobotError::TipAlreadyAttached(instrument));
        }
        Self::consume_tip(state)?;
        state.has_tip = true;
        debug!(event = "pick_up_tip", instrument = %instrument);
        Ok(())
    }

    fn drop_tip(&mut self, instrument: InstrumentId, trash: TrashId) -> Result<()> {
        if !self.trash_bins.contains(&trash) {
            return Err(RobotError::Hardware(format!("unknown trash bin {}", trash)));
        }
        let state = self.instrument_mut(instrument)?;
        if !state.has_tip {
            return Err(RobotError::NoTipAttached(instrument));
        }
        state.has_tip = false;
        debug!(event = "drop_tip", instrument = %instrument, trash = %trash);
        Ok(())
    }

    fn transfer(
        &mut self,
        instrument: InstrumentId,
        volume: Volume,
        source: &WellRef,
        dest: &WellRef,
        tip_policy: TipPolicy,
    ) -> Result<()> {
        self.check_well(source)?;
        self.check_well(dest)?;
        let state = self.instrument_mut(instrument)?;
        match tip_policy {
            TipPolicy::Never => {
                if !state.has_tip {
                    return Err(RobotError::NoTipAttached(instrument));
                }
            }
            TipPolicy::Always => {
                if state.has_tip {
                    return Err(RobotError::TipAlreadyAttached(instrument));
                }
                // A single aspirate/dispense pair uses exactly one tip.
                Self::consume_tip(state)?;
            }
        }
        self.transfers += 1;
        debug!(
            event = "transfer",
            instrument = %instrument,
            volume = volume.microliters(),
            source = %source,
            dest = %dest,
        );
        Ok(())
    }

    fn comment(&mut self, text: &str) {
        info!(event = "comment", text);
        self.comments.push(text.to_string());
    }
}

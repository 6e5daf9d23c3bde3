//! A robot that records every call.
//!
//! # Example
//!
//! ```
//! use platemix_robot::{DeckSlot, Mount, Robot};
//! use platemix_test::{Call, RecordingRobot};
//!
//! let mut robot = RecordingRobot::new();
//! let rack = robot.load_labware("tips", &DeckSlot::from("B1")).unwrap();
//! let pipette = robot.load_instrument("p50", Mount::Right, &[rack]).unwrap();
//! robot.pick_up_tip(pipette).unwrap();
//!
//! assert_eq!(robot.calls().last(), Some(&Call::PickUpTip(pipette)));
//! assert!(robot.pick_up_tip(pipette).is_err());
//! ```

use std::collections::{HashMap, HashSet};

use platemix_core::Volume;
use platemix_robot::{
    DeckSlot, InstrumentId, LabwareId, LiquidId, Mount, Result, Robot, RobotError, TipPolicy,
    TrashId, WellRef,
};

/// A single call made on a [`RecordingRobot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Home,
    LoadLabware {
        definition: String,
        slot: String,
    },
    LoadTrashBin {
        slot: String,
    },
    LoadInstrument {
        model: String,
        mount: Mount,
        tip_racks: Vec<LabwareId>,
    },
    DefineLiquid {
        name: String,
    },
    LoadLiquid {
        well: WellRef,
        volume: Volume,
        liquid: LiquidId,
    },
    PickUpTip(InstrumentId),
    DropTip(InstrumentId),
    Transfer {
        instrument: InstrumentId,
        volume: Volume,
        source: WellRef,
        dest: WellRef,
        tip_policy: TipPolicy,
    },
    Comment(String),
}

/// Records calls in order and enforces tip state.
///
/// Tip pick-ups and transfers can be made to fail on their n-th attempt
/// (counting from zero) to exercise error propagation.
#[derive(Debug, Default)]
pub struct RecordingRobot {
    calls: Vec<Call>,
    next_handle: u32,
    mounts: HashMap<InstrumentId, Mount>,
    tips: HashSet<InstrumentId>,
    preloaded_tips: HashSet<Mount>,
    pick_up_attempts: usize,
    transfer_attempts: usize,
    fail_pick_up_at: Option<usize>,
    fail_transfer_at: Option<usize>,
}

impl RecordingRobot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instruments loaded on `mount` start with a tip attached.
    pub fn with_tip_attached(mut self, mount: Mount) -> Self {
        self.preloaded_tips.insert(mount);
        self
    }

    /// Makes the `n`-th tip pick-up fail.
    pub fn fail_pick_up_at(mut self, n: usize) -> Self {
        self.fail_pick_up_at = Some(n);
        self
    }

    /// Makes the `n`-th transfer fail.
    pub fn fail_transfer_at(mut self, n: usize) -> Self {
        self.fail_transfer_at = Some(n);
        self
    }

    /// Every call, in order.
    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    /// Returns true if the instrument currently holds a tip.
    pub fn holds_tip(&self, instrument: InstrumentId) -> bool {
        self.tips.contains(&instrument)
    }

    /// The instrument loaded on `mount`.
    pub fn instrument_on(&self, mount: Mount) -> Option<InstrumentId> {
        self.mounts
            .iter()
            .find(|(_, m)| **m == mount)
            .map(|(id, _)| *id)
    }

    /// Transfer calls as `(instrument, volume, source, dest)`.
    pub fn transfers(&self) -> Vec<(InstrumentId, Volume, &WellRef, &WellRef)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Transfer {
                    instrument,
                    volume,
                    source,
                    dest,
                    ..
                } => Some((*instrument, *volume, source, dest)),
                _ => None,
            })
            .collect()
    }

    /// Comment texts, in order.
    pub fn comments(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Comment(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Number of calls matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }

    fn next_handle(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }

    fn known(&self, instrument: InstrumentId) -> Result<()> {
        if self.mounts.contains_key(&instrument) {
            Ok(())
        } else {
            Err(RobotError::UnknownInstrument(instrument))
        }
    }
}

impl Robot for RecordingRobot {
    fn home(&mut self) -> Result<()> {
        self.calls.push(Call::Home);
        Ok(())
    }

    fn load_labware(&mut self, definition: &str, slot: &DeckSlot) -> Result<LabwareId> {
        self.calls.push(Call::LoadLabware {
            definition: definition.to_string(),
            slot: slot.to_string(),
        });
        Ok(LabwareId(self.next_handle()))
    }

    fn load_trash_bin(&mut self, slot: &DeckSlot) -> Result<TrashId> {
        self.calls.push(Call::LoadTrashBin {
            slot: slot.to_string(),
        });
        Ok(TrashId(self.next_handle()))
    }

    fn load_instrument(
        &mut self,
        model: &str,
        mount: Mount,
        tip_racks: &[LabwareId],
    ) -> Result<InstrumentId> {
        self.calls.push(Call::LoadInstrument {
            model: model.to_string(),
            mount,
            tip_racks: tip_racks.to_vec(),
        });
        let id = InstrumentId(self.next_handle());
        self.mounts.insert(id, mount);
        if self.preloaded_tips.contains(&mount) {
            self.tips.insert(id);
        }
        Ok(id)
    }

    fn define_liquid(&mut self, name: &str) -> Result<LiquidId> {
        self.calls.push(Call::DefineLiquid {
            name: name.to_string(),
        });
        Ok(LiquidId(self.next_handle()))
    }

    fn load_liquid(&mut self, well: &WellRef, volume: Volume, liquid: LiquidId) -> Result<()> {
        self.calls.push(Call::LoadLiquid {
            well: well.clone(),
            volume,
            liquid,
        });
        Ok(())
    }

    fn has_tip(&self, instrument: InstrumentId) -> Result<bool> {
        self.known(instrument)?;
        Ok(self.tips.contains(&instrument))
    }

    fn pick_up_tip(&mut self, instrument: InstrumentId) -> Result<()> {
        self.known(instrument)?;
        let attempt = self.pick_up_attempts;
        self.pick_up_attempts += 1;
        if self.fail_pick_up_at == Some(attempt) {
            return Err(RobotError::Hardware("tip pick-up failed".to_string()));
        }
        if !self.tips.insert(instrument) {
            return Err(RobotError::TipAlreadyAttached(instrument));
        }
        self.calls.push(Call::PickUpTip(instrument));
        Ok(())
    }

    fn drop_tip(&mut self, instrument: InstrumentId, _trash: TrashId) -> Result<()> {
        self.known(instrument)?;
        if !self.tips.remove(&instrument) {
            return Err(RobotError::NoTipAttached(instrument));
        }
        self.calls.push(Call::DropTip(instrument));
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
        self.known(instrument)?;
        let attempt = self.transfer_attempts;
        self.transfer_attempts += 1;
        if self.fail_transfer_at == Some(attempt) {
            return Err(RobotError::Hardware("transfer failed".to_string()));
        }
        let holds_tip = self.tips.contains(&instrument);
        match tip_policy {
            TipPolicy::Never if !holds_tip => return Err(RobotError::NoTipAttached(instrument)),
            TipPolicy::Always if holds_tip => {
                return Err(RobotError::TipAlreadyAttached(instrument))
            }
            _ => {}
        }
        self.calls.push(Call::Transfer {
            instrument,
            volume,
            source: source.clone(),
            dest: dest.clone(),
            tip_policy,
        });
        Ok(())
    }

    fn comment(&mut self, text: &str) {
        self.calls.push(Call::Comment(text.to_string()));
    }
}

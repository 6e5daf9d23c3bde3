//! Instrument handles with explicit tip state.

use std::fmt;

use platemix_core::{Volume, VolumeRange};
use platemix_robot::{InstrumentId, Robot, RobotError, TipPolicy, TrashId, WellRef};
use tracing::warn;

/// A loaded instrument and the tip it may be holding.
///
/// Tip state is mirrored from every call made through this handle, so it
/// can be queried without a round trip to the robot. Call
/// [`Pipette::sync_tip_state`] to pick up state left by an earlier context.
#[derive(Debug, Clone)]
pub struct Pipette {
    id: InstrumentId,
    label: String,
    range: VolumeRange,
    has_tip: bool,
}

impl Pipette {
    pub fn new(id: InstrumentId, label: impl Into<String>, range: VolumeRange) -> Self {
        Pipette {
            id,
            label: label.into(),
            range,
            has_tip: false,
        }
    }

    pub fn id(&self) -> InstrumentId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Volumes this instrument is recommended for.
    pub fn range(&self) -> VolumeRange {
        self.range
    }

    /// Returns true while a tip is attached.
    pub fn has_tip(&self) -> bool {
        self.has_tip
    }

    /// Reads the tip state from the robot.
    pub fn sync_tip_state<R: Robot>(&mut self, robot: &R) -> Result<bool, RobotError> {
        self.has_tip = robot.has_tip(self.id)?;
        Ok(self.has_tip)
    }

    /// Drops a tip left over from an earlier context, if any.
    ///
    /// Returns true if a tip was dropped.
    pub fn release_leftover_tip<R: Robot>(
        &mut self,
        robot: &mut R,
        trash: TrashId,
    ) -> Result<bool, RobotError> {
        if !self.sync_tip_state(robot)? {
            return Ok(false);
        }
        warn!(event = "leftover_tip", instrument = %self.label);
        self.drop_tip(robot, trash)?;
        Ok(true)
    }

    pub fn pick_up_tip<R: Robot>(&mut self, robot: &mut R) -> Result<(), RobotError> {
        robot.pick_up_tip(self.id)?;
        self.has_tip = true;
        Ok(())
    }

    pub fn drop_tip<R: Robot>(&mut self, robot: &mut R, trash: TrashId) -> Result<(), RobotError> {
        robot.drop_tip(self.id, trash)?;
        self.has_tip = false;
        Ok(())
    }

    /// Moves `volume` from `source` to `dest`.
    pub fn transfer<R: Robot>(
        &self,
        robot: &mut R,
        volume: Volume,
        source: &WellRef,
        dest: &WellRef,
        tip_policy: TipPolicy,
    ) -> Result<(), RobotError> {
        robot.transfer(self.id, volume, source, dest, tip_policy)
    }

    /// Runs `body` with a freshly picked-up tip and drops the tip afterwards.
    ///
    /// The tip is dropped whether or not `body` succeeds. If both fail, the
    /// error from `body` is returned.
    pub fn with_fresh_tip<R, T, F>(
        &mut self,
        robot: &mut R,
        trash: TrashId,
        body: F,
    ) -> Result<T, RobotError>
    where
        R: Robot,
        F: FnOnce(&mut R, &Pipette) -> Result<T, RobotError>,
    {
        self.pick_up_tip(robot)?;
        let outcome = body(robot, self);
        let released = self.drop_tip(robot, trash);
        let value = outcome?;
        released?;
        Ok(value)
    }
}

impl fmt::Display for Pipette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

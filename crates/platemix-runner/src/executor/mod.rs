//! Sequential mixture placement.
//!
//! The executor walks the mixtures in enumeration order. Each mixture gets
//! the next unused destination well, a comment on the robot log, and one
//! transfer per non-empty component, each with its own tip.
//!
//! # Usage
//!
//! ```
//! use platemix_core::{MixtureGrid, PlateLayout, ReagentSet, Volume, VolumeRange};
//! use platemix_robot::{DeckSlot, DryRunRobot, Mount, Robot, WellRef};
//! use platemix_runner::{Executor, Pipette, ReagentSources};
//!
//! let mut robot = DryRunRobot::new();
//! let small_tips = robot.load_labware("tips_50", &DeckSlot::from("B2")).unwrap();
//! let large_tips = robot.load_labware("tips_1000", &DeckSlot::from("B1")).unwrap();
//! let reservoir = robot.load_labware("reservoir", &DeckSlot::from("A2")).unwrap();
//! let plate = robot.load_labware("plate", &DeckSlot::from("C3")).unwrap();
//! let trash = robot.load_trash_bin(&DeckSlot::from("A3")).unwrap();
//! let p50 = robot.load_instrument("p50", Mount::Right, &[small_tips]).unwrap();
//! let p1000 = robot.load_instrument("p1000", Mount::Left, &[large_tips]).unwrap();
//!
//! let reagents = ReagentSet::default();
//! let sources: ReagentSources = reagents
//!     .iter()
//!     .zip(["A1", "A2", "A3"])
//!     .map(|(reagent, well)| (reagent.clone(), WellRef::new(reservoir, well)))
//!     .collect();
//!
//! let pipettes = vec![
//!     Pipette::new(p50, "p50", VolumeRange::new(Volume::ZERO, Some(Volume::new(50)))),
//!     Pipette::new(p1000, "p1000", VolumeRange::new(Volume::new(50), None)),
//! ];
//! let mut executor =
//!     Executor::new(pipettes, sources, plate, PlateLayout::standard_96(), trash).unwrap();
//!
//! let grid = MixtureGrid::new(Volume::new(100), Volume::new(50), reagents).unwrap();
//! let report = executor.run(&mut robot, &grid.enumerate()).unwrap();
//!
//! assert_eq!(report.mixtures_placed, 6);
//! assert_eq!(robot.comments()[0], "0, {Reagent_A: 0, Reagent_B: 0, Reagent_C: 100}");
//! ```

mod report;

#[cfg(test)]
mod tests;

pub use report::RunReport;

use platemix_config::TipHandling;
use platemix_core::{Mixture, PlateLayout, PlatemixError, WellAllocator, WellName};
use platemix_robot::{LabwareId, Robot, TipPolicy, TrashId, WellRef};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::error::{Result, RunError};
use crate::event::RunEvent;
use crate::pipette::Pipette;
use crate::plan::plan_mixture;
use crate::route::InstrumentRouter;
use crate::sources::ReagentSources;

/// Places mixtures into consecutive wells of the destination plate.
#[derive(Debug)]
pub struct Executor {
    pipettes: Vec<Pipette>,
    router: InstrumentRouter,
    sources: ReagentSources,
    plate: LabwareId,
    allocator: WellAllocator,
    trash: TrashId,
    tip_handling: TipHandling,
}

impl Executor {
    /// Creates an executor routing transfers between `pipettes` by their ranges.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the pipette ranges do not partition
    /// all positive volumes.
    pub fn new(
        pipettes: Vec<Pipette>,
        sources: ReagentSources,
        plate: LabwareId,
        layout: PlateLayout,
        trash: TrashId,
    ) -> Result<Self> {
        let ranges: Vec<_> = pipettes.iter().map(Pipette::range).collect();
        let router = InstrumentRouter::new(&ranges)?;
        Ok(Executor {
            pipettes,
            router,
            sources,
            plate,
            allocator: WellAllocator::new(layout),
            trash,
            tip_handling: TipHandling::default(),
        })
    }

    /// Sets how tips are handled around each transfer.
    pub fn with_tip_handling(mut self, tip_handling: TipHandling) -> Self {
        self.tip_handling = tip_handling;
        self
    }

    pub fn pipettes(&self) -> &[Pipette] {
        &self.pipettes
    }

    pub fn router(&self) -> &InstrumentRouter {
        &self.router
    }

    /// Wells still available on the destination plate.
    pub fn wells_remaining(&self) -> usize {
        self.allocator.remaining()
    }

    /// Drops any tip an instrument still holds from an earlier context.
    ///
    /// Returns the number of tips dropped.
    pub fn prepare<R: Robot>(&mut self, robot: &mut R) -> Result<usize> {
        let mut released = 0;
        for pipette in &mut self.pipettes {
            if pipette.release_leftover_tip(robot, self.trash)? {
                released += 1;
            }
        }
        Ok(released)
    }

    /// Places every mixture, in order.
    ///
    /// Every reagent dispensed by `mixtures` must have a source; this is
    /// checked before the robot is touched. Leftover tips are dropped first. The run stops at the first failure;
    /// transfers already issued are not undone.
    pub fn run<R: Robot>(&mut self, robot: &mut R, mixtures: &[Mixture]) -> Result<RunReport> {
        self.execute(robot, mixtures, None)
    }

    /// Places every mixture, streaming progress events through `sender`.
    pub fn run_with_channel<R: Robot>(
        &mut self,
        robot: &mut R,
        mixtures: &[Mixture],
        sender: mpsc::UnboundedSender<RunEvent>,
    ) -> Result<RunReport> {
        self.execute(robot, mixtures, Some(&sender))
    }

    fn execute<R: Robot>(
        &mut self,
        robot: &mut R,
        mixtures: &[Mixture],
        sender: Option<&mpsc::UnboundedSender<RunEvent>>,
    ) -> Result<RunReport> {
        let emit = |event: RunEvent| {
            if let Some(sender) = sender {
                let _ = sender.send(event);
            }
        };

        self.check_sources(mixtures)?;
        self.prepare(robot)?;

        info!(
            event = "run_start",
            mixture_count = mixtures.len(),
            well_capacity = self.allocator.remaining(),
            instrument_count = self.pipettes.len(),
        );
        emit(RunEvent::RunStarted {
            mixture_count: mixtures.len(),
            well_capacity: self.allocator.remaining(),
        });

        let mut report = RunReport::new(self.pipettes.len());
        for (index, mixture) in mixtures.iter().enumerate() {
            if let Err(err) = self.place_mixture(robot, index, mixture, &mut report, &emit) {
                error!(event = "run_aborted", index, error = %err);
                emit(RunEvent::RunAborted {
                    index,
                    reason: err.to_string(),
                });
                return Err(err);
            }
        }

        info!(
            event = "run_end",
            mixtures_placed = report.mixtures_placed,
            transfers = report.transfers,
        );
        emit(RunEvent::RunCompleted(report.clone()));
        Ok(report)
    }

    fn place_mixture<R: Robot>(
        &mut self,
        robot: &mut R,
        index: usize,
        mixture: &Mixture,
        report: &mut RunReport,
        emit: &dyn Fn(RunEvent),
    ) -> Result<()> {
        let well = self.next_well(index)?;
        let dest = WellRef::new(self.plate, well.clone());

        robot.comment(&format!("{}, {}", index, mixture));
        info!(event = "mixture", index, well = %well, mixture = %mixture);
        emit(RunEvent::MixtureStarted {
            index,
            well: well.clone(),
            mixture: mixture.clone(),
        });

        for transfer in plan_mixture(mixture, &self.router) {
            let source = self.sources.get(&transfer.reagent)?;
            let slot = transfer.instrument.index();
            let pipette = &mut self.pipettes[slot];

            match self.tip_handling {
                TipHandling::Explicit => {
                    pipette.with_fresh_tip(robot, self.trash, |robot, pipette| {
                        pipette.transfer(robot, transfer.volume, source, &dest, TipPolicy::Never)
                    })?;
                }
                TipHandling::Delegated => {
                    pipette.transfer(robot, transfer.volume, source, &dest, TipPolicy::Always)?;
                }
            }

            debug!(
                event = "transfer",
                index,
                reagent = %transfer.reagent,
                volume = transfer.volume.microliters(),
                instrument = %pipette,
            );
            emit(RunEvent::TransferCompleted {
                index,
                reagent: transfer.reagent,
                volume: transfer.volume,
                instrument: pipette.label().to_string(),
            });
            report.record_transfer(slot);
        }

        report.record_mixture(well);
        Ok(())
    }

    fn check_sources(&self, mixtures: &[Mixture]) -> Result<()> {
        for component in mixtures.iter().flat_map(|m| m.nonzero()) {
            self.sources.get(&component.reagent)?;
        }
        Ok(())
    }

    fn next_well(&mut self, index: usize) -> Result<WellName> {
        self.allocator.next_well().map_err(|err| match err {
            PlatemixError::WellsExhausted { capacity, .. } => {
                RunError::Domain(PlatemixError::WellsExhausted {
                    mixture_index: index,
                    capacity,
                })
            }
            other => RunError::Domain(other),
        })
    }
}

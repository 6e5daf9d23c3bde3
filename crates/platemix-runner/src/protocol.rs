//! Deck setup and end-to-end runs from a [`ProtocolConfig`].

use platemix_config::{InstrumentConfig, MountConfig, ProtocolConfig};
use platemix_core::{Mixture, MixtureGrid, PlateLayout};
use platemix_robot::{DeckSlot, LabwareId, Mount, Robot, WellRef};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::error::Result;
use crate::event::RunEvent;
use crate::executor::{Executor, RunReport};
use crate::pipette::Pipette;
use crate::sources::ReagentSources;

/// A validated protocol, ready to run on any [`Robot`].
///
/// All configuration errors are reported by [`Protocol::from_config`], so a
/// protocol that was built successfully only fails at run time through
/// robot errors.
///
/// # Example
///
/// ```
/// use platemix_config::ProtocolConfig;
/// use platemix_robot::DryRunRobot;
/// use platemix_runner::Protocol;
///
/// let protocol = Protocol::from_config(ProtocolConfig::default()).unwrap();
/// let mut robot = DryRunRobot::new();
/// let report = protocol.run(&mut robot).unwrap();
///
/// assert_eq!(report.mixtures_placed, 66);
/// assert_eq!(robot.comments().len(), 66);
/// ```
#[derive(Debug, Clone)]
pub struct Protocol {
    config: ProtocolConfig,
    grid: MixtureGrid,
    layout: PlateLayout,
}

impl Protocol {
    /// Validates `config` and builds the protocol.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error found.
    pub fn from_config(config: ProtocolConfig) -> Result<Self> {
        config.validate()?;
        let grid = config.mixture_grid()?;
        let layout = config.plate_layout()?;
        Ok(Protocol {
            config,
            grid,
            layout,
        })
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    pub fn grid(&self) -> &MixtureGrid {
        &self.grid
    }

    /// Every mixture, in placement order.
    pub fn mixtures(&self) -> Vec<Mixture> {
        self.grid.enumerate()
    }

    /// Sets up the deck and places every mixture.
    pub fn run<R: Robot>(&self, robot: &mut R) -> Result<RunReport> {
        let mut executor = self.setup(robot)?;
        executor.run(robot, &self.mixtures())
    }

    /// Sets up the deck and places every mixture, streaming progress events.
    pub fn run_with_channel<R: Robot>(
        &self,
        robot: &mut R,
        sender: mpsc::UnboundedSender<RunEvent>,
    ) -> Result<RunReport> {
        let mut executor = self.setup(robot)?;
        executor.run_with_channel(robot, &self.mixtures(), sender)
    }

    /// Homes the robot, loads labware, instruments and liquids, and returns
    /// an executor wired to them.
    pub fn setup<R: Robot>(&self, robot: &mut R) -> Result<Executor> {
        let config = &self.config;
        info!(
            event = "protocol_setup",
            protocol = %config.metadata.protocol_name,
            robot_type = %config.metadata.robot_type,
            api_level = %config.metadata.api_level,
        );

        robot.home()?;

        let mut tip_racks = Vec::with_capacity(config.instruments.len());
        for instrument in &config.instruments {
            tip_racks.push(load_tip_racks(robot, instrument)?);
        }

        let reservoir = robot.load_labware(
            &config.reservoir.definition,
            &DeckSlot::new(config.reservoir.slot.as_str()),
        )?;
        let plate = robot.load_labware(
            &config.plate.definition,
            &DeckSlot::new(config.plate.slot.as_str()),
        )?;
        let trash = robot.load_trash_bin(&DeckSlot::new(config.trash.slot.as_str()))?;

        let mut pipettes = Vec::with_capacity(config.instruments.len());
        for (instrument, racks) in config.instruments.iter().zip(&tip_racks) {
            let mount = mount_of(instrument.mount);
            let id = robot.load_instrument(&instrument.model, mount, racks)?;
            debug!(
                event = "instrument_loaded",
                model = %instrument.model,
                mount = %mount,
                range = %instrument.volume_range(),
            );
            let label = format!("{} ({})", instrument.model, mount);
            pipettes.push(Pipette::new(id, label, instrument.volume_range()));
        }

        let mut sources = ReagentSources::new();
        for reagent in self.grid.reagents().iter() {
            let Some(source) = config.source_for(reagent) else {
                continue;
            };
            let well = WellRef::new(reservoir, source.well.clone());
            let liquid = robot.define_liquid(reagent.name())?;
            robot.load_liquid(&well, source.volume.into(), liquid)?;
            sources.insert(reagent.clone(), well);
        }

        let executor = Executor::new(pipettes, sources, plate, self.layout, trash)?
            .with_tip_handling(config.tip_handling);
        Ok(executor)
    }
}

fn load_tip_racks<R: Robot>(robot: &mut R, instrument: &InstrumentConfig) -> Result<Vec<LabwareId>> {
    let mut racks = Vec::with_capacity(instrument.tip_racks.len());
    for rack in &instrument.tip_racks {
        racks.push(robot.load_labware(&rack.definition, &DeckSlot::new(rack.slot.as_str()))?);
    }
    Ok(racks)
}

fn mount_of(mount: MountConfig) -> Mount {
    match mount {
        MountConfig::Left => Mount::Left,
        MountConfig::Right => Mount::Right,
    }
}

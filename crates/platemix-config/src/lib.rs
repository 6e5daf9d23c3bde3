//! Configuration system for PlateMix.
//!
//! Load a protocol description from TOML or YAML to change the deck layout,
//! mixture grid and instruments without code changes. Every field has a
//! default taken from the reference Flex protocol, so a file only needs to
//! name what it changes.
//!
//! # Examples
//!
//! Load configuration from TOML string:
//!
//! ```
//! use platemix_config::{ProtocolConfig, TipHandling};
//!
//! let config = ProtocolConfig::from_toml_str(r#"
//!     tip_handling = "delegated"
//!
//!     [mixtures]
//!     total_volume = 60
//!     step = 20
//!     reagents = ["Buffer", "Salt", "Dye"]
//!
//!     [[sources]]
//!     reagent = "Buffer"
//!     well = "A1"
//!     volume = 5000
//!
//!     [[sources]]
//!     reagent = "Salt"
//!     well = "A2"
//!     volume = 5000
//!
//!     [[sources]]
//!     reagent = "Dye"
//!     well = "A3"
//!     volume = 5000
//! "#).unwrap();
//!
//! assert_eq!(config.tip_handling, TipHandling::Delegated);
//! assert_eq!(config.mixture_grid().unwrap().mixture_count(), 10);
//! config.validate().unwrap();
//! ```
//!
//! Use the reference protocol when no file is present:
//!
//! ```
//! use platemix_config::ProtocolConfig;
//!
//! let config = ProtocolConfig::load("protocol.toml").unwrap_or_default();
//! assert_eq!(config.instruments.len(), 2);
//! ```

use std::collections::HashSet;
use std::path::Path;

use platemix_core::{
    MixtureGrid, PlateLayout, PlatemixError, Reagent, ReagentSet, Volume, VolumeRange, WellName,
    WellOrder,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Domain(#[from] PlatemixError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete description of a mixture-preparation run.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ProtocolConfig {
    /// Descriptive metadata reported to the robot.
    pub metadata: MetadataConfig,

    /// Mixture enumeration parameters.
    pub mixtures: MixtureConfig,

    /// Labware holding the reagent sources.
    pub reservoir: LabwareConfig,

    /// One source well per reagent.
    pub sources: Vec<SourceConfig>,

    /// Destination plate.
    pub plate: PlateConfig,

    /// Trash bin receiving used tips.
    pub trash: TrashConfig,

    /// Installed instruments and their volume ranges.
    pub instruments: Vec<InstrumentConfig>,

    /// How tips are managed around each transfer.
    pub tip_handling: TipHandling,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        ProtocolConfig {
            metadata: MetadataConfig::default(),
            mixtures: MixtureConfig::default(),
            reservoir: LabwareConfig::new("corning_12_wellplate_6.9ml_flat", "A2"),
            sources: vec![
                SourceConfig::new("Reagent_A", "A1", 6000),
                SourceConfig::new("Reagent_B", "A2", 6000),
                SourceConfig::new("Reagent_C", "A3", 6000),
            ],
            plate: PlateConfig::default(),
            trash: TrashConfig::default(),
            instruments: vec![
                InstrumentConfig {
                    model: "flex_1channel_50".to_string(),
                    mount: MountConfig::Right,
                    above: 0,
                    up_to: Some(50),
                    tip_racks: vec![
                        LabwareConfig::new("opentrons_flex_96_tiprack_50ul", "B2"),
                        LabwareConfig::new("opentrons_flex_96_tiprack_50ul", "C2"),
                    ],
                },
                InstrumentConfig {
                    model: "flex_1channel_1000".to_string(),
                    mount: MountConfig::Left,
                    above: 50,
                    up_to: None,
                    tip_racks: vec![
                        LabwareConfig::new("opentrons_flex_96_tiprack_1000ul", "B1"),
                        LabwareConfig::new("opentrons_flex_96_tiprack_1000ul", "C1"),
                    ],
                },
            ],
            tip_handling: TipHandling::default(),
        }
    }
}

impl ProtocolConfig {
    /// Creates the reference configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist or contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Sets the mixture total and step.
    pub fn with_mixture_grid(mut self, total_volume: u32, step: u32) -> Self {
        self.mixtures.total_volume = total_volume;
        self.mixtures.step = step;
        self
    }

    /// Sets the destination plate dimensions.
    pub fn with_plate_size(mut self, rows: usize, columns: usize) -> Self {
        self.plate.rows = rows;
        self.plate.columns = columns;
        self
    }

    /// Sets the tip handling mode.
    pub fn with_tip_handling(mut self, tip_handling: TipHandling) -> Self {
        self.tip_handling = tip_handling;
        self
    }

    /// Replaces the installed instruments.
    pub fn with_instruments(mut self, instruments: Vec<InstrumentConfig>) -> Self {
        self.instruments = instruments;
        self
    }

    /// Returns the reagents in component order.
    pub fn reagent_set(&self) -> Result<ReagentSet, ConfigError> {
        Ok(ReagentSet::new(self.mixtures.reagents.clone())?)
    }

    /// Returns the enumeration grid.
    pub fn mixture_grid(&self) -> Result<MixtureGrid, ConfigError> {
        Ok(MixtureGrid::new(
            Volume::new(self.mixtures.total_volume),
            Volume::new(self.mixtures.step),
            self.reagent_set()?,
        )?)
    }

    /// Returns the destination plate geometry.
    pub fn plate_layout(&self) -> Result<PlateLayout, ConfigError> {
        Ok(PlateLayout::new(
            self.plate.rows,
            self.plate.columns,
            self.plate.well_order,
        )?)
    }

    /// Returns the source configured for `reagent`, if any.
    pub fn source_for(&self, reagent: &Reagent) -> Option<&SourceConfig> {
        self.sources.iter().find(|s| s.reagent == reagent.name())
    }

    /// Checks every cross-field constraint of the configuration.
    ///
    /// Nothing is sent to the robot before this passes, so a misconfigured
    /// run fails without dispensing anything.
    ///
    /// # Errors
    ///
    /// - total volume not divisible by the step, or zero
    /// - duplicate or blank reagent names
    /// - missing, duplicate or unknown reagent sources
    /// - destination plate smaller than the number of mixtures
    /// - instrument ranges with a gap or an overlap
    /// - two instruments on one mount, or two items in one deck slot
    pub fn validate(&self) -> Result<(), ConfigError> {
        let grid = self.mixture_grid()?;
        let plate = self.plate_layout()?;

        if grid.mixture_count() > plate.capacity() {
            return Err(ConfigError::Invalid(format!(
                "{} mixtures do not fit on a plate with {} wells",
                grid.mixture_count(),
                plate.capacity()
            )));
        }

        self.validate_sources(grid.reagents())?;

        let ranges: Vec<VolumeRange> = self.instruments.iter().map(|i| i.volume_range()).collect();
        VolumeRange::check_partition(&ranges)?;

        let mut mounts = HashSet::new();
        for instrument in &self.instruments {
            if !mounts.insert(instrument.mount) {
                return Err(ConfigError::Invalid(format!(
                    "more than one instrument on the {:?} mount",
                    instrument.mount
                )));
            }
        }

        self.validate_deck_slots()
    }

    fn validate_sources(&self, reagents: &ReagentSet) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for source in &self.sources {
            if !reagents.contains(&Reagent::new(source.reagent.as_str())) {
                return Err(ConfigError::Invalid(format!(
                    "source for unknown reagent '{}'",
                    source.reagent
                )));
            }
            if !seen.insert(source.reagent.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "reagent '{}' has more than one source",
                    source.reagent
                )));
            }
        }
        for reagent in reagents.iter() {
            if !seen.contains(reagent.name()) {
                return Err(ConfigError::Invalid(format!(
                    "reagent '{}' has no source",
                    reagent
                )));
            }
        }
        Ok(())
    }

    fn validate_deck_slots(&self) -> Result<(), ConfigError> {
        let mut slots = HashSet::new();
        let all = [
            self.reservoir.slot.as_str(),
            self.plate.slot.as_str(),
            self.trash.slot.as_str(),
        ]
        .into_iter()
        .chain(
            self.instruments
                .iter()
                .flat_map(|i| i.tip_racks.iter().map(|r| r.slot.as_str())),
        );
        for slot in all {
            if !slots.insert(slot) {
                return Err(ConfigError::Invalid(format!(
                    "deck slot {} is used more than once",
                    slot
                )));
            }
        }
        Ok(())
    }
}

/// Protocol metadata.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct MetadataConfig {
    pub protocol_name: String,
    pub description: String,
    pub robot_type: String,
    pub api_level: String,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        MetadataConfig {
            protocol_name: "Demo OT Flex Protocol".to_string(),
            description: "Combinatorial three-reagent mixtures on the OT Flex".to_string(),
            robot_type: "Flex".to_string(),
            api_level: "2.23".to_string(),
        }
    }
}

/// Mixture enumeration parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct MixtureConfig {
    /// Volume of every mixture in microliters.
    pub total_volume: u32,

    /// Granularity of each component in microliters.
    pub step: u32,

    /// The three reagents, in component order.
    pub reagents: [String; 3],
}

impl Default for MixtureConfig {
    fn default() -> Self {
        MixtureConfig {
            total_volume: 100,
            step: 10,
            reagents: [
                "Reagent_A".to_string(),
                "Reagent_B".to_string(),
                "Reagent_C".to_string(),
            ],
        }
    }
}

/// A labware definition placed in a deck slot.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct LabwareConfig {
    /// Labware definition name.
    pub definition: String,

    /// Deck slot, e.g. `A2`.
    pub slot: String,
}

impl LabwareConfig {
    pub fn new(definition: impl Into<String>, slot: impl Into<String>) -> Self {
        LabwareConfig {
            definition: definition.into(),
            slot: slot.into(),
        }
    }
}

/// A reagent's source well in the reservoir.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SourceConfig {
    /// Reagent name, matching one of `mixtures.reagents`.
    pub reagent: String,

    /// Well in the reservoir holding the reagent.
    pub well: WellName,

    /// Initial volume loaded into the well, in microliters.
    pub volume: u32,
}

impl SourceConfig {
    pub fn new(reagent: impl Into<String>, well: &str, volume: u32) -> Self {
        SourceConfig {
            reagent: reagent.into(),
            well: WellName::from(well),
            volume,
        }
    }
}

/// Destination plate configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct PlateConfig {
    pub definition: String,
    pub slot: String,
    pub rows: usize,
    pub columns: usize,

    /// Order in which wells receive mixtures.
    pub well_order: WellOrder,
}

impl Default for PlateConfig {
    fn default() -> Self {
        PlateConfig {
            definition: "corning_96_wellplate_360ul_flat".to_string(),
            slot: "C3".to_string(),
            rows: 8,
            columns: 12,
            well_order: WellOrder::ColumnMajor,
        }
    }
}

/// Trash bin configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct TrashConfig {
    pub slot: String,
}

impl Default for TrashConfig {
    fn default() -> Self {
        TrashConfig {
            slot: "A3".to_string(),
        }
    }
}

/// Instrument mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MountConfig {
    Left,
    Right,
}

/// An installed instrument.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct InstrumentConfig {
    /// Instrument model name.
    pub model: String,

    /// Mount the instrument is installed on.
    pub mount: MountConfig,

    /// Exclusive lower bound of the handled volumes.
    #[serde(default)]
    pub above: u32,

    /// Inclusive upper bound of the handled volumes; unbounded when absent.
    #[serde(default)]
    pub up_to: Option<u32>,

    /// Tip racks the instrument draws from, in order.
    #[serde(default)]
    pub tip_racks: Vec<LabwareConfig>,
}

impl InstrumentConfig {
    /// Returns the volume range the instrument is recommended for.
    pub fn volume_range(&self) -> VolumeRange {
        VolumeRange::new(Volume::new(self.above), self.up_to.map(Volume::new))
    }
}

/// How tips are managed around each transfer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TipHandling {
    /// Pick up a tip, transfer, drop the tip: three separate robot calls.
    #[default]
    Explicit,

    /// A single transfer call in which the robot picks up and drops a fresh tip.
    Delegated,
}

#[cfg(test)]
mod tests;

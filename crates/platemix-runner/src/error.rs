//! Error types for protocol runs

use platemix_config::ConfigError;
use platemix_core::PlatemixError;
use platemix_robot::RobotError;
use thiserror::Error;

/// Reason a run stopped before placing every mixture.
///
/// No variant is recovered from locally: configuration problems surface
/// before the robot moves, and exhaustion or robot failures abort the run
/// with whatever was already dispensed left on the plate.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Domain(#[from] PlatemixError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Robot error: {0}")]
    Robot(#[from] RobotError),
}

/// Result type alias for protocol runs
pub type Result<T> = std::result::Result<T, RunError>;

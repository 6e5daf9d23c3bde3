//! Protocol entry points that hide deck setup and executor wiring.

use std::io::ErrorKind;
use std::path::Path;

use platemix_config::{ConfigError, ProtocolConfig};
use platemix_robot::Robot;
use platemix_runner::{Protocol, Result, RunEvent, RunReport};
use tokio::sync::mpsc;
use tracing::info;

/// File read by [`load_config`] when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "protocol.toml";

/// Loads a protocol configuration.
///
/// With an explicit path the file must exist. Without one,
/// [`DEFAULT_CONFIG_PATH`] is read if present and the reference protocol is
/// used otherwise. Files ending in `.yaml` or `.yml` are parsed as YAML.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not parse.
pub fn load_config(path: Option<&Path>) -> std::result::Result<ProtocolConfig, ConfigError> {
    let Some(path) = path else {
        return match ProtocolConfig::load(DEFAULT_CONFIG_PATH) {
            Err(ConfigError::Io(err)) if err.kind() == ErrorKind::NotFound => {
                Ok(ProtocolConfig::default())
            }
            other => other,
        };
    };

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml" | "yml") => ProtocolConfig::from_yaml_file(path),
        _ => ProtocolConfig::from_toml_file(path),
    }
}

/// Validates `config`, sets up the deck and places every mixture.
///
/// Nothing is sent to the robot unless the whole configuration is valid.
pub fn run_protocol<R: Robot>(config: ProtocolConfig, robot: &mut R) -> Result<RunReport> {
    #[cfg(feature = "console")]
    platemix_console::init();

    let protocol = Protocol::from_config(config)?;
    info!(
        event = "protocol_ready",
        mixtures = protocol.grid().mixture_count(),
    );
    protocol.run(robot)
}

/// Like [`run_protocol`], streaming [`RunEvent`]s through `sender`.
pub fn run_protocol_with_channel<R: Robot>(
    config: ProtocolConfig,
    robot: &mut R,
    sender: mpsc::UnboundedSender<RunEvent>,
) -> Result<RunReport> {
    #[cfg(feature = "console")]
    platemix_console::init();

    let protocol = Protocol::from_config(config)?;
    protocol.run_with_channel(robot, sender)
}

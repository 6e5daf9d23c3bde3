//! Flex Demo
//!
//! Runs the combinatorial mixture protocol against the dry-run robot and
//! prints each mixture as it is placed.
//!
//! ```text
//! cargo run -p flex-demo -- demos/flex-demo/protocol.toml
//! ```
//!
//! Without an argument, `protocol.toml` in the working directory is used if
//! present, otherwise the built-in reference protocol.

use std::path::PathBuf;
use std::process::ExitCode;

use platemix::prelude::*;

fn main() -> ExitCode {
    platemix::console::init();

    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = match load_config(path.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to load protocol: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let mut robot = DryRunRobot::new();
    match run_protocol(config, &mut robot) {
        Ok(report) => {
            println!(
                "\n{} mixtures placed, last well {}",
                report.mixtures_placed,
                report
                    .last_well
                    .as_ref()
                    .map_or("-", |well| well.as_str())
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Run failed: {}", err);
            ExitCode::FAILURE
        }
    }
}

//! Shared test fixtures for PlateMix crates.
//!
//! - [`recording`] - A robot that records every call and can inject faults
//! - [`fixtures`] - Mixture and volume-range builders
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! platemix-test = { workspace = true }
//! ```
//!
//! Then import the fixtures you need:
//!
//! ```ignore
//! use platemix_test::{mixture, Call, RecordingRobot};
//! ```

pub mod fixtures;
pub mod recording;

pub use fixtures::{low_high_ranges, mixture, HIGH_VOLUME, LOW_VOLUME};
pub use recording::{Call, RecordingRobot};

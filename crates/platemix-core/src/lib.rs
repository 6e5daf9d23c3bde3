//! PlateMix Core - domain types and mixture enumeration
//!
//! This crate provides the fundamental abstractions for PlateMix:
//! - Volume and reagent types
//! - Mixtures with a fixed total volume
//! - Destination plate layout and sequential well allocation
//! - The combinatorial mixture enumerator

pub mod domain;
pub mod enumerate;
pub mod error;


pub use domain::{
    Component, Mixture, PlateLayout, Reagent, ReagentSet, Volume, VolumeRange, WellAllocator,
    WellName, WellOrder,
};
pub use enumerate::{enumerate_mixtures, MixtureGrid, MixtureIter};
pub use error::{PlatemixError, Result};

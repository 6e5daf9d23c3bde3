//! Reagent source locations.

use std::collections::HashMap;

use platemix_core::{PlatemixError, Reagent, Result};
use platemix_robot::WellRef;

/// Where each reagent is drawn from. Fixed for the duration of a run.
#[derive(Debug, Clone, Default)]
pub struct ReagentSources {
    wells: HashMap<Reagent, WellRef>,
}

impl ReagentSources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the source well of `reagent`, replacing any previous one.
    pub fn insert(&mut self, reagent: Reagent, well: WellRef) {
        self.wells.insert(reagent, well);
    }

    /// Returns the source well of `reagent`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the reagent has no source.
    pub fn get(&self, reagent: &Reagent) -> Result<&WellRef> {
        self.wells.get(reagent).ok_or_else(|| {
            PlatemixError::Config(format!("reagent '{}' has no source", reagent))
        })
    }

    pub fn len(&self) -> usize {
        self.wells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wells.is_empty()
    }
}

impl FromIterator<(Reagent, WellRef)> for ReagentSources {
    fn from_iter<I: IntoIterator<Item = (Reagent, WellRef)>>(iter: I) -> Self {
        ReagentSources {
            wells: iter.into_iter().collect(),
        }
    }
}

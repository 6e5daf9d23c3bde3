use std::collections::HashSet;
use std::fmt;

use crate::error::{PlatemixError, Result};

/// A named fluid supplied from a fixed source location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Reagent(String);

impl Reagent {
    /// Creates a reagent with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Reagent(name.into())
    }

    /// Returns the reagent name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Reagent {
    fn from(name: &str) -> Self {
        Reagent::new(name)
    }
}

impl From<String> for Reagent {
    fn from(name: String) -> Self {
        Reagent(name)
    }
}

impl fmt::Display for Reagent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The three reagents combined in every mixture, in component order.
///
/// # Example
///
/// ```
/// use platemix_core::ReagentSet;
///
/// let reagents = ReagentSet::new(["Reagent_A", "Reagent_B", "Reagent_C"]).unwrap();
/// assert_eq!(reagents.names()[1].name(), "Reagent_B");
///
/// assert!(ReagentSet::new(["A", "A", "B"]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReagentSet([Reagent; 3]);

impl ReagentSet {
    /// Creates a reagent set, rejecting empty or repeated names.
    pub fn new<R: Into<Reagent>>(names: [R; 3]) -> Result<Self> {
        let names = names.map(Into::into);
        let mut seen = HashSet::new();
        for reagent in &names {
            if reagent.name().trim().is_empty() {
                return Err(PlatemixError::Config(
                    "reagent names must not be empty".to_string(),
                ));
            }
            if !seen.insert(reagent.name()) {
                return Err(PlatemixError::Config(format!(
                    "reagent '{}' is listed more than once",
                    reagent
                )));
            }
        }
        Ok(ReagentSet(names))
    }

    /// Returns the reagents in component order.
    pub fn names(&self) -> &[Reagent; 3] {
        &self.0
    }

    /// Iterates over the reagents in component order.
    pub fn iter(&self) -> impl Iterator<Item = &Reagent> {
        self.0.iter()
    }

    /// Returns true if `reagent` belongs to the set.
    pub fn contains(&self, reagent: &Reagent) -> bool {
        self.0.contains(reagent)
    }
}

impl Default for ReagentSet {
    fn default() -> Self {
        ReagentSet([
            Reagent::new("Reagent_A"),
            Reagent::new("Reagent_B"),
            Reagent::new("Reagent_C"),
        ])
    }
}

use std::fmt;

use super::{Reagent, ReagentSet, Volume};

/// One reagent's share of a mixture.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Component {
    pub reagent: Reagent,
    pub volume: Volume,
}

/// A combination of three reagent volumes.
///
/// Components keep the order of the [`ReagentSet`] they were built from;
/// transfers for a mixture are issued in that order.
///
/// # Example
///
/// ```
/// use platemix_core::{Mixture, ReagentSet, Volume};
///
/// let reagents = ReagentSet::default();
/// let mixture = Mixture::new(&reagents, [Volume::new(60), Volume::new(40), Volume::ZERO]);
///
/// assert_eq!(mixture.total(), Volume::new(100));
/// assert_eq!(mixture.nonzero().count(), 2);
/// assert_eq!(
///     mixture.to_string(),
///     "{Reagent_A: 60, Reagent_B: 40, Reagent_C: 0}"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mixture {
    components: [Component; 3],
}

impl Mixture {
    /// Creates a mixture pairing each reagent with its volume.
    pub fn new(reagents: &ReagentSet, volumes: [Volume; 3]) -> Self {
        let [a, b, c] = reagents.names();
        let [va, vb, vc] = volumes;
        Mixture {
            components: [
                Component { reagent: a.clone(), volume: va },
                Component { reagent: b.clone(), volume: vb },
                Component { reagent: c.clone(), volume: vc },
            ],
        }
    }

    /// Returns the components in reagent order.
    pub fn components(&self) -> &[Component; 3] {
        &self.components
    }

    /// Iterates over all components, including empty ones.
    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.components.iter()
    }

    /// Iterates over the components that require a transfer.
    pub fn nonzero(&self) -> impl Iterator<Item = &Component> {
        self.components.iter().filter(|c| !c.volume.is_zero())
    }

    /// Returns the volume of `reagent`, or `None` if it is not part of the mixture.
    pub fn volume_of(&self, reagent: &Reagent) -> Option<Volume> {
        self.components
            .iter()
            .find(|c| &c.reagent == reagent)
            .map(|c| c.volume)
    }

    /// Returns the sum of all component volumes.
    pub fn total(&self) -> Volume {
        self.components.iter().map(|c| c.volume).sum()
    }
}

impl fmt::Display for Mixture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, component) in self.components.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", component.reagent, component.volume)?;
        }
        f.write_str("}")
    }
}

//! Per-mixture transfer planning.

use platemix_core::{Mixture, Reagent, Volume};
use smallvec::SmallVec;

use crate::route::{InstrumentRouter, InstrumentSlot};

/// One reagent transfer into a mixture's well.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedTransfer {
    pub reagent: Reagent,
    pub volume: Volume,
    pub instrument: InstrumentSlot,
}

/// Transfers for a single mixture, in component order.
pub type MixturePlan = SmallVec<[PlannedTransfer; 3]>;

/// Lists the transfers needed for `mixture`.
///
/// Zero-volume components produce no entry. The result depends only on the
/// mixture and the router, so the assignment policy can be checked without
/// a robot.
pub fn plan_mixture(mixture: &Mixture, router: &InstrumentRouter) -> MixturePlan {
    mixture
        .iter()
        .filter_map(|component| {
            router
                .select_instrument(component.volume)
                .map(|instrument| PlannedTransfer {
                    reagent: component.reagent.clone(),
                    volume: component.volume,
                    instrument,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use platemix_core::{ReagentSet, VolumeRange};

    use super::*;

    const LOW: InstrumentSlot = InstrumentSlot(0);
    const HIGH: InstrumentSlot = InstrumentSlot(1);

    fn router() -> InstrumentRouter {
        InstrumentRouter::new(&[
            VolumeRange::new(Volume::ZERO, Some(Volume::new(50))),
            VolumeRange::new(Volume::new(50), None),
        ])
        .unwrap()
    }

    fn mixture(a: u32, b: u32, c: u32) -> Mixture {
        Mixture::new(
            &ReagentSet::default(),
            [Volume::new(a), Volume::new(b), Volume::new(c)],
        )
    }

    fn summary(plan: &MixturePlan) -> Vec<(&str, u32, InstrumentSlot)> {
        plan.iter()
            .map(|t| (t.reagent.name(), t.volume.microliters(), t.instrument))
            .collect()
    }

    #[test]
    fn test_single_component_goes_high() {
        let plan = plan_mixture(&mixture(0, 0, 100), &router());
        assert_eq!(summary(&plan), vec![("Reagent_C", 100, HIGH)]);
        assert!(!plan.spilled());
    }

    #[test]
    fn test_even_split_goes_low() {
        let plan = plan_mixture(&mixture(50, 50, 0), &router());
        assert_eq!(
            summary(&plan),
            vec![("Reagent_A", 50, LOW), ("Reagent_B", 50, LOW)]
        );
    }

    #[test]
    fn test_uneven_split_uses_both() {
        let plan = plan_mixture(&mixture(60, 40, 0), &router());
        assert_eq!(
            summary(&plan),
            vec![("Reagent_A", 60, HIGH), ("Reagent_B", 40, LOW)]
        );
    }

    #[test]
    fn test_three_components_keep_order() {
        let plan = plan_mixture(&mixture(10, 20, 70), &router());
        assert_eq!(
            summary(&plan),
            vec![
                ("Reagent_A", 10, LOW),
                ("Reagent_B", 20, LOW),
                ("Reagent_C", 70, HIGH),
            ]
        );
    }
}

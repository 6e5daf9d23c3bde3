//! Tests for the executor.

use platemix_config::TipHandling;
use platemix_core::{
    Mixture, MixtureGrid, PlateLayout, PlatemixError, ReagentSet, Volume, WellOrder,
};
use platemix_robot::{DeckSlot, InstrumentId, LabwareId, Mount, Robot, RobotError, TipPolicy, WellRef};
use platemix_test::{low_high_ranges, mixture, Call, RecordingRobot};
use tokio::sync::mpsc;

use super::*;

struct Rig {
    robot: RecordingRobot,
    executor: Executor,
    low: InstrumentId,
    high: InstrumentId,
    reservoir: LabwareId,
    plate: LabwareId,
}

fn rig_with(robot: RecordingRobot, layout: PlateLayout) -> Rig {
    rig_with_sources(robot, layout, &["A1", "A2", "A3"])
}

/// Registers sources for the first `wells.len()` reagents only.
fn rig_with_sources(mut robot: RecordingRobot, layout: PlateLayout, wells: &[&str]) -> Rig {
    let reservoir = robot.load_labware("reservoir", &DeckSlot::from("A2")).unwrap();
    let plate = robot.load_labware("plate", &DeckSlot::from("C3")).unwrap();
    let trash = robot.load_trash_bin(&DeckSlot::from("A3")).unwrap();
    let low = robot.load_instrument("p50", Mount::Right, &[]).unwrap();
    let high = robot.load_instrument("p1000", Mount::Left, &[]).unwrap();

    let [low_range, high_range] = low_high_ranges();
    let pipettes = vec![
        Pipette::new(low, "p50", low_range),
        Pipette::new(high, "p1000", high_range),
    ];
    let sources: ReagentSources = ReagentSet::default()
        .iter()
        .zip(wells)
        .map(|(reagent, well)| (reagent.clone(), WellRef::new(reservoir, *well)))
        .collect();

    let executor = Executor::new(pipettes, sources, plate, layout, trash).unwrap();
    Rig {
        robot,
        executor,
        low,
        high,
        reservoir,
        plate,
    }
}

fn rig() -> Rig {
    rig_with(RecordingRobot::new(), PlateLayout::standard_96())
}

fn reference_mixtures() -> Vec<Mixture> {
    MixtureGrid::new(Volume::new(100), Volume::new(10), ReagentSet::default())
        .unwrap()
        .enumerate()
}

/// Calls made after deck setup.
fn run_calls(robot: &RecordingRobot) -> &[Call] {
    let first = robot
        .calls()
        .iter()
        .position(|c| matches!(c, Call::Comment(_)))
        .unwrap_or(robot.calls().len());
    &robot.calls()[first..]
}

fn assert_tip_discipline(calls: &[Call]) {
    for (i, call) in calls.iter().enumerate() {
        if let Call::Transfer { instrument, .. } = call {
            let before = i.checked_sub(1).and_then(|j| calls.get(j));
            assert_eq!(before, Some(&Call::PickUpTip(*instrument)), "call {}", i);
            assert_eq!(calls.get(i + 1), Some(&Call::DropTip(*instrument)), "call {}", i);
        }
    }
}

#[test]
fn test_single_reagent_uses_high_volume_instrument() {
    let mut rig = rig();
    rig.executor
        .run(&mut rig.robot, &[mixture(0, 0, 100)])
        .unwrap();

    let transfers = rig.robot.transfers();
    assert_eq!(transfers.len(), 1);
    let (instrument, volume, source, dest) = transfers[0];
    assert_eq!(instrument, rig.high);
    assert_eq!(volume, Volume::new(100));
    assert_eq!(source, &WellRef::new(rig.reservoir, "A3"));
    assert_eq!(dest, &WellRef::new(rig.plate, "A1"));
}

#[test]
fn test_even_split_uses_low_volume_instrument_twice() {
    let mut rig = rig();
    rig.executor
        .run(&mut rig.robot, &[mixture(50, 50, 0)])
        .unwrap();

    let transfers = rig.robot.transfers();
    assert_eq!(transfers.len(), 2);
    for (instrument, volume, _, _) in &transfers {
        assert_eq!(*instrument, rig.low);
        assert_eq!(*volume, Volume::new(50));
    }
    assert_eq!(transfers[0].2, &WellRef::new(rig.reservoir, "A1"));
    assert_eq!(transfers[1].2, &WellRef::new(rig.reservoir, "A2"));
}

#[test]
fn test_uneven_split_uses_both_instruments() {
    let mut rig = rig();
    let report = rig
        .executor
        .run(&mut rig.robot, &[mixture(60, 40, 0)])
        .unwrap();

    let transfers = rig.robot.transfers();
    assert_eq!(transfers.len(), 2);
    assert_eq!((transfers[0].0, transfers[0].1), (rig.high, Volume::new(60)));
    assert_eq!((transfers[1].0, transfers[1].1), (rig.low, Volume::new(40)));
    assert_eq!(report.transfers_by_instrument, vec![1, 1]);
}

#[test]
fn test_zero_components_make_no_calls() {
    let mut rig = rig();
    rig.executor
        .run(&mut rig.robot, &[mixture(0, 0, 100)])
        .unwrap();

    assert_eq!(
        run_calls(&rig.robot),
        &[
            Call::Comment("0, {Reagent_A: 0, Reagent_B: 0, Reagent_C: 100}".to_string()),
            Call::PickUpTip(rig.high),
            Call::Transfer {
                instrument: rig.high,
                volume: Volume::new(100),
                source: WellRef::new(rig.reservoir, "A3"),
                dest: WellRef::new(rig.plate, "A1"),
                tip_policy: TipPolicy::Never,
            },
            Call::DropTip(rig.high),
        ]
    );
}

#[test]
fn test_reference_run_tip_discipline() {
    let mut rig = rig();
    let mixtures = reference_mixtures();
    let report = rig.executor.run(&mut rig.robot, &mixtures).unwrap();

    let calls = run_calls(&rig.robot);
    assert_tip_discipline(calls);

    let picks = rig.robot.count(|c| matches!(c, Call::PickUpTip(_)));
    let drops = rig.robot.count(|c| matches!(c, Call::DropTip(_)));
    let transfers = rig.robot.transfers().len();
    assert_eq!(picks, transfers);
    assert_eq!(drops, transfers);

    // 66 mixtures with 3 components, minus the empty ones.
    let nonzero: usize = mixtures.iter().map(|m| m.nonzero().count()).sum();
    assert_eq!(transfers, nonzero);
    assert_eq!(report.transfers, nonzero);
    assert_eq!(report.mixtures_placed, 66);
    // Volumes above 50 occur 15 times per reagent.
    assert_eq!(report.transfers_by_instrument[1], 45);
    assert!(rig.executor.pipettes().iter().all(|p| !p.has_tip()));
}

#[test]
fn test_wells_assigned_in_order() {
    let mut rig = rig();
    let mixtures = reference_mixtures();
    let report = rig.executor.run(&mut rig.robot, &mixtures).unwrap();

    let comments = rig.robot.comments();
    assert_eq!(comments.len(), 66);
    for (i, (comment, mixture)) in comments.iter().zip(&mixtures).enumerate() {
        assert_eq!(*comment, format!("{}, {}", i, mixture));
    }

    let layout = PlateLayout::standard_96();
    let mut expected_well = 0;
    let mut last_dest: Option<&WellRef> = None;
    for (_, _, _, dest) in rig.robot.transfers() {
        if last_dest != Some(dest) {
            // Mixture 0 is {0, 0, 100}; every mixture has at least one transfer.
            assert_eq!(dest.well, layout.well_name(expected_well).unwrap());
            expected_well += 1;
            last_dest = Some(dest);
        }
    }
    assert_eq!(expected_well, 66);
    assert_eq!(report.last_well, layout.well_name(65));
    assert_eq!(rig.executor.wells_remaining(), 30);
}

#[test]
fn test_comment_precedes_mixture_transfers() {
    let mut rig = rig();
    rig.executor
        .run(&mut rig.robot, &[mixture(10, 20, 70), mixture(100, 0, 0)])
        .unwrap();

    let calls = run_calls(&rig.robot);
    let kinds: Vec<&str> = calls
        .iter()
        .map(|c| match c {
            Call::Comment(_) => "comment",
            Call::PickUpTip(_) => "pick",
            Call::Transfer { .. } => "transfer",
            Call::DropTip(_) => "drop",
            _ => "other",
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            "comment", "pick", "transfer", "drop", "pick", "transfer", "drop", "pick", "transfer",
            "drop", "comment", "pick", "transfer", "drop",
        ]
    );
}

#[test]
fn test_exhausted_plate_stops_before_overflow_mixture() {
    let layout = PlateLayout::new(2, 2, WellOrder::ColumnMajor).unwrap();
    let mut rig = rig_with(RecordingRobot::new(), layout);
    let mixtures: Vec<Mixture> = reference_mixtures().into_iter().take(6).collect();

    let err = rig.executor.run(&mut rig.robot, &mixtures).unwrap_err();
    assert!(matches!(
        err,
        RunError::Domain(PlatemixError::WellsExhausted {
            mixture_index: 4,
            capacity: 4
        })
    ));

    let comments = rig.robot.comments();
    assert_eq!(comments.len(), 4);
    assert!(comments[3].starts_with("3, "));

    let last_dest = rig.robot.transfers().last().map(|t| t.3.well.to_string());
    assert_eq!(last_dest.as_deref(), Some("B2"));
    assert!(matches!(rig.robot.calls().last(), Some(Call::DropTip(_))));
}

#[test]
fn test_leftover_tip_released_before_run() {
    let robot = RecordingRobot::new().with_tip_attached(Mount::Right);
    let mut rig = rig_with(robot, PlateLayout::standard_96());
    assert!(rig.robot.holds_tip(rig.low));

    rig.executor
        .run(&mut rig.robot, &[mixture(50, 50, 0)])
        .unwrap();

    let calls = rig.robot.calls();
    let first_comment = calls
        .iter()
        .position(|c| matches!(c, Call::Comment(_)))
        .unwrap();
    assert_eq!(calls[first_comment - 1], Call::DropTip(rig.low));
    assert_tip_discipline(run_calls(&rig.robot));
}

#[test]
fn test_prepare_reports_released_tips() {
    let robot = RecordingRobot::new()
        .with_tip_attached(Mount::Right)
        .with_tip_attached(Mount::Left);
    let mut rig = rig_with(robot, PlateLayout::standard_96());

    assert_eq!(rig.executor.prepare(&mut rig.robot).unwrap(), 2);
    assert_eq!(rig.executor.prepare(&mut rig.robot).unwrap(), 0);
    assert!(!rig.robot.holds_tip(rig.low));
    assert!(!rig.robot.holds_tip(rig.high));
}

#[test]
fn test_failed_transfer_still_drops_tip() {
    let robot = RecordingRobot::new().fail_transfer_at(1);
    let mut rig = rig_with(robot, PlateLayout::standard_96());

    let err = rig
        .executor
        .run(&mut rig.robot, &[mixture(10, 20, 70), mixture(0, 0, 100)])
        .unwrap_err();
    assert!(matches!(err, RunError::Robot(RobotError::Hardware(_))));

    // First transfer completed, second failed with its tip dropped, nothing after.
    assert_eq!(rig.robot.transfers().len(), 1);
    assert_eq!(rig.robot.calls().last(), Some(&Call::DropTip(rig.low)));
    assert!(!rig.robot.holds_tip(rig.low));
    assert!(rig.executor.pipettes().iter().all(|p| !p.has_tip()));
    assert_eq!(rig.robot.comments().len(), 1);
}

#[test]
fn test_failed_pick_up_aborts_without_transfer() {
    let robot = RecordingRobot::new().fail_pick_up_at(0);
    let mut rig = rig_with(robot, PlateLayout::standard_96());

    let err = rig
        .executor
        .run(&mut rig.robot, &[mixture(60, 40, 0)])
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Robot error: hardware error: tip pick-up failed"
    );
    assert!(rig.robot.transfers().is_empty());
}

#[test]
fn test_delegated_tip_handling() {
    let mut rig = rig();
    rig.executor = rig.executor.with_tip_handling(TipHandling::Delegated);
    rig.executor
        .run(&mut rig.robot, &[mixture(60, 40, 0)])
        .unwrap();

    assert_eq!(rig.robot.count(|c| matches!(c, Call::PickUpTip(_))), 0);
    assert_eq!(rig.robot.count(|c| matches!(c, Call::DropTip(_))), 0);
    let policies: Vec<TipPolicy> = rig
        .robot
        .calls()
        .iter()
        .filter_map(|c| match c {
            Call::Transfer { tip_policy, .. } => Some(*tip_policy),
            _ => None,
        })
        .collect();
    assert_eq!(policies, vec![TipPolicy::Always, TipPolicy::Always]);
}

#[test]
fn test_events_streamed_in_order() {
    let mut rig = rig();
    let (sender, mut receiver) = mpsc::unbounded_channel();
    rig.executor
        .run_with_channel(&mut rig.robot, &[mixture(60, 40, 0)], sender)
        .unwrap();

    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }

    assert_eq!(events.len(), 5);
    assert_eq!(
        events[0],
        RunEvent::RunStarted {
            mixture_count: 1,
            well_capacity: 96
        }
    );
    assert!(matches!(
        &events[1],
        RunEvent::MixtureStarted { index: 0, well, .. } if well.as_str() == "A1"
    ));
    assert!(matches!(
        &events[2],
        RunEvent::TransferCompleted { instrument, .. } if instrument == "p1000"
    ));
    assert!(matches!(
        &events[3],
        RunEvent::TransferCompleted { instrument, .. } if instrument == "p50"
    ));
    assert!(matches!(
        &events[4],
        RunEvent::RunCompleted(report) if report.mixtures_placed == 1 && report.transfers == 2
    ));
}

#[test]
fn test_abort_event_on_exhaustion() {
    let layout = PlateLayout::new(1, 1, WellOrder::RowMajor).unwrap();
    let mut rig = rig_with(RecordingRobot::new(), layout);
    let (sender, mut receiver) = mpsc::unbounded_channel();

    let result = rig.executor.run_with_channel(
        &mut rig.robot,
        &[mixture(0, 0, 100), mixture(0, 10, 90)],
        sender,
    );
    assert!(result.is_err());

    let mut last = None;
    while let Ok(event) = receiver.try_recv() {
        last = Some(event);
    }
    assert!(matches!(last, Some(RunEvent::RunAborted { index: 1, .. })));
}

#[test]
fn test_dropped_receiver_does_not_affect_run() {
    let mut rig = rig();
    let (sender, receiver) = mpsc::unbounded_channel();
    drop(receiver);

    let report = rig
        .executor
        .run_with_channel(&mut rig.robot, &[mixture(50, 50, 0)], sender)
        .unwrap();
    assert_eq!(report.transfers, 2);
}

#[test]
fn test_missing_source_fails_before_any_robot_call() {
    let mut rig = rig_with_sources(RecordingRobot::new(), PlateLayout::standard_96(), &["A1"]);
    let setup_calls = rig.robot.calls().len();

    let err = rig
        .executor
        .run(&mut rig.robot, &[mixture(100, 0, 0), mixture(60, 40, 0)])
        .unwrap_err();
    assert!(matches!(
        err,
        RunError::Domain(PlatemixError::Config(ref message)) if message == "reagent 'Reagent_B' has no source"
    ));
    assert_eq!(rig.robot.calls().len(), setup_calls);
    assert_eq!(rig.executor.wells_remaining(), 96);
}

#[test]
fn test_unused_reagent_needs_no_source() {
    let mut rig =
        rig_with_sources(RecordingRobot::new(), PlateLayout::standard_96(), &["A1", "A2"]);
    let report = rig
        .executor
        .run(&mut rig.robot, &[mixture(60, 40, 0), mixture(0, 100, 0)])
        .unwrap();
    assert_eq!(report.transfers, 3);
}

//! Signal-program rewriting and inspection against a scripted simulator

mod common;

use common::{four_phase_program, FakeSim};
use proptest::prelude::*;
use signal_tuner::simulation::{
    retime_green_phases, AlternatingGreen, ControlPointId, GreenDurationPolicy, Phase, Session,
    SignalClass, SignalProgramEditor, SimError, TimingProgram,
};

fn durations(program: &TimingProgram) -> Vec<f64> {
    program.phases.iter().map(|p| p.duration).collect()
}

fn programs_of(sim: &FakeSim, id: &str) -> Vec<TimingProgram> {
    sim.control_points
        .iter()
        .find(|(cp, _)| cp.as_str() == id)
        .map(|(_, programs)| programs.clone())
        .expect("control point exists")
}

#[test]
fn test_phase_classification() {
    assert_eq!(SignalClass::of("GGrr"), SignalClass::Green);
    assert_eq!(SignalClass::of("rrgg"), SignalClass::Green);
    assert_eq!(SignalClass::of("yyrr"), SignalClass::Yellow);
    assert_eq!(SignalClass::of("rrYY"), SignalClass::Yellow);
    assert_eq!(SignalClass::of("rrrr"), SignalClass::Red);
    assert_eq!(SignalClass::of(""), SignalClass::Red);
    // Green takes precedence over yellow in mixed states
    assert_eq!(SignalClass::of("Gyrr"), SignalClass::Green);
}

#[test]
fn test_alternating_policy_depends_only_on_rank_parity() {
    let policy = AlternatingGreen::default();
    for rank in [0, 2, 4, 100] {
        assert_eq!(policy.target_duration(rank), 50.0);
    }
    for rank in [1, 3, 5, 101] {
        assert_eq!(policy.target_duration(rank), 80.0);
    }
}

#[test]
fn test_canonical_program_at_even_rank() {
    let sim = FakeSim::new().with_control_point("J0", vec![four_phase_program("0")]);
    let log = sim.log();
    let mut session = Session::open(sim);

    let summary = SignalProgramEditor::new(AlternatingGreen::default())
        .rewrite_all_programs(&mut session)
        .expect("rewrite should succeed");

    assert_eq!(summary.phases_changed(&ControlPointId::new("J0")), Some(2));
    let log = log.borrow();
    assert_eq!(log.set_programs.len(), 1);
    assert_eq!(durations(&log.set_programs[0].1), vec![50.0, 4.0, 50.0, 4.0]);
}

#[test]
fn test_four_control_points_alternate_targets() {
    let sim = FakeSim::new()
        .with_control_point("a", vec![four_phase_program("0")])
        .with_control_point("b", vec![four_phase_program("0")])
        .with_control_point("c", vec![four_phase_program("0")])
        .with_control_point("d", vec![four_phase_program("0")]);
    let log = sim.log();
    let mut session = Session::open(sim);

    let summary = SignalProgramEditor::new(AlternatingGreen::default())
        .rewrite_all_programs(&mut session)
        .expect("rewrite should succeed");

    let targets: Vec<f64> = summary.rewrites.iter().map(|r| r.target_duration).collect();
    assert_eq!(targets, vec![50.0, 80.0, 50.0, 80.0]);
    assert_eq!(summary.total_phases_changed(), 8);

    let log = log.borrow();
    let written: Vec<(&str, Vec<f64>)> = log
        .set_programs
        .iter()
        .map(|(id, p)| (id.as_str(), durations(p)))
        .collect();
    assert_eq!(
        written,
        vec![
            ("a", vec![50.0, 4.0, 50.0, 4.0]),
            ("b", vec![80.0, 4.0, 80.0, 4.0]),
            ("c", vec![50.0, 4.0, 50.0, 4.0]),
            ("d", vec![80.0, 4.0, 80.0, 4.0]),
        ]
    );
}

#[test]
fn test_only_first_program_is_rewritten() {
    let mut alternative = four_phase_program("night");
    alternative.phases[0].duration = 12.0;
    let sim = FakeSim::new()
        .with_control_point("J0", vec![four_phase_program("day"), alternative]);
    let log = sim.log();
    let mut session = Session::open(sim);

    let summary = SignalProgramEditor::new(AlternatingGreen::default())
        .rewrite_all_programs(&mut session)
        .expect("rewrite should succeed");

    assert_eq!(summary.rewrites[0].program_id, "day");
    let log = log.borrow();
    assert_eq!(log.set_programs.len(), 1);
    assert_eq!(log.set_programs[0].1.program_id, "day");
}

#[test]
fn test_rewrite_is_idempotent() {
    let sim = FakeSim::new()
        .with_control_point("a", vec![four_phase_program("0")])
        .with_control_point("b", vec![four_phase_program("0")]);
    let editor = SignalProgramEditor::new(AlternatingGreen::default());

    let mut session = Session::open(sim);
    editor.rewrite_all_programs(&mut session).expect("first pass");
    let after_once: Vec<TimingProgram> = {
        let control = session.control().expect("session open");
        vec![programs_of(control, "a")[0].clone(), programs_of(control, "b")[0].clone()]
    };

    editor.rewrite_all_programs(&mut session).expect("second pass");
    let control = session.control().expect("session open");
    let after_twice = vec![programs_of(control, "a")[0].clone(), programs_of(control, "b")[0].clone()];

    assert_eq!(after_once, after_twice);
}

#[test]
fn test_custom_policy_replaces_alternation() {
    let sim = FakeSim::new()
        .with_control_point("a", vec![four_phase_program("0")])
        .with_control_point("b", vec![four_phase_program("0")]);
    let log = sim.log();
    let mut session = Session::open(sim);

    let editor = SignalProgramEditor::new(|rank: usize| 20.0 + rank as f64);
    editor
        .rewrite_all_programs(&mut session)
        .expect("rewrite should succeed");

    let log = log.borrow();
    assert_eq!(durations(&log.set_programs[0].1), vec![20.0, 4.0, 20.0, 4.0]);
    assert_eq!(durations(&log.set_programs[1].1), vec![21.0, 4.0, 21.0, 4.0]);
}

#[test]
fn test_control_point_without_program_fails() {
    let sim = FakeSim::new()
        .with_control_point("a", vec![four_phase_program("0")])
        .with_control_point("empty", Vec::new());
    let mut session = Session::open(sim);

    let err = SignalProgramEditor::new(AlternatingGreen::default())
        .rewrite_all_programs(&mut session)
        .expect_err("empty control point must not be skipped");

    match err {
        SimError::NoActiveProgram { control_point } => assert_eq!(control_point, "empty"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_rewrite_after_close_is_not_ready() {
    let sim = FakeSim::new().with_control_point("a", vec![four_phase_program("0")]);
    let mut session = Session::open(sim);
    session.close().expect("close should succeed");

    let err = SignalProgramEditor::new(AlternatingGreen::default())
        .rewrite_all_programs(&mut session)
        .expect_err("closed session");
    assert!(matches!(err, SimError::SessionNotReady));
}

#[test]
fn test_inspect_reports_cycle_and_markers_without_writing() {
    let sim = FakeSim::new().with_control_point("J7", vec![four_phase_program("0")]);
    let log = sim.log();
    let mut session = Session::open(sim);

    let inspections = SignalProgramEditor::new(AlternatingGreen::default())
        .inspect_programs(&mut session)
        .expect("inspection should succeed");

    assert_eq!(inspections.len(), 1);
    let inspection = &inspections[0];
    assert_eq!(inspection.control_point.as_str(), "J7");
    assert_eq!(inspection.cycle_time, 68.0);
    let modifiable: Vec<bool> = inspection.phases.iter().map(|p| p.is_modifiable()).collect();
    assert_eq!(modifiable, vec![true, false, true, false]);
    assert!(log.borrow().set_programs.is_empty());
}

fn state_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec(prop::sample::select(vec!['G', 'g', 'y', 'Y', 'r', 's', 'u']), 1..8)
        .prop_map(|chars| chars.into_iter().collect())
}

fn phases_strategy() -> impl Strategy<Value = Vec<Phase>> {
    proptest::collection::vec((1.0f64..120.0, state_strategy()), 0..12).prop_map(|phases| {
        phases
            .into_iter()
            .map(|(duration, state)| Phase::new(duration, state))
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_only_green_phases_change(phases in phases_strategy(), target in 1.0f64..200.0) {
        let original = TimingProgram::new("0", phases);
        let mut program = original.clone();
        let changed = retime_green_phases(&mut program, target);

        let greens = original.phases.iter().filter(|p| p.class().is_green()).count();
        prop_assert_eq!(changed, greens);
        for (before, after) in original.phases.iter().zip(&program.phases) {
            if before.class().is_green() {
                prop_assert_eq!(after.duration, target);
            } else {
                prop_assert_eq!(after.duration, before.duration);
            }
            prop_assert_eq!(&after.state, &before.state);
        }
    }

    #[test]
    fn prop_retiming_twice_equals_once(phases in phases_strategy(), target in 1.0f64..200.0) {
        let mut once = TimingProgram::new("0", phases);
        retime_green_phases(&mut once, target);
        let mut twice = once.clone();
        retime_green_phases(&mut twice, target);
        prop_assert_eq!(once, twice);
    }
}

//! Smoke tests for the cvt-app service layer.

mod common;

use cvt_app::{
    RampSelector, SweepParameter, force_report, init_project, load_project, run_sweep,
    sample_ramp, simulate_project, validate_project,
};
use cvt_sim::Termination;

#[test]
fn init_writes_a_loadable_reference_project() {
    let dir = std::env::temp_dir().join("cvt_app_init");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("baja.yaml");

    let written = init_project(&path, "Baja", false).unwrap();
    let loaded = load_project(&path).unwrap();
    assert_eq!(written, loaded);
    validate_project(&loaded).unwrap();

    assert!(init_project(&path, "Baja", false).is_err());
    init_project(&path, "Baja again", true).unwrap();
    assert_eq!(load_project(&path).unwrap().name, "Baja again");
}

#[test]
fn reference_launch_accelerates_and_shifts() {
    let project = common::short_project("Launch", 3.0);
    let (engine, record) = simulate_project(&project, |_| {}).unwrap();

    assert_eq!(record.termination, Termination::Completed);
    let first = record.x.first().unwrap();
    let last = record.final_state().unwrap();
    assert!(last.vehicle_velocity > first.vehicle_velocity);
    assert!(last.vehicle_position > 0.0);

    let max = engine.limits().max_shift;
    assert!(
        record
            .x
            .iter()
            .all(|x| (0.0..=max).contains(&x.shift_distance))
    );
}

#[test]
fn forces_and_ramp_diagnostics() {
    let project = cvt_project::reference_project("Diag");
    let report = force_report(&project, 3000.0, 0.005).unwrap();
    assert!(report.primary_flyweight_n > 0.0);
    assert!(report.secondary_helix_n.is_finite());

    let helix = sample_ramp(&project, RampSelector::Secondary, 5).unwrap();
    let expected = (-30.0_f64).to_radians().tan();
    assert!(helix.iter().all(|s| (s.slope - expected).abs() < 1e-12));
}

#[test]
fn sweep_keeps_input_order() {
    let project = common::short_project("Sweep", 0.3);
    let values = [0.2, 0.3, 0.4];
    let outcomes = run_sweep(&project, SweepParameter::FlyweightMass, &values).unwrap();

    assert_eq!(outcomes.len(), 3);
    for (outcome, value) in outcomes.iter().zip(values) {
        assert_eq!(outcome.value, value);
        assert!(outcome.metrics.top_speed_kmh.is_finite());
        assert!((outcome.final_time_s - 0.3).abs() < 1e-6);
    }
}

//! Full launch run: dyno engine, flyweight primary, helix secondary.

use cvt_core::units::{ft_lbf_to_nm, rpm_to_rad_s};
use cvt_models::{
    BeltConfig, BeltModel, CubicSplineCurve, CvtGeometry, CvtRatioModel, EngineModel, LoadConfig,
    LoadModel, PrimaryConfig, PrimaryPulley, RampProfile, SecondaryConfig, SecondaryPulley,
    Segment, Sheave,
};
use cvt_sim::{
    CvtShiftEngine, DEFAULT_MAX_ENGINE_SPEED, DrivetrainModels, DrivetrainState, IntegratorType,
    ShiftConfig, SimOptions, SimRecord, Termination, TransientModel, run_sim,
};
use std::f64::consts::PI;
use std::sync::Arc;

const SHIFTING_FLYWEIGHTS: f64 = 0.9;

fn launch_engine(track_length: Option<f64>) -> CvtShiftEngine {
    launch_engine_with(SHIFTING_FLYWEIGHTS, track_length)
}

fn launch_engine_with(flyweight_mass: f64, track_length: Option<f64>) -> CvtShiftEngine {
    let dyno: Vec<(f64, f64)> = [
        (2400.0, 18.5),
        (2600.0, 18.1),
        (2800.0, 17.4),
        (3000.0, 16.6),
        (3200.0, 15.4),
        (3400.0, 14.5),
        (3600.0, 13.5),
    ]
    .iter()
    .map(|&(rpm, t)| (rpm, ft_lbf_to_nm(t)))
    .collect();

    let ratio = Arc::new(CvtRatioModel::new(CvtGeometry::default()).unwrap());
    let max = ratio.max_shift();
    // Straight launch section, then an arc that steepens from 0.55 to 1.1 rad.
    let split = max / 3.0;
    let (t0, t1) = (0.55_f64, 1.1_f64);
    let radius = (max - split) / (t1.sin() - t0.sin());
    let ramp = RampProfile::from_segments([
        Segment::linear(0.0, split, -t0.tan()).unwrap(),
        Segment::circular_arc(split, max, radius, t0, t1).unwrap(),
    ])
    .unwrap();
    let helix =
        RampProfile::from_segments([Segment::linear(0.0, max, (-30.0_f64).to_radians().tan())
            .unwrap()])
        .unwrap();

    let models = DrivetrainModels {
        engine: Arc::new(
            EngineModel::new(CubicSplineCurve::from_rpm_table(&dyno).unwrap(), 0.5).unwrap(),
        ),
        load: Arc::new(LoadModel::new(LoadConfig::default()).unwrap()),
        primary: Arc::new(
            PrimaryPulley::new(
                PrimaryConfig {
                    spring_rate: 500.0,
                    initial_compression: 0.2,
                    flyweight_mass,
                    initial_flyweight_radius: 0.05,
                    ramp,
                },
                max,
            )
            .unwrap(),
        ),
        secondary: Arc::new(
            SecondaryPulley::new(
                SecondaryConfig {
                    torsion_spring_rate: 5.0,
                    compression_spring_rate: 100.0,
                    initial_rotation: PI / 12.0,
                    initial_compression: 0.1,
                    helix_radius: 0.04,
                    helix,
                },
                ratio.clone(),
            )
            .unwrap(),
        ),
        primary_belt: Arc::new(
            BeltModel::new(BeltConfig::default(), Sheave::Primary, ratio.clone()).unwrap(),
        ),
        secondary_belt: Arc::new(
            BeltModel::new(BeltConfig::default(), Sheave::Secondary, ratio.clone()).unwrap(),
        ),
        ratio,
    };

    let engine = CvtShiftEngine::new(models, ShiftConfig::default()).unwrap();
    let omega0 = rpm_to_rad_s(2400.0);
    let v0 = engine.vehicle_speed_for(omega0, 0.0);
    engine
        .with_initial_state(DrivetrainState {
            engine_angular_velocity: omega0,
            vehicle_velocity: v0,
            ..DrivetrainState::default()
        })
        .with_track_length(track_length)
}

fn peak_engine_speed(engine: &CvtShiftEngine, rec: &SimRecord<DrivetrainState>) -> f64 {
    rec.x
        .iter()
        .map(|s| engine.engine_speed_for(s.vehicle_velocity, s.shift_distance))
        .fold(f64::MIN, f64::max)
}

#[test]
fn initial_state_is_locked_to_wheels() {
    let engine = launch_engine(None);
    let s0 = engine.initial_state();
    let omega = engine.engine_speed_for(s0.vehicle_velocity, s0.shift_distance);
    assert!((omega - s0.engine_angular_velocity).abs() < 1e-9);
}

#[test]
fn launch_accelerates_and_stays_in_bounds() {
    let mut engine = launch_engine(None);
    let max = engine.limits().max_shift;
    let opts = SimOptions {
        dt: 1e-4,
        t_end: 1.0,
        record_every: 50,
        ..SimOptions::default()
    };
    let rec = run_sim(&mut engine, &opts).unwrap();

    assert_eq!(rec.termination, Termination::Completed);
    assert_eq!(rec.t.len(), rec.x.len());
    for s in &rec.x {
        assert!(s.is_finite());
        assert!((0.0..=max).contains(&s.shift_distance));
    }
    let first = rec.x.first().unwrap();
    let last = rec.final_state().unwrap();
    assert!(last.vehicle_velocity > first.vehicle_velocity);
    assert!(last.vehicle_position > 0.0);
    // Flyweights overcome the secondary and the belt walks out to overdrive.
    assert!(last.shift_distance > 0.9 * max);
    assert!(peak_engine_speed(&engine, &rec) <= DEFAULT_MAX_ENGINE_SPEED + 1e-6);
}

#[test]
fn light_flyweights_hold_engine_at_its_ceiling() {
    let mut engine = launch_engine_with(0.3, None);
    let opts = SimOptions {
        dt: 1e-4,
        t_end: 1.0,
        record_every: 50,
        ..SimOptions::default()
    };
    let rec = run_sim(&mut engine, &opts).unwrap();

    assert_eq!(rec.termination, Termination::Completed);
    assert!(rec.x.iter().all(|s| s.is_finite()));
    let peak = peak_engine_speed(&engine, &rec);
    assert!(peak <= DEFAULT_MAX_ENGINE_SPEED + 1e-6);
    assert!(peak > 0.99 * DEFAULT_MAX_ENGINE_SPEED);
    let max = engine.limits().max_shift;
    assert!(rec.final_state().unwrap().shift_distance < 0.05 * max);
}

#[test]
fn track_length_ends_run_early() {
    let mut engine = launch_engine(Some(2.0));
    let opts = SimOptions {
        dt: 1e-4,
        t_end: 30.0,
        record_every: 100,
        integrator: IntegratorType::RK4,
        ..SimOptions::default()
    };
    let rec = run_sim(&mut engine, &opts).unwrap();
    assert!(matches!(rec.termination, Termination::Event(_)));
    assert!(rec.final_state().unwrap().vehicle_position >= 2.0);
    assert!(rec.final_time() < 30.0);
}

#[test]
fn euler_and_rk4_agree_on_short_horizon() {
    let opts = |integrator| SimOptions {
        dt: 1e-5,
        t_end: 0.05,
        record_every: 1000,
        integrator,
        ..SimOptions::default()
    };
    let rk4 = run_sim(&mut launch_engine(None), &opts(IntegratorType::RK4)).unwrap();
    let euler = run_sim(&mut launch_engine(None), &opts(IntegratorType::ForwardEuler)).unwrap();
    let (a, b) = (rk4.final_state().unwrap(), euler.final_state().unwrap());
    assert!((a.vehicle_velocity - b.vehicle_velocity).abs() < 5e-2);
}

//! Integration tests for cvt-models composed the way a vehicle uses them.

use cvt_core::units::{deg_to_rad, inch_to_m, rpm_to_rad_s};
use cvt_models::{
    BeltConfig, BeltModel, CarModel, CubicSplineCurve, CvtGeometry, CvtRatioModel, EngineModel,
    PrimaryConfig, PrimaryPulley, RampProfile, SecondaryConfig, SecondaryPulley, Segment, Sheave,
};
use std::f64::consts::PI;
use std::sync::Arc;

/// Line, spiral blend, then a shallow arc, in shop units.
fn blended_ramp() -> RampProfile {
    let line_end = inch_to_m(0.125);
    let blend_end = line_end + inch_to_m(0.025);
    let length = inch_to_m(1.125);
    let line_slope = deg_to_rad(-25.0).tan();

    let arc = Segment::circular_arc(
        blend_end,
        length,
        inch_to_m(5.0).powi(2),
        0.971_816_735_418,
        1.198_452_124_8,
    )
    .unwrap();
    let arc_slope = arc.slope(blend_end);

    RampProfile::from_segments([
        Segment::linear(0.0, line_end, line_slope).unwrap(),
        Segment::cubic_spiral(line_end, blend_end, line_slope, arc_slope, 1.0 / inch_to_m(5.0))
            .unwrap(),
        arc,
    ])
    .unwrap()
}

#[test]
fn blended_ramp_is_smooth_at_joints() {
    let ramp = blended_ramp();
    let joints = [inch_to_m(0.125), inch_to_m(0.150)];
    let eps = 1e-10;
    for x in joints {
        let (hl, hr) = (
            ramp.signed_height(x - eps).unwrap(),
            ramp.signed_height(x + eps).unwrap(),
        );
        assert!((hl - hr).abs() < 1e-8, "height jump at {x}");
        let (sl, sr) = (
            ramp.signed_slope(x - eps).unwrap(),
            ramp.signed_slope(x + eps).unwrap(),
        );
        assert!((sl - sr).abs() < 1e-4, "slope jump at {x}: {sl} vs {sr}");
    }
}

#[test]
fn primary_with_blended_ramp_covers_travel() {
    let geometry = CvtGeometry::default();
    let primary = PrimaryPulley::new(
        PrimaryConfig {
            spring_rate: 500.0,
            initial_compression: 0.2,
            flyweight_mass: 0.05,
            initial_flyweight_radius: 0.05,
            ramp: blended_ramp(),
        },
        geometry.max_shift,
    )
    .unwrap();

    let omega = rpm_to_rad_s(3600.0);
    for i in 0..=20 {
        let s = geometry.max_shift * i as f64 / 20.0;
        assert!(primary.net_force(s, omega).unwrap().is_finite());
    }
}

#[test]
fn engine_scenario() {
    let engine = EngineModel::new(|w: f64| 2.0 * w, 5.0).unwrap();
    assert_eq!(engine.angular_acceleration(5.0, 5.0), 1.0);
}

#[test]
fn dyno_spline_engine_stays_near_table() {
    let table = [
        (2400.0, 25.08),
        (2800.0, 23.59),
        (3200.0, 20.88),
        (3600.0, 18.30),
    ];
    let engine = EngineModel::new(CubicSplineCurve::from_rpm_table(&table).unwrap(), 0.5).unwrap();
    let mid = engine.get_torque(rpm_to_rad_s(3000.0));
    assert!(mid < 23.59 && mid > 20.88);
}

#[test]
fn car_scenario() {
    let car = CarModel::new(1000.0).unwrap();
    assert_eq!(car.acceleration(2000.0), 2.0);
}

#[test]
fn radial_clamp_scenario() {
    let theta = deg_to_rad(23.0);
    let f = BeltModel::radial_force_from_clamping(1000.0, theta);
    assert!((f - 2000.0 * (theta / 2.0).tan()).abs() < 1e-9);
}

#[test]
fn ratio_round_trip_at_zero_shift() {
    let geometry = CvtGeometry::default();
    let expected = geometry.initial_secondary_radius / geometry.initial_primary_radius;
    let ratio = CvtRatioModel::new(geometry).unwrap();
    assert!((ratio.current_cvt_ratio(0.0) - expected).abs() < 1e-12);
}

#[test]
fn belt_and_pulleys_share_one_geometry() {
    let ratio = Arc::new(CvtRatioModel::new(CvtGeometry::default()).unwrap());
    let max = ratio.max_shift();
    let helix =
        RampProfile::from_segments([Segment::linear(0.0, max, deg_to_rad(-30.0).tan()).unwrap()])
            .unwrap();
    let secondary = SecondaryPulley::new(
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
    .unwrap();
    let belt = BeltModel::new(BeltConfig::default(), Sheave::Secondary, ratio.clone()).unwrap();

    for s in [0.0, 0.5 * max, max] {
        assert_eq!(secondary.effective_radius(s), belt.effective_radius(s));
        let clamp = secondary.net_force(20.0, s).unwrap();
        let wrap = ratio.secondary_wrap_angle(s);
        let radial = belt.calculate_radial_force(100.0, s, wrap, clamp);
        assert!(radial > 0.0);
    }
}

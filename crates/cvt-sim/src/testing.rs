//! Shared fixture for unit tests.

use crate::shift::{CvtShiftEngine, DrivetrainModels, ShiftConfig};
use cvt_models::{
    BeltConfig, BeltModel, CvtGeometry, CvtRatioModel, EngineModel, LoadConfig, LoadModel,
    PrimaryConfig, PrimaryPulley, RampProfile, SecondaryConfig, SecondaryPulley, Segment, Sheave,
};
use std::f64::consts::{FRAC_PI_2, PI};
use std::sync::Arc;

pub(crate) fn reference_models() -> DrivetrainModels {
    let ratio = Arc::new(CvtRatioModel::new(CvtGeometry::default()).unwrap());
    let max = ratio.max_shift();

    let ramp = RampProfile::from_segments([
        Segment::linear(0.0, max / 6.0, -0.8).unwrap(),
        Segment::circular_arc(max / 6.0, max, 0.2, 1.0, FRAC_PI_2 - 0.55).unwrap(),
    ])
    .unwrap();
    let helix =
        RampProfile::from_segments([Segment::linear(0.0, max, (-30.0_f64).to_radians().tan())
            .unwrap()])
        .unwrap();

    DrivetrainModels {
        engine: Arc::new(EngineModel::new(|_: f64| 20.0, 0.5).unwrap()),
        load: Arc::new(LoadModel::new(LoadConfig::default()).unwrap()),
        primary: Arc::new(
            PrimaryPulley::new(
                PrimaryConfig {
                    spring_rate: 500.0,
                    initial_compression: 0.2,
                    flyweight_mass: 0.05,
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
    }
}

pub(crate) fn reference_engine() -> CvtShiftEngine {
    CvtShiftEngine::new(reference_models(), ShiftConfig::default()).unwrap()
}

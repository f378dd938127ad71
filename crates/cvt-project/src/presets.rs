//! Reference Baja vehicle and named ramp shapes.

use crate::schema::*;
use cvt_core::units::{deg_to_rad, inch_to_m};
use std::f64::consts::FRAC_PI_2;

pub const CURRENT_VERSION: u32 = 1;

/// 150 ft acceleration event.
pub const ACCELERATION_EVENT_M: f64 = 45.72;

pub fn vehicle() -> VehicleDef {
    VehicleDef {
        mass_kg: 225.0,
        frontal_area_m2: 1.0,
        drag_coefficient: 0.6,
        incline_deg: 0.0,
        gearbox_ratio: 8.32,
        wheel_radius_m: inch_to_m(11.0),
        air_density_kg_m3: 1.225,
        min_velocity_mps: 0.1,
    }
}

pub fn engine() -> EngineDef {
    let table = [
        (2400.0, 18.5),
        (2600.0, 18.1),
        (2800.0, 17.4),
        (3000.0, 16.6),
        (3200.0, 15.4),
        (3400.0, 14.5),
        (3600.0, 13.5),
    ];
    EngineDef {
        inertia_kg_m2: 0.5,
        torque_unit: TorqueUnitDef::FtLbf,
        dyno: table
            .iter()
            .map(|&(rpm, torque)| DynoPointDef { rpm, torque })
            .collect(),
    }
}

pub fn geometry() -> GeometryDef {
    GeometryDef {
        sheave_angle_deg: 23.0,
        initial_primary_radius_m: 0.03462,
        initial_secondary_radius_m: inch_to_m(4.0),
        center_to_center_m: inch_to_m(10.0),
        belt_height_m: 0.01557,
        max_shift_m: 0.0221,
    }
}

pub fn belt() -> BeltDef {
    BeltDef {
        density_kg_m3: 1100.0,
        top_width_m: 0.0221,
        cross_section_area_m2: None,
        friction_coefficient: 0.3,
    }
}

pub fn primary() -> PrimaryDef {
    PrimaryDef {
        spring_rate_n_per_m: 500.0,
        initial_compression_m: 0.2,
        flyweight_mass_kg: 0.9,
        initial_flyweight_radius_m: 0.05,
        ramp: RampDef::Preset {
            preset: RampPresetDef::Progressive,
        },
    }
}

pub fn secondary() -> SecondaryDef {
    SecondaryDef {
        torsion_rate_nm_per_rad: 5.0,
        compression_rate_n_per_m: 100.0,
        initial_rotation_deg: 15.0,
        initial_compression_m: 0.1,
        helix_radius_m: 0.04,
        helix: RampDef::Preset {
            preset: RampPresetDef::Helix30,
        },
    }
}

pub fn shift() -> ShiftDef {
    ShiftDef {
        moving_mass_kg: 1.0,
        friction_cap_n: 20.0,
        max_engine_rpm: 3820.0,
    }
}

pub fn initial_conditions() -> InitialConditionsDef {
    InitialConditionsDef {
        engine_rpm: 2400.0,
        vehicle_velocity_mps: None,
        shift_m: 0.0,
        shift_velocity_mps: 0.0,
    }
}

pub fn run_options() -> RunOptionsDef {
    RunOptionsDef {
        dt_s: 1e-4,
        t_end_s: 15.0,
        max_steps: None,
        record_every: 100,
        integrator: IntegratorDef::Rk4,
        track_length_m: Some(ACCELERATION_EVENT_M),
        progress_interval_s: 0.5,
    }
}

/// The full reference vehicle.
pub fn reference_project(name: impl Into<String>) -> Project {
    Project {
        version: CURRENT_VERSION,
        name: name.into(),
        vehicle: vehicle(),
        engine: engine(),
        geometry: geometry(),
        belt: belt(),
        primary: primary(),
        secondary: secondary(),
        shift: shift(),
        initial: initial_conditions(),
        run: run_options(),
    }
}

/// Expand a named ramp into explicit segments for a shift range.
///
/// `Blended` has a fixed 1.125 in length; the others scale with `max_shift`.
pub fn ramp_segments(preset: RampPresetDef, max_shift: f64) -> Vec<SegmentDef> {
    match preset {
        RampPresetDef::Progressive => {
            let split = max_shift / 3.0;
            let (t0, t1) = (0.55_f64, 1.1_f64);
            // Radius chosen so the arc's x-span equals its chord abscissa span.
            let radius = (max_shift - split) / (t1.sin() - t0.sin());
            vec![
                SegmentDef::Linear {
                    x_start_m: 0.0,
                    x_end_m: split,
                    slope: -t0.tan(),
                },
                SegmentDef::CircularArc {
                    x_start_m: split,
                    x_end_m: max_shift,
                    radius_m: radius,
                    theta_start_rad: t0,
                    theta_end_rad: t1,
                },
            ]
        }
        RampPresetDef::Blended => {
            let line_end = inch_to_m(0.125);
            let blend_end = line_end + inch_to_m(0.025);
            vec![
                SegmentDef::Linear {
                    x_start_m: 0.0,
                    x_end_m: line_end,
                    slope: deg_to_rad(-25.0).tan(),
                },
                SegmentDef::CubicSpiral {
                    x_start_m: line_end,
                    x_end_m: blend_end,
                    slope_start: None,
                    slope_end: None,
                    target_curvature_per_m: -1.0 / inch_to_m(5.0),
                },
                SegmentDef::CircularArc {
                    x_start_m: blend_end,
                    x_end_m: inch_to_m(1.125),
                    radius_m: inch_to_m(5.0).powi(2),
                    theta_start_rad: 0.971_816_735_418,
                    theta_end_rad: 1.198_452_124_8,
                },
            ]
        }
        RampPresetDef::SteepArc => vec![
            SegmentDef::Linear {
                x_start_m: 0.0,
                x_end_m: max_shift / 6.0,
                slope: -0.8,
            },
            SegmentDef::CircularArc {
                x_start_m: max_shift / 6.0,
                x_end_m: max_shift,
                radius_m: 0.2,
                theta_start_rad: 1.0,
                theta_end_rad: FRAC_PI_2 - 0.55,
            },
        ],
        RampPresetDef::TightArc => vec![
            SegmentDef::Linear {
                x_start_m: 0.0,
                x_end_m: max_shift / 6.0,
                slope: -0.5,
            },
            SegmentDef::CircularArc {
                x_start_m: max_shift / 6.0,
                x_end_m: max_shift,
                radius_m: 0.01,
                theta_start_rad: 0.9,
                theta_end_rad: FRAC_PI_2 - 0.3,
            },
        ],
        RampPresetDef::Helix30 => vec![SegmentDef::Linear {
            x_start_m: 0.0,
            x_end_m: max_shift,
            slope: deg_to_rad(-30.0).tan(),
        }],
    }
}

/// Segments of a ramp definition, expanding presets.
pub fn resolve_ramp(ramp: &RampDef, max_shift: f64) -> Vec<SegmentDef> {
    match ramp {
        RampDef::Preset { preset } => ramp_segments(*preset, max_shift),
        RampDef::Segments { segments } => segments.clone(),
    }
}

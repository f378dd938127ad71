//! Project definition → runnable shift engine.

use std::sync::Arc;

use cvt_core::units::{deg_to_rad, ft_lbf_to_nm, rpm_to_rad_s};
use cvt_models::{
    BeltConfig, BeltModel, CubicSplineCurve, CvtGeometry, CvtRatioModel, EngineModel, LoadConfig,
    LoadModel, PrimaryConfig, PrimaryPulley, RampProfile, SecondaryConfig, SecondaryPulley,
    Segment, Sheave,
};
use cvt_project::resolve_ramp;
use cvt_project::schema::{IntegratorDef, Project, SegmentDef, TorqueUnitDef};
use cvt_sim::{
    CvtShiftEngine, DrivetrainModels, DrivetrainState, IntegratorType, ShiftConfig, SimOptions,
};

use crate::error::{AppError, AppResult};

/// A validated project turned into models plus integration options.
#[derive(Debug, Clone)]
pub struct CompiledRun {
    pub engine: CvtShiftEngine,
    pub options: SimOptions,
}

/// Build a ramp profile from segment definitions.
///
/// Spiral slopes left unset are read off the neighbouring segment at the
/// shared boundary, so the neighbour must not itself be an unresolved spiral.
pub fn compile_ramp(segments: &[SegmentDef]) -> AppResult<RampProfile> {
    let mut built: Vec<Option<Segment>> = segments
        .iter()
        .map(|def| match *def {
            SegmentDef::Linear {
                x_start_m,
                x_end_m,
                slope,
            } => Segment::linear(x_start_m, x_end_m, slope).map(Some),
            SegmentDef::CircularArc {
                x_start_m,
                x_end_m,
                radius_m,
                theta_start_rad,
                theta_end_rad,
            } => Segment::circular_arc(
                x_start_m,
                x_end_m,
                radius_m,
                theta_start_rad,
                theta_end_rad,
            )
            .map(Some),
            SegmentDef::CubicSpiral { .. } => Ok(None),
        })
        .collect::<Result<_, _>>()?;

    for (idx, def) in segments.iter().enumerate() {
        let SegmentDef::CubicSpiral {
            x_start_m,
            x_end_m,
            slope_start,
            slope_end,
            target_curvature_per_m,
        } = *def
        else {
            continue;
        };

        let neighbour_slope = |neighbour: Option<usize>, x: f64| -> AppResult<f64> {
            neighbour
                .and_then(|i| built.get(i))
                .and_then(Option::as_ref)
                .map(|seg| seg.slope(x))
                .ok_or_else(|| {
                    AppError::Compile(format!(
                        "spiral segment {idx} needs an explicit slope or a non-spiral neighbour"
                    ))
                })
        };

        let start = match slope_start {
            Some(s) => s,
            None => neighbour_slope(idx.checked_sub(1), x_start_m)?,
        };
        let end = match slope_end {
            Some(s) => s,
            None => neighbour_slope(Some(idx + 1), x_end_m)?,
        };
        built[idx] = Some(Segment::cubic_spiral(
            x_start_m,
            x_end_m,
            start,
            end,
            target_curvature_per_m,
        )?);
    }

    Ok(RampProfile::from_segments(built.into_iter().flatten())?)
}

/// Construct the component models described by a project.
pub fn compile_models(project: &Project) -> AppResult<DrivetrainModels> {
    let g = &project.geometry;
    let sheave_angle = deg_to_rad(g.sheave_angle_deg);
    let ratio = Arc::new(CvtRatioModel::new(CvtGeometry {
        sheave_angle,
        initial_primary_radius: g.initial_primary_radius_m,
        initial_secondary_radius: g.initial_secondary_radius_m,
        center_to_center: g.center_to_center_m,
        belt_height: g.belt_height_m,
        max_shift: g.max_shift_m,
    })?);
    let max_shift = ratio.max_shift();

    let e = &project.engine;
    let dyno: Vec<(f64, f64)> = e
        .dyno
        .iter()
        .map(|p| match e.torque_unit {
            TorqueUnitDef::Nm => (p.rpm, p.torque),
            TorqueUnitDef::FtLbf => (p.rpm, ft_lbf_to_nm(p.torque)),
        })
        .collect();
    let engine = EngineModel::new(CubicSplineCurve::from_rpm_table(&dyno)?, e.inertia_kg_m2)?;

    let v = &project.vehicle;
    let load = LoadModel::new(LoadConfig {
        car_mass: v.mass_kg,
        frontal_area: v.frontal_area_m2,
        drag_coefficient: v.drag_coefficient,
        incline_angle: deg_to_rad(v.incline_deg),
        gearbox_ratio: v.gearbox_ratio,
        wheel_radius: v.wheel_radius_m,
        air_density: v.air_density_kg_m3,
        min_velocity: v.min_velocity_mps,
    })?;

    let b = &project.belt;
    let belt = BeltConfig {
        density: b.density_kg_m3,
        cross_section_area: b.cross_section_area_m2.unwrap_or_else(|| {
            BeltConfig::trapezoid_area(b.top_width_m, g.belt_height_m, sheave_angle)
        }),
        friction_coefficient: b.friction_coefficient,
    };

    let p = &project.primary;
    let primary = PrimaryPulley::new(
        PrimaryConfig {
            spring_rate: p.spring_rate_n_per_m,
            initial_compression: p.initial_compression_m,
            flyweight_mass: p.flyweight_mass_kg,
            initial_flyweight_radius: p.initial_flyweight_radius_m,
            ramp: compile_ramp(&resolve_ramp(&p.ramp, max_shift))?,
        },
        max_shift,
    )?;

    let s = &project.secondary;
    let secondary = SecondaryPulley::new(
        SecondaryConfig {
            torsion_spring_rate: s.torsion_rate_nm_per_rad,
            compression_spring_rate: s.compression_rate_n_per_m,
            initial_rotation: deg_to_rad(s.initial_rotation_deg),
            initial_compression: s.initial_compression_m,
            helix_radius: s.helix_radius_m,
            helix: compile_ramp(&resolve_ramp(&s.helix, max_shift))?,
        },
        ratio.clone(),
    )?;

    Ok(DrivetrainModels {
        engine: Arc::new(engine),
        load: Arc::new(load),
        primary: Arc::new(primary),
        secondary: Arc::new(secondary),
        primary_belt: Arc::new(BeltModel::new(belt.clone(), Sheave::Primary, ratio.clone())?),
        secondary_belt: Arc::new(BeltModel::new(belt, Sheave::Secondary, ratio.clone())?),
        ratio,
    })
}

pub fn integrator_type(def: IntegratorDef) -> IntegratorType {
    match def {
        IntegratorDef::Rk4 => IntegratorType::RK4,
        IntegratorDef::ForwardEuler => IntegratorType::ForwardEuler,
    }
}

pub(crate) fn shift_config(project: &Project) -> ShiftConfig {
    ShiftConfig {
        moving_mass: project.shift.moving_mass_kg,
        friction_cap: project.shift.friction_cap_n,
        max_engine_speed: rpm_to_rad_s(project.shift.max_engine_rpm),
    }
}

/// Validate a project and build its shift engine, initial state and options.
pub fn compile_run(project: &Project) -> AppResult<CompiledRun> {
    cvt_project::validate_project(project)?;

    let models = compile_models(project)?;
    let engine = CvtShiftEngine::new(models, shift_config(project))?
        .with_track_length(project.run.track_length_m);

    let init = &project.initial;
    let shift = init.shift_m;
    let (omega, velocity) = match init.vehicle_velocity_mps {
        Some(v) => (engine.engine_speed_for(v, shift), v),
        None => {
            let omega = rpm_to_rad_s(init.engine_rpm);
            (omega, engine.vehicle_speed_for(omega, shift))
        }
    };
    let engine = engine.with_initial_state(DrivetrainState {
        engine_angular_velocity: omega,
        engine_angular_position: 0.0,
        vehicle_velocity: velocity,
        vehicle_position: 0.0,
        shift_velocity: init.shift_velocity_mps,
        shift_distance: shift,
    });

    let run = &project.run;
    let max_steps = run
        .max_steps
        .unwrap_or_else(|| ((run.t_end_s / run.dt_s).ceil() as usize).saturating_add(1));
    let options = SimOptions {
        dt: run.dt_s,
        t_end: run.t_end_s,
        max_steps,
        record_every: run.record_every,
        integrator: integrator_type(run.integrator),
        progress_interval_s: run.progress_interval_s,
    };
    options.validate()?;

    Ok(CompiledRun { engine, options })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cvt_project::presets::{ramp_segments, reference_project};
    use cvt_project::schema::RampPresetDef;
    use cvt_sim::TransientModel;

    #[test]
    fn spiral_slopes_come_from_neighbours() {
        let segments = ramp_segments(RampPresetDef::Blended, 0.0221);
        let ramp = compile_ramp(&segments).unwrap();
        assert_eq!(ramp.len(), 3);

        let joint = segments[1].x_start_m();
        let left = ramp.signed_slope(joint - 1e-9).unwrap();
        let right = ramp.signed_slope(joint + 1e-9).unwrap();
        assert!((left - right).abs() < 1e-3);
    }

    #[test]
    fn spiral_without_neighbour_or_slope_is_rejected() {
        let segments = vec![SegmentDef::CubicSpiral {
            x_start_m: 0.0,
            x_end_m: 0.01,
            slope_start: None,
            slope_end: Some(-1.0),
            target_curvature_per_m: 5.0,
        }];
        assert!(matches!(
            compile_ramp(&segments),
            Err(AppError::Compile(_))
        ));
    }

    #[test]
    fn initial_state_follows_engine_rpm() {
        let project = reference_project("Baja");
        let compiled = compile_run(&project).unwrap();
        let x0 = compiled.engine.initial_state();

        assert!((x0.engine_angular_velocity - rpm_to_rad_s(2400.0)).abs() < 1e-9);
        let back = compiled
            .engine
            .engine_speed_for(x0.vehicle_velocity, x0.shift_distance);
        assert!((back - x0.engine_angular_velocity).abs() < 1e-9);
        assert_eq!(x0.vehicle_position, 0.0);
        assert!(compiled.options.max_steps >= 150_000);
    }

    #[test]
    fn explicit_velocity_overrides_rpm() {
        let mut project = reference_project("Baja");
        project.initial.vehicle_velocity_mps = Some(2.0);
        let compiled = compile_run(&project).unwrap();
        let x0 = compiled.engine.initial_state();
        assert_eq!(x0.vehicle_velocity, 2.0);
        assert!(x0.engine_angular_velocity > 0.0);
    }

    #[test]
    fn initial_rpm_above_ceiling_is_held_at_it() {
        let mut project = reference_project("Baja");
        project.initial.engine_rpm = 5000.0;
        let compiled = compile_run(&project).unwrap();
        let x0 = compiled.engine.initial_state();

        let ceiling = rpm_to_rad_s(project.shift.max_engine_rpm);
        assert_eq!(x0.engine_angular_velocity, ceiling);
        let locked = compiled
            .engine
            .engine_speed_for(x0.vehicle_velocity, x0.shift_distance);
        assert!((locked - ceiling).abs() < 1e-9);
    }

    #[test]
    fn ft_lbf_dyno_is_converted() {
        let mut project = reference_project("Baja");
        let models_ft = compile_models(&project).unwrap();
        project.engine.torque_unit = TorqueUnitDef::Nm;
        let models_nm = compile_models(&project).unwrap();

        let omega = rpm_to_rad_s(3000.0);
        let ratio = models_ft.engine.get_torque(omega) / models_nm.engine.get_torque(omega);
        assert!((ratio - cvt_core::units::NM_PER_FT_LBF).abs() < 1e-9);
    }
}

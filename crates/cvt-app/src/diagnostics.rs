//! Static force breakdowns and ramp sampling for tuning work.

use cvt_core::units::{rad_s_to_rpm, rpm_to_rad_s};
use cvt_models::{BeltModel, RampSample};
use cvt_project::schema::Project;
use cvt_sim::CvtShiftEngine;
use serde::Serialize;

use crate::compile::{compile_models, shift_config};
use crate::error::{AppError, AppResult};

/// Every force acting on the sheaves at one engine speed and shift position.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ForceReport {
    pub engine_rpm: f64,
    pub shift_m: f64,
    pub cvt_ratio: f64,
    pub engine_torque_nm: f64,
    pub vehicle_speed_mps: f64,

    pub primary_flyweight_n: f64,
    pub primary_spring_n: f64,
    pub primary_net_n: f64,
    pub secondary_spring_torque_nm: f64,
    pub secondary_helix_n: f64,
    pub secondary_spring_n: f64,
    pub secondary_net_n: f64,

    pub primary_wrap_rad: f64,
    pub secondary_wrap_rad: f64,
    pub primary_radial_n: f64,
    pub secondary_radial_n: f64,
    /// Radial imbalance driving the shift, before friction.
    pub radial_difference_n: f64,

    pub primary_slack_tension_n: f64,
    pub primary_max_torque_nm: f64,
    pub secondary_slack_tension_n: f64,
    pub secondary_max_torque_nm: f64,
}

/// Which cam profile to sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampSelector {
    Primary,
    Secondary,
}

fn shift_engine(project: &Project) -> AppResult<CvtShiftEngine> {
    cvt_project::validate_project(project)?;
    let models = compile_models(project)?;
    Ok(CvtShiftEngine::new(models, shift_config(project))?)
}

pub fn force_report(project: &Project, engine_rpm: f64, shift_m: f64) -> AppResult<ForceReport> {
    let engine = shift_engine(project)?;
    let max_shift = engine.limits().max_shift;
    if !(0.0..=max_shift).contains(&shift_m) {
        return Err(AppError::InvalidInput(format!(
            "shift {shift_m} m outside [0, {max_shift}]"
        )));
    }

    let omega = rpm_to_rad_s(engine_rpm);
    let f = engine.forces_at(omega, shift_m)?;
    let m = engine.models();

    let mu_p = m.primary_belt.config().friction_coefficient;
    let mu_s = m.secondary_belt.config().friction_coefficient;
    let primary_slack = BeltModel::slack_tension(f.primary_radial, f.primary_wrap, mu_p);
    let secondary_slack = BeltModel::slack_tension(f.secondary_radial, f.secondary_wrap, mu_s);

    Ok(ForceReport {
        engine_rpm: rad_s_to_rpm(omega),
        shift_m,
        cvt_ratio: f.cvt_ratio,
        engine_torque_nm: f.engine_torque,
        vehicle_speed_mps: engine.vehicle_speed_for(omega, shift_m),
        primary_flyweight_n: f.primary.flyweight,
        primary_spring_n: f.primary.spring,
        primary_net_n: f.primary.net,
        secondary_spring_torque_nm: f.secondary.spring_torque,
        secondary_helix_n: f.secondary.helix,
        secondary_spring_n: f.secondary.spring,
        secondary_net_n: f.secondary.net,
        primary_wrap_rad: f.primary_wrap,
        secondary_wrap_rad: f.secondary_wrap,
        primary_radial_n: f.primary_radial,
        secondary_radial_n: f.secondary_radial,
        radial_difference_n: f.primary_radial - f.secondary_radial,
        primary_slack_tension_n: primary_slack,
        primary_max_torque_nm: m.primary_belt.slip_torque(
            f.primary_radial,
            shift_m,
            f.primary_wrap,
        ),
        secondary_slack_tension_n: secondary_slack,
        secondary_max_torque_nm: m.secondary_belt.slip_torque(
            f.secondary_radial,
            shift_m,
            f.secondary_wrap,
        ),
    })
}

/// Sample a cam profile at `n` evenly spaced points over its domain.
pub fn sample_ramp(project: &Project, which: RampSelector, n: usize) -> AppResult<Vec<RampSample>> {
    if n < 2 {
        return Err(AppError::InvalidInput(
            "ramp sampling needs at least 2 points".to_string(),
        ));
    }
    cvt_project::validate_project(project)?;
    let models = compile_models(project)?;
    let ramp = match which {
        RampSelector::Primary => models.primary.ramp(),
        RampSelector::Secondary => models.secondary.helix(),
    };
    Ok(ramp.sample(n)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cvt_project::reference_project;

    #[test]
    fn low_ratio_report_is_consistent() {
        let project = reference_project("Baja");
        let r = force_report(&project, 2400.0, 0.0).unwrap();

        let g = &project.geometry;
        let expected_ratio = g.initial_secondary_radius_m / g.initial_primary_radius_m;
        assert!((r.cvt_ratio - expected_ratio).abs() < 1e-9);
        assert!((r.primary_net_n - (r.primary_flyweight_n - r.primary_spring_n)).abs() < 1e-9);
        assert!(r.primary_wrap_rad < std::f64::consts::PI);
        assert!(r.secondary_wrap_rad > std::f64::consts::PI);
        assert!(r.primary_max_torque_nm.is_finite());
    }

    #[test]
    fn shift_outside_travel_is_rejected() {
        let project = reference_project("Baja");
        assert!(matches!(
            force_report(&project, 3000.0, 1.0),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn ramp_samples_span_the_travel() {
        let project = reference_project("Baja");
        let samples = sample_ramp(&project, RampSelector::Primary, 11).unwrap();
        assert_eq!(samples.len(), 11);
        assert_eq!(samples[0].x, 0.0);
        assert_eq!(samples[0].height, 0.0);
        // Falling ramp: height never rises with shift.
        assert!(samples.windows(2).all(|w| w[1].height <= w[0].height + 1e-15));
    }
}

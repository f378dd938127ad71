//! Project validation logic.

use crate::presets::{CURRENT_VERSION, resolve_ramp};
use crate::schema::{Project, RampDef, SegmentDef};
use std::f64::consts::FRAC_PI_2;

const CONTIGUITY_TOL_M: f64 = 1e-12;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid ramp {context}: {reason}")]
    InvalidRamp { context: String, reason: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn positive(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "must be positive"))
    }
}

fn non_negative(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "must be non-negative"))
    }
}

fn finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, value, "must be finite"))
    }
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version != CURRENT_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }
    if project.name.trim().is_empty() {
        return Err(invalid("name", "\"\"", "must not be empty"));
    }

    let v = &project.vehicle;
    positive("vehicle.mass_kg", v.mass_kg)?;
    non_negative("vehicle.frontal_area_m2", v.frontal_area_m2)?;
    non_negative("vehicle.drag_coefficient", v.drag_coefficient)?;
    if !(v.incline_deg.is_finite() && v.incline_deg.abs() < 90.0) {
        return Err(invalid(
            "vehicle.incline_deg",
            v.incline_deg,
            "must lie strictly between -90 and 90",
        ));
    }
    positive("vehicle.gearbox_ratio", v.gearbox_ratio)?;
    positive("vehicle.wheel_radius_m", v.wheel_radius_m)?;
    non_negative("vehicle.air_density_kg_m3", v.air_density_kg_m3)?;
    positive("vehicle.min_velocity_mps", v.min_velocity_mps)?;

    let e = &project.engine;
    positive("engine.inertia_kg_m2", e.inertia_kg_m2)?;
    if e.dyno.len() < 3 {
        return Err(invalid(
            "engine.dyno",
            e.dyno.len(),
            "needs at least 3 points",
        ));
    }
    for point in &e.dyno {
        positive("engine.dyno.rpm", point.rpm)?;
        finite("engine.dyno.torque", point.torque)?;
    }
    if e.dyno.windows(2).any(|w| w[1].rpm <= w[0].rpm) {
        return Err(invalid(
            "engine.dyno",
            "rpm",
            "must be strictly increasing",
        ));
    }

    let g = &project.geometry;
    if !(g.sheave_angle_deg.is_finite() && g.sheave_angle_deg > 0.0 && g.sheave_angle_deg < 180.0)
    {
        return Err(invalid(
            "geometry.sheave_angle_deg",
            g.sheave_angle_deg,
            "must lie strictly between 0 and 180",
        ));
    }
    positive("geometry.initial_primary_radius_m", g.initial_primary_radius_m)?;
    positive("geometry.initial_secondary_radius_m", g.initial_secondary_radius_m)?;
    positive("geometry.center_to_center_m", g.center_to_center_m)?;
    positive("geometry.belt_height_m", g.belt_height_m)?;
    positive("geometry.max_shift_m", g.max_shift_m)?;
    let half_belt = 0.5 * g.belt_height_m;
    if g.initial_primary_radius_m <= half_belt || g.initial_secondary_radius_m <= half_belt {
        return Err(invalid(
            "geometry.belt_height_m",
            g.belt_height_m,
            "initial radii must exceed half the belt height",
        ));
    }
    if g.initial_primary_radius_m + g.initial_secondary_radius_m >= g.center_to_center_m {
        return Err(invalid(
            "geometry.center_to_center_m",
            g.center_to_center_m,
            "sheaves overlap",
        ));
    }

    let b = &project.belt;
    positive("belt.density_kg_m3", b.density_kg_m3)?;
    positive("belt.top_width_m", b.top_width_m)?;
    if let Some(area) = b.cross_section_area_m2 {
        positive("belt.cross_section_area_m2", area)?;
    }
    non_negative("belt.friction_coefficient", b.friction_coefficient)?;

    let p = &project.primary;
    non_negative("primary.spring_rate_n_per_m", p.spring_rate_n_per_m)?;
    non_negative("primary.initial_compression_m", p.initial_compression_m)?;
    positive("primary.flyweight_mass_kg", p.flyweight_mass_kg)?;
    positive("primary.initial_flyweight_radius_m", p.initial_flyweight_radius_m)?;
    validate_ramp("primary.ramp", &p.ramp, g.max_shift_m)?;

    let s = &project.secondary;
    non_negative("secondary.torsion_rate_nm_per_rad", s.torsion_rate_nm_per_rad)?;
    non_negative("secondary.compression_rate_n_per_m", s.compression_rate_n_per_m)?;
    finite("secondary.initial_rotation_deg", s.initial_rotation_deg)?;
    non_negative("secondary.initial_compression_m", s.initial_compression_m)?;
    positive("secondary.helix_radius_m", s.helix_radius_m)?;
    validate_ramp("secondary.helix", &s.helix, g.max_shift_m)?;

    positive("shift.moving_mass_kg", project.shift.moving_mass_kg)?;
    non_negative("shift.friction_cap_n", project.shift.friction_cap_n)?;
    positive("shift.max_engine_rpm", project.shift.max_engine_rpm)?;

    let i = &project.initial;
    match i.vehicle_velocity_mps {
        Some(vel) => finite("initial.vehicle_velocity_mps", vel)?,
        None => positive("initial.engine_rpm", i.engine_rpm)?,
    }
    if !(i.shift_m.is_finite() && (0.0..=g.max_shift_m).contains(&i.shift_m)) {
        return Err(invalid(
            "initial.shift_m",
            i.shift_m,
            "must lie within [0, max_shift_m]",
        ));
    }
    finite("initial.shift_velocity_mps", i.shift_velocity_mps)?;

    let r = &project.run;
    positive("run.dt_s", r.dt_s)?;
    positive("run.t_end_s", r.t_end_s)?;
    if r.record_every == 0 {
        return Err(invalid("run.record_every", 0, "must be at least 1"));
    }
    if r.max_steps == Some(0) {
        return Err(invalid("run.max_steps", 0, "must be at least 1"));
    }
    if let Some(len) = r.track_length_m {
        positive("run.track_length_m", len)?;
    }
    non_negative("run.progress_interval_s", r.progress_interval_s)?;

    Ok(())
}

/// Check a ramp definition tiles `[0, max_shift]` with well-formed segments.
pub fn validate_ramp(context: &str, ramp: &RampDef, max_shift: f64) -> Result<(), ValidationError> {
    let fail = |reason: String| ValidationError::InvalidRamp {
        context: context.to_string(),
        reason,
    };

    let segments = resolve_ramp(ramp, max_shift);
    let first = segments
        .first()
        .ok_or_else(|| fail("has no segments".to_string()))?;
    if first.x_start_m().abs() > CONTIGUITY_TOL_M {
        return Err(fail(format!(
            "first segment starts at {} instead of 0",
            first.x_start_m()
        )));
    }

    for (idx, seg) in segments.iter().enumerate() {
        let (x0, x1) = (seg.x_start_m(), seg.x_end_m());
        if !(x0.is_finite() && x1.is_finite() && x1 > x0) {
            return Err(fail(format!("segment {idx} has empty range [{x0}, {x1}]")));
        }
        match seg {
            SegmentDef::Linear { slope, .. } if !slope.is_finite() => {
                return Err(fail(format!("segment {idx} slope is not finite")));
            }
            SegmentDef::CircularArc {
                radius_m,
                theta_start_rad,
                theta_end_rad,
                ..
            } => {
                if !(radius_m.is_finite() && *radius_m > 0.0) {
                    return Err(fail(format!("segment {idx} radius must be positive")));
                }
                for theta in [theta_start_rad, theta_end_rad] {
                    if !(0.0..FRAC_PI_2).contains(theta) {
                        return Err(fail(format!(
                            "segment {idx} angle {theta} outside [0, π/2)"
                        )));
                    }
                }
            }
            SegmentDef::CubicSpiral {
                target_curvature_per_m,
                ..
            } if !target_curvature_per_m.is_finite() => {
                return Err(fail(format!("segment {idx} curvature is not finite")));
            }
            _ => {}
        }
    }

    for (idx, pair) in segments.windows(2).enumerate() {
        let gap = pair[1].x_start_m() - pair[0].x_end_m();
        if gap.abs() > CONTIGUITY_TOL_M {
            return Err(fail(format!(
                "gap of {gap} m between segments {idx} and {}",
                idx + 1
            )));
        }
    }

    let end = segments.last().map_or(0.0, SegmentDef::x_end_m);
    if end + CONTIGUITY_TOL_M < max_shift {
        return Err(fail(format!(
            "ends at {end} m, short of max shift {max_shift} m"
        )));
    }

    Ok(())
}

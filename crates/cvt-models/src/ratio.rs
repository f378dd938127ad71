//! CVT geometry: sheave radii, ratio and belt wrap as functions of shift.
//!
//! The belt length is fixed by the un-shifted geometry. As the primary closes,
//! its pitch radius grows linearly with shift and the secondary pitch radius is
//! whatever keeps the belt length constant, using the open-belt approximation
//!
//! ```text
//! L = 2C + π(r1 + r2) + (r2 − r1)²/C
//! ```
//!
//! which is a quadratic in `u = r2 − r1` and therefore solved in closed form.

use crate::common::{check_positive, clamp_shift};
use crate::error::{ModelError, ModelResult};
use cvt_core::units::{deg_to_rad, inch_to_m};
use std::f64::consts::PI;

/// Fixed sheave and belt geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct CvtGeometry {
    /// Included angle between the sheave faces (rad).
    pub sheave_angle: f64,
    /// Primary outer belt radius at zero shift (m).
    pub initial_primary_radius: f64,
    /// Secondary outer belt radius at zero shift (m).
    pub initial_secondary_radius: f64,
    /// Distance between the pulley axes (m).
    pub center_to_center: f64,
    /// Radial height of the belt cross-section (m).
    pub belt_height: f64,
    /// Axial travel of the moving primary sheave (m).
    pub max_shift: f64,
}

impl Default for CvtGeometry {
    fn default() -> Self {
        Self {
            sheave_angle: deg_to_rad(23.0),
            initial_primary_radius: 0.03462,
            initial_secondary_radius: inch_to_m(4.0),
            center_to_center: inch_to_m(10.0),
            belt_height: 0.01557,
            max_shift: 0.0221,
        }
    }
}

/// Ratio and wrap-angle model over the shift range.
#[derive(Debug, Clone, PartialEq)]
pub struct CvtRatioModel {
    geometry: CvtGeometry,
    belt_length: f64,
}

impl CvtRatioModel {
    pub fn new(geometry: CvtGeometry) -> ModelResult<Self> {
        check_positive(geometry.sheave_angle, "sheave angle")?;
        check_positive(geometry.initial_primary_radius, "initial primary radius")?;
        check_positive(geometry.initial_secondary_radius, "initial secondary radius")?;
        check_positive(geometry.center_to_center, "center distance")?;
        check_positive(geometry.belt_height, "belt height")?;
        check_positive(geometry.max_shift, "max shift")?;
        if geometry.sheave_angle >= PI {
            return Err(ModelError::config("sheave angle must be below 180°"));
        }

        let half = 0.5 * geometry.belt_height;
        let r1 = geometry.initial_primary_radius - half;
        let r2 = geometry.initial_secondary_radius - half;
        if r1 <= 0.0 || r2 <= 0.0 {
            return Err(ModelError::config(
                "initial sheave radii must exceed half the belt height",
            ));
        }

        let c = geometry.center_to_center;
        let belt_length = 2.0 * c + PI * (r1 + r2) + (r2 - r1).powi(2) / c;

        // Largest possible r1 + r2 for this belt length (reached at u = 0).
        if (belt_length - 2.0 * c) / PI + geometry.belt_height >= c {
            return Err(ModelError::config(
                "sheaves would overlap at this center distance",
            ));
        }

        let model = Self {
            geometry,
            belt_length,
        };

        // r1 grows monotonically with shift, so the end of travel is the
        // tightest point for the secondary.
        let s_max = model.geometry.max_shift;
        let r1_max = model.primary_pitch_radius(s_max);
        match model.pitch_offset(r1_max) {
            Some(u) if r1_max + u > 0.0 => Ok(model),
            _ => Err(ModelError::config(format!(
                "belt cannot reach full shift {s_max} m: secondary radius collapses"
            ))),
        }
    }

    pub fn geometry(&self) -> &CvtGeometry {
        &self.geometry
    }

    pub fn belt_length(&self) -> f64 {
        self.belt_length
    }

    pub fn max_shift(&self) -> f64 {
        self.geometry.max_shift
    }

    /// d(radius)/d(shift) for the primary.
    fn radial_rate(&self) -> f64 {
        1.0 / (2.0 * (0.5 * self.geometry.sheave_angle).tan())
    }

    /// `u = r2 − r1` preserving belt length, or `None` if no real solution.
    fn pitch_offset(&self, r1: f64) -> Option<f64> {
        let c = self.geometry.center_to_center;
        let k = 2.0 * PI * r1 + 2.0 * c - self.belt_length;
        let disc = PI * PI - 4.0 * k / c;
        (disc >= 0.0).then(|| 0.5 * c * (-PI + disc.sqrt()))
    }

    fn clamp(&self, shift: f64) -> f64 {
        clamp_shift(shift, self.geometry.max_shift)
    }

    pub fn primary_outer_radius(&self, shift: f64) -> f64 {
        self.geometry.initial_primary_radius + self.clamp(shift) * self.radial_rate()
    }

    pub fn primary_pitch_radius(&self, shift: f64) -> f64 {
        self.primary_outer_radius(shift) - 0.5 * self.geometry.belt_height
    }

    pub fn secondary_pitch_radius(&self, shift: f64) -> f64 {
        let r1 = self.primary_pitch_radius(shift);
        // Feasibility over the whole range is checked at construction.
        r1 + self.pitch_offset(r1).unwrap_or(0.0)
    }

    pub fn secondary_outer_radius(&self, shift: f64) -> f64 {
        self.secondary_pitch_radius(shift) + 0.5 * self.geometry.belt_height
    }

    /// Secondary over primary outer radius: >1 is underdrive.
    pub fn current_cvt_ratio(&self, shift: f64) -> f64 {
        self.secondary_outer_radius(shift) / self.primary_outer_radius(shift)
    }

    /// Analytic d(ratio)/d(shift).
    pub fn cvt_ratio_derivative(&self, shift: f64) -> f64 {
        let c = self.geometry.center_to_center;
        let r1 = self.primary_pitch_radius(shift);
        let u = self.pitch_offset(r1).unwrap_or(0.0);
        let du_dr1 = -2.0 * PI / (2.0 * u / c + PI);

        let g = self.radial_rate();
        let rp = self.primary_outer_radius(shift);
        let rs = self.secondary_outer_radius(shift);
        let drp = g;
        let drs = g * (1.0 + du_dr1);
        (drs * rp - rs * drp) / (rp * rp)
    }

    /// Belt direction change between two sheaves: `2·asin((r2 − r1)/(2C))`.
    pub fn wrap_angle(r1: f64, r2: f64, center_to_center: f64) -> f64 {
        2.0 * ((r2 - r1) / (2.0 * center_to_center)).asin()
    }

    fn wraps(&self, shift: f64) -> (f64, f64) {
        let r1 = self.primary_pitch_radius(shift);
        let r2 = self.secondary_pitch_radius(shift);
        let offset = Self::wrap_angle(r1, r2, self.geometry.center_to_center).abs();
        if r1 <= r2 {
            (PI - offset, PI + offset)
        } else {
            (PI + offset, PI - offset)
        }
    }

    pub fn primary_wrap_angle(&self, shift: f64) -> f64 {
        self.wraps(shift).0
    }

    pub fn secondary_wrap_angle(&self, shift: f64) -> f64 {
        self.wraps(shift).1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> CvtRatioModel {
        CvtRatioModel::new(CvtGeometry::default()).unwrap()
    }

    #[test]
    fn initial_ratio_is_outer_radius_quotient() {
        let m = model();
        let g = m.geometry();
        let expected = g.initial_secondary_radius / g.initial_primary_radius;
        assert!((m.current_cvt_ratio(0.0) - expected).abs() < 1e-12);
    }

    #[test]
    fn belt_length_is_conserved_across_shift() {
        let m = model();
        let c = m.geometry().center_to_center;
        for i in 0..=10 {
            let s = m.max_shift() * i as f64 / 10.0;
            let (r1, r2) = (m.primary_pitch_radius(s), m.secondary_pitch_radius(s));
            let length = 2.0 * c + PI * (r1 + r2) + (r2 - r1).powi(2) / c;
            assert!((length - m.belt_length()).abs() < 1e-12);
        }
    }

    #[test]
    fn ratio_falls_as_primary_closes() {
        let m = model();
        let r0 = m.current_cvt_ratio(0.0);
        let r_mid = m.current_cvt_ratio(0.5 * m.max_shift());
        let r_max = m.current_cvt_ratio(m.max_shift());
        assert!(r0 > r_mid && r_mid > r_max);
        assert!(r_max < 1.0);
    }

    #[test]
    fn shift_is_clamped() {
        let m = model();
        assert_eq!(m.current_cvt_ratio(-0.5), m.current_cvt_ratio(0.0));
        assert_eq!(
            m.current_cvt_ratio(1.0),
            m.current_cvt_ratio(m.max_shift())
        );
    }

    #[test]
    fn derivative_matches_finite_difference() {
        let m = model();
        let h = 1e-7;
        for s in [0.002, 0.01, 0.02] {
            let fd = (m.current_cvt_ratio(s + h) - m.current_cvt_ratio(s - h)) / (2.0 * h);
            let an = m.cvt_ratio_derivative(s);
            assert!((fd - an).abs() < 1e-5 * an.abs().max(1.0), "s={s}: {fd} vs {an}");
        }
    }

    #[test]
    fn smaller_sheave_wraps_less() {
        let m = model();
        let wp = m.primary_wrap_angle(0.0);
        let ws = m.secondary_wrap_angle(0.0);
        assert!((wp - 2.877).abs() < 1e-3);
        assert!((wp + ws - 2.0 * PI).abs() < 1e-12);
        assert!(wp < PI && ws > PI);

        // At full shift the primary is the larger sheave.
        let s = m.max_shift();
        assert!(m.primary_wrap_angle(s) > PI);
    }

    #[test]
    fn wrap_angle_is_antisymmetric() {
        let a = CvtRatioModel::wrap_angle(0.03, 0.09, 0.25);
        let b = CvtRatioModel::wrap_angle(0.09, 0.03, 0.25);
        assert!((a + b).abs() < 1e-15);
    }

    #[test]
    fn infeasible_travel_is_rejected() {
        let geometry = CvtGeometry {
            max_shift: 0.2,
            ..CvtGeometry::default()
        };
        let err = CvtRatioModel::new(geometry).unwrap_err();
        assert!(matches!(err, ModelError::Configuration { .. }));
    }

    #[test]
    fn overlapping_sheaves_are_rejected() {
        let geometry = CvtGeometry {
            center_to_center: 0.1,
            ..CvtGeometry::default()
        };
        assert!(CvtRatioModel::new(geometry).is_err());
    }
}

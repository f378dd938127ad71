//! Secondary (driven) pulley: torque-feedback helix plus a combined
//! torsion/compression spring.

use crate::common::{check_non_negative, check_positive, clamp_shift};
use crate::error::{ModelError, ModelResult};
use crate::forces::{hookes_law_comp, hookes_law_tors};
use crate::ramp::RampProfile;
use crate::ratio::CvtRatioModel;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct SecondaryConfig {
    /// Torsional spring rate (N·m/rad).
    pub torsion_spring_rate: f64,
    /// Compression spring rate (N/m).
    pub compression_spring_rate: f64,
    /// Spring pre-twist at zero shift (rad).
    pub initial_rotation: f64,
    /// Spring preload compression at zero shift (m).
    pub initial_compression: f64,
    /// Radius at which the helix ramps act (m).
    pub helix_radius: f64,
    pub helix: RampProfile,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SecondaryForces {
    pub spring_torque: f64,
    pub helix: f64,
    pub spring: f64,
    pub net: f64,
}

#[derive(Debug, Clone)]
pub struct SecondaryPulley {
    config: SecondaryConfig,
    ratio: Arc<CvtRatioModel>,
}

impl SecondaryPulley {
    pub fn new(config: SecondaryConfig, ratio: Arc<CvtRatioModel>) -> ModelResult<Self> {
        check_non_negative(config.torsion_spring_rate, "secondary torsion rate")?;
        check_non_negative(config.compression_spring_rate, "secondary compression rate")?;
        check_non_negative(config.initial_compression, "secondary initial compression")?;
        check_positive(config.helix_radius, "helix radius")?;
        let max_shift = ratio.max_shift();
        if !config.helix.covers(max_shift) {
            return Err(ModelError::config(format!(
                "helix does not cover shift range [0, {max_shift}]"
            )));
        }
        Ok(Self { config, ratio })
    }

    pub fn config(&self) -> &SecondaryConfig {
        &self.config
    }

    pub fn helix(&self) -> &RampProfile {
        &self.config.helix
    }

    fn clamp(&self, shift: f64) -> f64 {
        clamp_shift(shift, self.ratio.max_shift())
    }

    /// Belt effective radius on the secondary sheave.
    pub fn effective_radius(&self, shift: f64) -> f64 {
        self.ratio.secondary_pitch_radius(self.clamp(shift))
    }

    pub fn spring_torsion_torque(&self, shift: f64) -> ModelResult<f64> {
        let s = self.clamp(shift);
        let twist = self.config.helix.height(s)? / self.config.helix_radius;
        Ok(hookes_law_tors(
            self.config.torsion_spring_rate,
            self.config.initial_rotation + twist,
        ))
    }

    pub fn helix_force(&self, torque: f64, spring_torque: f64, shift: f64) -> ModelResult<f64> {
        let s = self.clamp(shift);
        let angle = self.config.helix.slope(s)?.atan();
        let denom = 2.0 * angle.tan() * self.effective_radius(s);
        if denom.abs() < f64::EPSILON {
            return Err(ModelError::NonPhysical {
                what: "helix slope vanishes",
            });
        }
        Ok((torque + spring_torque) / denom)
    }

    pub fn spring_compression_force(&self, shift: f64) -> f64 {
        hookes_law_comp(
            self.config.compression_spring_rate,
            self.config.initial_compression + self.clamp(shift),
        )
    }

    /// `torque` is the secondary shaft torque (engine torque times ratio).
    pub fn forces(&self, torque: f64, shift: f64) -> ModelResult<SecondaryForces> {
        let spring_torque = self.spring_torsion_torque(shift)?;
        let helix = self.helix_force(torque, spring_torque, shift)?;
        let spring = self.spring_compression_force(shift);
        Ok(SecondaryForces {
            spring_torque,
            helix,
            spring,
            net: helix + spring,
        })
    }

    pub fn net_force(&self, torque: f64, shift: f64) -> ModelResult<f64> {
        Ok(self.forces(torque, shift)?.net)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ramp::Segment;
    use crate::ratio::CvtGeometry;
    use std::f64::consts::PI;

    fn pulley_with_slope(slope: f64) -> SecondaryPulley {
        let ratio = Arc::new(CvtRatioModel::new(CvtGeometry::default()).unwrap());
        let max = ratio.max_shift();
        let helix = RampProfile::from_segments([Segment::linear(0.0, max, slope).unwrap()]).unwrap();
        SecondaryPulley::new(
            SecondaryConfig {
                torsion_spring_rate: 5.0,
                compression_spring_rate: 100.0,
                initial_rotation: PI / 12.0,
                initial_compression: 0.1,
                helix_radius: 0.04,
                helix,
            },
            ratio,
        )
        .unwrap()
    }

    #[test]
    fn spring_torque_at_zero_shift_is_pretwist() {
        let p = pulley_with_slope((-30.0_f64).to_radians().tan());
        let t = p.spring_torsion_torque(0.0).unwrap();
        assert!((t - 5.0 * PI / 12.0).abs() < 1e-12);
    }

    #[test]
    fn helix_force_formula() {
        let slope = (-30.0_f64).to_radians().tan();
        let p = pulley_with_slope(slope);
        let shift = 0.01;
        let spring_torque = p.spring_torsion_torque(shift).unwrap();
        let expected = (20.0 + spring_torque) / (2.0 * slope.abs() * p.effective_radius(shift));
        let f = p.helix_force(20.0, spring_torque, shift).unwrap();
        assert!((f - expected).abs() < 1e-9);
    }

    #[test]
    fn net_force_adds_compression_spring() {
        let p = pulley_with_slope(-0.5);
        let forces = p.forces(10.0, 0.005).unwrap();
        assert!((forces.spring - 100.0 * 0.105).abs() < 1e-12);
        assert!((forces.net - (forces.helix + forces.spring)).abs() < 1e-12);
        assert_eq!(p.net_force(10.0, 0.005).unwrap(), forces.net);
    }

    #[test]
    fn more_torque_clamps_harder() {
        let p = pulley_with_slope(-0.5);
        assert!(p.net_force(30.0, 0.005).unwrap() > p.net_force(10.0, 0.005).unwrap());
    }

    #[test]
    fn flat_helix_is_non_physical() {
        let p = pulley_with_slope(0.0);
        let err = p.net_force(10.0, 0.005).unwrap_err();
        assert_eq!(
            err,
            ModelError::NonPhysical {
                what: "helix slope vanishes"
            }
        );
    }
}

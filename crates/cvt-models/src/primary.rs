//! Primary (drive) pulley: flyweights on a ramp against a compression spring.

use crate::common::{check_non_negative, check_positive, clamp_shift};
use crate::error::{ModelError, ModelResult};
use crate::forces::{centrifugal_force, hookes_law_comp};
use crate::ramp::RampProfile;

#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryConfig {
    /// Compression spring rate (N/m).
    pub spring_rate: f64,
    /// Spring preload compression at zero shift (m).
    pub initial_compression: f64,
    /// Total flyweight mass (kg).
    pub flyweight_mass: f64,
    /// Flyweight radius at zero shift (m).
    pub initial_flyweight_radius: f64,
    pub ramp: RampProfile,
}

/// Axial force breakdown at one operating point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrimaryForces {
    pub flyweight: f64,
    pub spring: f64,
    pub net: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryPulley {
    config: PrimaryConfig,
    max_shift: f64,
}

impl PrimaryPulley {
    pub fn new(config: PrimaryConfig, max_shift: f64) -> ModelResult<Self> {
        check_non_negative(config.spring_rate, "primary spring rate")?;
        check_non_negative(config.initial_compression, "primary initial compression")?;
        check_positive(config.flyweight_mass, "flyweight mass")?;
        check_positive(config.initial_flyweight_radius, "initial flyweight radius")?;
        check_positive(max_shift, "max shift")?;
        if !config.ramp.covers(max_shift) {
            return Err(ModelError::config(format!(
                "primary ramp does not cover shift range [0, {max_shift}]"
            )));
        }
        Ok(Self { config, max_shift })
    }

    pub fn config(&self) -> &PrimaryConfig {
        &self.config
    }

    pub fn ramp(&self) -> &RampProfile {
        &self.config.ramp
    }

    pub fn flyweight_radius(&self, shift: f64) -> ModelResult<f64> {
        let s = clamp_shift(shift, self.max_shift);
        Ok(self.config.initial_flyweight_radius + self.config.ramp.height(s)?)
    }

    /// Axial component of the flyweights' centrifugal load.
    pub fn flyweight_force(&self, shift: f64, omega: f64) -> ModelResult<f64> {
        let s = clamp_shift(shift, self.max_shift);
        let radius = self.flyweight_radius(s)?;
        let angle = self.config.ramp.slope(s)?.atan();
        let cf = centrifugal_force(self.config.flyweight_mass, omega, radius);
        Ok(angle.tan() * cf)
    }

    pub fn spring_force(&self, shift: f64) -> f64 {
        let s = clamp_shift(shift, self.max_shift);
        hookes_law_comp(self.config.spring_rate, self.config.initial_compression + s)
    }

    pub fn forces(&self, shift: f64, omega: f64) -> ModelResult<PrimaryForces> {
        let flyweight = self.flyweight_force(shift, omega)?;
        let spring = self.spring_force(shift);
        Ok(PrimaryForces {
            flyweight,
            spring,
            net: flyweight - spring,
        })
    }

    /// Net closing force on the moving sheave (N).
    pub fn net_force(&self, shift: f64, omega: f64) -> ModelResult<f64> {
        Ok(self.forces(shift, omega)?.net)
    }
}

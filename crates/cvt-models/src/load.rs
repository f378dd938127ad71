//! Road load on the vehicle: grade, aerodynamic drag and the body itself.

use crate::common::{check_finite, check_positive};
use crate::error::ModelResult;
use crate::forces::{air_resistance, newtons_second_law};
use cvt_core::numeric::sign_or_positive;
use cvt_core::units::constants::{AIR_DENSITY_KG_M3, G0_MPS2};

/// Velocity floor used in the power term near standstill (m/s).
pub const DEFAULT_MIN_VELOCITY: f64 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct LoadConfig {
    /// Vehicle plus driver mass (kg).
    pub car_mass: f64,
    /// Frontal area (m²).
    pub frontal_area: f64,
    pub drag_coefficient: f64,
    /// Road grade (rad, positive uphill).
    pub incline_angle: f64,
    /// Fixed reduction between the CVT secondary and the wheels.
    pub gearbox_ratio: f64,
    /// Tyre rolling radius (m).
    pub wheel_radius: f64,
    pub air_density: f64,
    pub min_velocity: f64,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            car_mass: 225.0,
            frontal_area: 1.0,
            drag_coefficient: 0.6,
            incline_angle: 0.0,
            gearbox_ratio: 8.32,
            wheel_radius: 0.2794,
            air_density: AIR_DENSITY_KG_M3,
            min_velocity: DEFAULT_MIN_VELOCITY,
        }
    }
}

/// Resistive load seen by the drivetrain.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadModel {
    config: LoadConfig,
}

impl LoadModel {
    pub fn new(config: LoadConfig) -> ModelResult<Self> {
        check_positive(config.car_mass, "car mass")?;
        check_positive(config.gearbox_ratio, "gearbox ratio")?;
        check_positive(config.wheel_radius, "wheel radius")?;
        check_positive(config.min_velocity, "minimum velocity")?;
        check_finite(config.frontal_area, "frontal area")?;
        check_finite(config.drag_coefficient, "drag coefficient")?;
        check_finite(config.air_density, "air density")?;
        check_finite(config.incline_angle, "incline angle")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &LoadConfig {
        &self.config
    }

    pub fn car_mass(&self) -> f64 {
        self.config.car_mass
    }

    pub fn gearbox_ratio(&self) -> f64 {
        self.config.gearbox_ratio
    }

    pub fn wheel_radius(&self) -> f64 {
        self.config.wheel_radius
    }

    pub fn incline_force(&self) -> f64 {
        self.config.car_mass * G0_MPS2 * self.config.incline_angle.sin()
    }

    /// Drag force, signed with `v` so it always opposes motion.
    pub fn drag_force(&self, v: f64) -> f64 {
        let c = &self.config;
        sign_or_positive(v) * air_resistance(c.air_density, v, c.frontal_area, c.drag_coefficient)
    }

    /// Resistive torque referred to the CVT secondary shaft (N·m).
    pub fn gearbox_load(&self, v: f64) -> f64 {
        (self.incline_force() + self.drag_force(v)) * self.config.wheel_radius
            / self.config.gearbox_ratio
    }

    /// Vehicle acceleration given power delivered at the wheels.
    pub fn acceleration(&self, v: f64, power: f64) -> f64 {
        let c = &self.config;
        let v_eff = sign_or_positive(v) * v.abs().max(c.min_velocity);
        power / (v_eff * c.car_mass) - self.drag_force(v) / c.car_mass
            - G0_MPS2 * c.incline_angle.sin()
    }
}

/// Bare vehicle body obeying Newton's second law.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarModel {
    mass: f64,
}

impl CarModel {
    pub fn new(mass: f64) -> ModelResult<Self> {
        check_positive(mass, "car mass")?;
        Ok(Self { mass })
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn acceleration(&self, force: f64) -> f64 {
        force / self.mass
    }

    pub fn force_for(&self, acceleration: f64) -> f64 {
        newtons_second_law(self.mass, acceleration)
    }
}

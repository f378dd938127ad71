//! Coupled engine/vehicle/CVT shift dynamics.
//!
//! The engine is kinematically locked to the wheels through the current CVT
//! ratio and the fixed gearbox:
//!
//! ```text
//! ω_engine = v · k(s),   k(s) = ratio(s) · G / r_wheel
//! ```
//!
//! so vehicle motion is driven by engine power, and the shift coordinate `s`
//! is driven by the imbalance between the two sheaves' radial belt forces:
//!
//! ```text
//! m_shift · s̈ = F_r,primary − F_r,secondary + F_friction
//! ```

use crate::error::{SimError, SimResult};
use crate::events::{ShiftLimits, cap_engine_speed, track_end_reached};
use crate::model::TransientModel;
use crate::state::DrivetrainState;
use cvt_models::forces::gearing;
use cvt_models::{
    BeltModel, CvtRatioModel, EngineModel, LoadModel, PrimaryForces, PrimaryPulley,
    SecondaryForces, SecondaryPulley,
};
use std::sync::Arc;

/// Coulomb friction ceiling on the moving sheave (N).
pub const DEFAULT_FRICTION_CAP: f64 = 20.0;

/// Governed engine speed (rad/s), about 3820 rpm.
pub const DEFAULT_MAX_ENGINE_SPEED: f64 = 400.0;

/// Scalars governing the shift coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShiftConfig {
    /// Effective mass of the moving sheaves and belt (kg).
    pub moving_mass: f64,
    pub friction_cap: f64,
    /// Engine speed ceiling (rad/s). Vehicle speed is held so that the
    /// locked engine never turns faster than this.
    pub max_engine_speed: f64,
}

impl Default for ShiftConfig {
    fn default() -> Self {
        Self {
            moving_mass: 1.0,
            friction_cap: DEFAULT_FRICTION_CAP,
            max_engine_speed: DEFAULT_MAX_ENGINE_SPEED,
        }
    }
}

/// The immutable component models a shift engine is assembled from.
#[derive(Debug, Clone)]
pub struct DrivetrainModels {
    pub engine: Arc<EngineModel>,
    pub load: Arc<LoadModel>,
    pub ratio: Arc<CvtRatioModel>,
    pub primary: Arc<PrimaryPulley>,
    pub secondary: Arc<SecondaryPulley>,
    pub primary_belt: Arc<BeltModel>,
    pub secondary_belt: Arc<BeltModel>,
}

/// Clamping and radial forces at one state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulleyForces {
    pub cvt_ratio: f64,
    pub engine_angular_velocity: f64,
    pub engine_torque: f64,
    pub primary: PrimaryForces,
    pub secondary: SecondaryForces,
    pub primary_wrap: f64,
    pub secondary_wrap: f64,
    pub primary_radial: f64,
    pub secondary_radial: f64,
}

/// Everything the derivative computes, exposed for reporting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperatingPoint {
    pub forces: PulleyForces,
    pub engine_power: f64,
    pub gearbox_load: f64,
    pub vehicle_acceleration: f64,
    pub friction: f64,
    pub shift_acceleration: f64,
    pub engine_angular_acceleration: f64,
}

/// Shift dynamics orchestrator. Cheap to clone; all models are shared.
#[derive(Debug, Clone)]
pub struct CvtShiftEngine {
    models: DrivetrainModels,
    config: ShiftConfig,
    limits: ShiftLimits,
    initial: DrivetrainState,
    track_length: Option<f64>,
}

impl CvtShiftEngine {
    pub fn new(models: DrivetrainModels, config: ShiftConfig) -> SimResult<Self> {
        if !config.moving_mass.is_finite() || config.moving_mass <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "moving mass must be positive",
            });
        }
        if !config.friction_cap.is_finite() || config.friction_cap < 0.0 {
            return Err(SimError::InvalidArg {
                what: "friction cap must be non-negative",
            });
        }
        if !config.max_engine_speed.is_finite() || config.max_engine_speed <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "max engine speed must be positive",
            });
        }
        let limits = ShiftLimits::new(models.ratio.max_shift());
        Ok(Self {
            models,
            config,
            limits,
            initial: DrivetrainState::default(),
            track_length: None,
        })
    }

    /// Set the state at t = 0, corrected into the admissible range.
    pub fn with_initial_state(mut self, state: DrivetrainState) -> Self {
        self.initial = self.correct(state);
        self
    }

    /// End runs once the vehicle has travelled `length` metres.
    pub fn with_track_length(mut self, length: Option<f64>) -> Self {
        self.track_length = length;
        self
    }

    pub fn models(&self) -> &DrivetrainModels {
        &self.models
    }

    pub fn config(&self) -> &ShiftConfig {
        &self.config
    }

    pub fn limits(&self) -> ShiftLimits {
        self.limits
    }

    pub fn track_length(&self) -> Option<f64> {
        self.track_length
    }

    /// wheel speed → engine speed factor at a shift position.
    pub fn wheel_to_engine(&self, shift: f64) -> f64 {
        let load = &self.models.load;
        self.models.ratio.current_cvt_ratio(shift) * load.gearbox_ratio() / load.wheel_radius()
    }

    /// Engine speed implied by vehicle speed and shift position.
    pub fn engine_speed_for(&self, vehicle_velocity: f64, shift: f64) -> f64 {
        vehicle_velocity * self.wheel_to_engine(shift)
    }

    /// Vehicle speed at which the engine turns at `omega` for a shift position.
    pub fn vehicle_speed_for(&self, omega: f64, shift: f64) -> f64 {
        omega / self.wheel_to_engine(shift)
    }

    /// Coulomb friction on the moving sheave.
    pub fn frictional_force(&self, radial_difference: f64, shift_velocity: f64) -> f64 {
        let magnitude = self.config.friction_cap.min(radial_difference.abs());
        if shift_velocity > 0.0 {
            -magnitude
        } else {
            magnitude
        }
    }

    /// Sheave forces at an explicit engine speed and shift position.
    pub fn forces_at(&self, omega: f64, shift: f64) -> SimResult<PulleyForces> {
        let m = &self.models;
        let cvt_ratio = m.ratio.current_cvt_ratio(shift);
        let engine_torque = m.engine.get_torque(omega);

        let primary = m.primary.forces(shift, omega)?;
        let secondary = m.secondary.forces(gearing(engine_torque, cvt_ratio), shift)?;

        let primary_wrap = m.ratio.primary_wrap_angle(shift);
        let secondary_wrap = m.ratio.secondary_wrap_angle(shift);
        let primary_radial =
            m.primary_belt
                .calculate_radial_force(omega, shift, primary_wrap, primary.net);
        let secondary_radial =
            m.secondary_belt
                .calculate_radial_force(omega, shift, secondary_wrap, secondary.net);

        Ok(PulleyForces {
            cvt_ratio,
            engine_angular_velocity: omega,
            engine_torque,
            primary,
            secondary,
            primary_wrap,
            secondary_wrap,
            primary_radial,
            secondary_radial,
        })
    }

    pub fn pulley_forces(&self, state: &DrivetrainState) -> SimResult<PulleyForces> {
        let omega = self.engine_speed_for(state.vehicle_velocity, state.shift_distance);
        self.forces_at(omega, state.shift_distance)
    }

    pub fn operating_point(&self, state: &DrivetrainState) -> SimResult<OperatingPoint> {
        if !state.is_finite() {
            return Err(SimError::NonPhysical {
                what: "drivetrain state is not finite",
            });
        }

        let m = &self.models;
        let v = state.vehicle_velocity;
        let s = state.shift_distance;

        let forces = self.pulley_forces(state)?;
        let omega = forces.engine_angular_velocity;
        let engine_power = m.engine.get_power(omega);
        let gearbox_load = m.load.gearbox_load(v);
        let vehicle_acceleration = m.load.acceleration(v, engine_power);

        let radial_difference = forces.primary_radial - forces.secondary_radial;
        let friction = self.frictional_force(radial_difference, state.shift_velocity);
        let shift_acceleration = (radial_difference + friction) / self.config.moving_mass;

        let k = self.wheel_to_engine(s);
        let dk_ds =
            m.ratio.cvt_ratio_derivative(s) * m.load.gearbox_ratio() / m.load.wheel_radius();
        let engine_angular_acceleration = vehicle_acceleration * k + v * dk_ds * state.shift_velocity;

        Ok(OperatingPoint {
            forces,
            engine_power,
            gearbox_load,
            vehicle_acceleration,
            friction,
            shift_acceleration,
            engine_angular_acceleration,
        })
    }

    /// Time derivative of the state. Pure in `(t, state)`.
    pub fn state_derivative(&self, _t: f64, state: &DrivetrainState) -> SimResult<DrivetrainState> {
        let op = self.operating_point(state)?;
        let d = DrivetrainState {
            engine_angular_velocity: op.engine_angular_acceleration,
            engine_angular_position: op.forces.engine_angular_velocity,
            vehicle_velocity: op.vehicle_acceleration,
            vehicle_position: state.vehicle_velocity,
            shift_velocity: op.shift_acceleration,
            shift_distance: state.shift_velocity,
        };
        if !d.is_finite() {
            return Err(SimError::NonPhysical {
                what: "state derivative is not finite",
            });
        }
        Ok(d)
    }

    /// Flat-vector form of [`state_derivative`](Self::state_derivative).
    pub fn derivative(&self, t: f64, y: &[f64; 6]) -> SimResult<[f64; 6]> {
        let d = self.state_derivative(t, &DrivetrainState::from_array(*y))?;
        Ok(d.to_array())
    }

    /// Clamp the shift into its travel, then hold the engine at or below
    /// its ceiling by limiting vehicle speed.
    pub fn correct(&self, state: DrivetrainState) -> DrivetrainState {
        let state = self.limits.correct(state);
        let k = self.wheel_to_engine(state.shift_distance);
        cap_engine_speed(state, k, self.config.max_engine_speed)
    }
}

impl TransientModel for CvtShiftEngine {
    type State = DrivetrainState;

    fn initial_state(&self) -> DrivetrainState {
        self.initial
    }

    fn rhs(&mut self, t: f64, x: &DrivetrainState) -> SimResult<DrivetrainState> {
        self.state_derivative(t, x)
    }

    fn add(&self, a: &DrivetrainState, b: &DrivetrainState) -> DrivetrainState {
        a.zip_with(b, |x, y| x + y)
    }

    fn scale(&self, a: &DrivetrainState, scale: f64) -> DrivetrainState {
        a.map(|x| x * scale)
    }

    fn correct(&self, x: DrivetrainState) -> DrivetrainState {
        CvtShiftEngine::correct(self, x)
    }

    fn validate_state(&self, t: f64, x: &DrivetrainState) -> SimResult<()> {
        if x.is_finite() {
            Ok(())
        } else {
            Err(SimError::NonFiniteState { t })
        }
    }

    fn terminal_event(&self, _t: f64, x: &DrivetrainState) -> Option<String> {
        track_end_reached(x, self.track_length).then(|| {
            format!(
                "vehicle reached end of track at {:.2} m",
                x.vehicle_position
            )
        })
    }
}

//! Drivetrain state vector.

use crate::error::{SimError, SimResult};

/// Instantaneous drivetrain state, SI units.
///
/// The flat layout handed to integrators is the field order below.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DrivetrainState {
    /// rad/s
    pub engine_angular_velocity: f64,
    /// rad
    pub engine_angular_position: f64,
    /// m/s
    pub vehicle_velocity: f64,
    /// m
    pub vehicle_position: f64,
    /// m/s
    pub shift_velocity: f64,
    /// m
    pub shift_distance: f64,
}

impl DrivetrainState {
    pub const LEN: usize = 6;

    pub fn from_array(y: [f64; 6]) -> Self {
        Self {
            engine_angular_velocity: y[0],
            engine_angular_position: y[1],
            vehicle_velocity: y[2],
            vehicle_position: y[3],
            shift_velocity: y[4],
            shift_distance: y[5],
        }
    }

    pub fn to_array(&self) -> [f64; 6] {
        [
            self.engine_angular_velocity,
            self.engine_angular_position,
            self.vehicle_velocity,
            self.vehicle_position,
            self.shift_velocity,
            self.shift_distance,
        ]
    }

    pub fn from_slice(y: &[f64]) -> SimResult<Self> {
        let array: [f64; 6] = y.try_into().map_err(|_| SimError::InvalidArg {
            what: "drivetrain state needs exactly 6 values",
        })?;
        Ok(Self::from_array(array))
    }

    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }

    pub(crate) fn zip_with(&self, other: &Self, f: impl Fn(f64, f64) -> f64) -> Self {
        let (a, b) = (self.to_array(), other.to_array());
        Self::from_array(std::array::from_fn(|i| f(a[i], b[i])))
    }

    pub(crate) fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self::from_array(self.to_array().map(f))
    }
}

impl From<[f64; 6]> for DrivetrainState {
    fn from(y: [f64; 6]) -> Self {
        Self::from_array(y)
    }
}

impl From<DrivetrainState> for [f64; 6] {
    fn from(s: DrivetrainState) -> Self {
        s.to_array()
    }
}

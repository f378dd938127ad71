//! Boundary correction and run-ending events for the shift dynamics.

use crate::state::DrivetrainState;

/// Mechanical travel limits of the moving primary sheave.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShiftLimits {
    pub max_shift: f64,
}

impl ShiftLimits {
    pub fn new(max_shift: f64) -> Self {
        Self { max_shift }
    }

    /// Clamp shift distance into `[0, max_shift]`, zeroing any velocity that
    /// would carry it further out.
    pub fn correct(&self, mut state: DrivetrainState) -> DrivetrainState {
        if state.shift_distance < 0.0 {
            state.shift_distance = 0.0;
            state.shift_velocity = state.shift_velocity.max(0.0);
        } else if state.shift_distance > self.max_shift {
            state.shift_distance = self.max_shift;
            state.shift_velocity = state.shift_velocity.min(0.0);
        }
        state
    }

    pub fn is_at_limit(&self, state: &DrivetrainState) -> bool {
        state.shift_distance <= 0.0 || state.shift_distance >= self.max_shift
    }
}

/// Hold the wheel-locked engine inside `[0, max_speed]`.
///
/// `wheel_to_engine` is the factor k with ω = v·k. Vehicle speed is the
/// integrated quantity, so it is the one that gets limited; the engine speed
/// is then pinned to the bound it hit.
pub(crate) fn cap_engine_speed(
    mut state: DrivetrainState,
    wheel_to_engine: f64,
    max_speed: f64,
) -> DrivetrainState {
    let omega = state.vehicle_velocity * wheel_to_engine;
    if omega > max_speed {
        state.vehicle_velocity = max_speed / wheel_to_engine;
        state.engine_angular_velocity = max_speed;
    } else if omega < 0.0 {
        state.vehicle_velocity = 0.0;
        state.engine_angular_velocity = 0.0;
    }
    state
}

/// True once the vehicle has covered the course.
pub(crate) fn track_end_reached(state: &DrivetrainState, track_length: Option<f64>) -> bool {
    track_length.is_some_and(|len| state.vehicle_position >= len)
}

//! Transient simulation of CVT shift dynamics.
//!
//! Provides:
//! - `DrivetrainState` and its flat six-value layout
//! - `CvtShiftEngine`: the coupled engine/vehicle/shift derivative
//! - Shift boundary correction and the end-of-track event
//! - Fixed-step RK4 and forward Euler integrators with a recording run loop

pub mod error;
pub mod events;
pub mod integrator;
pub mod model;
pub mod shift;
pub mod sim;
pub mod state;

#[cfg(test)]
mod testing;

// Re-exports for public API
pub use error::{SimError, SimResult};
pub use events::ShiftLimits;
pub use integrator::{ForwardEuler, Integrator, RK4};
pub use model::TransientModel;
pub use shift::{
    CvtShiftEngine, DEFAULT_FRICTION_CAP, DEFAULT_MAX_ENGINE_SPEED, DrivetrainModels,
    OperatingPoint, PulleyForces, ShiftConfig,
};
pub use sim::{
    IntegratorType, SimOptions, SimProgress, SimRecord, Termination, run_sim,
    run_sim_with_progress,
};
pub use state::DrivetrainState;

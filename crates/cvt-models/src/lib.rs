//! cvt-models: physical models for a CVT-equipped vehicle.
//!
//! Provides:
//! - Ramp and helix cam profiles built from linear, arc and spiral segments
//! - Stateless force formulas (springs, centrifugal, drag, belt tension)
//! - Engine torque source and road load
//! - Primary/secondary pulley clamping forces
//! - Belt radial force and the geometric ratio model
//!
//! Every model is an immutable value; evaluation is a pure function of the
//! arguments, so models can be shared freely between threads.
//!
//! # Example
//!
//! ```
//! use cvt_models::{CvtGeometry, CvtRatioModel};
//!
//! let ratio = CvtRatioModel::new(CvtGeometry::default()).unwrap();
//! let launch = ratio.current_cvt_ratio(0.0);
//! let overdrive = ratio.current_cvt_ratio(ratio.max_shift());
//! assert!(launch > 1.0 && overdrive < 1.0);
//! ```

pub mod belt;
pub mod common;
pub mod engine;
pub mod error;
pub mod forces;
pub mod load;
pub mod primary;
pub mod ramp;
pub mod ratio;
pub mod secondary;
pub mod traits;

// Re-exports
pub use belt::{BeltConfig, BeltModel, Sheave};
pub use engine::{CubicSplineCurve, EngineModel};
pub use error::{ModelError, ModelResult};
pub use load::{CarModel, LoadConfig, LoadModel};
pub use primary::{PrimaryConfig, PrimaryForces, PrimaryPulley};
pub use ramp::{RampProfile, RampSample, Segment};
pub use ratio::{CvtGeometry, CvtRatioModel};
pub use secondary::{SecondaryConfig, SecondaryForces, SecondaryPulley};
pub use traits::TorqueCurve;

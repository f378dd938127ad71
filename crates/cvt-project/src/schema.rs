//! Project schema definitions.
//!
//! Field names carry their unit as a suffix; everything is SI except where a
//! suffix says otherwise (`_deg`, `_rpm`). Every section defaults to the
//! reference vehicle in [`crate::presets`], so a minimal project file only
//! needs `version` and `name`.

use crate::presets;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub vehicle: VehicleDef,
    #[serde(default)]
    pub engine: EngineDef,
    #[serde(default)]
    pub geometry: GeometryDef,
    #[serde(default)]
    pub belt: BeltDef,
    #[serde(default)]
    pub primary: PrimaryDef,
    #[serde(default)]
    pub secondary: SecondaryDef,
    #[serde(default)]
    pub shift: ShiftDef,
    #[serde(default)]
    pub initial: InitialConditionsDef,
    #[serde(default)]
    pub run: RunOptionsDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VehicleDef {
    pub mass_kg: f64,
    pub frontal_area_m2: f64,
    pub drag_coefficient: f64,
    pub incline_deg: f64,
    pub gearbox_ratio: f64,
    pub wheel_radius_m: f64,
    pub air_density_kg_m3: f64,
    pub min_velocity_mps: f64,
}

impl Default for VehicleDef {
    fn default() -> Self {
        presets::vehicle()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TorqueUnitDef {
    #[default]
    Nm,
    FtLbf,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DynoPointDef {
    pub rpm: f64,
    pub torque: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineDef {
    pub inertia_kg_m2: f64,
    pub torque_unit: TorqueUnitDef,
    pub dyno: Vec<DynoPointDef>,
}

impl Default for EngineDef {
    fn default() -> Self {
        presets::engine()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeometryDef {
    pub sheave_angle_deg: f64,
    pub initial_primary_radius_m: f64,
    pub initial_secondary_radius_m: f64,
    pub center_to_center_m: f64,
    pub belt_height_m: f64,
    pub max_shift_m: f64,
}

impl Default for GeometryDef {
    fn default() -> Self {
        presets::geometry()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BeltDef {
    pub density_kg_m3: f64,
    pub top_width_m: f64,
    /// Overrides the area derived from top width, height and sheave angle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cross_section_area_m2: Option<f64>,
    pub friction_coefficient: f64,
}

impl Default for BeltDef {
    fn default() -> Self {
        presets::belt()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PrimaryDef {
    pub spring_rate_n_per_m: f64,
    pub initial_compression_m: f64,
    pub flyweight_mass_kg: f64,
    pub initial_flyweight_radius_m: f64,
    pub ramp: RampDef,
}

impl Default for PrimaryDef {
    fn default() -> Self {
        presets::primary()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SecondaryDef {
    pub torsion_rate_nm_per_rad: f64,
    pub compression_rate_n_per_m: f64,
    pub initial_rotation_deg: f64,
    pub initial_compression_m: f64,
    pub helix_radius_m: f64,
    pub helix: RampDef,
}

impl Default for SecondaryDef {
    fn default() -> Self {
        presets::secondary()
    }
}

/// A cam profile, either a named shape scaled to the shift range or an
/// explicit list of segments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum RampDef {
    Preset { preset: RampPresetDef },
    Segments { segments: Vec<SegmentDef> },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RampPresetDef {
    /// Straight start steepening into a circular arc.
    Progressive,
    /// 25° line blended into a shallow arc by a cubic spiral.
    Blended,
    /// Steep line then a large-radius arc.
    SteepArc,
    /// Moderate line then a tight arc.
    TightArc,
    /// Constant 30° helix.
    Helix30,
}

impl RampPresetDef {
    pub const ALL: [RampPresetDef; 5] = [
        RampPresetDef::Progressive,
        RampPresetDef::Blended,
        RampPresetDef::SteepArc,
        RampPresetDef::TightArc,
        RampPresetDef::Helix30,
    ];
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum SegmentDef {
    Linear {
        x_start_m: f64,
        x_end_m: f64,
        slope: f64,
    },
    CircularArc {
        x_start_m: f64,
        x_end_m: f64,
        radius_m: f64,
        theta_start_rad: f64,
        theta_end_rad: f64,
    },
    /// Slopes left empty are taken from the neighbouring segments.
    CubicSpiral {
        x_start_m: f64,
        x_end_m: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        slope_start: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        slope_end: Option<f64>,
        target_curvature_per_m: f64,
    },
}

impl SegmentDef {
    pub fn x_start_m(&self) -> f64 {
        match self {
            SegmentDef::Linear { x_start_m, .. }
            | SegmentDef::CircularArc { x_start_m, .. }
            | SegmentDef::CubicSpiral { x_start_m, .. } => *x_start_m,
        }
    }

    pub fn x_end_m(&self) -> f64 {
        match self {
            SegmentDef::Linear { x_end_m, .. }
            | SegmentDef::CircularArc { x_end_m, .. }
            | SegmentDef::CubicSpiral { x_end_m, .. } => *x_end_m,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShiftDef {
    pub moving_mass_kg: f64,
    pub friction_cap_n: f64,
    /// Governed engine speed; the vehicle is held back once the engine hits it.
    pub max_engine_rpm: f64,
}

impl Default for ShiftDef {
    fn default() -> Self {
        presets::shift()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InitialConditionsDef {
    pub engine_rpm: f64,
    /// When set, the engine speed follows from this instead of `engine_rpm`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_velocity_mps: Option<f64>,
    pub shift_m: f64,
    pub shift_velocity_mps: f64,
}

impl Default for InitialConditionsDef {
    fn default() -> Self {
        presets::initial_conditions()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum IntegratorDef {
    #[default]
    Rk4,
    ForwardEuler,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunOptionsDef {
    pub dt_s: f64,
    pub t_end_s: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_steps: Option<usize>,
    pub record_every: usize,
    pub integrator: IntegratorDef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_length_m: Option<f64>,
    pub progress_interval_s: f64,
}

impl Default for RunOptionsDef {
    fn default() -> Self {
        presets::run_options()
    }
}

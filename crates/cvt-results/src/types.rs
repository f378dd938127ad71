//! Result data types.

use serde::{Deserialize, Serialize};

pub type RunId = String;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunManifest {
    pub run_id: RunId,
    pub project_name: String,
    /// RFC 3339, UTC.
    pub timestamp: String,
    pub settings: RunSettings,
    pub solver_version: String,
    pub termination: String,
    pub steps: usize,
    pub record_count: usize,
}

/// Integration settings a run was produced with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSettings {
    pub dt_s: f64,
    pub t_end_s: f64,
    pub integrator: String,
    pub record_every: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_length_m: Option<f64>,
}

/// One recorded sample: the raw state followed by quantities derived from it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeseriesRecord {
    pub time_s: f64,
    pub engine_angular_velocity_rad_s: f64,
    pub engine_angular_position_rad: f64,
    pub vehicle_velocity_mps: f64,
    pub vehicle_position_m: f64,
    pub shift_velocity_mps: f64,
    pub shift_distance_m: f64,

    pub cvt_ratio: f64,
    pub engine_rpm: f64,
    pub engine_torque_nm: f64,
    pub vehicle_speed_kmh: f64,
    /// Shift distance as a percentage of the full travel.
    pub shift_percent: f64,
    pub secondary_angular_position_rad: f64,
    pub primary_net_force_n: f64,
    pub secondary_net_force_n: f64,
    pub primary_radial_force_n: f64,
    pub secondary_radial_force_n: f64,
}

/// Current UTC time in the manifest timestamp format.
pub fn timestamp_now() -> String {
    chrono::Utc::now().to_rfc3339()
}

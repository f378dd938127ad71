//! Query helpers for extracting data from loaded runs.

use cvt_results::TimeseriesRecord;

use crate::error::{AppError, AppResult};

/// Summary of a run's time range and data.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub time_range: (f64, f64),
    pub record_count: usize,
    pub final_position_m: f64,
    pub final_speed_kmh: f64,
    pub final_engine_rpm: f64,
    pub final_cvt_ratio: f64,
}

/// Names accepted by [`extract_series`].
pub const VARIABLES: &[&str] = &[
    "engine_rpm",
    "engine_torque_nm",
    "engine_angular_velocity_rad_s",
    "engine_angular_position_rad",
    "vehicle_velocity_mps",
    "vehicle_position_m",
    "vehicle_speed_kmh",
    "shift_distance_m",
    "shift_velocity_mps",
    "shift_percent",
    "cvt_ratio",
    "secondary_angular_position_rad",
    "primary_net_force_n",
    "secondary_net_force_n",
    "primary_radial_force_n",
    "secondary_radial_force_n",
];

/// Get run summary from timeseries records.
pub fn get_run_summary(records: &[TimeseriesRecord]) -> AppResult<RunSummary> {
    let (Some(first), Some(last)) = (records.first(), records.last()) else {
        return Err(AppError::InvalidInput("No records in run".to_string()));
    };

    Ok(RunSummary {
        time_range: (first.time_s, last.time_s),
        record_count: records.len(),
        final_position_m: last.vehicle_position_m,
        final_speed_kmh: last.vehicle_speed_kmh,
        final_engine_rpm: last.engine_rpm,
        final_cvt_ratio: last.cvt_ratio,
    })
}

fn variable_value(record: &TimeseriesRecord, variable: &str) -> Option<f64> {
    let value = match variable {
        "engine_rpm" | "rpm" => record.engine_rpm,
        "engine_torque_nm" | "torque" => record.engine_torque_nm,
        "engine_angular_velocity_rad_s" => record.engine_angular_velocity_rad_s,
        "engine_angular_position_rad" => record.engine_angular_position_rad,
        "vehicle_velocity_mps" | "velocity" => record.vehicle_velocity_mps,
        "vehicle_position_m" | "position" => record.vehicle_position_m,
        "vehicle_speed_kmh" | "speed" => record.vehicle_speed_kmh,
        "shift_distance_m" | "shift" => record.shift_distance_m,
        "shift_velocity_mps" => record.shift_velocity_mps,
        "shift_percent" => record.shift_percent,
        "cvt_ratio" | "ratio" => record.cvt_ratio,
        "secondary_angular_position_rad" => record.secondary_angular_position_rad,
        "primary_net_force_n" => record.primary_net_force_n,
        "secondary_net_force_n" => record.secondary_net_force_n,
        "primary_radial_force_n" => record.primary_radial_force_n,
        "secondary_radial_force_n" => record.secondary_radial_force_n,
        _ => return None,
    };
    Some(value)
}

/// Extract the time series of one recorded variable.
pub fn extract_series(records: &[TimeseriesRecord], variable: &str) -> AppResult<Vec<(f64, f64)>> {
    records
        .iter()
        .map(|r| {
            variable_value(r, variable)
                .map(|v| (r.time_s, v))
                .ok_or_else(|| AppError::InvalidInput(format!("Unknown variable: {}", variable)))
        })
        .collect()
}

//! Launch performance metrics.
//!
//! Computes acceleration-event figures (top speed, time to distance, shift
//! timing) from persisted or in-memory timeseries records.

use cvt_results::TimeseriesRecord;
use serde::{Deserialize, Serialize};

/// Shift travel below this percentage counts as "not yet shifting".
const SHIFT_ONSET_PCT: f64 = 1.0;
/// Shift travel above this percentage counts as fully shifted out.
const SHIFT_OUT_PCT: f64 = 99.0;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LaunchMetrics {
    pub top_speed_kmh: f64,
    pub final_speed_kmh: f64,
    pub final_shift_percent: f64,
    pub peak_engine_rpm: f64,
    /// First time the sheaves move off the low-ratio stop.
    pub shift_onset_s: Option<f64>,
    /// Engine speed at shift onset.
    pub shift_onset_rpm: Option<f64>,
    /// First time the belt reaches the high-ratio stop.
    pub shift_out_s: Option<f64>,
    /// Time to cover the given distance, interpolated between records.
    pub time_to_distance_s: Option<f64>,
    pub distance_m: Option<f64>,
}

/// Compute launch metrics. `distance_m` is usually the track length.
pub fn compute_launch_metrics(
    records: &[TimeseriesRecord],
    distance_m: Option<f64>,
) -> LaunchMetrics {
    let Some(last) = records.last() else {
        return LaunchMetrics::default();
    };

    let max_of = |f: fn(&TimeseriesRecord) -> f64| {
        records.iter().map(f).fold(f64::NEG_INFINITY, f64::max)
    };

    let onset = records
        .iter()
        .find(|r| r.shift_percent > SHIFT_ONSET_PCT);

    LaunchMetrics {
        top_speed_kmh: max_of(|r| r.vehicle_speed_kmh),
        final_speed_kmh: last.vehicle_speed_kmh,
        final_shift_percent: last.shift_percent,
        peak_engine_rpm: max_of(|r| r.engine_rpm),
        shift_onset_s: onset.map(|r| r.time_s),
        shift_onset_rpm: onset.map(|r| r.engine_rpm),
        shift_out_s: records
            .iter()
            .find(|r| r.shift_percent >= SHIFT_OUT_PCT)
            .map(|r| r.time_s),
        time_to_distance_s: distance_m.and_then(|d| {
            let series: Vec<(f64, f64)> = records
                .iter()
                .map(|r| (r.time_s, r.vehicle_position_m))
                .collect();
            time_to_reach(&series, d)
        }),
        distance_m,
    }
}

/// First time a rising series reaches `target`, linearly interpolated
/// between samples.
pub fn time_to_reach(series: &[(f64, f64)], target: f64) -> Option<f64> {
    let (first_t, first_v) = *series.first()?;
    if first_v >= target {
        return Some(first_t);
    }

    series.windows(2).find_map(|w| {
        let ((t0, v0), (t1, v1)) = (w[0], w[1]);
        if v1 < target {
            return None;
        }
        let dv = v1 - v0;
        if dv.abs() > 1e-12 {
            Some(t0 + (target - v0) / dv * (t1 - t0))
        } else {
            Some(t1)
        }
    })
}

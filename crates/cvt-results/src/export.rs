//! CSV export of recorded timeseries.

use crate::ResultsResult;
use crate::types::TimeseriesRecord;
use std::io::Write;

pub const CSV_HEADER: &str = "time_s,engine_rpm,engine_torque_nm,vehicle_velocity_mps,\
vehicle_position_m,vehicle_speed_kmh,shift_distance_m,shift_velocity_mps,shift_percent,\
cvt_ratio,secondary_angular_position_rad,primary_net_force_n,secondary_net_force_n,\
primary_radial_force_n,secondary_radial_force_n";

pub fn write_csv<W: Write>(mut out: W, records: &[TimeseriesRecord]) -> ResultsResult<()> {
    writeln!(out, "{CSV_HEADER}")?;
    for r in records {
        writeln!(
            out,
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            r.time_s,
            r.engine_rpm,
            r.engine_torque_nm,
            r.vehicle_velocity_mps,
            r.vehicle_position_m,
            r.vehicle_speed_kmh,
            r.shift_distance_m,
            r.shift_velocity_mps,
            r.shift_percent,
            r.cvt_ratio,
            r.secondary_angular_position_rad,
            r.primary_net_force_n,
            r.secondary_net_force_n,
            r.primary_radial_force_n,
            r.secondary_radial_force_n,
        )?;
    }
    out.flush()?;
    Ok(())
}

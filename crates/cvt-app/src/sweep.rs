//! Parallel one-parameter sweeps.

use std::str::FromStr;

use cvt_project::schema::Project;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::metrics::{LaunchMetrics, compute_launch_metrics};
use crate::run_service::{build_records, simulate_project};

/// A tuning knob that can be swept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepParameter {
    PrimarySpringRate,
    FlyweightMass,
    SecondaryTorsionRate,
    SecondaryCompressionRate,
}

impl SweepParameter {
    pub const ALL: [SweepParameter; 4] = [
        SweepParameter::PrimarySpringRate,
        SweepParameter::FlyweightMass,
        SweepParameter::SecondaryTorsionRate,
        SweepParameter::SecondaryCompressionRate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SweepParameter::PrimarySpringRate => "primary_spring_rate",
            SweepParameter::FlyweightMass => "flyweight_mass",
            SweepParameter::SecondaryTorsionRate => "secondary_torsion_rate",
            SweepParameter::SecondaryCompressionRate => "secondary_compression_rate",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            SweepParameter::PrimarySpringRate => "N/m",
            SweepParameter::FlyweightMass => "kg",
            SweepParameter::SecondaryTorsionRate => "N·m/rad",
            SweepParameter::SecondaryCompressionRate => "N/m",
        }
    }

    /// Copy of `project` with this parameter set to `value`.
    pub fn apply(self, project: &Project, value: f64) -> Project {
        let mut p = project.clone();
        match self {
            SweepParameter::PrimarySpringRate => p.primary.spring_rate_n_per_m = value,
            SweepParameter::FlyweightMass => p.primary.flyweight_mass_kg = value,
            SweepParameter::SecondaryTorsionRate => p.secondary.torsion_rate_nm_per_rad = value,
            SweepParameter::SecondaryCompressionRate => {
                p.secondary.compression_rate_n_per_m = value
            }
        }
        p
    }
}

impl FromStr for SweepParameter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SweepParameter::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| {
                let known: Vec<_> = SweepParameter::ALL.iter().map(|p| p.name()).collect();
                AppError::InvalidInput(format!(
                    "unknown sweep parameter '{s}', expected one of {}",
                    known.join(", ")
                ))
            })
    }
}

/// Result of one sweep point.
#[derive(Debug, Clone, Serialize)]
pub struct SweepOutcome {
    pub value: f64,
    pub termination: String,
    pub final_time_s: f64,
    pub final_shift_m: f64,
    pub metrics: LaunchMetrics,
}

/// Simulate `project` once per value, in parallel. Results keep input order.
pub fn run_sweep(
    project: &Project,
    parameter: SweepParameter,
    values: &[f64],
) -> AppResult<Vec<SweepOutcome>> {
    if values.is_empty() {
        return Err(AppError::InvalidInput("sweep needs at least one value".to_string()));
    }
    info!(
        parameter = parameter.name(),
        points = values.len(),
        "Starting sweep"
    );

    let outcomes = values
        .par_iter()
        .map(|&value| -> AppResult<SweepOutcome> {
            let variant = parameter.apply(project, value);
            let (engine, record) = simulate_project(&variant, |_| {})?;
            let records = build_records(&engine, &record)?;
            let final_shift_m = record
                .final_state()
                .map_or(0.0, |x| x.shift_distance);
            debug!(value, steps = record.steps, "Sweep point finished");
            Ok(SweepOutcome {
                value,
                termination: record.termination.describe(),
                final_time_s: record.final_time(),
                final_shift_m,
                metrics: compute_launch_metrics(&records, variant.run.track_length_m),
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    info!(parameter = parameter.name(), "Sweep finished");
    Ok(outcomes)
}

/// `count` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => (0..count)
            .map(|i| start + (end - start) * i as f64 / (count - 1) as f64)
            .collect(),
    }
}

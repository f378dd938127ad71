//! Run execution and caching service.

use std::path::Path;
use std::time::Instant;

use cvt_core::units::{mps_to_kmh, rad_s_to_rpm};
use cvt_project::schema::{IntegratorDef, Project};
use cvt_results::{RunManifest, RunSettings, RunStore, TimeseriesRecord, timestamp_now};
use cvt_sim::{CvtShiftEngine, DrivetrainState, SimProgress, SimRecord, run_sim_with_progress};
use tracing::{info, warn};

use crate::compile::{CompiledRun, compile_run};
use crate::error::{AppError, AppResult};
use crate::progress::{RunProgressEvent, RunStage, TransientProgress};
use crate::project_service;

/// Options for running simulations.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub use_cache: bool,
    pub solver_version: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            solver_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Request to execute a run.
pub struct RunRequest<'a> {
    pub project_path: &'a Path,
    pub options: RunOptions,
}

/// Concise timing and execution summary for a run.
#[derive(Debug, Clone, Default)]
pub struct RunTimingSummary {
    pub compile_time_s: f64,
    pub solve_time_s: f64,
    pub save_time_s: f64,
    pub load_cache_time_s: f64,
    pub total_time_s: f64,
    pub steps: usize,
}

/// Response from a run execution.
#[derive(Debug, Clone)]
pub struct RunResponse {
    pub run_id: String,
    pub manifest: RunManifest,
    pub loaded_from_cache: bool,
    pub timing: RunTimingSummary,
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    stage: RunStage,
    started: Instant,
    message: Option<String>,
    transient: Option<TransientProgress>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(RunProgressEvent {
            stage,
            elapsed_wall_s: started.elapsed().as_secs_f64(),
            message,
            transient,
        });
    }
}

pub fn integrator_name(def: IntegratorDef) -> &'static str {
    match def {
        IntegratorDef::Rk4 => "rk4",
        IntegratorDef::ForwardEuler => "forward_euler",
    }
}

/// The settings that, together with the project, identify a run.
pub fn run_settings(project: &Project) -> RunSettings {
    RunSettings {
        dt_s: project.run.dt_s,
        t_end_s: project.run.t_end_s,
        integrator: integrator_name(project.run.integrator).to_string(),
        record_every: project.run.record_every,
        track_length_m: project.run.track_length_m,
    }
}

/// Execute or load a run based on request.
pub fn ensure_run(request: &RunRequest) -> AppResult<RunResponse> {
    ensure_run_with_progress(request, None)
}

/// Execute or load a run and stream progress events.
pub fn ensure_run_with_progress(
    request: &RunRequest,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunResponse> {
    let started = Instant::now();
    let mut timing = RunTimingSummary::default();

    emit_progress(
        &mut progress_cb,
        RunStage::LoadingProject,
        started,
        Some("Loading project".to_string()),
        None,
    );
    let project = project_service::load_project(request.project_path)?;

    emit_progress(
        &mut progress_cb,
        RunStage::CheckingCache,
        started,
        Some("Checking run cache".to_string()),
        None,
    );
    let settings = run_settings(&project);
    let run_id = cvt_results::compute_run_id(&project, &settings, &request.options.solver_version);
    let store = RunStore::for_project(request.project_path)?;

    if request.options.use_cache && store.has_run(&run_id) {
        emit_progress(
            &mut progress_cb,
            RunStage::LoadingCachedResult,
            started,
            Some("Loading cached run".to_string()),
            None,
        );

        let load_started = Instant::now();
        let manifest = store.load_manifest(&run_id)?;
        timing.load_cache_time_s = load_started.elapsed().as_secs_f64();
        timing.steps = manifest.steps;
        timing.total_time_s = started.elapsed().as_secs_f64();
        info!(run_id = %run_id, "Loaded cached run");

        emit_progress(
            &mut progress_cb,
            RunStage::Completed,
            started,
            Some("Loaded cached run".to_string()),
            None,
        );

        return Ok(RunResponse {
            run_id,
            manifest,
            loaded_from_cache: true,
            timing,
        });
    }

    emit_progress(
        &mut progress_cb,
        RunStage::Compiling,
        started,
        Some("Building models".to_string()),
        None,
    );
    let compile_started = Instant::now();
    let CompiledRun {
        mut engine,
        options,
    } = compile_run(&project)?;
    timing.compile_time_s = compile_started.elapsed().as_secs_f64();

    emit_progress(
        &mut progress_cb,
        RunStage::RunningTransient,
        started,
        Some("Integrating".to_string()),
        None,
    );
    let solve_started = Instant::now();
    let record = run_sim_with_progress(&mut engine, &options, |p: &SimProgress| {
        emit_progress(
            &mut progress_cb,
            RunStage::RunningTransient,
            started,
            None,
            Some(TransientProgress {
                sim_time_s: p.t,
                t_end_s: p.t_end,
                fraction_complete: p.fraction_complete,
                step: p.step,
            }),
        );
    })?;
    timing.solve_time_s = solve_started.elapsed().as_secs_f64();
    timing.steps = record.steps;

    emit_progress(
        &mut progress_cb,
        RunStage::SavingResults,
        started,
        Some("Saving results".to_string()),
        None,
    );
    let save_started = Instant::now();
    let records = build_records(&engine, &record)?;
    let manifest = RunManifest {
        run_id: run_id.clone(),
        project_name: project.name.clone(),
        timestamp: timestamp_now(),
        settings,
        solver_version: request.options.solver_version.clone(),
        termination: record.termination.describe(),
        steps: record.steps,
        record_count: records.len(),
    };
    store.save_run(&manifest, &records)?;
    timing.save_time_s = save_started.elapsed().as_secs_f64();
    timing.total_time_s = started.elapsed().as_secs_f64();

    info!(
        run_id = %run_id,
        steps = record.steps,
        records = records.len(),
        total_s = timing.total_time_s,
        "Run saved"
    );

    emit_progress(
        &mut progress_cb,
        RunStage::Completed,
        started,
        Some("Run completed".to_string()),
        None,
    );

    Ok(RunResponse {
        run_id,
        manifest,
        loaded_from_cache: false,
        timing,
    })
}

/// Compile and integrate a project without touching the run store.
pub fn simulate_project(
    project: &Project,
    on_progress: impl FnMut(&SimProgress),
) -> AppResult<(CvtShiftEngine, SimRecord<DrivetrainState>)> {
    let CompiledRun {
        mut engine,
        options,
    } = compile_run(project)?;
    let record = run_sim_with_progress(&mut engine, &options, on_progress)?;
    if let Some(last) = record.final_state() {
        if engine.limits().is_at_limit(last) {
            warn!(
                shift_m = last.shift_distance,
                "Run finished at a shift travel limit"
            );
        }
    }
    Ok((engine, record))
}

/// Derived quantities for every recorded state.
pub fn build_records(
    engine: &CvtShiftEngine,
    record: &SimRecord<DrivetrainState>,
) -> AppResult<Vec<TimeseriesRecord>> {
    let load = &engine.models().load;
    let secondary_per_metre = load.gearbox_ratio() / load.wheel_radius();
    let max_shift = engine.limits().max_shift;

    record
        .t
        .iter()
        .zip(&record.x)
        .map(|(&t, x)| -> AppResult<TimeseriesRecord> {
            let f = engine.pulley_forces(x)?;
            Ok(TimeseriesRecord {
                time_s: t,
                engine_angular_velocity_rad_s: x.engine_angular_velocity,
                engine_angular_position_rad: x.engine_angular_position,
                vehicle_velocity_mps: x.vehicle_velocity,
                vehicle_position_m: x.vehicle_position,
                shift_velocity_mps: x.shift_velocity,
                shift_distance_m: x.shift_distance,
                cvt_ratio: f.cvt_ratio,
                engine_rpm: rad_s_to_rpm(f.engine_angular_velocity),
                engine_torque_nm: f.engine_torque,
                vehicle_speed_kmh: mps_to_kmh(x.vehicle_velocity),
                shift_percent: 100.0 * x.shift_distance / max_shift,
                secondary_angular_position_rad: x.vehicle_position * secondary_per_metre,
                primary_net_force_n: f.primary.net,
                secondary_net_force_n: f.secondary.net,
                primary_radial_force_n: f.primary_radial,
                secondary_radial_force_n: f.secondary_radial,
            })
        })
        .collect()
}

/// Run id alias for the newest run matching the project's current settings.
pub const LATEST_RUN: &str = "latest";

/// List stored runs beside a project, most recent first.
pub fn list_runs(project_path: &Path, project_name: Option<&str>) -> AppResult<Vec<RunManifest>> {
    let store = RunStore::for_project(project_path)?;
    Ok(store.list_runs(project_name)?)
}

/// Newest stored run of this project made with its current run settings.
pub fn latest_run(project_path: &Path) -> AppResult<Option<RunManifest>> {
    let project = project_service::load_project(project_path)?;
    let store = RunStore::for_project(project_path)?;
    Ok(store.latest_run(&project.name, &run_settings(&project))?)
}

/// Expand [`LATEST_RUN`]; any other id is returned unchanged.
pub fn resolve_run_id(project_path: &Path, run_id: &str) -> AppResult<String> {
    if run_id != LATEST_RUN {
        return Ok(run_id.to_string());
    }
    latest_run(project_path)?
        .map(|m| m.run_id)
        .ok_or_else(|| {
            AppError::Results(format!(
                "no stored run matches the current settings of {}",
                project_path.display()
            ))
        })
}

/// Keep only the `keep` newest runs of the project, returning removed ids.
pub fn prune_runs(project_path: &Path, keep: usize) -> AppResult<Vec<String>> {
    let project = project_service::load_project(project_path)?;
    let store = RunStore::for_project(project_path)?;
    let removed = store.prune_runs(&project.name, keep)?;
    if !removed.is_empty() {
        info!(project = %project.name, removed = removed.len(), keep, "Pruned stored runs");
    }
    Ok(removed)
}

/// Load a specific run.
pub fn load_run(
    project_path: &Path,
    run_id: &str,
) -> AppResult<(RunManifest, Vec<TimeseriesRecord>)> {
    let store = RunStore::for_project(project_path)?;

    let manifest = store.load_manifest(run_id)?;
    let records = store.load_timeseries(run_id)?;

    Ok((manifest, records))
}

pub fn delete_run(project_path: &Path, run_id: &str) -> AppResult<()> {
    let store = RunStore::for_project(project_path)?;
    Ok(store.delete_run(run_id)?)
}

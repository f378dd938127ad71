//! Shared application service layer for the CVT shift simulator.
//!
//! Centralizes project management, model compilation, run execution and
//! caching, diagnostics, sweeps and result querying for the CLI.

pub mod compile;
pub mod diagnostics;
pub mod error;
pub mod metrics;
pub mod progress;
pub mod project_service;
pub mod query;
pub mod run_service;
pub mod sweep;

// Re-export key types for convenience
pub use compile::{CompiledRun, compile_models, compile_ramp, compile_run};
pub use diagnostics::{ForceReport, RampSelector, force_report, sample_ramp};
pub use error::{AppError, AppResult};
pub use metrics::{LaunchMetrics, compute_launch_metrics};
pub use progress::{RunProgressEvent, RunStage, TransientProgress};
pub use project_service::{init_project, load_project, save_project, validate_project};
pub use query::{RunSummary, extract_series, get_run_summary};
pub use run_service::{
    LATEST_RUN, RunOptions, RunRequest, RunResponse, RunTimingSummary, build_records,
    delete_run, ensure_run, ensure_run_with_progress, latest_run, list_runs, load_run,
    prune_runs, resolve_run_id, simulate_project,
};
pub use sweep::{SweepOutcome, SweepParameter, linspace, run_sweep};

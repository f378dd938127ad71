use clap::{Parser, Subcommand, ValueEnum};
use cvt_app::{
    AppError, AppResult, RampSelector, RunOptions, RunProgressEvent, RunRequest, RunStage,
    SweepParameter, diagnostics, metrics, project_service, query, run_service, sweep,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cvtsim")]
#[command(about = "CVT shift dynamics simulator", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate project file syntax and values
    Validate {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
    },
    /// Write the reference Baja vehicle as a new project
    Init {
        /// Path of the project YAML file to create
        project_path: PathBuf,
        /// Project name
        #[arg(long, default_value = "Baja")]
        name: String,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Run a launch simulation
    Run {
        /// Path to the project file
        project_path: PathBuf,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
    },
    /// List cached runs for a project
    Runs {
        /// Path to the project file
        project_path: PathBuf,
        /// Delete all but this many of the project's newest runs first
        #[arg(long, value_name = "KEEP")]
        prune: Option<usize>,
    },
    /// Show details of a cached run
    ShowRun {
        /// Path to the project file
        project_path: PathBuf,
        /// Run ID to display, or `latest` for the newest run with the current settings
        run_id: String,
    },
    /// Export a cached run as CSV
    Export {
        /// Path to the project file
        project_path: PathBuf,
        /// Run ID, or `latest`
        run_id: String,
        /// Export only this variable (e.g. engine_rpm, cvt_ratio)
        #[arg(long)]
        variable: Option<String>,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the force balance at one engine speed and shift position
    Forces {
        /// Path to the project file
        project_path: PathBuf,
        /// Engine speed (rpm)
        #[arg(long)]
        rpm: f64,
        /// Shift distance (m)
        #[arg(long, default_value_t = 0.0)]
        shift: f64,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Sample a ramp profile
    Ramp {
        /// Path to the project file
        project_path: PathBuf,
        /// Which ramp to sample
        #[arg(long, value_enum, default_value_t = RampArg::Primary)]
        which: RampArg,
        /// Number of sample points
        #[arg(long, default_value_t = 21)]
        points: usize,
    },
    /// Run the project over a range of one parameter
    Sweep {
        /// Path to the project file
        project_path: PathBuf,
        /// primary_spring_rate, flyweight_mass, secondary_torsion_rate or
        /// secondary_compression_rate
        parameter: String,
        /// First value
        #[arg(long)]
        from: f64,
        /// Last value
        #[arg(long)]
        to: f64,
        /// Number of values
        #[arg(long, default_value_t = 5)]
        steps: usize,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RampArg {
    Primary,
    Secondary,
}

impl From<RampArg> for RampSelector {
    fn from(arg: RampArg) -> Self {
        match arg {
            RampArg::Primary => RampSelector::Primary,
            RampArg::Secondary => RampSelector::Secondary,
        }
    }
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Validate { project_path } => cmd_validate(&project_path),
        Commands::Init {
            project_path,
            name,
            force,
        } => cmd_init(&project_path, &name, force),
        Commands::Run {
            project_path,
            no_cache,
        } => cmd_run(&project_path, !no_cache),
        Commands::Runs {
            project_path,
            prune,
        } => cmd_runs(&project_path, prune),
        Commands::ShowRun {
            project_path,
            run_id,
        } => cmd_show_run(&project_path, &run_id),
        Commands::Export {
            project_path,
            run_id,
            variable,
            output,
        } => cmd_export(
            &project_path,
            &run_id,
            variable.as_deref(),
            output.as_deref(),
        ),
        Commands::Forces {
            project_path,
            rpm,
            shift,
            json,
        } => cmd_forces(&project_path, rpm, shift, json),
        Commands::Ramp {
            project_path,
            which,
            points,
        } => cmd_ramp(&project_path, which.into(), points),
        Commands::Sweep {
            project_path,
            parameter,
            from,
            to,
            steps,
            json,
        } => cmd_sweep(&project_path, &parameter, from, to, steps, json),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> AppResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| AppError::Results(e.to_string()))
}

fn cmd_validate(project_path: &Path) -> AppResult<()> {
    println!("Validating project: {}", project_path.display());
    let project = project_service::load_project(project_path)?;
    project_service::validate_project(&project)?;
    println!("✓ Project '{}' is valid", project.name);
    Ok(())
}

fn cmd_init(project_path: &Path, name: &str, force: bool) -> AppResult<()> {
    project_service::init_project(project_path, name, force)?;
    println!("✓ Wrote reference project to {}", project_path.display());
    Ok(())
}

fn cmd_run(project_path: &Path, use_cache: bool) -> AppResult<()> {
    println!("Running launch simulation: {}", project_path.display());

    let request = RunRequest {
        project_path,
        options: RunOptions {
            use_cache,
            ..RunOptions::default()
        },
    };

    let mut last_emit = Instant::now();
    let mut last_fraction = -1.0f64;
    let response = run_service::ensure_run_with_progress(
        &request,
        Some(&mut |event| {
            let fraction = event
                .transient
                .as_ref()
                .map(|t| t.fraction_complete)
                .unwrap_or(-1.0);
            let emit_now = (fraction >= 0.0 && (fraction - last_fraction).abs() >= 0.005)
                || last_emit.elapsed().as_millis() >= 100;
            if emit_now {
                render_cli_progress(&event);
                if fraction >= 0.0 {
                    last_fraction = fraction;
                }
                last_emit = Instant::now();
            }
        }),
    )?;
    clear_progress_line();
    info!(run_id = %response.run_id, cached = response.loaded_from_cache, "Run ready");

    if response.loaded_from_cache {
        println!("✓ Loaded from cache: {}", response.run_id);
    } else {
        println!("✓ Simulation completed: {}", response.run_id);
    }

    print_timing_summary(&response.timing);

    let (manifest, records) = run_service::load_run(project_path, &response.run_id)?;
    println!("  Stopped: {}", manifest.termination);
    print_launch_summary(&records, manifest.settings.track_length_m)?;

    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &RunProgressEvent) {
    match event.stage {
        RunStage::RunningTransient => {
            if let Some(t) = &event.transient {
                let width = 28usize;
                let filled = ((t.fraction_complete * width as f64).round() as usize).min(width);
                let bar = format!(
                    "{}{}",
                    "#".repeat(filled),
                    "-".repeat(width.saturating_sub(filled))
                );
                print!(
                    "\r[{}] {:>6.2}%  t={:.3}/{:.3}s  step={}  elapsed={:.1}s",
                    bar,
                    t.fraction_complete * 100.0,
                    t.sim_time_s,
                    t.t_end_s,
                    t.step,
                    event.elapsed_wall_s
                );
                let _ = io::stdout().flush();
            }
        }
        _ => {
            let spinner = ['|', '/', '-', '\\'];
            let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
            let mut line = format!(
                "\r{} {}  elapsed={:.2}s",
                spinner[spin_idx],
                event.stage.label(),
                event.elapsed_wall_s
            );
            if let Some(msg) = &event.message {
                line.push_str(&format!("  {}", msg));
            }
            print!("{}", line);
            let _ = io::stdout().flush();
        }
    }
}

fn print_timing_summary(timing: &cvt_app::RunTimingSummary) {
    let total = timing.total_time_s.max(1.0e-12);
    let compile_pct = 100.0 * timing.compile_time_s / total;
    let solve_pct = 100.0 * timing.solve_time_s / total;
    let save_pct = 100.0 * timing.save_time_s / total;

    println!("\nTiming summary:");
    println!(
        "  Compile: {:.3}s ({:.1}%)",
        timing.compile_time_s, compile_pct
    );
    println!("  Solve:   {:.3}s ({:.1}%)", timing.solve_time_s, solve_pct);
    println!("  Save:    {:.3}s ({:.1}%)", timing.save_time_s, save_pct);
    if timing.load_cache_time_s > 0.0 {
        println!("  Cache load: {:.3}s", timing.load_cache_time_s);
    }
    println!("  Total:   {:.3}s", timing.total_time_s);
    println!("  Steps:   {}", timing.steps);
}

fn print_launch_summary(
    records: &[cvt_results::TimeseriesRecord],
    track_length_m: Option<f64>,
) -> AppResult<()> {
    let summary = query::get_run_summary(records)?;
    let m = metrics::compute_launch_metrics(records, track_length_m);

    println!(
        "  Time range: {:.3} - {:.3} s ({} points)",
        summary.time_range.0, summary.time_range.1, summary.record_count
    );
    println!("  Distance:    {:.2} m", summary.final_position_m);
    println!("  Top speed:   {:.2} km/h", m.top_speed_kmh);
    println!("  Peak engine: {:.0} rpm", m.peak_engine_rpm);
    println!(
        "  Final shift: {:.1}% (ratio {:.3})",
        m.final_shift_percent, summary.final_cvt_ratio
    );
    if let (Some(t), Some(rpm)) = (m.shift_onset_s, m.shift_onset_rpm) {
        println!("  Shift onset: {:.3} s at {:.0} rpm", t, rpm);
    }
    if let Some(t) = m.shift_out_s {
        println!("  Shift out:   {:.3} s", t);
    }
    if let (Some(t), Some(d)) = (m.time_to_distance_s, m.distance_m) {
        println!("  {:.2} m in:  {:.3} s", d, t);
    }
    Ok(())
}

fn cmd_runs(project_path: &Path, prune: Option<usize>) -> AppResult<()> {
    if let Some(keep) = prune {
        let removed = run_service::prune_runs(project_path, keep)?;
        println!("✓ Removed {} run(s)", removed.len());
    }
    let runs = run_service::list_runs(project_path, None)?;

    if runs.is_empty() {
        println!("No cached runs found beside {}", project_path.display());
    } else {
        println!("Cached runs:");
        for manifest in runs {
            println!(
                "  {} {} ({}, {})",
                manifest.run_id, manifest.project_name, manifest.timestamp, manifest.termination
            );
        }
    }
    Ok(())
}

fn cmd_show_run(project_path: &Path, run_id: &str) -> AppResult<()> {
    let run_id = run_service::resolve_run_id(project_path, run_id)?;
    println!("Loading run: {}", run_id);

    let (manifest, records) = run_service::load_run(project_path, &run_id)?;

    println!("\nRun Summary:");
    println!("  Project:    {}", manifest.project_name);
    println!("  Created:    {}", manifest.timestamp);
    println!(
        "  Integrator: {} (dt = {} s, t_end = {} s)",
        manifest.settings.integrator, manifest.settings.dt_s, manifest.settings.t_end_s
    );
    println!("  Steps:      {}", manifest.steps);
    println!("  Stopped:    {}", manifest.termination);
    print_launch_summary(&records, manifest.settings.track_length_m)?;

    println!("\nVariables:");
    for name in query::VARIABLES {
        println!("  {}", name);
    }

    Ok(())
}

fn cmd_export(
    project_path: &Path,
    run_id: &str,
    variable: Option<&str>,
    output: Option<&Path>,
) -> AppResult<()> {
    let run_id = run_service::resolve_run_id(project_path, run_id)?;
    let (_manifest, records) = run_service::load_run(project_path, &run_id)?;

    let mut csv = Vec::new();
    match variable {
        Some(name) => {
            let series = query::extract_series(&records, name)?;
            writeln!(csv, "time_s,{}", name)?;
            for (t, val) in &series {
                writeln!(csv, "{},{}", t, val)?;
            }
        }
        None => cvt_results::write_csv(&mut csv, &records)?,
    }

    if let Some(path) = output {
        std::fs::write(path, csv)?;
        println!(
            "✓ Exported {} data points to {}",
            records.len(),
            path.display()
        );
    } else {
        io::stdout().write_all(&csv)?;
    }

    Ok(())
}

fn cmd_forces(project_path: &Path, rpm: f64, shift: f64, json: bool) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    let r = diagnostics::force_report(&project, rpm, shift)?;

    if json {
        println!("{}", to_json(&r)?);
        return Ok(());
    }

    println!(
        "Operating point: {:.0} rpm, shift {:.4} m, ratio {:.3}, {:.2} m/s",
        r.engine_rpm, r.shift_m, r.cvt_ratio, r.vehicle_speed_mps
    );
    println!("  Engine torque:        {:>10.2} N·m", r.engine_torque_nm);
    println!("\nPrimary:");
    println!("  Flyweight force:      {:>10.2} N", r.primary_flyweight_n);
    println!("  Spring force:         {:>10.2} N", r.primary_spring_n);
    println!("  Net clamping:         {:>10.2} N", r.primary_net_n);
    println!("  Wrap angle:           {:>10.4} rad", r.primary_wrap_rad);
    println!("  Radial force:         {:>10.2} N", r.primary_radial_n);
    println!("  Slack tension:        {:>10.2} N", r.primary_slack_tension_n);
    println!("  Slip torque:          {:>10.2} N·m", r.primary_max_torque_nm);
    println!("\nSecondary:");
    println!(
        "  Spring torque:        {:>10.2} N·m",
        r.secondary_spring_torque_nm
    );
    println!("  Helix force:          {:>10.2} N", r.secondary_helix_n);
    println!("  Spring force:         {:>10.2} N", r.secondary_spring_n);
    println!("  Net clamping:         {:>10.2} N", r.secondary_net_n);
    println!("  Wrap angle:           {:>10.4} rad", r.secondary_wrap_rad);
    println!("  Radial force:         {:>10.2} N", r.secondary_radial_n);
    println!(
        "  Slack tension:        {:>10.2} N",
        r.secondary_slack_tension_n
    );
    println!(
        "  Slip torque:          {:>10.2} N·m",
        r.secondary_max_torque_nm
    );
    println!("\nRadial imbalance:       {:>10.2} N", r.radial_difference_n);
    Ok(())
}

fn cmd_ramp(project_path: &Path, which: RampSelector, points: usize) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    let samples = diagnostics::sample_ramp(&project, which, points)?;

    println!("x_m,height_m,slope");
    for s in samples {
        println!("{},{},{}", s.x, s.height, s.slope);
    }
    Ok(())
}

fn cmd_sweep(
    project_path: &Path,
    parameter: &str,
    from: f64,
    to: f64,
    steps: usize,
    json: bool,
) -> AppResult<()> {
    let parameter: SweepParameter = parameter.parse()?;
    let project = project_service::load_project(project_path)?;
    let values = sweep::linspace(from, to, steps);

    if !json {
        println!(
            "Sweeping {} over {} values from {} to {} {}",
            parameter.name(),
            values.len(),
            from,
            to,
            parameter.unit()
        );
    }

    let started = Instant::now();
    let outcomes = sweep::run_sweep(&project, parameter, &values)?;

    if json {
        println!("{}", to_json(&outcomes)?);
        return Ok(());
    }

    println!(
        "\n{:>12}  {:>10}  {:>10}  {:>9}  {:>10}",
        parameter.unit(),
        "top km/h",
        "shift %",
        "t_end s",
        "finish s"
    );
    for o in &outcomes {
        let finish = o
            .metrics
            .time_to_distance_s
            .map(|t| format!("{:.3}", t))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>12.4}  {:>10.2}  {:>10.1}  {:>9.3}  {:>10}",
            o.value, o.metrics.top_speed_kmh, o.metrics.final_shift_percent, o.final_time_s, finish
        );
    }
    println!("\nSweep took {:.2}s", started.elapsed().as_secs_f64());
    Ok(())
}

//! Simulation runner and result recording.

use crate::error::{SimError, SimResult};
use crate::integrator::{ForwardEuler, Integrator, RK4};
use crate::model::TransientModel;
use tracing::{debug, info, warn};

/// Integrator selection for simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IntegratorType {
    /// 4th-order Runge-Kutta (default, most accurate, 4 rhs calls per step).
    #[default]
    RK4,
    /// Forward Euler (1st-order, faster, 1 rhs call per step).
    ForwardEuler,
}

/// Options for simulation runs.
#[derive(Clone, Debug)]
pub struct SimOptions {
    /// Fixed time step (seconds)
    pub dt: f64,
    /// Final simulation time (seconds)
    pub t_end: f64,
    /// Maximum number of steps (safety limit)
    pub max_steps: usize,
    /// Record every N-th step (decimation)
    pub record_every: usize,
    /// Integrator type (default: RK4)
    pub integrator: IntegratorType,
    /// Simulated time between progress callbacks (seconds)
    pub progress_interval_s: f64,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            dt: 1e-4,
            t_end: 15.0,
            max_steps: 1_000_000,
            record_every: 100,
            integrator: IntegratorType::default(),
            progress_interval_s: 0.5,
        }
    }
}

impl SimOptions {
    pub fn validate(&self) -> SimResult<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(SimError::InvalidArg {
                what: "dt must be positive",
            });
        }
        if !(self.t_end.is_finite() && self.t_end >= 0.0) {
            return Err(SimError::InvalidArg {
                what: "t_end must be non-negative",
            });
        }
        if self.max_steps == 0 {
            return Err(SimError::InvalidArg {
                what: "max_steps must be positive",
            });
        }
        if self.record_every == 0 {
            return Err(SimError::InvalidArg {
                what: "record_every must be positive",
            });
        }
        Ok(())
    }
}

/// Why a run stopped.
#[derive(Clone, Debug, PartialEq)]
pub enum Termination {
    /// Reached `t_end`.
    Completed,
    /// The model reported a terminal event.
    Event(String),
    /// Hit `max_steps` before `t_end`.
    StepLimit,
}

impl Termination {
    pub fn describe(&self) -> String {
        match self {
            Termination::Completed => "completed".to_string(),
            Termination::Event(reason) => reason.clone(),
            Termination::StepLimit => "step limit reached".to_string(),
        }
    }
}

/// Periodic progress snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct SimProgress {
    pub t: f64,
    pub t_end: f64,
    pub step: usize,
    pub fraction_complete: f64,
}

/// Record of simulation results.
#[derive(Clone, Debug)]
pub struct SimRecord<S> {
    /// Time points (seconds)
    pub t: Vec<f64>,
    /// State snapshots
    pub x: Vec<S>,
    pub steps: usize,
    pub termination: Termination,
}

impl<S> SimRecord<S> {
    pub fn final_state(&self) -> Option<&S> {
        self.x.last()
    }

    pub fn final_time(&self) -> f64 {
        self.t.last().copied().unwrap_or(0.0)
    }
}

/// Run a transient simulation.
pub fn run_sim<M: TransientModel>(
    model: &mut M,
    opts: &SimOptions,
) -> SimResult<SimRecord<M::State>> {
    run_sim_with_progress(model, opts, |_| {})
}

/// Run a transient simulation, calling `on_progress` every
/// `progress_interval_s` of simulated time.
pub fn run_sim_with_progress<M, F>(
    model: &mut M,
    opts: &SimOptions,
    mut on_progress: F,
) -> SimResult<SimRecord<M::State>>
where
    M: TransientModel,
    F: FnMut(&SimProgress),
{
    opts.validate()?;

    let mut t = 0.0;
    let mut x = model.correct(model.initial_state());
    model.validate_state(t, &x)?;

    let mut t_record = vec![t];
    let mut x_record = vec![x.clone()];

    info!(
        dt = opts.dt,
        t_end = opts.t_end,
        integrator = ?opts.integrator,
        "Starting transient run"
    );

    let mut step = 0;
    let mut next_progress = opts.progress_interval_s;
    let mut termination = Termination::Completed;

    // Slack so round-off in the accumulated time does not add a sliver step.
    let t_stop = opts.t_end - 1e-6 * opts.dt;
    while t < t_stop {
        if step >= opts.max_steps {
            termination = Termination::StepLimit;
            warn!(step, t, "Run stopped at step limit");
            break;
        }

        let dt = opts.dt.min(opts.t_end - t);
        let next = match opts.integrator {
            IntegratorType::RK4 => RK4.step(model, t, &x, dt)?,
            IntegratorType::ForwardEuler => ForwardEuler.step(model, t, &x, dt)?,
        };
        x = model.correct(next);
        t += dt;
        step += 1;

        model.validate_state(t, &x)?;

        if step % opts.record_every == 0 {
            t_record.push(t);
            x_record.push(x.clone());
        }

        if opts.progress_interval_s > 0.0 && t >= next_progress {
            let progress = SimProgress {
                t,
                t_end: opts.t_end,
                step,
                fraction_complete: if opts.t_end > 0.0 {
                    (t / opts.t_end).min(1.0)
                } else {
                    1.0
                },
            };
            debug!(t, step, "Transient progress");
            on_progress(&progress);
            while next_progress <= t {
                next_progress += opts.progress_interval_s;
            }
        }

        if let Some(reason) = model.terminal_event(t, &x) {
            warn!(t, step, %reason, "Run ended on terminal event");
            termination = Termination::Event(reason);
            break;
        }
    }

    // Always record final state
    if step % opts.record_every != 0 {
        t_record.push(t);
        x_record.push(x);
    }

    info!(
        steps = step,
        t_final = t,
        records = t_record.len(),
        termination = %termination.describe(),
        "Transient run finished"
    );

    Ok(SimRecord {
        t: t_record,
        x: x_record,
        steps: step,
        termination,
    })
}

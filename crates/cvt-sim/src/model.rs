//! TransientModel trait for pluggable dynamic systems.

use crate::error::SimResult;

/// Trait for transient (dynamic) system models.
///
/// A TransientModel must implement:
/// - State type (Clone, for snapshots)
/// - Initial state
/// - RHS (right-hand side) computation: x_dot = f(t, x)
/// - Scalar field arithmetic for integration: add states, scale by scalar
///
/// Constrained systems can also override [`correct`](Self::correct), which the
/// run loop applies after every accepted step, and
/// [`terminal_event`](Self::terminal_event) to end a run early.
pub trait TransientModel {
    /// State type (must be Clone).
    type State: Clone;

    /// Return the initial state at t=0.
    fn initial_state(&self) -> Self::State;

    /// Compute state derivative dxdt = f(t, x).
    ///
    /// Takes &mut self so models may cache between calls; the result must
    /// still depend only on `(t, x)`.
    fn rhs(&mut self, t: f64, x: &Self::State) -> SimResult<Self::State>;

    /// Add two states element-wise: result = a + b.
    fn add(&self, a: &Self::State, b: &Self::State) -> Self::State;

    /// Scale a state by a scalar: result = scale * a.
    fn scale(&self, a: &Self::State, scale: f64) -> Self::State;

    /// Project a freshly integrated state back onto the admissible set.
    fn correct(&self, x: Self::State) -> Self::State {
        x
    }

    /// Reject states the model can no longer evaluate (NaN, infinities).
    fn validate_state(&self, _t: f64, _x: &Self::State) -> SimResult<()> {
        Ok(())
    }

    /// Reason to stop the run at `(t, x)`, if any.
    fn terminal_event(&self, _t: f64, _x: &Self::State) -> Option<String> {
        None
    }
}

//! Core traits for drivetrain models.

/// Engine output torque as a function of crankshaft angular velocity.
///
/// Implementations are deterministic and shareable across threads so a single
/// curve can back many parallel runs.
pub trait TorqueCurve: Send + Sync {
    /// Torque (N·m) at angular velocity `omega` (rad/s).
    ///
    /// Outside the tabulated range implementations extrapolate rather than
    /// fail; a finite value is always expected.
    fn torque(&self, omega: f64) -> f64;

    /// Short label for logs and reports.
    fn describe(&self) -> String {
        "custom".to_string()
    }
}

impl<F> TorqueCurve for F
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    fn torque(&self, omega: f64) -> f64 {
        self(omega)
    }

    fn describe(&self) -> String {
        "closure".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_torque_curves() {
        let curve = |w: f64| 3.0 * w;
        assert_eq!(curve.torque(2.0), 6.0);
        assert_eq!(TorqueCurve::describe(&curve), "closure");
    }
}

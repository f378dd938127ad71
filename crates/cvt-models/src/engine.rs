//! Engine torque source.

use crate::common::check_positive;
use crate::error::{ModelError, ModelResult};
use crate::traits::TorqueCurve;
use std::fmt;
use std::sync::Arc;

/// Natural cubic spline through tabulated dynamometer points.
///
/// Outside the knots the curve continues along the end tangents. A natural
/// spline has zero curvature at its ends, so this is the C¹ continuation and
/// torque grows at most linearly with engine speed.
#[derive(Debug, Clone, PartialEq)]
pub struct CubicSplineCurve {
    knots: Vec<f64>,
    // Per-interval coefficients of y = a + b·dx + c·dx² + d·dx³.
    a: Vec<f64>,
    b: Vec<f64>,
    c: Vec<f64>,
    d: Vec<f64>,
}

impl CubicSplineCurve {
    /// Build from `(omega [rad/s], torque [N·m])` points.
    pub fn new(points: &[(f64, f64)]) -> ModelResult<Self> {
        if points.len() < 3 {
            return Err(ModelError::config(format!(
                "torque curve needs at least 3 points, got {}",
                points.len()
            )));
        }
        if points.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
            return Err(ModelError::config("torque curve points must be finite"));
        }
        if points.windows(2).any(|w| w[1].0 <= w[0].0) {
            return Err(ModelError::config(
                "torque curve angular velocities must be strictly increasing",
            ));
        }

        let n = points.len() - 1;
        let x: Vec<f64> = points.iter().map(|p| p.0).collect();
        let y: Vec<f64> = points.iter().map(|p| p.1).collect();
        let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();

        // Tridiagonal solve for the natural spline (c_0 = c_n = 0).
        let mut mu = vec![0.0; n + 1];
        let mut z = vec![0.0; n + 1];
        for i in 1..n {
            let alpha = 3.0 / h[i] * (y[i + 1] - y[i]) - 3.0 / h[i - 1] * (y[i] - y[i - 1]);
            let l = 2.0 * (x[i + 1] - x[i - 1]) - h[i - 1] * mu[i - 1];
            mu[i] = h[i] / l;
            z[i] = (alpha - h[i - 1] * z[i - 1]) / l;
        }

        let mut c = vec![0.0; n + 1];
        let mut b = vec![0.0; n];
        let mut d = vec![0.0; n];
        for j in (0..n).rev() {
            c[j] = z[j] - mu[j] * c[j + 1];
            b[j] = (y[j + 1] - y[j]) / h[j] - h[j] * (c[j + 1] + 2.0 * c[j]) / 3.0;
            d[j] = (c[j + 1] - c[j]) / (3.0 * h[j]);
        }
        c.truncate(n);

        Ok(Self {
            knots: x,
            a: y,
            b,
            c,
            d,
        })
    }

    /// Build from a dyno table given in rpm and N·m.
    pub fn from_rpm_table(points: &[(f64, f64)]) -> ModelResult<Self> {
        let converted: Vec<(f64, f64)> = points
            .iter()
            .map(|&(rpm, torque)| (cvt_core::units::rpm_to_rad_s(rpm), torque))
            .collect();
        Self::new(&converted)
    }

    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    pub fn evaluate(&self, omega: f64) -> f64 {
        let last = self.b.len() - 1;
        let (first_knot, last_knot) = (self.knots[0], self.knots[last + 1]);
        if omega < first_knot {
            return self.a[0] + (omega - first_knot) * self.b[0];
        }
        if omega > last_knot {
            return self.a[last + 1] + (omega - last_knot) * self.end_slope();
        }

        let i = self
            .knots
            .partition_point(|&k| k <= omega)
            .saturating_sub(1)
            .min(last);
        let dx = omega - self.knots[i];
        self.a[i] + dx * (self.b[i] + dx * (self.c[i] + dx * self.d[i]))
    }

    /// Derivative of the last interval at the final knot.
    fn end_slope(&self) -> f64 {
        let last = self.b.len() - 1;
        let h = self.knots[last + 1] - self.knots[last];
        self.b[last] + h * (2.0 * self.c[last] + 3.0 * h * self.d[last])
    }
}

impl TorqueCurve for CubicSplineCurve {
    fn torque(&self, omega: f64) -> f64 {
        self.evaluate(omega)
    }

    fn describe(&self) -> String {
        format!("cubic spline ({} points)", self.knots.len())
    }
}

/// Engine with a torque curve and rotational inertia.
#[derive(Clone)]
pub struct EngineModel {
    curve: Arc<dyn TorqueCurve>,
    inertia: f64,
}

impl fmt::Debug for EngineModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineModel")
            .field("curve", &self.curve.describe())
            .field("inertia", &self.inertia)
            .finish()
    }
}

impl EngineModel {
    pub fn new(curve: impl TorqueCurve + 'static, inertia: f64) -> ModelResult<Self> {
        Self::from_shared(Arc::new(curve), inertia)
    }

    pub fn from_shared(curve: Arc<dyn TorqueCurve>, inertia: f64) -> ModelResult<Self> {
        check_positive(inertia, "engine inertia")?;
        Ok(Self { curve, inertia })
    }

    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    pub fn get_torque(&self, omega: f64) -> f64 {
        self.curve.torque(omega)
    }

    pub fn get_power(&self, omega: f64) -> f64 {
        self.get_torque(omega) * omega
    }

    pub fn angular_acceleration(&self, omega: f64, load_torque: f64) -> f64 {
        (self.get_torque(omega) - load_torque) / self.inertia
    }
}

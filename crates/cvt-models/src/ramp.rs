//! Piecewise cam profiles for the primary ramps and the secondary helix.
//!
//! A [`RampProfile`] is an ordered list of [`Segment`]s tiling `[0, x_max]`.
//! Each segment only knows its own shape; the profile stitches them together so
//! that every segment starts at the height where the previous one ended.
//!
//! Ramps are described as falling curves (negative slopes). Pulley models only
//! need magnitudes, so [`RampProfile::height`] and [`RampProfile::slope`] return
//! absolute values and the caller reapplies direction from physical context.
//!
//! ## Segment shapes
//!
//! ```text
//! Linear        y = y0 + m·(x − x0)
//! CircularArc   u(x) mapped linearly onto [r·sin θ0, r·sin θ1],
//!               y = y0 − (f(u) − f(u0)),  f(u) = −√(r² − u²)
//! CubicSpiral   φ(s) = φ0 + a·s² + b·s³,  κ(0) = 0, κ(L) = κ_target
//! ```

use crate::common::{EPSILON_LENGTH, check_finite};
use crate::error::{ModelError, ModelResult};
use cvt_core::numeric::bisect;
use std::f64::consts::FRAC_PI_2;

/// Straight segment with constant slope.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSegment {
    pub x_start: f64,
    pub x_end: f64,
    pub slope: f64,
}

impl LinearSegment {
    fn rise(&self, x: f64) -> f64 {
        self.slope * (x - self.x_start)
    }
}

/// Circular arc between two tangent angles measured from the horizontal.
#[derive(Debug, Clone, PartialEq)]
pub struct CircularArc {
    x_start: f64,
    x_end: f64,
    radius: f64,
    theta_start: f64,
    theta_end: f64,
    u_start: f64,
    du_dx: f64,
}

impl CircularArc {
    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn theta_range(&self) -> (f64, f64) {
        (self.theta_start, self.theta_end)
    }

    fn abscissa(&self, x: f64) -> f64 {
        self.u_start + (x - self.x_start) * self.du_dx
    }

    // Lower half circle.
    fn circle_y(&self, u: f64) -> f64 {
        -(self.radius * self.radius - u * u).sqrt()
    }

    fn rise(&self, x: f64) -> f64 {
        -(self.circle_y(self.abscissa(x)) - self.circle_y(self.u_start))
    }

    fn slope(&self, x: f64) -> f64 {
        let u = self.abscissa(x);
        let dy_du = u / (self.radius * self.radius - u * u).sqrt();
        -dy_du * self.du_dx
    }
}

/// One precomputed point along a cubic spiral.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SpiralSample {
    x: f64,
    y: f64,
    phi: f64,
}

/// Curvature-continuous transition whose tangent angle is cubic in arc length.
///
/// Curvature is zero where the spiral leaves the previous segment and reaches
/// `target_curvature` where it meets the next one, so the blend can be machined
/// without a visible kink. Curvature is dφ/ds of the tangent angle φ = atan(slope).
#[derive(Debug, Clone, PartialEq)]
pub struct CubicSpiral {
    x_start: f64,
    x_end: f64,
    slope_start: f64,
    slope_end: f64,
    target_curvature: f64,
    arc_length: f64,
    samples: Vec<SpiralSample>,
}

impl CubicSpiral {
    const TABLE_INTERVALS: usize = 256;
    const MAX_BRACKET_DOUBLINGS: usize = 48;

    pub fn arc_length(&self) -> f64 {
        self.arc_length
    }

    pub fn target_curvature(&self) -> f64 {
        self.target_curvature
    }

    pub fn slope_range(&self) -> (f64, f64) {
        (self.slope_start, self.slope_end)
    }

    fn coefficients(phi_delta: f64, kappa: f64, length: f64) -> (f64, f64) {
        let a = (3.0 * phi_delta - kappa * length) / (length * length);
        let b = (kappa * length - 2.0 * phi_delta) / (length * length * length);
        (a, b)
    }

    /// Integrate the spiral of total arc length `length` into a sample table.
    fn trace(phi_start: f64, phi_delta: f64, kappa: f64, length: f64) -> Vec<SpiralSample> {
        let (a, b) = Self::coefficients(phi_delta, kappa, length);
        let phi = |s: f64| phi_start + a * s * s + b * s * s * s;

        let n = Self::TABLE_INTERVALS;
        let h = length / n as f64;
        let mut samples = Vec::with_capacity(n + 1);
        let (mut x, mut y) = (0.0, 0.0);
        samples.push(SpiralSample {
            x,
            y,
            phi: phi(0.0),
        });

        // Simpson's rule on each sub-interval.
        for i in 0..n {
            let s0 = i as f64 * h;
            let s1 = s0 + h;
            let (p0, pm, p1) = (phi(s0), phi(s0 + 0.5 * h), phi(s1));
            x += h / 6.0 * (p0.cos() + 4.0 * pm.cos() + p1.cos());
            y += h / 6.0 * (p0.sin() + 4.0 * pm.sin() + p1.sin());
            samples.push(SpiralSample { x, y, phi: p1 });
        }
        samples
    }

    fn new(
        x_start: f64,
        x_end: f64,
        slope_start: f64,
        slope_end: f64,
        target_curvature: f64,
    ) -> ModelResult<Self> {
        check_finite(slope_start, "spiral start slope")?;
        check_finite(slope_end, "spiral end slope")?;
        check_finite(target_curvature, "spiral target curvature")?;

        let chord = x_end - x_start;
        let phi_start = slope_start.atan();
        let phi_delta = slope_end.atan() - phi_start;

        let chord_error = |length: f64| -> f64 {
            let table = Self::trace(phi_start, phi_delta, target_curvature, length);
            table.last().map_or(0.0, |s| s.x) - chord
        };

        // x-extent never exceeds arc length, so the chord itself is a lower bound.
        let lo = chord;
        let mut hi = 2.0 * chord;
        let mut doublings = 0;
        while chord_error(hi) < 0.0 {
            hi *= 2.0;
            doublings += 1;
            if doublings > Self::MAX_BRACKET_DOUBLINGS {
                return Err(ModelError::config(
                    "cubic spiral cannot span its x-range with the requested slopes",
                ));
            }
        }

        let arc_length = if chord_error(lo) >= 0.0 {
            lo
        } else {
            bisect(chord_error, lo, hi, chord * 1e-14, 200, "cubic spiral arc length")?
        };

        let samples = Self::trace(phi_start, phi_delta, target_curvature, arc_length);
        if samples.iter().any(|s| s.phi.cos() <= 0.0) {
            return Err(ModelError::config(
                "cubic spiral turns past vertical and folds back on itself",
            ));
        }

        Ok(Self {
            x_start,
            x_end,
            slope_start,
            slope_end,
            target_curvature,
            arc_length,
            samples,
        })
    }

    /// Locate the table interval containing `x` and the interpolation weight.
    fn bracket(&self, x: f64) -> (usize, f64) {
        let traced = self.samples.last().map_or(0.0, |s| s.x);
        let span = self.x_end - self.x_start;
        let local = ((x - self.x_start) / span).clamp(0.0, 1.0) * traced;

        let upper = self
            .samples
            .partition_point(|s| s.x < local)
            .clamp(1, self.samples.len() - 1);
        let (s0, s1) = (&self.samples[upper - 1], &self.samples[upper]);
        let dx = s1.x - s0.x;
        let w = if dx > 0.0 { (local - s0.x) / dx } else { 0.0 };
        (upper - 1, w)
    }

    fn rise(&self, x: f64) -> f64 {
        let (i, w) = self.bracket(x);
        let (s0, s1) = (&self.samples[i], &self.samples[i + 1]);
        s0.y + w * (s1.y - s0.y)
    }

    fn slope(&self, x: f64) -> f64 {
        let (i, w) = self.bracket(x);
        let (s0, s1) = (&self.samples[i], &self.samples[i + 1]);
        (s0.phi + w * (s1.phi - s0.phi)).tan()
    }
}

/// A single piece of a ramp profile.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Linear(LinearSegment),
    CircularArc(CircularArc),
    CubicSpiral(CubicSpiral),
}

impl Segment {
    /// Straight segment. Negative slopes describe a falling ramp.
    pub fn linear(x_start: f64, x_end: f64, slope: f64) -> ModelResult<Self> {
        check_span(x_start, x_end)?;
        check_finite(slope, "linear segment slope")?;
        Ok(Segment::Linear(LinearSegment {
            x_start,
            x_end,
            slope,
        }))
    }

    /// Circular arc of `radius` whose tangent angle runs from `theta_start`
    /// to `theta_end` (both in `[0, π/2)`).
    pub fn circular_arc(
        x_start: f64,
        x_end: f64,
        radius: f64,
        theta_start: f64,
        theta_end: f64,
    ) -> ModelResult<Self> {
        check_span(x_start, x_end)?;
        if !radius.is_finite() || radius <= 0.0 {
            return Err(ModelError::config("circular arc radius must be positive"));
        }
        for theta in [theta_start, theta_end] {
            if !(0.0..FRAC_PI_2).contains(&theta) {
                return Err(ModelError::config(format!(
                    "circular arc angle {theta} must lie in [0, π/2)"
                )));
            }
        }

        let u_start = radius * theta_start.sin();
        let u_end = radius * theta_end.sin();
        Ok(Segment::CircularArc(CircularArc {
            x_start,
            x_end,
            radius,
            theta_start,
            theta_end,
            u_start,
            du_dx: (u_end - u_start) / (x_end - x_start),
        }))
    }

    /// Curvature-continuous blend from `slope_start` (zero curvature) to
    /// `slope_end` (curvature `target_curvature`).
    ///
    /// Curvature is signed like the tangent angle: positive when the slope is
    /// rising along x, negative when it is falling. A falling ramp that steepens
    /// into its next segment therefore needs a negative `target_curvature`.
    /// With the opposite sign the slope overshoots `slope_end` inside the blend
    /// and swings back to meet it.
    pub fn cubic_spiral(
        x_start: f64,
        x_end: f64,
        slope_start: f64,
        slope_end: f64,
        target_curvature: f64,
    ) -> ModelResult<Self> {
        check_span(x_start, x_end)?;
        Ok(Segment::CubicSpiral(CubicSpiral::new(
            x_start,
            x_end,
            slope_start,
            slope_end,
            target_curvature,
        )?))
    }

    pub fn x_start(&self) -> f64 {
        match self {
            Segment::Linear(s) => s.x_start,
            Segment::CircularArc(s) => s.x_start,
            Segment::CubicSpiral(s) => s.x_start,
        }
    }

    pub fn x_end(&self) -> f64 {
        match self {
            Segment::Linear(s) => s.x_end,
            Segment::CircularArc(s) => s.x_end,
            Segment::CubicSpiral(s) => s.x_end,
        }
    }

    pub fn contains(&self, x: f64) -> bool {
        self.x_start() <= x && x <= self.x_end()
    }

    /// Height at `x` relative to this segment's own start.
    pub fn rise(&self, x: f64) -> f64 {
        match self {
            Segment::Linear(s) => s.rise(x),
            Segment::CircularArc(s) => s.rise(x),
            Segment::CubicSpiral(s) => s.rise(x),
        }
    }

    /// Signed local slope dy/dx at `x`.
    pub fn slope(&self, x: f64) -> f64 {
        match self {
            Segment::Linear(s) => s.slope,
            Segment::CircularArc(s) => s.slope(x),
            Segment::CubicSpiral(s) => s.slope(x),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Segment::Linear(_) => "linear",
            Segment::CircularArc(_) => "circular_arc",
            Segment::CubicSpiral(_) => "cubic_spiral",
        }
    }
}

fn check_span(x_start: f64, x_end: f64) -> ModelResult<()> {
    if !x_start.is_finite() || !x_end.is_finite() {
        return Err(ModelError::config("segment bounds must be finite"));
    }
    if x_end - x_start <= EPSILON_LENGTH {
        return Err(ModelError::config(format!(
            "segment [{x_start}, {x_end}] has zero or negative length"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
struct PlacedSegment {
    segment: Segment,
    y_start: f64,
}

impl PlacedSegment {
    fn height(&self, x: f64) -> f64 {
        self.y_start + self.segment.rise(x)
    }

    fn y_end(&self) -> f64 {
        self.height(self.segment.x_end())
    }
}

/// One evaluated point of a profile, for reporting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampSample {
    pub x: f64,
    /// Signed height (negative below the starting point of a falling ramp).
    pub height: f64,
    /// Signed slope.
    pub slope: f64,
}

/// Continuous piecewise ramp assembled from segments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RampProfile {
    segments: Vec<PlacedSegment>,
}

impl RampProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_segments<I>(segments: I) -> ModelResult<Self>
    where
        I: IntoIterator<Item = Segment>,
    {
        let mut profile = Self::new();
        for segment in segments {
            profile.add_segment(segment)?;
        }
        Ok(profile)
    }

    /// Append a segment, starting it at the previous segment's end height.
    ///
    /// The first segment must start at x = 0 and each later one exactly where
    /// the previous ended.
    pub fn add_segment(&mut self, segment: Segment) -> ModelResult<()> {
        let y_start = match self.segments.last() {
            Some(prev) => {
                let gap = segment.x_start() - prev.segment.x_end();
                if gap.abs() > EPSILON_LENGTH {
                    return Err(ModelError::config(format!(
                        "{} segment starting at {} does not meet previous end {}",
                        segment.kind(),
                        segment.x_start(),
                        prev.segment.x_end()
                    )));
                }
                prev.y_end()
            }
            None => {
                if segment.x_start().abs() > EPSILON_LENGTH {
                    return Err(ModelError::config(format!(
                        "first segment must start at 0, got {}",
                        segment.x_start()
                    )));
                }
                0.0
            }
        };

        self.segments.push(PlacedSegment { segment, y_start });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter().map(|p| &p.segment)
    }

    /// Start heights of every segment, in order.
    pub fn segment_start_heights(&self) -> Vec<f64> {
        self.segments.iter().map(|p| p.y_start).collect()
    }

    /// `(x_min, x_max)` covered by the profile.
    pub fn domain(&self) -> Option<(f64, f64)> {
        let first = self.segments.first()?;
        let last = self.segments.last()?;
        Some((first.segment.x_start(), last.segment.x_end()))
    }

    /// True when the profile is defined on all of `[0, x_max]`.
    pub fn covers(&self, x_max: f64) -> bool {
        self.domain()
            .is_some_and(|(lo, hi)| lo <= 0.0 && hi + EPSILON_LENGTH >= x_max)
    }

    fn locate(&self, x: f64) -> ModelResult<&PlacedSegment> {
        self.segments
            .iter()
            .find(|p| p.segment.contains(x))
            .ok_or_else(|| {
                let (min, max) = self.domain().unwrap_or((0.0, 0.0));
                ModelError::Domain { x, min, max }
            })
    }

    /// Signed height of the profile at `x`.
    pub fn signed_height(&self, x: f64) -> ModelResult<f64> {
        Ok(self.locate(x)?.height(x))
    }

    /// Signed slope of the profile at `x`.
    pub fn signed_slope(&self, x: f64) -> ModelResult<f64> {
        Ok(self.locate(x)?.segment.slope(x))
    }

    /// Height magnitude at `x`.
    pub fn height(&self, x: f64) -> ModelResult<f64> {
        Ok(self.signed_height(x)?.abs())
    }

    /// Slope magnitude at `x`.
    pub fn slope(&self, x: f64) -> ModelResult<f64> {
        Ok(self.signed_slope(x)?.abs())
    }

    /// Evaluate `n` evenly spaced points across the whole domain.
    pub fn sample(&self, n: usize) -> ModelResult<Vec<RampSample>> {
        let (lo, hi) = self
            .domain()
            .ok_or_else(|| ModelError::config("cannot sample an empty ramp"))?;
        if n < 2 {
            return Err(ModelError::InvalidArg {
                what: "ramp sampling needs at least two points",
            });
        }

        (0..n)
            .map(|i| {
                let x = lo + (hi - lo) * i as f64 / (n - 1) as f64;
                Ok(RampSample {
                    x,
                    height: self.signed_height(x)?,
                    slope: self.signed_slope(x)?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn linear_then_arc() -> RampProfile {
        RampProfile::from_segments([
            Segment::linear(0.0, 0.005, -0.8).unwrap(),
            Segment::circular_arc(0.005, 0.03, 0.2, 0.9, 1.2).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn first_segment_starts_at_zero_height() {
        let ramp = linear_then_arc();
        assert_eq!(ramp.height(0.0).unwrap(), 0.0);
        assert_eq!(ramp.segment_start_heights()[0], 0.0);
    }

    #[test]
    fn linear_height_and_slope() {
        let ramp = RampProfile::from_segments([Segment::linear(0.0, 0.02, -0.5).unwrap()]).unwrap();
        assert!((ramp.height(0.01).unwrap() - 0.005).abs() < 1e-15);
        assert_eq!(ramp.slope(0.01).unwrap(), 0.5);
        assert!((ramp.signed_height(0.01).unwrap() + 0.005).abs() < 1e-15);
    }

    #[test]
    fn start_height_is_inferred_from_previous_end() {
        let ramp = linear_then_arc();
        let starts = ramp.segment_start_heights();
        assert!((starts[1] - (-0.8 * 0.005)).abs() < 1e-15);
    }

    #[test]
    fn arc_keeps_falling() {
        let ramp = linear_then_arc();
        let samples = ramp.sample(50).unwrap();
        for pair in samples.windows(2) {
            assert!(pair[1].height <= pair[0].height);
        }
        assert!(ramp.signed_slope(0.02).unwrap() < 0.0);
    }

    #[test]
    fn arc_with_unit_mapping_reproduces_tangent_angle() {
        // When the x-span equals the abscissa span the arc is a true circle.
        let (r, t0, t1) = (0.05_f64, 0.3_f64, 0.9_f64);
        let span = r * t1.sin() - r * t0.sin();
        let seg = Segment::circular_arc(0.0, span, r, t0, t1).unwrap();
        assert!((seg.slope(0.0) + t0.tan()).abs() < 1e-12);
        assert!((seg.slope(span) + t1.tan()).abs() < 1e-9);
    }

    #[test]
    fn query_outside_domain_is_domain_error() {
        let ramp = linear_then_arc();
        let err = ramp.height(0.031).unwrap_err();
        assert!(matches!(err, ModelError::Domain { .. }));
        assert!(ramp.slope(-1e-6).is_err());
        assert!(RampProfile::new().height(0.0).is_err());
    }

    #[test]
    fn gap_between_segments_is_rejected() {
        let mut ramp = RampProfile::new();
        ramp.add_segment(Segment::linear(0.0, 0.01, -1.0).unwrap())
            .unwrap();
        let err = ramp
            .add_segment(Segment::linear(0.011, 0.02, -1.0).unwrap())
            .unwrap_err();
        assert!(matches!(err, ModelError::Configuration { .. }));
    }

    #[test]
    fn first_segment_must_start_at_origin() {
        let mut ramp = RampProfile::new();
        assert!(
            ramp.add_segment(Segment::linear(0.001, 0.01, -1.0).unwrap())
                .is_err()
        );
    }

    #[test]
    fn zero_length_segment_is_rejected() {
        assert!(Segment::linear(0.01, 0.01, -1.0).is_err());
        assert!(Segment::circular_arc(0.0, 0.01, 0.1, 0.2, FRAC_PI_2).is_err());
        assert!(Segment::circular_arc(0.0, 0.01, -0.1, 0.2, 0.4).is_err());
    }

    #[test]
    fn spiral_spans_exact_chord_and_meets_end_slope() {
        let slope_start = (-25.0_f64).to_radians().tan();
        let slope_end = -1.4;
        let seg = Segment::cubic_spiral(0.003, 0.0036, slope_start, slope_end, -200.0).unwrap();
        let Segment::CubicSpiral(spiral) = &seg else {
            panic!("expected spiral");
        };

        assert!(spiral.arc_length() >= 0.0006);
        assert!((seg.slope(0.003) - slope_start).abs() < 1e-12);
        assert!((seg.slope(0.0036) - slope_end).abs() < 1e-9);

        let traced = spiral.samples.last().unwrap().x;
        assert!((traced - 0.0006).abs() < 1e-12);
    }

    #[test]
    fn spiral_blend_is_continuous_with_neighbours() {
        let line = Segment::linear(0.0, 0.003, -0.466).unwrap();
        let blend = Segment::cubic_spiral(0.003, 0.0036, -0.466, -0.6, -50.0).unwrap();
        let tail = Segment::linear(0.0036, 0.02, -0.6).unwrap();
        let ramp = RampProfile::from_segments([line, blend, tail]).unwrap();

        for x in [0.003, 0.0036] {
            let left = ramp.signed_height(x - 1e-12).unwrap();
            let right = ramp.signed_height(x + 1e-12).unwrap();
            assert!((left - right).abs() < 1e-9);
        }
        assert!((ramp.signed_slope(0.0036 + 1e-9).unwrap() + 0.6).abs() < 1e-9);
    }

    fn sampled_slopes(seg: &Segment) -> Vec<f64> {
        (0..=600)
            .map(|i| seg.slope(0.003 + 0.0006 * i as f64 / 600.0))
            .collect()
    }

    #[test]
    fn steepening_blend_with_negative_curvature_is_monotone() {
        let seg = Segment::cubic_spiral(0.003, 0.0036, -0.466, -0.6, -50.0).unwrap();
        let Segment::CubicSpiral(spiral) = &seg else {
            panic!("expected spiral");
        };

        let slopes = sampled_slopes(&seg);
        assert!(slopes.windows(2).all(|w| w[1] <= w[0] + 1e-12));
        assert!(slopes.iter().all(|&m| (-0.6 - 1e-9..=-0.466 + 1e-9).contains(&m)));
        assert!((seg.slope(0.0036) + 0.6).abs() < 1e-9);

        // Tangent angle turns clockwise into the joint at the requested rate.
        let n = spiral.samples.len();
        let step = spiral.arc_length() / (n - 1) as f64;
        let end_curvature = (spiral.samples[n - 1].phi - spiral.samples[n - 2].phi) / step;
        assert!(end_curvature < 0.0);
        assert!((end_curvature + 50.0).abs() < 5.0);
    }

    #[test]
    fn curvature_against_the_bend_overshoots() {
        let seg = Segment::cubic_spiral(0.003, 0.0036, -0.466, -0.6, 200.0).unwrap();
        let slopes = sampled_slopes(&seg);
        let steepest = slopes.iter().copied().fold(f64::INFINITY, f64::min);
        assert!(steepest < -0.605);
        assert!((seg.slope(0.0036) + 0.6).abs() < 1e-9);
    }

    #[test]
    fn covers_checks_full_shift_range() {
        let ramp = linear_then_arc();
        assert!(ramp.covers(0.03));
        assert!(!ramp.covers(0.031));
    }

    proptest! {
        #[test]
        fn boundaries_are_continuous(
            split in 0.002_f64..0.018,
            m in -2.0_f64..-0.1,
            t0 in 0.0_f64..0.8,
            dt in 0.0_f64..0.6,
        ) {
            let ramp = RampProfile::from_segments([
                Segment::linear(0.0, split, m).unwrap(),
                Segment::circular_arc(split, 0.02, 0.05, t0, t0 + dt).unwrap(),
            ]).unwrap();

            let starts = ramp.segment_start_heights();
            let end_of_first = ramp.segments().next().unwrap().rise(split);
            prop_assert!((starts[1] - end_of_first).abs() < 1e-12);

            let at_boundary = ramp.signed_height(split).unwrap();
            let just_after = ramp.signed_height(split + 1e-12).unwrap();
            prop_assert!((at_boundary - just_after).abs() < 1e-9);
        }
    }
}

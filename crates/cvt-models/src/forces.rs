//! Stateless physical formulas shared by every drivetrain model.
//!
//! All quantities are SI. These are deliberately plain functions: the models
//! compose them, and tests pin their algebra directly.

/// Linear spring force `F = k·x` (N).
#[inline]
pub fn hookes_law_comp(k: f64, x: f64) -> f64 {
    k * x
}

/// Torsional spring torque `τ = k·θ` (N·m).
#[inline]
pub fn hookes_law_tors(k: f64, theta: f64) -> f64 {
    k * theta
}

/// Centrifugal force on a mass `m` orbiting at radius `r` with angular
/// velocity `omega`: `F = m·ω²·r`.
#[inline]
pub fn centrifugal_force(m: f64, omega: f64, r: f64) -> f64 {
    m * omega * omega * r
}

/// Aerodynamic drag magnitude `½·ρ·v²·A·C_d`.
#[inline]
pub fn air_resistance(rho: f64, v: f64, area: f64, cd: f64) -> f64 {
    0.5 * rho * v * v * area * cd
}

/// Torque from shaft power `τ = P/ω`.
#[inline]
pub fn torque_from_power(power: f64, omega: f64) -> f64 {
    power / omega
}

/// Torque multiplied through a reduction of ratio `r`.
#[inline]
pub fn gearing(torque: f64, ratio: f64) -> f64 {
    torque * ratio
}

/// Coulomb static friction limit `μ·N`.
#[inline]
pub fn static_friction(mu: f64, normal: f64) -> f64 {
    mu * normal
}

/// Capstan equation: tight-side tension for slack-side tension `t` over a
/// wrap of `theta` radians with friction coefficient `mu`.
#[inline]
pub fn capstan_equation(t: f64, theta: f64, mu: f64) -> f64 {
    t * (mu * theta).exp()
}

/// Newton's second law `F = m·a`.
#[inline]
pub fn newtons_second_law(m: f64, a: f64) -> f64 {
    m * a
}

// cvt-core/src/units.rs

use uom::si::f64::{
    Angle as UomAngle, AngularVelocity as UomAngularVelocity, Length as UomLength,
    Velocity as UomVelocity,
};

// Public canonical unit types (SI, f64)
pub type Angle = UomAngle;
pub type AngularVelocity = UomAngularVelocity;
pub type Length = UomLength;
pub type Velocity = UomVelocity;

/// Newton-metres per foot-pound-force.
pub const NM_PER_FT_LBF: f64 = 1.355_817_948_3;

#[inline]
pub fn rpm_to_rad_s(rpm: f64) -> f64 {
    use uom::si::angular_velocity::{radian_per_second, revolution_per_minute};
    AngularVelocity::new::<revolution_per_minute>(rpm).get::<radian_per_second>()
}

#[inline]
pub fn rad_s_to_rpm(rad_s: f64) -> f64 {
    use uom::si::angular_velocity::{radian_per_second, revolution_per_minute};
    AngularVelocity::new::<radian_per_second>(rad_s).get::<revolution_per_minute>()
}

#[inline]
pub fn deg_to_rad(deg: f64) -> f64 {
    use uom::si::angle::{degree, radian};
    Angle::new::<degree>(deg).get::<radian>()
}

#[inline]
pub fn rad_to_deg(rad: f64) -> f64 {
    use uom::si::angle::{degree, radian};
    Angle::new::<radian>(rad).get::<degree>()
}

#[inline]
pub fn inch_to_m(inches: f64) -> f64 {
    use uom::si::length::{inch, meter};
    Length::new::<inch>(inches).get::<meter>()
}

#[inline]
pub fn mps_to_kmh(v: f64) -> f64 {
    use uom::si::velocity::{kilometer_per_hour, meter_per_second};
    Velocity::new::<meter_per_second>(v).get::<kilometer_per_hour>()
}

#[inline]
pub fn ft_lbf_to_nm(torque: f64) -> f64 {
    torque * NM_PER_FT_LBF
}

pub mod constants {
    /// Standard gravity (m/s²).
    pub const G0_MPS2: f64 = 9.806_65;

    /// Sea-level air density (kg/m³).
    pub const AIR_DENSITY_KG_M3: f64 = 1.225;

    /// Density of belt rubber compound (kg/m³).
    pub const RUBBER_DENSITY_KG_M3: f64 = 1100.0;
}

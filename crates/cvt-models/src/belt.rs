//! Belt contact model: turns axial sheave clamping into radial belt force.

use crate::common::{check_non_negative, check_positive};
use crate::error::ModelResult;
use crate::forces::centrifugal_force;
use crate::ratio::CvtRatioModel;
use cvt_core::units::constants::RUBBER_DENSITY_KG_M3;
use cvt_core::units::deg_to_rad;
use std::sync::Arc;

/// Which pulley a belt contact sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sheave {
    Primary,
    Secondary,
}

impl Sheave {
    pub fn label(self) -> &'static str {
        match self {
            Sheave::Primary => "primary",
            Sheave::Secondary => "secondary",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BeltConfig {
    /// Belt compound density (kg/m³).
    pub density: f64,
    /// Cross-section area (m²).
    pub cross_section_area: f64,
    /// Belt to sheave friction coefficient.
    pub friction_coefficient: f64,
}

impl BeltConfig {
    /// Area of a V-belt with the given top width and height whose flanks
    /// match the sheave angle.
    pub fn trapezoid_area(top_width: f64, height: f64, sheave_angle: f64) -> f64 {
        let bottom = top_width - 2.0 * height * (0.5 * sheave_angle).tan();
        0.5 * height * (top_width + bottom.max(0.0))
    }
}

impl Default for BeltConfig {
    fn default() -> Self {
        Self {
            density: RUBBER_DENSITY_KG_M3,
            cross_section_area: Self::trapezoid_area(0.0221, 0.01557, deg_to_rad(23.0)),
            friction_coefficient: 0.3,
        }
    }
}

/// Belt segment wrapped around one sheave.
#[derive(Debug, Clone)]
pub struct BeltModel {
    config: BeltConfig,
    sheave: Sheave,
    ratio: Arc<CvtRatioModel>,
}

impl BeltModel {
    pub fn new(config: BeltConfig, sheave: Sheave, ratio: Arc<CvtRatioModel>) -> ModelResult<Self> {
        check_positive(config.density, "belt density")?;
        check_positive(config.cross_section_area, "belt cross-section area")?;
        check_non_negative(config.friction_coefficient, "belt friction coefficient")?;
        Ok(Self {
            config,
            sheave,
            ratio,
        })
    }

    pub fn config(&self) -> &BeltConfig {
        &self.config
    }

    pub fn sheave(&self) -> Sheave {
        self.sheave
    }

    /// Radius at the belt's centroid on this sheave.
    pub fn effective_radius(&self, shift: f64) -> f64 {
        match self.sheave {
            Sheave::Primary => self.ratio.primary_pitch_radius(shift),
            Sheave::Secondary => self.ratio.secondary_pitch_radius(shift),
        }
    }

    /// Mass of belt in contact with the sheave over `wrap` radians.
    pub fn contact_mass(&self, shift: f64, wrap: f64) -> f64 {
        self.config.density * self.config.cross_section_area * self.effective_radius(shift) * wrap
    }

    pub fn centrifugal_force(&self, omega: f64, shift: f64, wrap: f64) -> f64 {
        let r_eff = self.effective_radius(shift);
        centrifugal_force(self.contact_mass(shift, wrap), omega, r_eff)
    }

    /// Radial force on the belt from axial clamping through V-shaped faces.
    pub fn radial_force_from_clamping(clamping_force: f64, sheave_angle: f64) -> f64 {
        2.0 * clamping_force * (0.5 * sheave_angle).tan()
    }

    /// Net radial force the belt exerts along the line of centres.
    pub fn calculate_radial_force(
        &self,
        omega: f64,
        shift: f64,
        wrap: f64,
        clamping_force: f64,
    ) -> f64 {
        let centrifugal = self.centrifugal_force(omega, shift, wrap);
        let from_clamp =
            Self::radial_force_from_clamping(clamping_force, self.ratio.geometry().sheave_angle);
        (centrifugal + from_clamp) * 2.0 * (0.5 * wrap).sin()
    }

    /// Slack-side tension that would produce `radial` over a wrap.
    pub fn slack_tension(radial: f64, wrap: f64, mu: f64) -> f64 {
        radial / (((wrap - std::f64::consts::PI).abs() / 2.0).cos() * (1.0 + (mu * wrap).exp()))
    }

    /// Torque the belt can carry before slipping, from slack tension `t`.
    pub fn max_transferable_torque(t: f64, mu: f64, wrap: f64, radius: f64) -> f64 {
        t * radius * ((mu * wrap).exp() - 1.0)
    }

    /// Slip limit on this sheave for a given radial force.
    pub fn slip_torque(&self, radial: f64, shift: f64, wrap: f64) -> f64 {
        let mu = self.config.friction_coefficient;
        let t = Self::slack_tension(radial, wrap, mu);
        Self::max_transferable_torque(t, mu, wrap, self.effective_radius(shift))
    }
}

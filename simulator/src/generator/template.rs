use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

/// Polarization angle layout of a synthetic image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum PolarizationPattern {
    /// Same polarization angle everywhere.
    Uniform { evpa_deg: f64 },
    /// Polarization along the radius vector.
    #[default]
    Radial,
    /// Polarization perpendicular to the radius vector.
    Tangential,
    /// Radial pattern rotated by a constant pitch angle.
    Spiral { pitch_deg: f64 },
}

impl PolarizationPattern {
    /// Electric-vector position angle at position angle `phi`, both in radians.
    pub fn evpa(&self, phi: f64) -> f64 {
        match *self {
            PolarizationPattern::Uniform { evpa_deg } => evpa_deg.to_radians(),
            PolarizationPattern::Radial => phi,
            PolarizationPattern::Tangential => phi + FRAC_PI_2,
            PolarizationPattern::Spiral { pitch_deg } => phi + pitch_deg.to_radians(),
        }
    }
}

//! Projection of the linear polarization field onto `exp(-i m φ)`.
//!
//! For each mode `m` the evaluator forms the masked sum of the chosen
//! polarization representation times the rotational basis, then normalizes it:
//!
//! | `norm_in_int` | `norm_with_stokes_i` | summand            | divisor              |
//! |---------------|----------------------|--------------------|----------------------|
//! | false         | true                 | `P · B_m`          | `Σ I`                |
//! | false         | false                | `P · B_m`          | `Σ \|P\|`            |
//! | true          | true                 | `(P / I) · B_m`    | pixel count          |
//! | true          | false                | `(P / \|P\|) · B_m`| pixel count          |

use crate::image::CanonicalImage;
use crate::math::stats::StatsHelper;
use crate::prelude::{DegeneracyPolicy, ModeRequest, PmodesError, PmodesResult, ProcessingStage};
use crate::processing::annulus::AnnulusMask;
use crate::processing::geometry::GeometryGrids;
use crate::telemetry::log::LogManager;
use ndarray::{Array2, Zip};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Beta coefficient for a single azimuthal mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BetaCoefficient {
    pub mode: i32,
    pub value: Complex64,
}

impl BetaCoefficient {
    pub fn amplitude(&self) -> f64 {
        self.value.norm()
    }

    /// Phase in radians, in `(-π, π]`.
    pub fn phase(&self) -> f64 {
        self.value.arg()
    }

    pub fn phase_deg(&self) -> f64 {
        self.phase().to_degrees()
    }

    pub fn is_finite(&self) -> bool {
        self.value.is_finite()
    }
}

/// Per-pixel polarization fields, computed once per image.
#[derive(Debug, Clone)]
pub struct PolarizationFields {
    /// `Q + iU`.
    pub p: Array2<Complex64>,
    /// `|P|`.
    pub p_abs: Array2<f64>,
    /// `P / I`.
    pub m_frac: Array2<Complex64>,
    /// `P / |P|`.
    pub p_hat: Array2<Complex64>,
}

impl PolarizationFields {
    pub fn from_image(image: &CanonicalImage) -> Self {
        let p = image.polarization();
        let p_abs = p.mapv(|value| value.norm());
        let m_frac = Zip::from(&p)
            .and(image.stokes_i())
            .map_collect(|&value, &intensity| value / intensity);
        let p_hat = Zip::from(&p)
            .and(&p_abs)
            .map_collect(|&value, &magnitude| value / magnitude);
        Self {
            p,
            p_abs,
            m_frac,
            p_hat,
        }
    }
}

/// Annulus-wide normalizers, computed once per request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnulusTotals {
    pub total_flux: f64,
    pub total_pflux: f64,
    pub count: usize,
}

/// Rotational basis `exp(-i m φ)` over an angle grid.
pub fn rotational_basis(angle: &Array2<f64>, mode: i32) -> Array2<Complex64> {
    let m = mode as f64;
    angle.mapv(|phi| Complex64::new((-m * phi).cos(), (-m * phi).sin()))
}

/// Borrowed inputs of the evaluator stage.
pub struct EvaluatorInput<'a> {
    pub image: &'a CanonicalImage,
    pub geometry: &'a GeometryGrids,
    pub annulus: &'a AnnulusMask,
}

/// Final pipeline stage.
pub struct BetaEvaluator {
    request: ModeRequest,
    policy: DegeneracyPolicy,
    logger: LogManager,
}

impl BetaEvaluator {
    pub fn new(request: ModeRequest, policy: DegeneracyPolicy) -> Self {
        Self {
            request,
            policy,
            logger: LogManager::new("beta"),
        }
    }

    /// Finds the first zero normalizer for the configured normalization.
    fn degenerate_quantity(
        &self,
        image: &CanonicalImage,
        fields: &PolarizationFields,
        annulus: &AnnulusMask,
        totals: &AnnulusTotals,
    ) -> Option<String> {
        if annulus.is_empty() {
            return Some("pixel count".into());
        }
        match (self.request.norm_in_int, self.request.norm_with_stokes_i) {
            (true, true) => StatsHelper::first_masked_zero(image.stokes_i(), &annulus.mask)
                .map(|(row, col)| format!("local Stokes I at pixel ({}, {})", row, col)),
            (true, false) => StatsHelper::first_masked_zero(&fields.p_abs, &annulus.mask)
                .map(|(row, col)| format!("local polarized flux at pixel ({}, {})", row, col)),
            (false, true) if totals.total_flux == 0.0 => Some("total flux".into()),
            (false, false) if totals.total_pflux == 0.0 => Some("total polarized flux".into()),
            (false, _) => None,
        }
    }
}

impl<'a> ProcessingStage<EvaluatorInput<'a>> for BetaEvaluator {
    type Output = Vec<BetaCoefficient>;

    fn execute(&self, input: &EvaluatorInput<'a>) -> PmodesResult<Vec<BetaCoefficient>> {
        let mask = &input.annulus.mask;
        let fields = PolarizationFields::from_image(input.image);
        let totals = AnnulusTotals {
            total_flux: StatsHelper::masked_sum(input.image.stokes_i(), mask),
            total_pflux: StatsHelper::masked_sum(&fields.p_abs, mask),
            count: input.annulus.count,
        };

        if let Some(quantity) = self.degenerate_quantity(input.image, &fields, input.annulus, &totals)
        {
            match self.policy {
                DegeneracyPolicy::Error => return Err(PmodesError::Degenerate { quantity }),
                DegeneracyPolicy::Propagate => self.logger.degeneracy(&quantity),
            }
        }

        let (summand, divisor) = match (self.request.norm_in_int, self.request.norm_with_stokes_i) {
            (true, true) => (&fields.m_frac, totals.count as f64),
            (true, false) => (&fields.p_hat, totals.count as f64),
            (false, true) => (&fields.p, totals.total_flux),
            (false, false) => (&fields.p, totals.total_pflux),
        };

        let coefficients = self
            .request
            .modes
            .iter()
            .map(|&mode| {
                let product = summand * &rotational_basis(&input.geometry.angle, mode);
                BetaCoefficient {
                    mode,
                    value: StatsHelper::masked_sum_complex(&product, mask) / divisor,
                }
            })
            .collect::<Vec<_>>();

        self.logger.record(&format!(
            "{} modes over {} pixels (flux {:.4e}, polarized flux {:.4e})",
            coefficients.len(),
            totals.count,
            totals.total_flux,
            totals.total_pflux
        ));
        Ok(coefficients)
    }
}

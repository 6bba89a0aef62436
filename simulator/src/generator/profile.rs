use crate::generator::template::PolarizationPattern;
use anyhow::{ensure, Context};
use ndarray::Array2;
use pmodescore::image::{CanonicalImage, DirectImage};
use pmodescore::prelude::{AdapterConfig, PixelCentering};
use pmodescore::processing::GeometryGrids;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Configuration for generating a synthetic polarized ring.
///
/// Lengths are in the physical angular unit (µas with the default adapter).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub npix: usize,
    pub fov: f64,
    pub ring_radius: f64,
    pub ring_width: f64,
    pub peak_intensity: f64,
    pub pol_fraction: f64,
    pub pattern: PolarizationPattern,
    pub noise: f64,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            npix: 128,
            fov: 160.0,
            ring_radius: 21.0,
            ring_width: 5.0,
            peak_intensity: 1.0,
            pol_fraction: 0.3,
            pattern: PolarizationPattern::Radial,
            noise: 0.0,
            seed: 0,
        }
    }
}

/// Builds the Stokes grids of a Gaussian ring with the configured pattern.
pub fn build_canonical_image(config: &GeneratorConfig) -> anyhow::Result<CanonicalImage> {
    ensure!(config.npix > 0, "generator needs at least one pixel");
    ensure!(config.ring_width > 0.0, "ring width must be positive");

    let npix = config.npix;
    let geometry = GeometryGrids::build(npix, config.fov, PixelCentering::Reference)
        .context("building generator geometry")?;
    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut iarr = Array2::zeros((npix, npix));
    let mut qarr = Array2::zeros((npix, npix));
    let mut uarr = Array2::zeros((npix, npix));
    for ((index, &radius), &phi) in geometry.radius.indexed_iter().zip(geometry.angle.iter()) {
        let offset = (radius - config.ring_radius) / config.ring_width;
        let intensity = config.peak_intensity * (-0.5 * offset * offset).exp();
        let chi = 2.0 * config.pattern.evpa(phi);
        let polarized = config.pol_fraction * intensity;

        let mut jitter = || {
            if config.noise > 0.0 {
                rng.gen_range(-config.noise..config.noise)
            } else {
                0.0
            }
        };
        iarr[index] = intensity;
        qarr[index] = polarized * chi.cos() + jitter();
        uarr[index] = polarized * chi.sin() + jitter();
    }

    CanonicalImage::new(iarr, qarr, uarr, Array2::zeros((npix, npix)), config.fov)
        .context("assembling synthetic image")
}

/// Same ring, expressed as a direct image object in the adapter's native unit.
pub fn build_direct_image(
    config: &GeneratorConfig,
    adapter: &AdapterConfig,
) -> anyhow::Result<DirectImage> {
    let image = build_canonical_image(config)?;
    Ok(DirectImage::from_canonical(&image, adapter))
}

use serde::{Deserialize, Serialize};

/// Radians per micro-arcsecond.
pub const RADPERUAS: f64 = 1.0e-6 / 3600.0 * std::f64::consts::PI / 180.0;

/// Radians to micro-arcseconds factor applied to snapshot containers.
pub const SNAPSHOT_RAD_TO_UAS: f64 = 2.06265e11;

/// Unit conversion constants used by the image adapters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Multiplier from a direct image's native field-of-view unit to the
    /// physical unit used by the annulus radii.
    pub direct_fov_to_physical: f64,
    /// Multiplier applied to `dx / dsource * L_unit` for snapshot containers.
    pub snapshot_fov_to_physical: f64,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            direct_fov_to_physical: 1.0 / RADPERUAS,
            snapshot_fov_to_physical: SNAPSHOT_RAD_TO_UAS,
        }
    }
}

/// Placement of pixel centers on the normalized `[-0.5, 0.5)` grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelCentering {
    /// Column axis nudged by `-0.01 / npix`, row axis unshifted.
    #[default]
    Reference,
    /// Half-pixel offset on both axes.
    Symmetric,
}

/// What the evaluator does when a normalizing quantity is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DegeneracyPolicy {
    /// Divide anyway and let `NaN`/`inf` reach the caller.
    #[default]
    Propagate,
    /// Fail with [`PmodesError::Degenerate`].
    Error,
}

/// Settings shared by every stage of the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub adapter: AdapterConfig,
    pub centering: PixelCentering,
    pub degeneracy: DegeneracyPolicy,
}

/// Closed radial interval `[r_min, r_max]` in physical angular units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Annulus {
    pub r_min: f64,
    pub r_max: f64,
}

impl Annulus {
    pub fn new(r_min: f64, r_max: f64) -> Self {
        Self { r_min, r_max }
    }

    pub fn contains(&self, radius: f64) -> bool {
        radius >= self.r_min && radius <= self.r_max
    }
}

impl Default for Annulus {
    fn default() -> Self {
        Self {
            r_min: 0.0,
            r_max: 1000.0,
        }
    }
}

/// Ordered mode numbers plus the two normalization switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeRequest {
    pub modes: Vec<i32>,
    /// Normalize per pixel inside the annulus sum instead of after it.
    pub norm_in_int: bool,
    /// Normalize by Stokes I rather than by polarized flux.
    pub norm_with_stokes_i: bool,
}

impl ModeRequest {
    pub fn new(modes: Vec<i32>) -> Self {
        Self {
            modes,
            ..Default::default()
        }
    }
}

impl Default for ModeRequest {
    fn default() -> Self {
        Self {
            modes: Vec::new(),
            norm_in_int: false,
            norm_with_stokes_i: true,
        }
    }
}

/// Everything [`crate::pipeline::compute_beta_modes`] needs besides the image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BetaRequest {
    #[serde(flatten)]
    pub mode_request: ModeRequest,
    pub annulus: Annulus,
    pub pipeline: PipelineConfig,
}

impl BetaRequest {
    pub fn new(modes: Vec<i32>) -> Self {
        Self {
            mode_request: ModeRequest::new(modes),
            ..Default::default()
        }
    }

    pub fn with_annulus(mut self, r_min: f64, r_max: f64) -> Self {
        self.annulus = Annulus::new(r_min, r_max);
        self
    }

    pub fn with_normalization(mut self, norm_in_int: bool, norm_with_stokes_i: bool) -> Self {
        self.mode_request.norm_in_int = norm_in_int;
        self.mode_request.norm_with_stokes_i = norm_with_stokes_i;
        self
    }

    pub fn with_pipeline(mut self, pipeline: PipelineConfig) -> Self {
        self.pipeline = pipeline;
        self
    }
}

/// Common error type for every stage.
#[derive(thiserror::Error, Debug)]
pub enum PmodesError {
    #[error("cannot access {path}: {message}")]
    Access { path: String, message: String },
    #[error("malformed image: {0}")]
    Format(String),
    #[error("numeric degeneracy: {quantity} is zero")]
    Degenerate { quantity: String },
}

pub type PmodesResult<T> = Result<T, PmodesError>;

/// A single step of the forward pipeline.
pub trait ProcessingStage<I: ?Sized> {
    type Output;

    fn execute(&self, input: &I) -> PmodesResult<Self::Output>;
}

//! Azimuthal beta-mode decomposition of resolved polarimetric images.
//!
//! The crate normalizes an input image into a canonical Stokes grid, builds
//! radius and position-angle grids, masks an annulus and projects the linear
//! polarization field onto rotational basis functions, one stage per module.

pub mod image;
pub mod math;
pub mod pipeline;
pub mod prelude;
pub mod processing;
pub mod telemetry;

pub use image::{CanonicalImage, CanonicalSource, DirectImage, ImageSource, SnapshotFields};
pub use pipeline::{compute_beta_modes, compute_beta_modes_for_image};
pub use prelude::{BetaRequest, PmodesError, PmodesResult};
pub use processing::BetaCoefficient;

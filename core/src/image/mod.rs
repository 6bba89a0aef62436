//! Image adapters: every supported input is turned into a [`CanonicalImage`].

pub mod canonical;
pub mod direct;
pub mod snapshot;

pub use canonical::CanonicalImage;
pub use direct::DirectImage;
pub use snapshot::SnapshotFields;

use crate::prelude::{AdapterConfig, PmodesResult, ProcessingStage};
use crate::telemetry::log::LogManager;
use std::path::PathBuf;

/// Anything that can produce a [`CanonicalImage`].
pub trait CanonicalSource {
    fn to_canonical(&self, config: &AdapterConfig) -> PmodesResult<CanonicalImage>;
}

impl CanonicalSource for CanonicalImage {
    fn to_canonical(&self, _config: &AdapterConfig) -> PmodesResult<CanonicalImage> {
        Ok(self.clone())
    }
}

/// The two supported image inputs.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    /// An image object already in memory.
    Direct(DirectImage),
    /// Path to a snapshot container on disk.
    Snapshot(PathBuf),
}

impl ImageSource {
    pub fn label(&self) -> String {
        match self {
            ImageSource::Direct(image) => format!("direct image {}x{}", image.xdim, image.ydim),
            ImageSource::Snapshot(path) => format!("snapshot {}", path.display()),
        }
    }
}

impl CanonicalSource for ImageSource {
    fn to_canonical(&self, config: &AdapterConfig) -> PmodesResult<CanonicalImage> {
        match self {
            ImageSource::Direct(image) => image.to_canonical(config),
            ImageSource::Snapshot(path) => snapshot::load(path)?.to_canonical(config),
        }
    }
}

/// First pipeline stage.
pub struct ImageAdapter {
    config: AdapterConfig,
    logger: LogManager,
}

impl ImageAdapter {
    pub fn new(config: AdapterConfig) -> Self {
        Self {
            config,
            logger: LogManager::new("adapter"),
        }
    }
}

impl<S: CanonicalSource + ?Sized> ProcessingStage<S> for ImageAdapter {
    type Output = CanonicalImage;

    fn execute(&self, input: &S) -> PmodesResult<CanonicalImage> {
        let image = input.to_canonical(&self.config)?;
        self.logger.record(&format!(
            "canonical image npix {} fov {:.4}",
            image.npix(),
            image.fov()
        ));
        Ok(image)
    }
}

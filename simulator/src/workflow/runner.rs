use crate::generator::profile::build_direct_image;
use crate::workflow::config::{SourceConfig, WorkflowConfig};
use crate::workflow::report::{BetaReport, ModeRecord};
use anyhow::Context;
use log::info;
use pmodescore::image::{DirectImage, ImageAdapter, ImageSource};
use pmodescore::pipeline::compute_beta_modes_for_image;
use pmodescore::prelude::ProcessingStage;
use pmodescore::processing::BetaCoefficient;

#[derive(Debug, Clone)]
pub struct WorkflowResult {
    pub source: String,
    pub npix: usize,
    pub fov: f64,
    pub coefficients: Vec<BetaCoefficient>,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    fn image_source(&self) -> anyhow::Result<ImageSource> {
        let adapter = &self.config.request.pipeline.adapter;
        let source = match &self.config.source {
            SourceConfig::Image { path } => ImageSource::Direct(
                DirectImage::load_json(path)
                    .with_context(|| format!("loading image object {}", path.display()))?,
            ),
            SourceConfig::Snapshot { path } => ImageSource::Snapshot(path.clone()),
            SourceConfig::Synthetic(generator) => ImageSource::Direct(
                build_direct_image(generator, adapter).context("generating synthetic image")?,
            ),
        };
        Ok(source)
    }

    pub fn execute(&self) -> anyhow::Result<WorkflowResult> {
        let request = &self.config.request;
        let source = self.image_source()?;
        let label = source.label();

        let image = ImageAdapter::new(request.pipeline.adapter)
            .execute(&source)
            .with_context(|| format!("adapting {}", label))?;
        let coefficients = compute_beta_modes_for_image(&image, request)
            .with_context(|| format!("computing beta modes for {}", label))?;
        info!(
            "{}: {} coefficients from {}x{} pixels",
            label,
            coefficients.len(),
            image.npix(),
            image.npix()
        );

        Ok(WorkflowResult {
            source: label,
            npix: image.npix(),
            fov: image.fov(),
            coefficients,
        })
    }

    pub fn report(&self, result: &WorkflowResult) -> BetaReport {
        let request = &self.config.request;
        BetaReport {
            source: result.source.clone(),
            npix: result.npix,
            fov: result.fov,
            annulus: request.annulus,
            norm_in_int: request.mode_request.norm_in_int,
            norm_with_stokes_i: request.mode_request.norm_with_stokes_i,
            coefficients: result.coefficients.iter().map(ModeRecord::from).collect(),
        }
    }
}

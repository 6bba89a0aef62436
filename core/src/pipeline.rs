use crate::image::{CanonicalImage, CanonicalSource, ImageAdapter};
use crate::prelude::{BetaRequest, PmodesResult, ProcessingStage};
use crate::processing::{
    AnnulusSelector, BetaCoefficient, BetaEvaluator, EvaluatorInput, GeometryBuilder,
};

/// Computes one beta coefficient per requested mode, in request order.
///
/// The source is first normalized by the image adapter, so a direct image and
/// a snapshot describing the same sky produce the same coefficients.
pub fn compute_beta_modes<S: CanonicalSource + ?Sized>(
    source: &S,
    request: &BetaRequest,
) -> PmodesResult<Vec<BetaCoefficient>> {
    let image = ImageAdapter::new(request.pipeline.adapter).execute(source)?;
    compute_beta_modes_for_image(&image, request)
}

/// Runs the geometry, annulus and evaluator stages on an already canonical image.
pub fn compute_beta_modes_for_image(
    image: &CanonicalImage,
    request: &BetaRequest,
) -> PmodesResult<Vec<BetaCoefficient>> {
    let geometry = GeometryBuilder::new(request.pipeline.centering).execute(image)?;
    let annulus = AnnulusSelector::new(request.annulus).execute(&geometry)?;
    BetaEvaluator::new(request.mode_request.clone(), request.pipeline.degeneracy).execute(
        &EvaluatorInput {
            image,
            geometry: &geometry,
            annulus: &annulus,
        },
    )
}

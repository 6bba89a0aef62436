use crate::math::stats::StatsHelper;
use crate::prelude::{Annulus, PmodesResult, ProcessingStage};
use crate::processing::geometry::GeometryGrids;
use crate::telemetry::log::LogManager;
use ndarray::Array2;

/// Pixels whose radius falls inside the annulus.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnulusMask {
    pub mask: Array2<bool>,
    pub count: usize,
}

impl AnnulusMask {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Third pipeline stage.
pub struct AnnulusSelector {
    annulus: Annulus,
    logger: LogManager,
}

impl AnnulusSelector {
    pub fn new(annulus: Annulus) -> Self {
        Self {
            annulus,
            logger: LogManager::new("annulus"),
        }
    }
}

impl ProcessingStage<GeometryGrids> for AnnulusSelector {
    type Output = AnnulusMask;

    fn execute(&self, input: &GeometryGrids) -> PmodesResult<AnnulusMask> {
        let mask = input.radius.mapv(|radius| self.annulus.contains(radius));
        let count = StatsHelper::masked_count(&mask);
        self.logger.detail(&format!(
            "[{}, {}] selects {} of {} pixels",
            self.annulus.r_min,
            self.annulus.r_max,
            count,
            mask.len()
        ));
        Ok(AnnulusMask { mask, count })
    }
}

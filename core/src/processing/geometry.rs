use crate::image::CanonicalImage;
use crate::prelude::{PixelCentering, PmodesError, PmodesResult, ProcessingStage};
use crate::telemetry::log::LogManager;
use ndarray::{Array1, Array2};
use std::f64::consts::{FRAC_PI_2, TAU};

/// Per-pixel radial distance and East-of-North position angle.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryGrids {
    pub radius: Array2<f64>,
    pub angle: Array2<f64>,
}

impl GeometryGrids {
    /// Builds both grids for a square image of side `npix` spanning `fov`.
    ///
    /// Columns carry the x coordinate and rows the y coordinate. The angle is
    /// zero towards north and grows through east, wrapped into `[0, 2π)`.
    pub fn build(npix: usize, fov: f64, centering: PixelCentering) -> PmodesResult<Self> {
        if npix == 0 {
            return Err(PmodesError::Format("grid must have at least one pixel".into()));
        }

        let (px, py) = Self::normalized_axes(npix, centering);
        let radius = Array2::from_shape_fn((npix, npix), |(row, col)| {
            (px[col] * fov).hypot(py[row] * fov)
        });
        let angle = Array2::from_shape_fn((npix, npix), |(row, col)| {
            position_angle(px[col], py[row])
        });

        Ok(Self { radius, angle })
    }

    /// Pixel-center coordinates on the unit grid, `(columns, rows)`.
    fn normalized_axes(npix: usize, centering: PixelCentering) -> (Array1<f64>, Array1<f64>) {
        let n = npix as f64;
        match centering {
            PixelCentering::Reference => (
                Array1::from_shape_fn(npix, |k| (k as f64 - 0.01) / n - 0.5),
                Array1::from_shape_fn(npix, |k| k as f64 / n - 0.5),
            ),
            PixelCentering::Symmetric => {
                let axis = Array1::from_shape_fn(npix, |k| (k as f64 + 0.5) / n - 0.5);
                (axis.clone(), axis)
            }
        }
    }
}

fn position_angle(x: f64, y: f64) -> f64 {
    let mut angle = (-y).atan2(x) - FRAC_PI_2;
    if angle < 0.0 {
        angle += TAU;
    }
    if angle >= TAU {
        angle -= TAU;
    }
    angle
}

/// Second pipeline stage.
pub struct GeometryBuilder {
    centering: PixelCentering,
    logger: LogManager,
}

impl GeometryBuilder {
    pub fn new(centering: PixelCentering) -> Self {
        Self {
            centering,
            logger: LogManager::new("geometry"),
        }
    }
}

impl ProcessingStage<CanonicalImage> for GeometryBuilder {
    type Output = GeometryGrids;

    fn execute(&self, input: &CanonicalImage) -> PmodesResult<GeometryGrids> {
        let grids = GeometryGrids::build(input.npix(), input.fov(), self.centering)?;
        let max_radius = grids.radius.iter().cloned().fold(0.0, f64::max);
        self.logger.detail(&format!(
            "{:?} centering, max radius {:.4}",
            self.centering, max_radius
        ));
        Ok(grids)
    }
}

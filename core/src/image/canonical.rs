use crate::prelude::{PmodesError, PmodesResult};
use ndarray::{Array2, Zip};
use num_complex::Complex64;

/// Square grid of Stokes parameters with its angular field of view.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalImage {
    npix: usize,
    iarr: Array2<f64>,
    qarr: Array2<f64>,
    uarr: Array2<f64>,
    varr: Array2<f64>,
    fov: f64,
}

impl CanonicalImage {
    /// Validates that all four grids share one square shape and that `fov`
    /// is positive and finite.
    pub fn new(
        iarr: Array2<f64>,
        qarr: Array2<f64>,
        uarr: Array2<f64>,
        varr: Array2<f64>,
        fov: f64,
    ) -> PmodesResult<Self> {
        let (rows, cols) = iarr.dim();
        if rows == 0 || rows != cols {
            return Err(PmodesError::Format(format!(
                "Stokes I grid must be square and non-empty, got {}x{}",
                rows, cols
            )));
        }
        for (name, grid) in [("Q", &qarr), ("U", &uarr), ("V", &varr)] {
            if grid.dim() != (rows, cols) {
                let (r, c) = grid.dim();
                return Err(PmodesError::Format(format!(
                    "Stokes {} grid is {}x{}, expected {}x{}",
                    name, r, c, rows, cols
                )));
            }
        }
        if !(fov.is_finite() && fov > 0.0) {
            return Err(PmodesError::Format(format!(
                "field of view must be positive, got {}",
                fov
            )));
        }

        Ok(Self {
            npix: rows,
            iarr,
            qarr,
            uarr,
            varr,
            fov,
        })
    }

    pub fn npix(&self) -> usize {
        self.npix
    }

    pub fn fov(&self) -> f64 {
        self.fov
    }

    pub fn stokes_i(&self) -> &Array2<f64> {
        &self.iarr
    }

    pub fn stokes_q(&self) -> &Array2<f64> {
        &self.qarr
    }

    pub fn stokes_u(&self) -> &Array2<f64> {
        &self.uarr
    }

    pub fn stokes_v(&self) -> &Array2<f64> {
        &self.varr
    }

    /// Complex linear polarization `Q + iU`.
    pub fn polarization(&self) -> Array2<Complex64> {
        Zip::from(&self.qarr)
            .and(&self.uarr)
            .map_collect(|&q, &u| Complex64::new(q, u))
    }
}

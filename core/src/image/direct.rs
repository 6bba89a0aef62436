use crate::image::canonical::CanonicalImage;
use crate::image::CanonicalSource;
use crate::prelude::{AdapterConfig, PmodesError, PmodesResult};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// In-memory image object with flattened, row-major Stokes vectors.
///
/// `psize` is the pixel size in the object's native angular unit (radians for
/// interferometric imaging tool exports).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectImage {
    pub xdim: usize,
    pub ydim: usize,
    pub psize: f64,
    pub ivec: Vec<f64>,
    pub qvec: Vec<f64>,
    pub uvec: Vec<f64>,
    pub vvec: Vec<f64>,
}

impl DirectImage {
    /// Horizontal field of view in the native unit.
    pub fn fovx(&self) -> f64 {
        self.psize * self.xdim as f64
    }

    /// Flattens a canonical image back into a direct image whose native unit
    /// is `1 / direct_fov_to_physical` of the physical unit.
    pub fn from_canonical(image: &CanonicalImage, config: &AdapterConfig) -> Self {
        let npix = image.npix();
        let flatten = |grid: &Array2<f64>| grid.iter().copied().collect::<Vec<_>>();
        Self {
            xdim: npix,
            ydim: npix,
            psize: image.fov() / config.direct_fov_to_physical / npix as f64,
            ivec: flatten(image.stokes_i()),
            qvec: flatten(image.stokes_q()),
            uvec: flatten(image.stokes_u()),
            vvec: flatten(image.stokes_v()),
        }
    }

    /// Reads a JSON-serialized image object.
    pub fn load_json<P: AsRef<Path>>(path: P) -> PmodesResult<Self> {
        let path_ref = path.as_ref();
        let file = File::open(path_ref).map_err(|err| PmodesError::Access {
            path: path_ref.display().to_string(),
            message: err.to_string(),
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|err| {
            PmodesError::Format(format!("{}: {}", path_ref.display(), err))
        })
    }

    fn reshape(&self, name: &str, values: &[f64]) -> PmodesResult<Array2<f64>> {
        Array2::from_shape_vec((self.xdim, self.xdim), values.to_vec()).map_err(|_| {
            PmodesError::Format(format!(
                "Stokes {} vector has {} entries, expected {}",
                name,
                values.len(),
                self.xdim * self.xdim
            ))
        })
    }
}

impl CanonicalSource for DirectImage {
    fn to_canonical(&self, config: &AdapterConfig) -> PmodesResult<CanonicalImage> {
        if self.xdim == 0 || self.xdim != self.ydim {
            return Err(PmodesError::Format(format!(
                "image must be square, got {}x{}",
                self.xdim, self.ydim
            )));
        }

        CanonicalImage::new(
            self.reshape("I", &self.ivec)?,
            self.reshape("Q", &self.qvec)?,
            self.reshape("U", &self.uvec)?,
            self.reshape("V", &self.vvec)?,
            self.fovx() * config.direct_fov_to_physical,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::RADPERUAS;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample(n: usize) -> DirectImage {
        let len = n * n;
        DirectImage {
            xdim: n,
            ydim: n,
            psize: 2.0 * RADPERUAS,
            ivec: (0..len).map(|k| k as f64).collect(),
            qvec: vec![0.1; len],
            uvec: vec![-0.1; len],
            vvec: vec![0.0; len],
        }
    }

    #[test]
    fn direct_image_reshapes_row_major() {
        let image = sample(3).to_canonical(&AdapterConfig::default()).unwrap();
        assert_eq!(image.npix(), 3);
        assert_eq!(image.stokes_i()[[0, 2]], 2.0);
        assert_eq!(image.stokes_i()[[2, 0]], 6.0);
        assert!((image.fov() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn direct_image_uses_configured_unit() {
        let config = AdapterConfig {
            direct_fov_to_physical: 10.0,
            ..Default::default()
        };
        let mut direct = sample(2);
        direct.psize = 0.5;
        assert_eq!(direct.to_canonical(&config).unwrap().fov(), 10.0);
    }

    #[test]
    fn direct_image_rejects_short_vector() {
        let mut direct = sample(3);
        direct.uvec.pop();
        let err = direct.to_canonical(&AdapterConfig::default()).unwrap_err();
        assert!(err.to_string().contains("Stokes U"));
    }

    #[test]
    fn direct_image_rejects_rectangular_dims() {
        let mut direct = sample(2);
        direct.ydim = 3;
        assert!(matches!(
            direct.to_canonical(&AdapterConfig::default()),
            Err(PmodesError::Format(_))
        ));
    }

    #[test]
    fn direct_image_survives_canonical_round_trip() {
        let config = AdapterConfig::default();
        let direct = sample(4);
        let back = DirectImage::from_canonical(&direct.to_canonical(&config).unwrap(), &config);
        assert_eq!(back.ivec, direct.ivec);
        assert!((back.fovx() - direct.fovx()).abs() < 1e-20);
    }

    #[test]
    fn load_json_reads_image_object() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            br#"{"xdim": 1, "ydim": 1, "psize": 1e-10,
                "ivec": [1.0], "qvec": [0.5], "uvec": [0.0], "vvec": [0.0]}"#,
        )
        .unwrap();
        let direct = DirectImage::load_json(temp.path()).unwrap();
        assert_eq!(direct.qvec, vec![0.5]);
    }

    #[test]
    fn load_json_reports_missing_file_as_access_error() {
        let err = DirectImage::load_json("/nonexistent/pmodes/image.json").unwrap_err();
        assert!(matches!(err, PmodesError::Access { .. }));
    }
}

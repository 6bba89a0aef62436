//! Simulation snapshot containers.
//!
//! A snapshot stores the Stokes cube in computational units together with the
//! camera pixel spacing, the source distance and the unit conversions needed to
//! express the field of view as an angle on the sky.

use crate::image::canonical::CanonicalImage;
use crate::image::CanonicalSource;
use crate::prelude::{AdapterConfig, PmodesError, PmodesResult};
use ndarray::{Array2, Array3, Axis};
use std::path::Path;

/// Dataset paths inside the snapshot container.
pub const DX_FIELD: &str = "header/camera/dx";
pub const DSOURCE_FIELD: &str = "header/dsource";
pub const L_UNIT_FIELD: &str = "header/units/L_unit";
pub const SCALE_FIELD: &str = "header/scale";
pub const POL_FIELD: &str = "pol";

/// Raw contents of a snapshot container.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotFields {
    /// Pixel spacing in computational units.
    pub dx: f64,
    /// Source distance in computational units.
    pub dsource: f64,
    /// Length unit in physical units.
    pub l_unit: f64,
    /// Flux scale applied to every Stokes value.
    pub scale: f64,
    /// Stokes cube `(npix, npix, 4)` ordered I, Q, U, V.
    pub pol: Array3<f64>,
}

impl SnapshotFields {
    pub fn fov(&self, config: &AdapterConfig) -> f64 {
        self.dx / self.dsource * self.l_unit * config.snapshot_fov_to_physical
    }

    /// Builds the snapshot that [`CanonicalSource::to_canonical`] maps back onto
    /// `image`, undoing the axis flip and transpose.
    pub fn from_canonical(
        image: &CanonicalImage,
        dsource: f64,
        l_unit: f64,
        config: &AdapterConfig,
    ) -> Self {
        let npix = image.npix();
        let stokes = [
            image.stokes_i(),
            image.stokes_q(),
            image.stokes_u(),
            image.stokes_v(),
        ];
        let pol = Array3::from_shape_fn((npix, npix, 4), |(a, b, k)| {
            stokes[k][[npix - 1 - b, a]]
        });
        let dx = image.fov() / config.snapshot_fov_to_physical / l_unit * dsource;
        Self {
            dx,
            dsource,
            l_unit,
            scale: 1.0,
            pol,
        }
    }

    fn stokes_plane(oriented: &Array3<f64>, index: usize) -> Array2<f64> {
        oriented.index_axis(Axis(2), index).to_owned()
    }
}

impl CanonicalSource for SnapshotFields {
    fn to_canonical(&self, config: &AdapterConfig) -> PmodesResult<CanonicalImage> {
        let (rows, cols, planes) = self.pol.dim();
        if rows == 0 || rows != cols || planes != 4 {
            return Err(PmodesError::Format(format!(
                "`{}` must have shape (npix, npix, 4), got ({}, {}, {})",
                POL_FIELD, rows, cols, planes
            )));
        }

        // Swap the two spatial axes, then flip the new first axis.
        let mut oriented = self.pol.view().permuted_axes([1, 0, 2]);
        oriented.invert_axis(Axis(0));
        let oriented = oriented.mapv(|value| value * self.scale);

        CanonicalImage::new(
            Self::stokes_plane(&oriented, 0),
            Self::stokes_plane(&oriented, 1),
            Self::stokes_plane(&oriented, 2),
            Self::stokes_plane(&oriented, 3),
            self.fov(config),
        )
    }
}

/// Opens, reads and closes the snapshot container at `path`.
#[cfg(feature = "hdf5")]
pub fn load<P: AsRef<Path>>(path: P) -> PmodesResult<SnapshotFields> {
    let path_ref = path.as_ref();
    let access_error = |message: String| PmodesError::Access {
        path: path_ref.display().to_string(),
        message,
    };

    // Keep libhdf5 from printing its own error stack.
    hdf5::silence_errors(true);
    if !path_ref.exists() {
        return Err(access_error("no such file".into()));
    }
    let file = hdf5::File::open(path_ref).map_err(|err| access_error(err.to_string()))?;

    let read_scalar = |name: &str| -> PmodesResult<f64> {
        file.dataset(name)
            .and_then(|dataset| dataset.read_scalar::<f64>())
            .map_err(|err| PmodesError::Format(format!("field `{}`: {}", name, err)))
    };

    let fields = SnapshotFields {
        dx: read_scalar(DX_FIELD)?,
        dsource: read_scalar(DSOURCE_FIELD)?,
        l_unit: read_scalar(L_UNIT_FIELD)?,
        scale: read_scalar(SCALE_FIELD)?,
        pol: file
            .dataset(POL_FIELD)
            .and_then(|dataset| dataset.read::<f64, ndarray::Ix3>())
            .map_err(|err| PmodesError::Format(format!("field `{}`: {}", POL_FIELD, err)))?,
    };
    Ok(fields)
}

/// Snapshot containers are HDF5 files; without the `hdf5` feature they
/// cannot be opened.
#[cfg(not(feature = "hdf5"))]
pub fn load<P: AsRef<Path>>(path: P) -> PmodesResult<SnapshotFields> {
    Err(PmodesError::Access {
        path: path.as_ref().display().to_string(),
        message: "HDF5 support is not compiled in (enable the `hdf5` feature)".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::SNAPSHOT_RAD_TO_UAS;

    fn cube(npix: usize) -> Array3<f64> {
        Array3::from_shape_fn((npix, npix, 4), |(a, b, k)| {
            (100 * k + 10 * a + b) as f64
        })
    }

    fn fields(pol: Array3<f64>) -> SnapshotFields {
        SnapshotFields {
            dx: 40.0,
            dsource: 2.0,
            l_unit: 1.0e-9,
            scale: 2.0,
            pol,
        }
    }

    #[test]
    fn snapshot_fov_uses_configured_constant() {
        let snapshot = fields(cube(2));
        let expected = 40.0 / 2.0 * 1.0e-9 * SNAPSHOT_RAD_TO_UAS;
        assert!((snapshot.fov(&AdapterConfig::default()) - expected).abs() < 1e-6);

        let custom = AdapterConfig {
            snapshot_fov_to_physical: 1.0,
            ..Default::default()
        };
        assert!((snapshot.fov(&custom) - 2.0e-8).abs() < 1e-20);
    }

    #[test]
    fn snapshot_orientation_transposes_then_flips() {
        let npix = 3;
        let image = fields(cube(npix))
            .to_canonical(&AdapterConfig::default())
            .unwrap();
        // canonical[r, c] = pol[c, npix - 1 - r] * scale
        for r in 0..npix {
            for c in 0..npix {
                let raw = (10 * c + (npix - 1 - r)) as f64;
                assert_eq!(image.stokes_i()[[r, c]], 2.0 * raw);
                assert_eq!(image.stokes_q()[[r, c]], 2.0 * (100.0 + raw));
                assert_eq!(image.stokes_u()[[r, c]], 2.0 * (200.0 + raw));
                assert_eq!(image.stokes_v()[[r, c]], 2.0 * (300.0 + raw));
            }
        }
    }

    #[test]
    fn snapshot_from_canonical_inverts_orientation() {
        let config = AdapterConfig::default();
        let original = fields(cube(4)).to_canonical(&config).unwrap();
        let rebuilt = SnapshotFields::from_canonical(&original, 3.0, 5.0e-10, &config)
            .to_canonical(&config)
            .unwrap();
        assert_eq!(rebuilt.stokes_u(), original.stokes_u());
        assert!((rebuilt.fov() - original.fov()).abs() < 1e-9 * original.fov());
    }

    #[test]
    fn snapshot_rejects_wrong_stokes_count() {
        let snapshot = fields(Array3::zeros((2, 2, 3)));
        assert!(matches!(
            snapshot.to_canonical(&AdapterConfig::default()),
            Err(PmodesError::Format(_))
        ));
    }

    #[test]
    fn snapshot_rejects_non_square_cube() {
        let snapshot = fields(Array3::zeros((2, 3, 4)));
        let err = snapshot.to_canonical(&AdapterConfig::default()).unwrap_err();
        assert!(err.to_string().contains("(2, 3, 4)"));
    }

    #[test]
    fn load_fails_with_access_error_for_missing_file() {
        let err = load("/nonexistent/pmodes/snapshot.h5").unwrap_err();
        assert!(matches!(err, PmodesError::Access { .. }));
    }

    #[cfg(feature = "hdf5")]
    mod hdf5_container {
        use super::*;
        use ndarray::arr0;
        use tempfile::TempDir;

        fn write_snapshot(path: &Path, snapshot: &SnapshotFields, with_scale: bool) {
            let file = hdf5::File::create(path).unwrap();
            let header = file.create_group("header").unwrap();
            let camera = header.create_group("camera").unwrap();
            let units = header.create_group("units").unwrap();
            camera
                .new_dataset_builder()
                .with_data(&arr0(snapshot.dx))
                .create("dx")
                .unwrap();
            header
                .new_dataset_builder()
                .with_data(&arr0(snapshot.dsource))
                .create("dsource")
                .unwrap();
            units
                .new_dataset_builder()
                .with_data(&arr0(snapshot.l_unit))
                .create("L_unit")
                .unwrap();
            if with_scale {
                header
                    .new_dataset_builder()
                    .with_data(&arr0(snapshot.scale))
                    .create("scale")
                    .unwrap();
            }
            file.new_dataset_builder()
                .with_data(&snapshot.pol)
                .create(POL_FIELD)
                .unwrap();
        }

        #[test]
        fn load_reads_every_field() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("snapshot.h5");
            let expected = fields(cube(3));
            write_snapshot(&path, &expected, true);
            assert_eq!(load(&path).unwrap(), expected);
        }

        #[test]
        fn load_reports_missing_field_as_format_error() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("snapshot.h5");
            write_snapshot(&path, &fields(cube(2)), false);
            let err = load(&path).unwrap_err();
            assert!(matches!(err, PmodesError::Format(ref msg) if msg.contains(SCALE_FIELD)));
        }
    }
}

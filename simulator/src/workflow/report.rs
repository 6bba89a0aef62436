use anyhow::Context;
use pmodescore::prelude::Annulus;
use pmodescore::processing::BetaCoefficient;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// One serialized coefficient. Non-finite parts serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeRecord {
    pub m: i32,
    pub re: f64,
    pub im: f64,
    pub amplitude: f64,
    pub phase_deg: f64,
}

impl From<&BetaCoefficient> for ModeRecord {
    fn from(beta: &BetaCoefficient) -> Self {
        Self {
            m: beta.mode,
            re: beta.value.re,
            im: beta.value.im,
            amplitude: beta.amplitude(),
            phase_deg: beta.phase_deg(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetaReport {
    pub source: String,
    pub npix: usize,
    pub fov: f64,
    pub annulus: Annulus,
    pub norm_in_int: bool,
    pub norm_with_stokes_i: bool,
    pub coefficients: Vec<ModeRecord>,
}

impl BetaReport {
    pub fn write_to<W: Write>(&self, writer: W) -> anyhow::Result<()> {
        serde_json::to_writer_pretty(writer, self).context("serializing beta report")
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path_ref = path.as_ref();
        if let Some(parent) = path_ref.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating report directory {}", parent.display()))?;
        }
        let file = File::create(path_ref)
            .with_context(|| format!("creating report {}", path_ref.display()))?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer
            .flush()
            .with_context(|| format!("writing report {}", path_ref.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;
    use tempfile::TempDir;

    fn report(value: Complex64) -> BetaReport {
        BetaReport {
            source: "unit".into(),
            npix: 4,
            fov: 100.0,
            annulus: Annulus::default(),
            norm_in_int: false,
            norm_with_stokes_i: true,
            coefficients: vec![ModeRecord::from(&BetaCoefficient { mode: 2, value })],
        }
    }

    #[test]
    fn mode_record_carries_amplitude_and_phase() {
        let record = &report(Complex64::new(0.0, 0.25)).coefficients[0];
        assert_eq!(record.m, 2);
        assert_eq!(record.amplitude, 0.25);
        assert!((record.phase_deg - 90.0).abs() < 1e-12);
    }

    #[test]
    fn nan_coefficients_serialize_as_null() {
        let mut buffer = Vec::new();
        report(Complex64::new(f64::NAN, f64::NAN))
            .write_to(&mut buffer)
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert!(json["coefficients"][0]["re"].is_null());
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/betas.json");
        report(Complex64::new(1.0, 0.0)).save(&path).unwrap();
        let saved: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved["npix"], 4);
    }
}

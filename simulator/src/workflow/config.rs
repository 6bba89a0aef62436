use crate::generator::profile::GeneratorConfig;
use anyhow::Context;
use pmodescore::prelude::BetaRequest;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Where the image comes from.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum SourceConfig {
    /// JSON-serialized image object.
    Image { path: PathBuf },
    /// HDF5 snapshot container.
    Snapshot { path: PathBuf },
    /// Ring built by the synthetic generator.
    Synthetic(GeneratorConfig),
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::Synthetic(GeneratorConfig::default())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WorkflowConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub request: BetaRequest,
    /// Report destination; stdout when absent.
    #[serde(default)]
    pub output: Option<PathBuf>,
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(source: SourceConfig, request: BetaRequest, output: Option<PathBuf>) -> Self {
        Self {
            source,
            request,
            output,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::template::PolarizationPattern;
    use pmodescore::prelude::{DegeneracyPolicy, PixelCentering};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_keeps_request() {
        let cfg = WorkflowConfig::from_args(
            SourceConfig::Image {
                path: PathBuf::from("ring.json"),
            },
            BetaRequest::new(vec![2]),
            None,
        );
        assert_eq!(cfg.request.mode_request.modes, vec![2]);
        assert!(cfg.output.is_none());
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"source:\n  kind: snapshot\n  path: /data/dump.h5\n\
request:\n  modes: [-2, 0, 2]\n  norm_in_int: true\n  annulus:\n    r_min: 15\n    r_max: 30\n  \
pipeline:\n    degeneracy: error\n    centering: symmetric\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert!(matches!(
            cfg.source,
            SourceConfig::Snapshot { ref path } if path == Path::new("/data/dump.h5")
        ));
        assert_eq!(cfg.request.mode_request.modes, vec![-2, 0, 2]);
        assert!(cfg.request.mode_request.norm_in_int);
        assert!(cfg.request.mode_request.norm_with_stokes_i);
        assert_eq!(cfg.request.annulus.r_max, 30.0);
        assert_eq!(cfg.request.pipeline.degeneracy, DegeneracyPolicy::Error);
        assert_eq!(cfg.request.pipeline.centering, PixelCentering::Symmetric);
    }

    #[test]
    fn config_load_reads_synthetic_source() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"source:\n  kind: synthetic\n  npix: 48\n  pattern:\n    kind: tangential\n\
request:\n  modes: [2]\n",
        )
        .unwrap();
        let cfg = WorkflowConfig::load(temp.path()).unwrap();
        match cfg.source {
            SourceConfig::Synthetic(generator) => {
                assert_eq!(generator.npix, 48);
                assert_eq!(generator.pattern, PolarizationPattern::Tangential);
                assert_eq!(generator.fov, GeneratorConfig::default().fov);
            }
            other => panic!("unexpected source {:?}", other),
        }
    }

    #[test]
    fn bundled_ring_workflow_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("workflows/ring.yaml");
        let cfg = WorkflowConfig::load(path).unwrap();
        assert!(matches!(
            cfg.source,
            SourceConfig::Synthetic(GeneratorConfig {
                pattern: PolarizationPattern::Spiral { .. },
                ..
            })
        ));
        assert_eq!(cfg.request.mode_request.modes.len(), 6);
        assert!(cfg.output.is_some());
    }

    #[test]
    fn config_load_reports_missing_file() {
        let err = WorkflowConfig::load("/nonexistent/pmodes/workflow.yaml").unwrap_err();
        assert!(err.to_string().contains("reading workflow config"));
    }
}

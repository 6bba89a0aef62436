use anyhow::Context;
use clap::{ArgAction, Parser, ValueEnum};
use generator::profile::GeneratorConfig;
use pmodescore::prelude::{BetaRequest, DegeneracyPolicy, PipelineConfig, PixelCentering};
use std::io;
use std::path::PathBuf;
use workflow::config::{SourceConfig, WorkflowConfig};
use workflow::runner::Runner;

mod generator;
mod workflow;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyArg {
    Propagate,
    Error,
}

impl From<PolicyArg> for DegeneracyPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Propagate => DegeneracyPolicy::Propagate,
            PolicyArg::Error => DegeneracyPolicy::Error,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CenteringArg {
    Reference,
    Symmetric,
}

impl From<CenteringArg> for PixelCentering {
    fn from(arg: CenteringArg) -> Self {
        match arg {
            CenteringArg::Reference => PixelCentering::Reference,
            CenteringArg::Symmetric => PixelCentering::Symmetric,
        }
    }
}

#[derive(Parser)]
#[command(author, version, about = "Beta-mode decomposition of polarimetric images")]
struct Args {
    /// Load a workflow config from YAML; the remaining options are ignored
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// JSON image object to decompose
    #[arg(long, conflicts_with_all = ["snapshot", "synthetic"])]
    image: Option<PathBuf>,
    /// HDF5 snapshot container to decompose
    #[arg(long, conflicts_with = "synthetic")]
    snapshot: Option<PathBuf>,
    /// Decompose a generated ring instead of a file
    #[arg(long, default_value_t = false)]
    synthetic: bool,
    /// Comma-separated mode numbers, e.g. `-2,0,2`
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, default_value = "2")]
    modes: Vec<i32>,
    #[arg(long, default_value_t = 0.0)]
    r_min: f64,
    #[arg(long, default_value_t = 1000.0)]
    r_max: f64,
    /// Normalize per pixel inside the annulus sum
    #[arg(long, default_value_t = false)]
    norm_in_int: bool,
    /// Normalize by Stokes I (true) or by polarized flux (false)
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    norm_with_stokes_i: bool,
    #[arg(long, value_enum, default_value_t = PolicyArg::Propagate)]
    policy: PolicyArg,
    #[arg(long, value_enum, default_value_t = CenteringArg::Reference)]
    centering: CenteringArg,
    /// Write the JSON report here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Args {
    fn source(&self) -> SourceConfig {
        if let Some(path) = &self.image {
            SourceConfig::Image { path: path.clone() }
        } else if let Some(path) = &self.snapshot {
            SourceConfig::Snapshot { path: path.clone() }
        } else {
            SourceConfig::Synthetic(GeneratorConfig::default())
        }
    }

    fn request(&self) -> BetaRequest {
        let pipeline = PipelineConfig {
            centering: self.centering.into(),
            degeneracy: self.policy.into(),
            ..Default::default()
        };
        BetaRequest::new(self.modes.clone())
            .with_annulus(self.r_min, self.r_max)
            .with_normalization(self.norm_in_int, self.norm_with_stokes_i)
            .with_pipeline(pipeline)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = if let Some(path) = &args.workflow {
        WorkflowConfig::load(path)?
    } else {
        if !args.synthetic && args.image.is_none() && args.snapshot.is_none() {
            log::warn!("no input given; decomposing the default synthetic ring");
        }
        WorkflowConfig::from_args(args.source(), args.request(), args.output.clone())
    };

    let runner = Runner::new(workflow_config);
    let result = runner.execute()?;
    let report = runner.report(&result);

    match &runner.config().output {
        Some(path) => {
            report.save(path)?;
            log::info!("report written to {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            report
                .write_to(stdout.lock())
                .context("writing report to stdout")?;
            println!();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_parse_negative_mode_list() {
        let args = Args::parse_from([
            "pmodes",
            "--synthetic",
            "--modes",
            "-2,0,2,2",
            "--norm-with-stokes-i",
            "false",
            "--policy",
            "error",
        ]);
        let request = args.request();
        assert_eq!(request.mode_request.modes, vec![-2, 0, 2, 2]);
        assert!(!request.mode_request.norm_with_stokes_i);
        assert_eq!(request.pipeline.degeneracy, DegeneracyPolicy::Error);
        assert!(matches!(args.source(), SourceConfig::Synthetic(_)));
    }

    #[test]
    fn args_default_to_reference_call() {
        let args = Args::parse_from(["pmodes", "--image", "ring.json"]);
        let request = args.request();
        assert_eq!(request, BetaRequest::new(vec![2]));
        assert!(matches!(args.source(), SourceConfig::Image { .. }));
    }

    #[test]
    fn args_reject_two_inputs() {
        let parsed = Args::try_parse_from(["pmodes", "--image", "a.json", "--snapshot", "b.h5"]);
        assert!(parsed.is_err());
    }
}

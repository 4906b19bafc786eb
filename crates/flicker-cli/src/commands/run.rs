use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use flicker_core::pipeline::config::{AnalysisConfig, ReportConfig};
use flicker_core::pipeline::run_batch_reported;
use flicker_core::repository::{DatasetFilter, LocalRepository, PlaneSelection};

use crate::progress::BarProgressReporter;
use crate::summary::{print_batch_results, print_run_summary};

#[derive(Args)]
pub struct RunArgs {
    /// Repository root directory (required unless --config is given)
    pub root: Option<PathBuf>,

    /// Run config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory for tables, JSON and plots
    #[arg(short, long, default_value = "results")]
    pub output: PathBuf,

    /// Frames per unit time for images without their own rate
    #[arg(long)]
    pub sample_frequency: Option<f64>,

    /// Only analyze datasets owned by this user id
    #[arg(long)]
    pub owner: Option<i64>,

    /// Dataset name to leave out (repeatable)
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Channel to read from colour stacks
    #[arg(long, default_value = "0")]
    pub channel: usize,

    /// Use at most this many time points per image
    #[arg(long)]
    pub max_frames: Option<usize>,

    /// Skip the TSV tables
    #[arg(long)]
    pub no_tables: bool,

    /// Skip summary.json
    #[arg(long)]
    pub no_json: bool,

    /// Skip PNG plots
    #[arg(long)]
    pub no_plots: bool,
}

pub fn run(args: &RunArgs) -> Result<()> {
    let config = if let Some(ref config_path) = args.config {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        toml::from_str(&contents).context("Invalid run config")?
    } else {
        build_config_from_args(args)?
    };

    print_run_summary(&config);

    let reporter = Arc::new(BarProgressReporter::new()?);
    let mut repo = LocalRepository::new(&config.repository);
    let output = run_batch_reported(&mut repo, &config, reporter.clone())
        .context("Batch run failed; no reports were written")?;
    reporter.finish();

    print_batch_results(&output.batch);
    println!("Wrote {} file(s) to {}", output.files.len(), config.output.display());

    Ok(())
}

fn build_config_from_args(args: &RunArgs) -> Result<AnalysisConfig> {
    let Some(ref root) = args.root else {
        bail!("Either a repository root or --config is required");
    };
    let defaults = AnalysisConfig::default();

    Ok(AnalysisConfig {
        repository: root.clone(),
        output: args.output.clone(),
        sample_frequency: args.sample_frequency.unwrap_or(defaults.sample_frequency),
        filter: DatasetFilter {
            owner: args.owner,
            exclude: args.exclude.clone(),
        },
        planes: PlaneSelection {
            channel: args.channel,
            max_frames: args.max_frames,
        },
        reports: ReportConfig {
            tables: !args.no_tables,
            json: !args.no_json,
            plots: !args.no_plots,
        },
    })
}

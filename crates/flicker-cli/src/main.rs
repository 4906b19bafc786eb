mod commands;
mod progress;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flicker", about = "Intensity fluctuation analysis for image stacks")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show SER stack metadata
    Info(commands::info::InfoArgs),
    /// List the datasets of a repository
    Datasets(commands::datasets::DatasetsArgs),
    /// Analyze a single stack
    Analyze(commands::analyze::AnalyzeArgs),
    /// Analyze every dataset of a repository and write reports
    Run(commands::run::RunArgs),
    /// Print or save the default run config
    Config(commands::config::ConfigArgs),
    /// Generate a synthetic repository for trying things out
    Synth(commands::synth::SynthArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Datasets(args) => commands::datasets::run(args),
        Commands::Analyze(args) => commands::analyze::run(args),
        Commands::Run(args) => commands::run::run(args),
        Commands::Config(args) => commands::config::run(args),
        Commands::Synth(args) => commands::synth::run(args),
    }
}

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use flicker_core::synthetic::SyntheticRepository;

#[derive(Args)]
pub struct SynthArgs {
    /// Directory to create the repository in
    pub root: PathBuf,

    /// Number of datasets
    #[arg(long, default_value = "3")]
    pub datasets: usize,

    /// Images per dataset
    #[arg(long, default_value = "4")]
    pub images: usize,

    /// Time points per image
    #[arg(long, default_value = "30")]
    pub frames: usize,

    /// Frame width and height in pixels
    #[arg(long, default_value = "32")]
    pub size: usize,

    /// Frames per unit time recorded in each dataset manifest
    #[arg(long, default_value = "5.6")]
    pub sample_frequency: f64,
}

/// Write datasets of oscillating 16-bit SER stacks. Dataset `d` oscillates at
/// bin `d + 1` with amplitude growing per image, so the reports have structure.
pub fn run(args: &SynthArgs) -> Result<()> {
    let layout = SyntheticRepository {
        datasets: args.datasets,
        images: args.images,
        time_points: args.frames,
        size: args.size,
        sample_frequency: args.sample_frequency,
    };
    let dirs = layout
        .write(&args.root)
        .with_context(|| format!("Failed to write repository at {}", args.root.display()))?;
    for dir in &dirs {
        println!("Wrote {} image(s) to {}", args.images, dir.display());
    }

    Ok(())
}

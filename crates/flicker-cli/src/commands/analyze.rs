use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use flicker_core::analysis::aggregate::summarize_stack;
use flicker_core::consts::DEFAULT_SAMPLE_FREQUENCY;
use flicker_core::io::image_io::load_frame_sequence;
use flicker_core::io::ser::SerReader;

#[derive(Args)]
pub struct AnalyzeArgs {
    /// SER file or directory of frame images
    pub input: PathBuf,

    /// Frames per unit time
    #[arg(long, default_value_t = DEFAULT_SAMPLE_FREQUENCY)]
    pub sample_frequency: f64,

    /// Channel to read from colour stacks
    #[arg(long, default_value = "0")]
    pub channel: usize,

    /// Use at most this many time points
    #[arg(long)]
    pub max_frames: Option<usize>,
}

pub fn run(args: &AnalyzeArgs) -> Result<()> {
    let stack = if args.input.is_dir() {
        load_frame_sequence(&args.input, args.channel, args.max_frames)
    } else {
        SerReader::open(&args.input)
            .and_then(|reader| reader.read_stack(args.channel, args.max_frames))
    }
    .with_context(|| format!("Failed to load {}", args.input.display()))?;

    let summary = summarize_stack(0, &stack, args.sample_frequency)?;

    println!("Input:                {}", args.input.display());
    println!("Time points:          {}", summary.time_points);
    println!("Spatial shape:        {:?}", stack.spatial_shape());
    println!("Sample frequency:     {}", summary.sample_frequency);
    println!("Mean intensity:       {:.4}", summary.mean_velocity);
    println!("Fluctuation strength: {:.4}", summary.turbulence_strength);
    println!();
    println!("{:>5}  {:>12}  {:>12}", "Bin", "Frequency", "Amplitude");
    println!("{}", "-".repeat(33));
    for (k, (f, a)) in summary
        .frequency_profile
        .iter()
        .zip(summary.amplitude_profile.iter())
        .enumerate()
    {
        println!("{:>5}  {:>12.4}  {:>12.6}", k, f, a);
    }

    Ok(())
}

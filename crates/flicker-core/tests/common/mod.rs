use std::path::Path;

use ndarray::{Array3, ArrayD, IxDyn};

use flicker_core::io::ser_writer::write_stack;
use flicker_core::stack::IntensityStack;
use flicker_core::synthetic::Oscillation;

/// A `[T, H, W]` stack holding `value` everywhere.
pub fn constant_stack(time_points: usize, height: usize, width: usize, value: f64) -> IntensityStack {
    IntensityStack::new(ArrayD::from_elem(IxDyn(&[time_points, height, width]), value))
}

/// A `[T, H, W]` stack filled with a deterministic pseudo-random pattern.
pub fn patterned_stack(time_points: usize, height: usize, width: usize) -> IntensityStack {
    let data = Array3::from_shape_fn((time_points, height, width), |(t, r, c)| {
        let seed = (t * 7919 + r * 104_729 + c * 1_299_709) % 1000;
        50.0 + seed as f64 / 10.0
    });
    IntensityStack::new(data.into_dyn())
}

/// Cosine at frequency bin `bin` of a `time_points`-long series.
pub fn cosine_stack(
    time_points: usize,
    size: usize,
    sample_frequency: f64,
    bin: usize,
    amplitude: f64,
) -> IntensityStack {
    Oscillation {
        width: size,
        height: size,
        time_points,
        sample_frequency,
        baseline: 100.0,
        amplitude,
        frequency: sample_frequency * bin as f64 / time_points as f64,
        phase_step: 0.3,
    }
    .stack()
}

/// Write `stack` as an 8-bit SER file at `path`, creating parent directories.
pub fn write_ser(path: &Path, stack: &IntensityStack) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create dataset dir");
    }
    write_stack(path, stack, 8).expect("write SER stack");
}

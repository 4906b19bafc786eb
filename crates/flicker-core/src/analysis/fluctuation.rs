use ndarray::{Array1, ArrayD, ArrayView1, ArrayViewMut1, Axis, IxDyn, Zip};
use num_complex::Complex;
use rustfft::FftPlanner;
use tracing::debug;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::error::{FlickerError, Result};
use crate::stack::IntensityStack;

/// Per-pixel fluctuation statistics for one stack.
#[derive(Clone, Debug)]
pub struct FluctuationStats {
    /// Temporal mean at each pixel, shaped like one time point.
    pub mean_intensity: ArrayD<f64>,
    /// Population standard deviation of the fluctuation at each pixel.
    pub fluctuation_strength: ArrayD<f64>,
    /// One-sided amplitude spectrum, shape `[T/2, spatial...]`.
    pub amplitude: ArrayD<f64>,
    /// Frequency of each spectrum bin, length `T/2`.
    pub frequency_axis: Array1<f64>,
}

impl FluctuationStats {
    pub fn bins(&self) -> usize {
        self.frequency_axis.len()
    }
}

/// Split a stack into its temporal mean and the fluctuation around it,
/// so that `mean + fluctuation` reproduces the stack.
pub fn decompose(stack: &IntensityStack) -> Result<(ArrayD<f64>, ArrayD<f64>)> {
    validate_stack(stack)?;
    let mean = stack
        .data
        .mean_axis(Axis(0))
        .ok_or_else(|| FlickerError::InvalidInput("stack has no time points".into()))?;
    let fluctuation = &stack.data - &mean.view().insert_axis(Axis(0));
    Ok((mean, fluctuation))
}

/// Compute mean intensity, fluctuation strength and the one-sided amplitude
/// spectrum of a stack sampled at `sample_frequency`.
pub fn analyze(stack: &IntensityStack, sample_frequency: f64) -> Result<FluctuationStats> {
    if !sample_frequency.is_finite() || sample_frequency <= 0.0 {
        return Err(FlickerError::InvalidInput(format!(
            "sample frequency must be positive, got {sample_frequency}"
        )));
    }

    let (mean_intensity, fluctuation) = decompose(stack)?;
    let fluctuation_strength = fluctuation.std_axis(Axis(0), 0.0);
    let amplitude = one_sided_spectrum(&fluctuation);
    let frequency_axis = frequency_axis(stack.time_points(), sample_frequency);

    debug!(
        time_points = stack.time_points(),
        pixels = stack.pixel_count(),
        bins = frequency_axis.len(),
        "Analyzed stack"
    );

    Ok(FluctuationStats {
        mean_intensity,
        fluctuation_strength,
        amplitude,
        frequency_axis,
    })
}

/// `f[k] = sample_frequency * k / T` for `k` in `0..T/2`.
pub fn frequency_axis(time_points: usize, sample_frequency: f64) -> Array1<f64> {
    let t = time_points as f64;
    Array1::from_shape_fn(time_points / 2, |k| sample_frequency * k as f64 / t)
}

fn validate_stack(stack: &IntensityStack) -> Result<()> {
    if stack.data.ndim() < 2 {
        return Err(FlickerError::InvalidInput(format!(
            "stack needs a time axis and at least one spatial axis, got {} axes",
            stack.data.ndim()
        )));
    }
    let t = stack.time_points();
    if t < 2 {
        return Err(FlickerError::InvalidInput(format!(
            "stack needs at least 2 time points, got {t}"
        )));
    }
    if stack.pixel_count() == 0 {
        return Err(FlickerError::InvalidInput("stack has no pixels".into()));
    }
    Ok(())
}

/// FFT every pixel's time series, keep the non-negative half scaled by `1/T`,
/// and double the interior bins. Bin 0 and the last kept bin stay unscaled.
fn one_sided_spectrum(fluctuation: &ArrayD<f64>) -> ArrayD<f64> {
    let t = fluctuation.len_of(Axis(0));
    let half = t / 2;
    let pixels = fluctuation.len() / t;

    let mut shape = fluctuation.shape().to_vec();
    shape[0] = half;
    let mut amplitude = ArrayD::<f64>::zeros(IxDyn(&shape));

    let fft = FftPlanner::<f64>::new().plan_fft_forward(t);
    let scale = 1.0 / t as f64;

    let lane_spectrum = |series: ArrayView1<f64>, mut out: ArrayViewMut1<f64>| {
        let mut buffer: Vec<Complex<f64>> =
            series.iter().map(|&v| Complex::new(v, 0.0)).collect();
        fft.process(&mut buffer);
        for (k, bin) in out.iter_mut().enumerate() {
            let magnitude = buffer[k].norm() * scale;
            *bin = if k == 0 || k + 1 == half {
                magnitude
            } else {
                2.0 * magnitude
            };
        }
    };

    let zip = Zip::from(fluctuation.lanes(Axis(0))).and(amplitude.lanes_mut(Axis(0)));
    if pixels >= PARALLEL_PIXEL_THRESHOLD {
        zip.par_for_each(lane_spectrum);
    } else {
        zip.for_each(lane_spectrum);
    }

    amplitude
}

use std::path::PathBuf;

use ndarray::{Array2, ArrayD, ArrayView2, Axis, IxDyn};

use crate::error::{FlickerError, Result};

/// A time-ordered intensity stack.
/// Axis 0 is time; the remaining axes are spatial (and optionally a channel).
/// Pixel values are raw intensities, not normalised.
#[derive(Clone, Debug)]
pub struct IntensityStack {
    pub data: ArrayD<f64>,
}

impl IntensityStack {
    pub fn new(data: ArrayD<f64>) -> Self {
        Self { data }
    }

    /// Build a `[T, H, W]` stack from equally sized 2-D planes.
    pub fn from_planes(planes: &[Array2<f64>]) -> Result<Self> {
        if planes.is_empty() {
            return Err(FlickerError::InvalidInput(
                "cannot build a stack from zero planes".into(),
            ));
        }
        let views: Vec<ArrayView2<f64>> = planes.iter().map(|p| p.view()).collect();
        let data = ndarray::stack(Axis(0), &views).map_err(|e| {
            FlickerError::InvalidInput(format!("planes differ in shape: {e}"))
        })?;
        Ok(Self::new(data.into_dyn()))
    }

    /// Build a stack from a flat buffer laid out in row-major `shape` order.
    pub fn from_shape_vec(shape: &[usize], values: Vec<f64>) -> Result<Self> {
        let data = ArrayD::from_shape_vec(IxDyn(shape), values)
            .map_err(|e| FlickerError::InvalidInput(format!("bad stack shape: {e}")))?;
        Ok(Self::new(data))
    }

    /// Number of time points (length of axis 0).
    pub fn time_points(&self) -> usize {
        if self.data.ndim() == 0 {
            0
        } else {
            self.data.len_of(Axis(0))
        }
    }

    /// Shape of one time point.
    pub fn spatial_shape(&self) -> &[usize] {
        self.data.shape().get(1..).unwrap_or(&[])
    }

    pub fn pixel_count(&self) -> usize {
        self.spatial_shape().iter().product()
    }
}

/// One image handed to the dataset aggregator.
#[derive(Clone, Debug)]
pub struct ImageInput {
    /// Identifier in the source repository.
    pub image_id: i64,
    pub stack: IntensityStack,
    /// Per-image sample frequency; falls back to the batch default.
    pub sample_frequency: Option<f64>,
}

impl ImageInput {
    pub fn new(image_id: i64, stack: IntensityStack) -> Self {
        Self {
            image_id,
            stack,
            sample_frequency: None,
        }
    }

    pub fn with_sample_frequency(mut self, sample_frequency: f64) -> Self {
        self.sample_frequency = Some(sample_frequency);
        self
    }
}

/// Metadata about a stack file on disk.
#[derive(Clone, Debug)]
pub struct StackInfo {
    pub filename: PathBuf,
    pub time_points: usize,
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub channels: usize,
    pub observer: Option<String>,
    pub telescope: Option<String>,
    pub instrument: Option<String>,
}

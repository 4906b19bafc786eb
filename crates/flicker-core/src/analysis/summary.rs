use std::collections::BTreeMap;

use ndarray::{Array1, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{FlickerError, Result};

use super::aggregate::{check_uniform_time_points, DatasetAggregate};

/// Collection-level statistics of one dataset.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub name: String,
    pub dataset_id: i64,
    /// Per-image results the statistics below were computed from.
    pub images: DatasetAggregate,
    pub mean_amplitude_profile: Array1<f64>,
    /// Population standard deviation across images, per bin.
    pub std_amplitude_profile: Array1<f64>,
    pub mean_frequency_profile: Array1<f64>,
    pub mean_velocity_scalar: f64,
    pub mean_turbulence_scalar: f64,
}

/// Summaries of every dataset in a run, keyed by dataset name.
pub type BatchSummary = BTreeMap<String, DatasetSummary>;

/// Average per-image results across the image axis.
pub fn summarize(name: &str, dataset_id: i64, images: DatasetAggregate) -> Result<DatasetSummary> {
    if images.is_empty() {
        return Err(FlickerError::EmptyDataset(name.to_string()));
    }

    // Aggregates can be merged or built by hand; check shapes again.
    check_uniform_time_points(&images.images)?;
    let empty = || FlickerError::EmptyDataset(name.to_string());
    let amplitudes = images.amplitude_profiles()?;
    let frequencies = images.frequency_profiles()?;

    let mean_amplitude_profile = amplitudes.mean_axis(Axis(0)).ok_or_else(empty)?;
    let std_amplitude_profile = amplitudes.std_axis(Axis(0), 0.0);
    let mean_frequency_profile = frequencies.mean_axis(Axis(0)).ok_or_else(empty)?;
    let mean_velocity_scalar = images.mean_velocities().mean().ok_or_else(empty)?;
    let mean_turbulence_scalar = images.turbulence_strengths().mean().ok_or_else(empty)?;

    Ok(DatasetSummary {
        name: name.to_string(),
        dataset_id,
        images,
        mean_amplitude_profile,
        std_amplitude_profile,
        mean_frequency_profile,
        mean_velocity_scalar,
        mean_turbulence_scalar,
    })
}

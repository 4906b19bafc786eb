use ndarray::{Array1, Array2, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::consts::PARALLEL_IMAGE_THRESHOLD;
use crate::error::{FlickerError, Result};
use crate::repository::{DatasetInfo, ImageRepository, PlaneSelection};
use crate::stack::{ImageInput, IntensityStack};

use super::fluctuation::{analyze, FluctuationStats};

/// Spatially averaged statistics of one image.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImageSummary {
    pub image_id: i64,
    pub sample_frequency: f64,
    pub time_points: usize,
    /// Spatial mean of the per-pixel mean intensity.
    pub mean_velocity: f64,
    /// Spatial mean of the per-pixel fluctuation strength.
    pub turbulence_strength: f64,
    /// Spatial mean of the amplitude spectrum, one value per frequency bin.
    pub amplitude_profile: Array1<f64>,
    pub frequency_profile: Array1<f64>,
}

impl ImageSummary {
    /// Reduce per-pixel statistics over every spatial axis.
    pub fn from_stats(
        image_id: i64,
        sample_frequency: f64,
        time_points: usize,
        stats: &FluctuationStats,
    ) -> Self {
        let pixels = stats.mean_intensity.len().max(1) as f64;
        let amplitude_profile: Array1<f64> = stats
            .amplitude
            .axis_iter(Axis(0))
            .map(|bin| bin.sum() / pixels)
            .collect();

        Self {
            image_id,
            sample_frequency,
            time_points,
            mean_velocity: stats.mean_intensity.sum() / pixels,
            turbulence_strength: stats.fluctuation_strength.sum() / pixels,
            amplitude_profile,
            frequency_profile: stats.frequency_axis.clone(),
        }
    }
}

/// Analyze one stack and reduce it to an [`ImageSummary`].
pub fn summarize_stack(
    image_id: i64,
    stack: &IntensityStack,
    sample_frequency: f64,
) -> Result<ImageSummary> {
    let stats = analyze(stack, sample_frequency)?;
    Ok(ImageSummary::from_stats(
        image_id,
        sample_frequency,
        stack.time_points(),
        &stats,
    ))
}

/// Per-image results for one dataset, in enumeration order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DatasetAggregate {
    pub images: Vec<ImageSummary>,
}

impl DatasetAggregate {
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Frequency bins per image (all images agree once aggregated).
    pub fn bins(&self) -> usize {
        self.images
            .first()
            .map_or(0, |img| img.amplitude_profile.len())
    }

    pub fn image_ids(&self) -> Vec<i64> {
        self.images.iter().map(|img| img.image_id).collect()
    }

    pub fn mean_velocities(&self) -> Array1<f64> {
        self.images.iter().map(|img| img.mean_velocity).collect()
    }

    pub fn turbulence_strengths(&self) -> Array1<f64> {
        self.images.iter().map(|img| img.turbulence_strength).collect()
    }

    /// Amplitude profiles stacked as `[images, bins]`.
    pub fn amplitude_profiles(&self) -> Result<Array2<f64>> {
        self.profile_matrix(|img| &img.amplitude_profile)
    }

    /// Frequency profiles stacked as `[images, bins]`.
    pub fn frequency_profiles(&self) -> Result<Array2<f64>> {
        self.profile_matrix(|img| &img.frequency_profile)
    }

    /// Every profile must have as many bins as the first image's amplitude
    /// profile; the first offender is reported.
    fn profile_matrix(&self, pick: impl Fn(&ImageSummary) -> &Array1<f64>) -> Result<Array2<f64>> {
        let bins = self.bins();
        let mut out = Array2::<f64>::zeros((self.images.len(), bins));
        for (mut row, img) in out.outer_iter_mut().zip(&self.images) {
            let profile = pick(img);
            if profile.len() != bins {
                return Err(FlickerError::ShapeMismatch {
                    expected: bins,
                    found: profile.len(),
                    image_id: img.image_id,
                });
            }
            row.assign(profile);
        }
        Ok(out)
    }
}

/// Analyze every image of a dataset, in the order given.
///
/// Images without their own sample frequency use `default_sample_frequency`.
pub fn aggregate(
    dataset: &str,
    images: &[ImageInput],
    default_sample_frequency: f64,
) -> Result<DatasetAggregate> {
    collect_summaries(dataset, images.len(), |i| {
        let input = &images[i];
        let fs = input.sample_frequency.unwrap_or(default_sample_frequency);
        summarize_stack(input.image_id, &input.stack, fs)
    })
}

/// Enumerate a dataset through the repository, load each stack and analyze it.
pub fn aggregate_from_repository<R>(
    repo: &R,
    dataset: &DatasetInfo,
    planes: &PlaneSelection,
    default_sample_frequency: f64,
) -> Result<DatasetAggregate>
where
    R: ImageRepository + Sync + ?Sized,
{
    let handles = repo.list_images(dataset.id)?;
    info!(
        dataset = %dataset.name,
        images = handles.len(),
        "Aggregating dataset"
    );

    collect_summaries(&dataset.name, handles.len(), |i| {
        let handle = &handles[i];
        let image_id = repo.image_id(handle);
        let stack = repo.load_stack(handle, planes)?;
        let fs = handle.sample_frequency.unwrap_or(default_sample_frequency);
        debug!(image_id, time_points = stack.time_points(), "Loaded stack");
        summarize_stack(image_id, &stack, fs)
    })
}

fn collect_summaries<F>(dataset: &str, count: usize, summarize: F) -> Result<DatasetAggregate>
where
    F: Fn(usize) -> Result<ImageSummary> + Sync + Send,
{
    if count == 0 {
        return Err(FlickerError::EmptyDataset(dataset.to_string()));
    }

    // Every image runs to completion so that the reported failure is the
    // lowest-index one, whatever order the pool finished in.
    let results: Vec<Result<ImageSummary>> = if count >= PARALLEL_IMAGE_THRESHOLD {
        (0..count).into_par_iter().map(&summarize).collect()
    } else {
        (0..count).map(&summarize).collect()
    };
    let images = results.into_iter().collect::<Result<Vec<_>>>()?;

    check_uniform_time_points(&images)?;
    Ok(DatasetAggregate { images })
}

pub(crate) fn check_uniform_time_points(images: &[ImageSummary]) -> Result<()> {
    let Some(first) = images.first() else {
        return Ok(());
    };
    for img in &images[1..] {
        if img.time_points != first.time_points {
            return Err(FlickerError::ShapeMismatch {
                expected: first.time_points,
                found: img.time_points,
                image_id: img.image_id,
            });
        }
    }
    Ok(())
}

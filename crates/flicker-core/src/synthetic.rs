use std::f64::consts::TAU;
use std::path::{Path, PathBuf};

use ndarray::Array3;
use tracing::info;

use crate::consts::{DATASET_MANIFEST, SYNTHETIC_PIXEL_DEPTH};
use crate::error::{FlickerError, Result};
use crate::io::ser_writer::write_stack;
use crate::repository::local::DatasetManifest;
use crate::stack::IntensityStack;

/// A stack whose every pixel oscillates around a baseline.
#[derive(Clone, Debug)]
pub struct Oscillation {
    pub width: usize,
    pub height: usize,
    pub time_points: usize,
    pub sample_frequency: f64,
    pub baseline: f64,
    pub amplitude: f64,
    /// Oscillation frequency, in the units of `sample_frequency`.
    pub frequency: f64,
    /// Phase advance per column, so neighbouring pixels are not identical.
    pub phase_step: f64,
}

impl Default for Oscillation {
    fn default() -> Self {
        Self {
            width: 16,
            height: 16,
            time_points: 30,
            sample_frequency: 5.6,
            baseline: 100.0,
            amplitude: 20.0,
            frequency: 5.6 * 3.0 / 30.0,
            phase_step: 0.0,
        }
    }
}

impl Oscillation {
    /// `baseline + amplitude * cos(2*pi*f*t/fs + phase)` at every pixel.
    pub fn stack(&self) -> IntensityStack {
        let data = Array3::from_shape_fn(
            (self.time_points, self.height, self.width),
            |(t, _, col)| {
                let phase = TAU * self.frequency * t as f64 / self.sample_frequency
                    + self.phase_step * col as f64;
                self.baseline + self.amplitude * phase.cos()
            },
        );
        IntensityStack::new(data.into_dyn())
    }
}

/// Layout of a generated local repository.
#[derive(Clone, Debug)]
pub struct SyntheticRepository {
    pub datasets: usize,
    pub images: usize,
    pub time_points: usize,
    /// Frame width and height in pixels.
    pub size: usize,
    pub sample_frequency: f64,
}

impl Default for SyntheticRepository {
    fn default() -> Self {
        Self {
            datasets: 3,
            images: 4,
            time_points: 30,
            size: 32,
            sample_frequency: 5.6,
        }
    }
}

impl SyntheticRepository {
    /// Oscillation of image `image` in dataset `dataset`, both zero based.
    ///
    /// Dataset `d` oscillates at bin `d + 1` around `100 + 20 d`, and the
    /// amplitude grows by 5 with every image.
    pub fn oscillation(&self, dataset: usize, image: usize) -> Oscillation {
        let bin = (dataset + 1).min(self.time_points / 2).max(1);
        Oscillation {
            width: self.size,
            height: self.size,
            time_points: self.time_points,
            sample_frequency: self.sample_frequency,
            baseline: 100.0 + 20.0 * dataset as f64,
            amplitude: 5.0 * (image + 1) as f64,
            frequency: self.sample_frequency * bin as f64 / self.time_points as f64,
            phase_step: 0.1,
        }
    }

    /// Write `dataset_NN` directories under `root`, each with a manifest and
    /// one SER file per image. Returns the dataset directories.
    pub fn write(&self, root: &Path) -> Result<Vec<PathBuf>> {
        if self.time_points < 2 || self.size == 0 {
            return Err(FlickerError::InvalidInput(format!(
                "synthetic images need at least 2 frames and 1 pixel, got {} frames of {}x{}",
                self.time_points, self.size, self.size
            )));
        }

        let mut dirs = Vec::with_capacity(self.datasets);
        for d in 0..self.datasets {
            let dir = root.join(format!("dataset_{:02}", d + 1));
            std::fs::create_dir_all(&dir)?;

            let manifest = DatasetManifest {
                id: Some(d as i64 + 1),
                owner: Some(1),
                sample_frequency: Some(self.sample_frequency),
                ..DatasetManifest::default()
            };
            manifest.save(&dir.join(DATASET_MANIFEST))?;

            for i in 0..self.images {
                let path = dir.join(format!("image_{:03}.ser", i + 1));
                write_stack(&path, &self.oscillation(d, i).stack(), SYNTHETIC_PIXEL_DEPTH)?;
            }
            info!(dir = %dir.display(), images = self.images, "Wrote synthetic dataset");
            dirs.push(dir);
        }
        Ok(dirs)
    }
}

pub mod local;

use std::ops::Deref;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::stack::IntensityStack;

pub use local::LocalRepository;

/// A named collection of images in the repository.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub id: i64,
    pub name: String,
    pub owner: Option<i64>,
}

/// An image the repository can load as a stack.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageHandle {
    pub id: i64,
    pub name: String,
    pub location: PathBuf,
    /// Acquisition rate recorded by the repository, if any.
    pub sample_frequency: Option<f64>,
}

/// Which datasets a batch should cover.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetFilter {
    /// Keep only datasets owned by this user.
    #[serde(default)]
    pub owner: Option<i64>,
    /// Dataset names to skip.
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl DatasetFilter {
    pub fn matches(&self, dataset: &DatasetInfo) -> bool {
        if let Some(owner) = self.owner {
            if dataset.owner != Some(owner) {
                return false;
            }
        }
        !self.exclude.iter().any(|name| name == &dataset.name)
    }
}

/// Which planes of an image form the stack.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaneSelection {
    /// Channel index read from every plane.
    #[serde(default)]
    pub channel: usize,
    /// Read at most this many time points from the start of each image.
    #[serde(default)]
    pub max_frames: Option<usize>,
}

/// Source of datasets and image stacks.
pub trait ImageRepository {
    /// Human-readable description used in logs.
    fn name(&self) -> String;

    fn connect(&mut self) -> Result<()>;

    fn close(&mut self);

    fn list_datasets(&self, filter: &DatasetFilter) -> Result<Vec<DatasetInfo>>;

    /// Images of a dataset, in the repository's own enumeration order.
    fn list_images(&self, dataset_id: i64) -> Result<Vec<ImageHandle>>;

    fn image_id(&self, handle: &ImageHandle) -> i64 {
        handle.id
    }

    fn load_stack(&self, handle: &ImageHandle, planes: &PlaneSelection) -> Result<IntensityStack>;
}

/// A connected repository. The connection closes when the session drops,
/// whether the run finished or failed.
pub struct Session<'a, R: ImageRepository + ?Sized> {
    repo: &'a mut R,
}

impl<'a, R: ImageRepository + ?Sized> Session<'a, R> {
    pub fn open(repo: &'a mut R) -> Result<Self> {
        repo.connect()?;
        info!(repository = %repo.name(), "Connected");
        Ok(Self { repo })
    }
}

impl<R: ImageRepository + ?Sized> Deref for Session<'_, R> {
    type Target = R;

    fn deref(&self) -> &R {
        &*self.repo
    }
}

impl<R: ImageRepository + ?Sized> Drop for Session<'_, R> {
    fn drop(&mut self) {
        self.repo.close();
        debug!(repository = %self.repo.name(), "Connection closed");
    }
}

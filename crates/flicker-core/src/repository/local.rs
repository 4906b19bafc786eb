use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::consts::{DATASET_MANIFEST, IMAGE_ID_STRIDE};
use crate::error::{FlickerError, Result};
use crate::io::image_io::{list_frames, load_frame_sequence};
use crate::io::ser::SerReader;
use crate::stack::IntensityStack;

use super::{DatasetFilter, DatasetInfo, ImageHandle, ImageRepository, PlaneSelection};

/// Optional `dataset.toml` placed in a dataset directory.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct DatasetManifest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<i64>,
    /// Sample frequency for every image of the dataset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_frequency: Option<f64>,
    /// Per-image overrides keyed by file or directory name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub images: BTreeMap<String, ImageManifest>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ImageManifest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_frequency: Option<f64>,
}

impl DatasetManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[derive(Clone, Debug)]
struct LocalDataset {
    info: DatasetInfo,
    dir: PathBuf,
    manifest: DatasetManifest,
}

/// Image repository backed by a directory tree.
///
/// Every sub-directory of `root` is a dataset. Inside a dataset, each `.ser`
/// file is one image, and each sub-directory holding frame files is one image
/// whose frames are read in file-name order.
pub struct LocalRepository {
    root: PathBuf,
    datasets: Option<Vec<LocalDataset>>,
}

impl LocalRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            datasets: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn datasets(&self) -> Result<&[LocalDataset]> {
        self.datasets
            .as_deref()
            .ok_or_else(|| FlickerError::Repository("repository is not connected".into()))
    }

    fn dataset(&self, dataset_id: i64) -> Result<&LocalDataset> {
        self.datasets()?
            .iter()
            .find(|d| d.info.id == dataset_id)
            .ok_or(FlickerError::DatasetNotFound(dataset_id))
    }

    fn scan(&self) -> Result<Vec<LocalDataset>> {
        let mut dirs = sorted_entries(&self.root)?;
        dirs.retain(|p| p.is_dir() && !file_name(p).starts_with('.'));

        let mut datasets = Vec::with_capacity(dirs.len());
        for (pos, dir) in dirs.into_iter().enumerate() {
            let manifest_path = dir.join(DATASET_MANIFEST);
            let manifest = if manifest_path.is_file() {
                DatasetManifest::load(&manifest_path)?
            } else {
                DatasetManifest::default()
            };
            let info = DatasetInfo {
                id: manifest.id.unwrap_or(pos as i64 + 1),
                name: file_name(&dir),
                owner: manifest.owner,
            };
            if datasets.iter().any(|d: &LocalDataset| d.info.id == info.id) {
                return Err(FlickerError::Repository(format!(
                    "dataset id {} used twice (at {})",
                    info.id,
                    dir.display()
                )));
            }
            datasets.push(LocalDataset {
                info,
                dir,
                manifest,
            });
        }
        Ok(datasets)
    }
}

impl ImageRepository for LocalRepository {
    fn name(&self) -> String {
        format!("local:{}", self.root.display())
    }

    fn connect(&mut self) -> Result<()> {
        if !self.root.is_dir() {
            return Err(FlickerError::Repository(format!(
                "{} is not a directory",
                self.root.display()
            )));
        }
        let datasets = self.scan()?;
        debug!(datasets = datasets.len(), "Scanned repository");
        self.datasets = Some(datasets);
        Ok(())
    }

    fn close(&mut self) {
        self.datasets = None;
    }

    fn list_datasets(&self, filter: &DatasetFilter) -> Result<Vec<DatasetInfo>> {
        Ok(self
            .datasets()?
            .iter()
            .map(|d| d.info.clone())
            .filter(|info| filter.matches(info))
            .collect())
    }

    fn list_images(&self, dataset_id: i64) -> Result<Vec<ImageHandle>> {
        let dataset = self.dataset(dataset_id)?;
        let mut images = Vec::new();

        for entry in sorted_entries(&dataset.dir)? {
            let is_ser = entry.is_file()
                && entry
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("ser"));
            let is_sequence = entry.is_dir() && !list_frames(&entry)?.is_empty();
            if !is_ser && !is_sequence {
                continue;
            }

            let name = file_name(&entry);
            let overrides = dataset.manifest.images.get(&name);
            let position = images.len() as i64 + 1;
            images.push(ImageHandle {
                id: overrides
                    .and_then(|m| m.id)
                    .unwrap_or(dataset_id * IMAGE_ID_STRIDE + position),
                name,
                location: entry,
                sample_frequency: overrides
                    .and_then(|m| m.sample_frequency)
                    .or(dataset.manifest.sample_frequency),
            });
        }

        for name in dataset.manifest.images.keys() {
            if !images.iter().any(|img| &img.name == name) {
                warn!(dataset = %dataset.info.name, image = %name, "Manifest entry has no matching image");
            }
        }

        Ok(images)
    }

    fn load_stack(&self, handle: &ImageHandle, planes: &PlaneSelection) -> Result<IntensityStack> {
        if handle.location.is_dir() {
            load_frame_sequence(&handle.location, planes.channel, planes.max_frames)
        } else {
            let reader = SerReader::open(&handle.location)?;
            reader.read_stack(planes.channel, planes.max_frames)
        }
    }
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = std::fs::read_dir(dir)?
        .map(|e| e.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();
    Ok(entries)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

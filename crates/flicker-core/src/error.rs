use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlickerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid SER file: {0}")]
    InvalidSer(String),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Shape mismatch for image {image_id}: expected length {expected}, found {found}")]
    ShapeMismatch {
        expected: usize,
        found: usize,
        image_id: i64,
    },

    #[error("Dataset '{0}' contains no images")]
    EmptyDataset(String),

    #[error("Dataset '{0}' appears more than once in the batch")]
    DuplicateDataset(String),

    #[error("Dataset {0} not found")]
    DatasetNotFound(i64),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Invalid manifest: {0}")]
    Manifest(#[from] toml::de::Error),

    #[error("Could not encode manifest: {0}")]
    ManifestEncode(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Table error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Table error at line {line}: {message}")]
    Table { line: usize, message: String },

    #[error("Plot error: {0}")]
    Plot(String),
}

pub type Result<T> = std::result::Result<T, FlickerError>;

/// Minimum pixel count per stack to run per-pixel FFTs on the Rayon pool.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 4_096;

/// Minimum image count in a dataset to analyze images on the Rayon pool.
pub const PARALLEL_IMAGE_THRESHOLD: usize = 2;

/// Sample frequency assumed when neither the config nor the dataset
/// manifest provides one. Frames per unit time.
pub const DEFAULT_SAMPLE_FREQUENCY: f64 = 5.6;

/// Image ids assigned without a manifest are `dataset_id * IMAGE_ID_STRIDE + n`.
pub const IMAGE_ID_STRIDE: i64 = 1_000;

/// Name of the optional per-dataset manifest in a local repository.
pub const DATASET_MANIFEST: &str = "dataset.toml";

/// Frame file extensions recognised inside an image directory.
pub const FRAME_EXTENSIONS: [&str; 3] = ["png", "tif", "tiff"];

/// Size of one dataset panel in the spectrum figures, in pixels.
pub const PLOT_PANEL_SIZE: (u32, u32) = (480, 360);

/// Height of the figure title band above the panels, in pixels.
pub const PLOT_TITLE_HEIGHT: u32 = 50;

/// Panels per row before the spectrum figures wrap.
pub const PLOT_GRID_COLUMNS: usize = 3;

/// Size of the mean intensity bar chart, in pixels.
pub const BAR_CHART_SIZE: (u32, u32) = (960, 560);

/// Pixel depth of the SER files written by the synthetic repository.
pub const SYNTHETIC_PIXEL_DEPTH: u32 = 16;

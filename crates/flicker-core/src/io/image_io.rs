use std::path::{Path, PathBuf};

use image::{DynamicImage, GenericImageView};
use ndarray::Array2;
use tracing::debug;

use crate::consts::FRAME_EXTENSIONS;
use crate::error::{FlickerError, Result};
use crate::stack::IntensityStack;

/// Load one channel of an image file as raw intensities.
///
/// 8-bit and 16-bit grayscale images keep their stored values; 8-bit RGB keeps
/// its 0..255 range and every other colour layout is read as 16-bit RGB.
pub fn load_plane(path: &Path, channel: usize) -> Result<Array2<f64>> {
    let img = image::open(path)?;
    let (w, h) = img.dimensions();
    let mut data = Array2::<f64>::zeros((h as usize, w as usize));

    match img {
        DynamicImage::ImageLuma8(gray) => {
            require_channel(path, channel, 1)?;
            for (x, y, p) in gray.enumerate_pixels() {
                data[[y as usize, x as usize]] = p.0[0] as f64;
            }
        }
        DynamicImage::ImageLuma16(gray) => {
            require_channel(path, channel, 1)?;
            for (x, y, p) in gray.enumerate_pixels() {
                data[[y as usize, x as usize]] = p.0[0] as f64;
            }
        }
        DynamicImage::ImageRgb8(rgb) => {
            require_channel(path, channel, 3)?;
            for (x, y, p) in rgb.enumerate_pixels() {
                data[[y as usize, x as usize]] = p.0[channel] as f64;
            }
        }
        other => {
            require_channel(path, channel, 3)?;
            let rgb = other.to_rgb16();
            for (x, y, p) in rgb.enumerate_pixels() {
                data[[y as usize, x as usize]] = p.0[channel] as f64;
            }
        }
    }

    Ok(data)
}

fn require_channel(path: &Path, channel: usize, available: usize) -> Result<()> {
    if channel >= available {
        return Err(FlickerError::InvalidInput(format!(
            "channel {channel} requested from {} which has {available}",
            path.display()
        )));
    }
    Ok(())
}

/// List frame files in a directory, sorted by file name.
pub fn list_frames(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut frames: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_frame_file(p))
        .collect();
    frames.sort();
    Ok(frames)
}

pub fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| FRAME_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Load a directory of frames as a `[T, H, W]` stack, one frame per time point.
pub fn load_frame_sequence(
    dir: &Path,
    channel: usize,
    max_frames: Option<usize>,
) -> Result<IntensityStack> {
    let mut frames = list_frames(dir)?;
    if let Some(max) = max_frames {
        frames.truncate(max);
    }
    debug!(dir = %dir.display(), frames = frames.len(), "Loading frame sequence");

    let planes = frames
        .iter()
        .map(|p| load_plane(p, channel))
        .collect::<Result<Vec<_>>>()?;
    IntensityStack::from_planes(&planes)
}

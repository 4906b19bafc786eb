use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use ndarray::Array2;

use crate::error::{FlickerError, Result};
use crate::io::ser::{SerHeader, SER_HEADER_SIZE, SER_MAGIC};
use crate::stack::IntensityStack;

/// Writes a mono SER file at the raw byte level.
pub struct SerWriter {
    writer: BufWriter<File>,
    header: SerHeader,
    frames_written: u32,
}

impl SerWriter {
    /// Create a new SER file and write the header.
    pub fn create(path: &Path, header: &SerHeader) -> Result<Self> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        write_header(&mut writer, header)?;
        Ok(Self {
            writer,
            header: header.clone(),
            frames_written: 0,
        })
    }

    /// Write one plane of raw intensities, rounded and clamped to the pixel depth.
    pub fn write_plane(&mut self, plane: &Array2<f64>) -> Result<()> {
        let (h, w) = plane.dim();
        if h != self.header.height as usize || w != self.header.width as usize {
            return Err(FlickerError::InvalidInput(format!(
                "plane is {w}x{h}, header expects {}x{}",
                self.header.width, self.header.height
            )));
        }
        let max_val = ((1u32 << self.header.pixel_depth) - 1) as f64;
        let wide = self.header.bytes_per_sample() == 2;
        for &v in plane.iter() {
            let sample = v.round().clamp(0.0, max_val) as u16;
            if wide {
                self.writer.write_all(&sample.to_le_bytes())?;
            } else {
                self.writer.write_all(&[sample as u8])?;
            }
        }
        self.frames_written += 1;
        Ok(())
    }

    /// Flush and finalize the file.
    pub fn finalize(mut self) -> Result<()> {
        if self.frames_written != self.header.frame_count {
            return Err(FlickerError::InvalidSer(format!(
                "header declares {} frames, {} written",
                self.header.frame_count, self.frames_written
            )));
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// Write a `[T, H, W]` stack to a mono SER file.
pub fn write_stack(path: &Path, stack: &IntensityStack, pixel_depth: u32) -> Result<()> {
    let spatial = stack.spatial_shape();
    if spatial.len() != 2 {
        return Err(FlickerError::InvalidInput(format!(
            "SER output needs a [T, H, W] stack, got {} spatial axes",
            spatial.len()
        )));
    }
    let header = SerHeader::mono(
        spatial[1] as u32,
        spatial[0] as u32,
        pixel_depth,
        stack.time_points() as u32,
    );
    let planes = stack
        .data
        .view()
        .into_dimensionality::<ndarray::Ix3>()
        .map_err(|e| FlickerError::InvalidInput(e.to_string()))?;

    let mut writer = SerWriter::create(path, &header)?;
    for plane in planes.outer_iter() {
        writer.write_plane(&plane.to_owned())?;
    }
    writer.finalize()
}

fn write_header(w: &mut impl Write, header: &SerHeader) -> Result<()> {
    // Magic (14 bytes)
    w.write_all(SER_MAGIC)?;
    // LuID (4 bytes)
    w.write_all(&0i32.to_le_bytes())?;
    // ColorID (4 bytes)
    w.write_all(&header.color_id.to_le_bytes())?;
    // LittleEndian flag: 0 = little-endian (Siril convention)
    let le_flag: i32 = if header.little_endian { 0 } else { 1 };
    w.write_all(&le_flag.to_le_bytes())?;
    w.write_all(&(header.width as i32).to_le_bytes())?;
    w.write_all(&(header.height as i32).to_le_bytes())?;
    w.write_all(&(header.pixel_depth as i32).to_le_bytes())?;
    w.write_all(&(header.frame_count as i32).to_le_bytes())?;
    // Observer, Instrument, Telescope (40 bytes each)
    write_fixed_string(w, &header.observer, 40)?;
    write_fixed_string(w, &header.instrument, 40)?;
    write_fixed_string(w, &header.telescope, 40)?;
    w.write_all(&header.date_time.to_le_bytes())?;
    w.write_all(&header.date_time_utc.to_le_bytes())?;

    debug_assert_eq!(
        14 + 4 + 4 + 4 + 4 + 4 + 4 + 4 + 40 + 40 + 40 + 8 + 8,
        SER_HEADER_SIZE
    );
    Ok(())
}

fn write_fixed_string(w: &mut impl Write, s: &str, len: usize) -> Result<()> {
    let bytes = s.as_bytes();
    let to_write = bytes.len().min(len);
    w.write_all(&bytes[..to_write])?;
    for _ in to_write..len {
        w.write_all(&[0u8])?;
    }
    Ok(())
}

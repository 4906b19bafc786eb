use std::fs::File;
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use memmap2::Mmap;
use ndarray::Array2;

use crate::error::{FlickerError, Result};
use crate::stack::{IntensityStack, StackInfo};

pub const SER_HEADER_SIZE: usize = 178;
pub const SER_MAGIC: &[u8; 14] = b"LUCAM-RECORDER";

/// SER file header (178 bytes).
#[derive(Clone, Debug)]
pub struct SerHeader {
    pub color_id: i32,
    pub little_endian: bool,
    pub width: u32,
    pub height: u32,
    pub pixel_depth: u32,
    pub frame_count: u32,
    pub observer: String,
    pub instrument: String,
    pub telescope: String,
    pub date_time: u64,
    pub date_time_utc: u64,
}

impl SerHeader {
    /// Header for a mono stack with the given geometry.
    pub fn mono(width: u32, height: u32, pixel_depth: u32, frame_count: u32) -> Self {
        Self {
            color_id: 0,
            little_endian: true,
            width,
            height,
            pixel_depth,
            frame_count,
            observer: String::new(),
            instrument: String::new(),
            telescope: String::new(),
            date_time: 0,
            date_time_utc: 0,
        }
    }

    /// Bytes per sample (1 for 8-bit, 2 for 9-16 bit).
    pub fn bytes_per_sample(&self) -> usize {
        if self.pixel_depth <= 8 { 1 } else { 2 }
    }

    /// Interleaved samples per pixel (3 for RGB/BGR, 1 otherwise).
    pub fn channels(&self) -> usize {
        match self.color_id {
            100 | 101 => 3,
            _ => 1,
        }
    }

    /// Total bytes per frame.
    pub fn frame_byte_size(&self) -> Result<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|n| n.checked_mul(self.bytes_per_sample()))
            .and_then(|n| n.checked_mul(self.channels()))
            .ok_or_else(|| {
                FlickerError::InvalidSer(format!(
                    "frame size overflows for {}x{} at {} bits",
                    self.width, self.height, self.pixel_depth
                ))
            })
    }

    pub fn color_label(&self) -> &'static str {
        match self.color_id {
            0 => "Mono",
            8..=11 => "Bayer (raw)",
            100 => "RGB",
            101 => "BGR",
            _ => "Unknown",
        }
    }
}

/// Memory-mapped SER file reader.
pub struct SerReader {
    mmap: Mmap,
    pub header: SerHeader,
}

impl SerReader {
    /// Open a SER file and parse its header.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };

        if mmap.len() < SER_HEADER_SIZE {
            return Err(FlickerError::InvalidSer(
                "File too small for SER header".into(),
            ));
        }

        if &mmap[0..14] != SER_MAGIC {
            return Err(FlickerError::InvalidSer(
                "Missing LUCAM-RECORDER magic".into(),
            ));
        }

        let header = parse_header(&mmap[..SER_HEADER_SIZE])?;

        let expected_data_size = header
            .frame_byte_size()?
            .checked_mul(header.frame_count as usize)
            .and_then(|n| n.checked_add(SER_HEADER_SIZE))
            .ok_or_else(|| {
                FlickerError::InvalidSer(format!(
                    "data size overflows for {} frames",
                    header.frame_count
                ))
            })?;
        if mmap.len() < expected_data_size {
            return Err(FlickerError::InvalidSer(format!(
                "File truncated: expected at least {} bytes, got {}",
                expected_data_size,
                mmap.len()
            )));
        }

        Ok(Self { mmap, header })
    }

    pub fn frame_count(&self) -> usize {
        self.header.frame_count as usize
    }

    fn frame_raw(&self, index: usize) -> Result<&[u8]> {
        let count = self.frame_count();
        if index >= count {
            return Err(FlickerError::InvalidInput(format!(
                "frame {index} out of range (total: {count})"
            )));
        }
        // open() checked that every frame fits in the mapping.
        let frame_bytes = self.header.frame_byte_size()?;
        let offset = SER_HEADER_SIZE + index * frame_bytes;
        let end = offset + frame_bytes;
        Ok(&self.mmap[offset..end])
    }

    /// Read one channel of one frame as raw intensities.
    pub fn read_plane(&self, index: usize, channel: usize) -> Result<Array2<f64>> {
        let channels = self.header.channels();
        if channel >= channels {
            return Err(FlickerError::InvalidInput(format!(
                "channel {channel} requested from a {channels}-channel SER file"
            )));
        }
        let raw = self.frame_raw(index)?;
        Ok(decode_plane(
            raw,
            self.header.height as usize,
            self.header.width as usize,
            self.header.bytes_per_sample(),
            channels,
            channel,
            self.header.little_endian,
        ))
    }

    /// Read the first `max_frames` frames (or all) of one channel as a `[T, H, W]` stack.
    pub fn read_stack(&self, channel: usize, max_frames: Option<usize>) -> Result<IntensityStack> {
        let count = max_frames.map_or(self.frame_count(), |m| m.min(self.frame_count()));
        let planes = (0..count)
            .map(|i| self.read_plane(i, channel))
            .collect::<Result<Vec<_>>>()?;
        IntensityStack::from_planes(&planes)
    }

    pub fn stack_info(&self, path: &Path) -> StackInfo {
        StackInfo {
            filename: path.to_path_buf(),
            time_points: self.frame_count(),
            width: self.header.width,
            height: self.header.height,
            bit_depth: self.header.pixel_depth as u8,
            channels: self.header.channels(),
            observer: non_empty(&self.header.observer),
            telescope: non_empty(&self.header.telescope),
            instrument: non_empty(&self.header.instrument),
        }
    }
}

fn parse_header(buf: &[u8]) -> Result<SerHeader> {
    let mut cursor = std::io::Cursor::new(&buf[14..]); // skip magic

    let _lu_id = cursor.read_i32::<LittleEndian>()?;
    let color_id = cursor.read_i32::<LittleEndian>()?;
    let le_flag = cursor.read_i32::<LittleEndian>()?;
    let width = cursor.read_i32::<LittleEndian>()? as u32;
    let height = cursor.read_i32::<LittleEndian>()? as u32;
    let pixel_depth = cursor.read_i32::<LittleEndian>()? as u32;
    let frame_count = cursor.read_i32::<LittleEndian>()? as u32;

    let observer = read_fixed_string(&buf[42..82]);
    let instrument = read_fixed_string(&buf[82..122]);
    let telescope = read_fixed_string(&buf[122..162]);

    let mut cursor = std::io::Cursor::new(&buf[162..]);
    let date_time = cursor.read_u64::<LittleEndian>()?;
    let date_time_utc = cursor.read_u64::<LittleEndian>()?;

    if width == 0 || height == 0 {
        return Err(FlickerError::InvalidSer(format!(
            "invalid dimensions {width}x{height}"
        )));
    }
    if pixel_depth == 0 || pixel_depth > 16 {
        return Err(FlickerError::InvalidSer(format!(
            "unsupported pixel depth {pixel_depth}"
        )));
    }

    // Siril convention: a flag of 0 means little-endian.
    let little_endian = le_flag != 1;

    Ok(SerHeader {
        color_id,
        little_endian,
        width,
        height,
        pixel_depth,
        frame_count,
        observer,
        instrument,
        telescope,
        date_time,
        date_time_utc,
    })
}

fn read_fixed_string(buf: &[u8]) -> String {
    String::from_utf8_lossy(buf)
        .trim_end_matches('\0')
        .trim()
        .to_string()
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() { None } else { Some(s.to_string()) }
}

fn decode_plane(
    raw: &[u8],
    height: usize,
    width: usize,
    bytes_per_sample: usize,
    channels: usize,
    channel: usize,
    little_endian: bool,
) -> Array2<f64> {
    let mut data = Array2::<f64>::zeros((height, width));

    for row in 0..height {
        for col in 0..width {
            let idx = ((row * width + col) * channels + channel) * bytes_per_sample;
            data[[row, col]] = if bytes_per_sample == 1 {
                raw[idx] as f64
            } else {
                let pair = [raw[idx], raw[idx + 1]];
                if little_endian {
                    u16::from_le_bytes(pair) as f64
                } else {
                    u16::from_be_bytes(pair) as f64
                }
            };
        }
    }

    data
}

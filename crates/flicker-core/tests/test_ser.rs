#[allow(dead_code)]
mod common;

use std::io::Write;

use ndarray::Array3;

use flicker_core::error::FlickerError;
use flicker_core::io::ser::{SerHeader, SerReader};
use flicker_core::io::ser_writer::{write_stack, SerWriter};
use flicker_core::stack::IntensityStack;

fn ramp_stack(t: usize, h: usize, w: usize) -> IntensityStack {
    let data = Array3::from_shape_fn((t, h, w), |(t, r, c)| (t * 31 + r * 7 + c) as f64);
    IntensityStack::new(data.into_dyn())
}

#[test]
fn test_round_trip_8bit() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ramp.ser");
    let stack = ramp_stack(5, 3, 4);
    write_stack(&path, &stack, 8).unwrap();

    let reader = SerReader::open(&path).unwrap();
    assert_eq!(reader.frame_count(), 5);
    assert_eq!(reader.header.width, 4);
    assert_eq!(reader.header.height, 3);

    let loaded = reader.read_stack(0, None).unwrap();
    assert_eq!(loaded.data.shape(), &[5, 3, 4]);
    assert_eq!(loaded.data, stack.data);
}

#[test]
fn test_round_trip_16bit_keeps_raw_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deep.ser");
    let data = Array3::from_shape_fn((3, 2, 2), |(t, r, c)| (1000 + t * 900 + r * 10 + c) as f64);
    let stack = IntensityStack::new(data.into_dyn());
    write_stack(&path, &stack, 12).unwrap();

    let loaded = SerReader::open(&path).unwrap().read_stack(0, None).unwrap();
    assert_eq!(loaded.data, stack.data);
}

#[test]
fn test_values_clamped_to_depth() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clamp.ser");
    let stack = IntensityStack::from_shape_vec(&[2, 1, 2], vec![-5.0, 300.0, 12.4, 12.6]).unwrap();
    write_stack(&path, &stack, 8).unwrap();

    let loaded = SerReader::open(&path).unwrap().read_stack(0, None).unwrap();
    let values: Vec<f64> = loaded.data.iter().copied().collect();
    assert_eq!(values, vec![0.0, 255.0, 12.0, 13.0]);
}

#[test]
fn test_max_frames_truncates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("long.ser");
    common::write_ser(&path, &ramp_stack(6, 2, 2));

    let reader = SerReader::open(&path).unwrap();
    assert_eq!(reader.read_stack(0, Some(4)).unwrap().time_points(), 4);
    assert_eq!(reader.read_stack(0, Some(50)).unwrap().time_points(), 6);
}

#[test]
fn test_missing_channel_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mono.ser");
    common::write_ser(&path, &ramp_stack(2, 2, 2));
    let reader = SerReader::open(&path).unwrap();
    assert!(matches!(reader.read_plane(0, 1), Err(FlickerError::InvalidInput(_))));
    assert!(matches!(reader.read_plane(2, 0), Err(FlickerError::InvalidInput(_))));
}

#[test]
fn test_bad_magic_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bogus.ser");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(&[0u8; 200]).unwrap();
    drop(file);

    assert!(matches!(SerReader::open(&path), Err(FlickerError::InvalidSer(_))));
}

#[test]
fn test_truncated_file_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cut.ser");
    common::write_ser(&path, &ramp_stack(4, 8, 8));

    let bytes = std::fs::read(&path).unwrap();
    std::fs::write(&path, &bytes[..bytes.len() - 10]).unwrap();
    assert!(matches!(SerReader::open(&path), Err(FlickerError::InvalidSer(_))));
}

#[test]
fn test_stack_info() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("info.ser");
    common::write_ser(&path, &ramp_stack(7, 3, 5));

    let info = SerReader::open(&path).unwrap().stack_info(&path);
    assert_eq!(info.time_points, 7);
    assert_eq!(info.width, 5);
    assert_eq!(info.height, 3);
    assert_eq!(info.bit_depth, 8);
    assert_eq!(info.channels, 1);
    assert!(info.observer.is_none());
}

#[test]
fn test_channel_stack_rejected_by_writer() {
    let dir = tempfile::tempdir().unwrap();
    let stack = IntensityStack::from_shape_vec(&[2, 2, 2, 3], vec![0.0; 24]).unwrap();
    assert!(write_stack(&dir.path().join("rgb.ser"), &stack, 8).is_err());
}

#[test]
fn test_frame_size_overflow_is_error() {
    let header = SerHeader::mono(u32::MAX, u32::MAX, 16, 1);
    assert!(matches!(header.frame_byte_size(), Err(FlickerError::InvalidSer(_))));
    assert_eq!(SerHeader::mono(4, 3, 16, 1).frame_byte_size().unwrap(), 24);
}

#[test]
fn test_oversized_headers_rejected_on_open() {
    let dir = tempfile::tempdir().unwrap();

    let wide = dir.path().join("wide.ser");
    drop(SerWriter::create(&wide, &SerHeader::mono(u32::MAX, u32::MAX, 16, 1)).unwrap());
    assert!(matches!(SerReader::open(&wide), Err(FlickerError::InvalidSer(_))));

    // Each frame fits, but the frame count pushes the total past usize.
    let mut header = SerHeader::mono(65_535, 65_535, 16, u32::MAX);
    header.color_id = 100;
    let long = dir.path().join("long.ser");
    drop(SerWriter::create(&long, &header).unwrap());
    match SerReader::open(&long) {
        Err(FlickerError::InvalidSer(msg)) => assert!(msg.contains("overflows"), "got {msg}"),
        other => panic!("expected InvalidSer, got {:?}", other.map(|r| r.frame_count())),
    }
}

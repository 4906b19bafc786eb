use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::analysis::BatchSummary;
use crate::error::Result;

/// Write the whole batch, per-image results included, as pretty JSON.
pub fn write_summary_json(path: &Path, batch: &BatchSummary) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, batch)?;
    writer.flush()?;
    Ok(())
}

pub fn read_summary_json(path: &Path) -> Result<BatchSummary> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

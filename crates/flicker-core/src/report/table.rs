use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use serde::Serialize;

use crate::analysis::{BatchSummary, DatasetSummary};
use crate::error::{FlickerError, Result};

const TABLE_HEADER: [&str; 3] = ["dataset", "length", "values"];
const IMAGE_TABLE_HEADER: [&str; 4] = ["dataset", "image_id", "mean_velocity", "turbulence_strength"];

/// One keyed row of a statistic table. Scalars are rows of length one.
#[derive(Clone, Debug, PartialEq)]
pub struct TableRow {
    pub key: String,
    pub values: Vec<f64>,
}

impl TableRow {
    pub fn new(key: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            key: key.into(),
            values,
        }
    }

    pub fn scalar(key: impl Into<String>, value: f64) -> Self {
        Self::new(key, vec![value])
    }
}

/// Per-dataset statistic exported as one table file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Statistic {
    MeanVelocity,
    TurbulenceStrength,
    MeanAmplitude,
    StdAmplitude,
    MeanFrequency,
}

impl Statistic {
    pub const ALL: [Statistic; 5] = [
        Self::MeanVelocity,
        Self::TurbulenceStrength,
        Self::MeanAmplitude,
        Self::StdAmplitude,
        Self::MeanFrequency,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Self::MeanVelocity => "mean_velocity.tsv",
            Self::TurbulenceStrength => "turbulence_strength.tsv",
            Self::MeanAmplitude => "mean_amplitude.tsv",
            Self::StdAmplitude => "std_amplitude.tsv",
            Self::MeanFrequency => "mean_frequency.tsv",
        }
    }

    pub fn row(self, summary: &DatasetSummary) -> TableRow {
        let key = summary.name.clone();
        match self {
            Self::MeanVelocity => TableRow::scalar(key, summary.mean_velocity_scalar),
            Self::TurbulenceStrength => TableRow::scalar(key, summary.mean_turbulence_scalar),
            Self::MeanAmplitude => TableRow::new(key, summary.mean_amplitude_profile.to_vec()),
            Self::StdAmplitude => TableRow::new(key, summary.std_amplitude_profile.to_vec()),
            Self::MeanFrequency => TableRow::new(key, summary.mean_frequency_profile.to_vec()),
        }
    }
}

/// Write rows as `key<TAB>N<TAB>v0<TAB>...<TAB>vN-1` under a header record.
///
/// Keys holding tabs, quotes or line breaks are quoted, so any dataset name
/// reads back unchanged.
pub fn write_rows<W: Write>(writer: W, rows: &[TableRow]) -> Result<()> {
    let mut out = tsv_writer().from_writer(writer);
    out.write_record(TABLE_HEADER)?;
    for row in rows {
        let mut record = vec![row.key.clone(), row.values.len().to_string()];
        record.extend(row.values.iter().map(f64::to_string));
        out.write_record(&record)?;
    }
    out.flush()?;
    Ok(())
}

/// Parse rows written by [`write_rows`], checking each declared length.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<TableRow>> {
    let mut input = ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .has_headers(false)
        .from_reader(reader);
    let mut records = input.records();

    let header = records
        .next()
        .transpose()?
        .ok_or_else(|| table_error(1, "empty table"))?;
    if header.iter().ne(TABLE_HEADER) {
        return Err(table_error(
            line_of(&header),
            format!("expected header '{}'", TABLE_HEADER.join("\t")),
        ));
    }

    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        let line_no = line_of(&record);
        let key = record.get(0).unwrap_or_default().to_string();
        let length: usize = record
            .get(1)
            .ok_or_else(|| table_error(line_no, "missing length field"))?
            .parse()
            .map_err(|e| table_error(line_no, format!("bad length: {e}")))?;
        let values = record
            .iter()
            .skip(2)
            .map(|f| {
                f.parse::<f64>()
                    .map_err(|e| table_error(line_no, format!("bad value '{f}': {e}")))
            })
            .collect::<Result<Vec<_>>>()?;
        if values.len() != length {
            return Err(table_error(
                line_no,
                format!("declared {length} values, found {}", values.len()),
            ));
        }
        rows.push(TableRow { key, values });
    }
    Ok(rows)
}

pub fn write_table(path: &Path, rows: &[TableRow]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_rows(&mut writer, rows)?;
    writer.flush()?;
    Ok(())
}

pub fn read_table(path: &Path) -> Result<Vec<TableRow>> {
    read_rows(BufReader::new(File::open(path)?))
}

/// Write one table per [`Statistic`] into `dir`. Returns the written paths.
pub fn write_statistic_tables(dir: &Path, batch: &BatchSummary) -> Result<Vec<PathBuf>> {
    Statistic::ALL
        .iter()
        .map(|stat| {
            let rows: Vec<TableRow> = batch.values().map(|s| stat.row(s)).collect();
            let path = dir.join(stat.file_name());
            write_table(&path, &rows)?;
            Ok(path)
        })
        .collect()
}

#[derive(Serialize)]
struct ImageRow<'a> {
    dataset: &'a str,
    image_id: i64,
    mean_velocity: f64,
    turbulence_strength: f64,
}

/// Write per-image scalars of every dataset, for tracing results back to
/// repository image ids.
pub fn write_image_table(path: &Path, batch: &BatchSummary) -> Result<()> {
    let mut out = tsv_writer().from_writer(BufWriter::new(File::create(path)?));
    out.write_record(IMAGE_TABLE_HEADER)?;
    for summary in batch.values() {
        for img in &summary.images.images {
            out.serialize(ImageRow {
                dataset: &summary.name,
                image_id: img.image_id,
                mean_velocity: img.mean_velocity,
                turbulence_strength: img.turbulence_strength,
            })?;
        }
    }
    out.flush()?;
    Ok(())
}

fn tsv_writer() -> WriterBuilder {
    let mut builder = WriterBuilder::new();
    builder.delimiter(b'\t').flexible(true).has_headers(false);
    builder
}

fn line_of(record: &StringRecord) -> usize {
    record.position().map_or(0, |pos| pos.line() as usize)
}

fn table_error(line: usize, message: impl Into<String>) -> FlickerError {
    FlickerError::Table {
        line,
        message: message.into(),
    }
}

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::analysis::{aggregate_from_repository, summarize, BatchSummary};
use crate::error::{FlickerError, Result};
use crate::report::{write_image_table, write_plots, write_statistic_tables, write_summary_json};
use crate::repository::{ImageRepository, Session};

use super::config::{AnalysisConfig, ReportConfig};
use super::types::{NoOpReporter, PipelineStage, ProgressReporter, RunOutput};

/// Summarize every dataset the filter selects.
///
/// The repository is connected for the duration of the call and closed
/// before returning, on success or failure. The first failing image aborts
/// the whole batch.
pub fn analyze_repository<R>(
    repo: &mut R,
    config: &AnalysisConfig,
    reporter: &dyn ProgressReporter,
) -> Result<BatchSummary>
where
    R: ImageRepository + Sync + ?Sized,
{
    reporter.begin_stage(PipelineStage::Connecting, None);
    let session = Session::open(repo)?;
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::Enumerating, None);
    let datasets = session.list_datasets(&config.filter)?;
    reporter.finish_stage();
    if datasets.is_empty() {
        return Err(FlickerError::Repository(format!(
            "no datasets in {} match the filter",
            session.name()
        )));
    }
    info!(datasets = datasets.len(), "Selected datasets");

    reporter.begin_stage(PipelineStage::Analyzing, Some(datasets.len()));
    let mut batch = BatchSummary::new();
    for (i, dataset) in datasets.iter().enumerate() {
        let images = aggregate_from_repository(
            &*session,
            dataset,
            &config.planes,
            config.sample_frequency,
        )?;
        let summary = summarize(&dataset.name, dataset.id, images)?;
        info!(
            dataset = %dataset.name,
            images = summary.images.len(),
            bins = summary.mean_amplitude_profile.len(),
            mean_intensity = summary.mean_velocity_scalar,
            fluctuation = summary.mean_turbulence_scalar,
            "Dataset summarized"
        );
        if batch.insert(dataset.name.clone(), summary).is_some() {
            return Err(FlickerError::DuplicateDataset(dataset.name.clone()));
        }
        reporter.advance(i + 1);
    }
    reporter.finish_stage();

    Ok(batch)
}

/// Write the enabled report artifacts for a finished batch into `dir`.
///
/// Artifacts are first rendered into a staging directory next to `dir` and
/// moved into place only once all of them succeeded. On failure the staging
/// directory is removed and `dir` is left as it was.
pub fn write_reports(
    dir: &Path,
    batch: &BatchSummary,
    reports: &ReportConfig,
    reporter: &dyn ProgressReporter,
) -> Result<Vec<PathBuf>> {
    reporter.begin_stage(PipelineStage::Writing, None);
    let staging = staging_dir(dir);
    if staging.exists() {
        std::fs::remove_dir_all(&staging)?;
    }
    std::fs::create_dir_all(&staging)?;

    let staged = match write_artifacts(&staging, batch, reports) {
        Ok(staged) => staged,
        Err(e) => {
            discard(&staging);
            return Err(e);
        }
    };

    let files = match publish(&staging, dir, &staged) {
        Ok(files) => files,
        Err(e) => {
            discard(&staging);
            return Err(e);
        }
    };
    discard(&staging);
    reporter.finish_stage();

    info!(dir = %dir.display(), files = files.len(), "Reports written");
    Ok(files)
}

fn write_artifacts(dir: &Path, batch: &BatchSummary, reports: &ReportConfig) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if reports.tables {
        files.extend(write_statistic_tables(dir, batch)?);
        let images = dir.join("images.tsv");
        write_image_table(&images, batch)?;
        files.push(images);
    }
    if reports.json {
        let json = dir.join("summary.json");
        write_summary_json(&json, batch)?;
        files.push(json);
    }
    if reports.plots {
        files.extend(write_plots(dir, batch)?);
    }
    Ok(files)
}

/// Move staged files into `dir`, keeping their names.
fn publish(staging: &Path, dir: &Path, staged: &[PathBuf]) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    staged
        .iter()
        .map(|file| {
            let name = file.strip_prefix(staging).map_err(|_| {
                FlickerError::InvalidInput(format!("{} is outside the staging directory", file.display()))
            })?;
            let target = dir.join(name);
            std::fs::rename(file, &target)?;
            Ok(target)
        })
        .collect()
}

/// Hidden sibling of `dir` that reports are staged in: `<parent>/.<name>.partial`.
pub fn staging_dir(dir: &Path) -> PathBuf {
    let name = dir
        .file_name()
        .map_or_else(|| "reports".into(), |n| n.to_string_lossy().into_owned());
    let parent = dir.parent().unwrap_or_else(|| Path::new("."));
    parent.join(format!(".{name}.partial"))
}

fn discard(staging: &Path) {
    if let Err(e) = std::fs::remove_dir_all(staging) {
        warn!(dir = %staging.display(), error = %e, "Could not remove staging directory");
    }
}

/// Run the whole batch with a thread-safe progress reporter.
///
/// Nothing is written unless every selected dataset was summarized.
pub fn run_batch_reported<R>(
    repo: &mut R,
    config: &AnalysisConfig,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<RunOutput>
where
    R: ImageRepository + Sync + ?Sized,
{
    let batch = analyze_repository(repo, config, reporter.as_ref())?;
    let files = write_reports(&config.output, &batch, &config.reports, reporter.as_ref())?;
    Ok(RunOutput { batch, files })
}

/// Run the whole batch without progress reporting.
pub fn run_batch<R>(repo: &mut R, config: &AnalysisConfig) -> Result<RunOutput>
where
    R: ImageRepository + Sync + ?Sized,
{
    run_batch_reported(repo, config, Arc::new(NoOpReporter))
}

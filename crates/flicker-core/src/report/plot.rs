use std::path::{Path, PathBuf};

use ndarray::Array1;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::analysis::{BatchSummary, DatasetSummary};
use crate::consts::{BAR_CHART_SIZE, PLOT_GRID_COLUMNS, PLOT_PANEL_SIZE, PLOT_TITLE_HEIGHT};
use crate::error::{FlickerError, Result};

pub const IMAGE_SPECTRA_FILE: &str = "image_spectra.png";
pub const MEAN_SPECTRA_FILE: &str = "mean_spectra.png";
pub const MEAN_INTENSITY_FILE: &str = "mean_intensity.png";

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// One line drawn on a spectrum panel.
struct Trace {
    points: Vec<(f64, f64)>,
    style: ShapeStyle,
}

/// Every image's spectrum, one titled panel per dataset.
pub fn render_image_spectra(path: &Path, batch: &BatchSummary) -> Result<()> {
    draw_grid(
        path,
        "Frequency Spectra for Individual Images in Datasets",
        batch,
        |area, summary| {
            let images = &summary.images.images;
            let top = y_max(
                images
                    .iter()
                    .flat_map(|img| img.amplitude_profile.iter().copied()),
            );
            let traces = images
                .iter()
                .enumerate()
                .map(|(i, img)| Trace {
                    points: points(&img.frequency_profile, &img.amplitude_profile),
                    style: Palette99::pick(i).stroke_width(2),
                })
                .collect();
            draw_spectrum_panel(
                area,
                &summary.name,
                x_extent(&summary.mean_frequency_profile),
                top,
                None,
                traces,
            )
        },
    )
}

/// Mean spectrum of every dataset with a band of one standard deviation
/// either side. All panels share the y-axis so datasets can be compared.
pub fn render_mean_spectra(path: &Path, batch: &BatchSummary) -> Result<()> {
    let top = y_max(
        batch
            .values()
            .flat_map(|s| (&s.mean_amplitude_profile + &s.std_amplitude_profile).to_vec()),
    );

    draw_grid(
        path,
        "Frequency Spectra for Mean of Datasets",
        batch,
        |area, summary| {
            let xs = &summary.mean_frequency_profile;
            let mean = &summary.mean_amplitude_profile;
            let upper = mean + &summary.std_amplitude_profile;
            let lower = (mean - &summary.std_amplitude_profile).mapv(|v| v.max(0.0));

            let mut band = points(xs, &upper);
            band.extend(points(xs, &lower).into_iter().rev());

            let traces = vec![Trace {
                points: points(xs, mean),
                style: BLUE.stroke_width(2),
            }];
            draw_spectrum_panel(area, &summary.name, x_extent(xs), top, Some(band), traces)
        },
    )
}

/// Mean intensity per dataset as bars, with turbulence strength error bars.
pub fn render_intensity_bars(path: &Path, batch: &BatchSummary) -> Result<()> {
    if batch.is_empty() {
        return Err(FlickerError::Plot("no datasets to plot".into()));
    }

    let names: Vec<&str> = batch.keys().map(String::as_str).collect();
    let top = y_max(
        batch
            .values()
            .map(|s| s.mean_velocity_scalar + s.mean_turbulence_scalar),
    );

    let root = BitMapBackend::new(path, BAR_CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Mean Pixel Intensity of Each Dataset", ("sans-serif", 26))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d((0..names.len()).into_segmented(), 0.0..top)
        .map_err(plot_error)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .y_desc("Mean Pixel Intensity")
        .x_label_formatter(&|v| match v {
            SegmentValue::CenterOf(i) => names.get(*i).map_or_else(String::new, |n| n.to_string()),
            _ => String::new(),
        })
        .y_label_formatter(&|y| format!("{y:.1}"))
        .draw()
        .map_err(plot_error)?;

    chart
        .draw_series(batch.values().enumerate().map(|(i, s)| {
            let mut bar = Rectangle::new(
                [
                    (SegmentValue::Exact(i), 0.0),
                    (SegmentValue::Exact(i + 1), s.mean_velocity_scalar),
                ],
                BLUE.mix(0.5).filled(),
            );
            bar.set_margin(0, 0, 15, 15);
            bar
        }))
        .map_err(plot_error)?;

    chart
        .draw_series(batch.values().enumerate().map(|(i, s)| {
            ErrorBar::new_vertical(
                SegmentValue::CenterOf(i),
                s.mean_velocity_scalar - s.mean_turbulence_scalar,
                s.mean_velocity_scalar,
                s.mean_velocity_scalar + s.mean_turbulence_scalar,
                BLACK.filled(),
                12,
            )
        }))
        .map_err(plot_error)?;

    root.present().map_err(plot_error)?;
    Ok(())
}

/// Render every figure of a batch into `dir`. Returns the written paths.
///
/// File names are fixed per figure; datasets are told apart by their panel
/// titles, so no two datasets can overwrite each other's output.
pub fn write_plots(dir: &Path, batch: &BatchSummary) -> Result<Vec<PathBuf>> {
    if batch.is_empty() {
        return Err(FlickerError::Plot("no datasets to plot".into()));
    }

    let spectra = dir.join(IMAGE_SPECTRA_FILE);
    render_image_spectra(&spectra, batch)?;

    let means = dir.join(MEAN_SPECTRA_FILE);
    render_mean_spectra(&means, batch)?;

    let bars = dir.join(MEAN_INTENSITY_FILE);
    render_intensity_bars(&bars, batch)?;

    Ok(vec![spectra, means, bars])
}

/// Pixel size of a figure holding `panels` spectrum panels.
pub fn grid_size(panels: usize) -> (u32, u32) {
    let (cols, rows) = grid_shape(panels);
    let (w, h) = PLOT_PANEL_SIZE;
    (w * cols as u32, h * rows as u32 + PLOT_TITLE_HEIGHT)
}

fn grid_shape(panels: usize) -> (usize, usize) {
    let cols = panels.clamp(1, PLOT_GRID_COLUMNS);
    (cols, panels.div_ceil(cols).max(1))
}

fn draw_grid<F>(path: &Path, title: &str, batch: &BatchSummary, mut draw: F) -> Result<()>
where
    F: FnMut(&Area<'_>, &DatasetSummary) -> Result<()>,
{
    if batch.is_empty() {
        return Err(FlickerError::Plot("no datasets to plot".into()));
    }

    let (cols, rows) = grid_shape(batch.len());
    let root = BitMapBackend::new(path, grid_size(batch.len())).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;

    let (header, body) = root.split_vertically(PLOT_TITLE_HEIGHT);
    header
        .titled(title, ("sans-serif", 26))
        .map_err(plot_error)?;

    for (area, summary) in body.split_evenly((rows, cols)).iter().zip(batch.values()) {
        draw(area, summary)?;
    }

    root.present().map_err(plot_error)?;
    Ok(())
}

fn draw_spectrum_panel(
    area: &Area<'_>,
    title: &str,
    x_range: (f64, f64),
    top: f64,
    band: Option<Vec<(f64, f64)>>,
    traces: Vec<Trace>,
) -> Result<()> {
    let (x0, x1) = widen(x_range);
    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(55)
        .build_cartesian_2d(x0..x1, 0.0..top)
        .map_err(plot_error)?;

    chart
        .configure_mesh()
        .x_desc("Frequency")
        .y_desc("Relative Amplitude")
        .x_label_formatter(&|x| format!("{x:.2}"))
        .y_label_formatter(&|y| format!("{y:.2}"))
        .draw()
        .map_err(plot_error)?;

    if let Some(outline) = band {
        chart
            .draw_series(std::iter::once(Polygon::new(outline, BLUE.mix(0.2).filled())))
            .map_err(plot_error)?;
    }
    for trace in traces {
        chart
            .draw_series(LineSeries::new(trace.points, trace.style))
            .map_err(plot_error)?;
    }
    Ok(())
}

fn plot_error(e: impl std::fmt::Display) -> FlickerError {
    FlickerError::Plot(e.to_string())
}

fn points(xs: &Array1<f64>, ys: &Array1<f64>) -> Vec<(f64, f64)> {
    xs.iter().copied().zip(ys.iter().copied()).collect()
}

fn widen((lo, hi): (f64, f64)) -> (f64, f64) {
    if hi > lo { (lo, hi) } else { (lo, lo + 1.0) }
}

fn x_extent(xs: &Array1<f64>) -> (f64, f64) {
    let lo = xs.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo.is_finite() { (lo, hi) } else { (0.0, 1.0) }
}

fn y_max(values: impl IntoIterator<Item = f64>) -> f64 {
    let max = values.into_iter().fold(0.0, f64::max);
    if max > 0.0 { max * 1.05 } else { 1.0 }
}

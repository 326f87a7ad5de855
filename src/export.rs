use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::DateTime;

use crate::render::contour::Raster;
use crate::render::{ContourFigure, Figure, LineFigure};

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Write the data behind a figure as CSV.
///
/// * line chart: `time,<level 1>,<level 2>,...`, one row per scan
/// * contour chart: `altitude_m,time,temperature`, one row per grid node
pub fn write_figure_csv<W: Write>(figure: &Figure, out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    match figure {
        Figure::Line(f) => write_line_csv(f, &mut writer)?,
        Figure::Contour(f) => write_contour_csv(f, &mut writer)?,
    }
    writer.flush().context("flushing CSV output")?;
    Ok(())
}

fn write_line_csv<W: Write>(fig: &LineFigure, writer: &mut csv::Writer<W>) -> Result<()> {
    let mut header = vec!["time".to_string()];
    header.extend(fig.series.iter().map(|s| s.label.clone()));
    writer.write_record(&header)?;

    let rows = fig.series.first().map_or(0, |s| s.points.len());
    for row in 0..rows {
        let mut record = vec![timestamp_text(fig.series[0].points[row][0])];
        record.extend(fig.series.iter().map(|s| s.points[row][1].to_string()));
        writer.write_record(&record)?;
    }
    Ok(())
}

fn write_contour_csv<W: Write>(fig: &ContourFigure, writer: &mut csv::Writer<W>) -> Result<()> {
    writer.write_record(["altitude_m", "time", "temperature"])?;
    let (times, altitudes) = fig.grid.mesh();
    for ((time_row, altitude_row), z_row) in times.iter().zip(&altitudes).zip(&fig.grid.z) {
        for ((time, altitude), temperature) in time_row.iter().zip(altitude_row).zip(z_row) {
            writer.write_record([
                altitude.to_string(),
                timestamp_text(*time),
                temperature.to_string(),
            ])?;
        }
    }
    Ok(())
}

fn timestamp_text(seconds: f64) -> String {
    DateTime::from_timestamp(seconds as i64, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

pub fn save_figure_csv(figure: &Figure, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_figure_csv(figure, file)
}

// ---------------------------------------------------------------------------
// PNG
// ---------------------------------------------------------------------------

pub fn save_png(raster: &Raster, path: &Path) -> Result<()> {
    let image = image::RgbaImage::from_raw(
        raster.width as u32,
        raster.height as u32,
        raster.rgba.clone(),
    )
    .context("raster size does not match its pixel buffer")?;
    image
        .save(path)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::data::model::{Sample, TimeSeries};
    use crate::render::{render_contour, render_line};

    fn series() -> TimeSeries {
        let day = NaiveDate::from_ymd_opt(2019, 6, 15).unwrap();
        TimeSeries::from_samples(
            (0..3)
                .map(|i| Sample {
                    timestamp: day.and_hms_opt(6, 0, i * 10).unwrap(),
                    temperatures: vec![10.0 + i as f64, 9.5, 9.0],
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn line_csv_has_one_column_per_level() {
        let fig = Figure::Line(render_line(&series(), 0, 50).unwrap());
        let mut out = Vec::new();
        write_figure_csv(&fig, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "time,0 m,50 m");
        assert_eq!(lines[1], "2019-06-15 06:00:00,10,9.5");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn contour_csv_lists_every_node() {
        let fig = Figure::Contour(render_contour(&series(), 0, 100).unwrap());
        let mut out = Vec::new();
        write_figure_csv(&fig, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1 + 3 * 3);
        assert!(text.contains("100,2019-06-15 06:00:20,9"));
    }

    #[test]
    fn png_is_written() {
        let fig = render_contour(&series(), 0, 100).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contour.png");
        save_png(&fig.rasterize(20, 10), &path).unwrap();
        let img = image::open(&path).unwrap();
        assert_eq!((img.width(), img.height()), (20, 10));
    }
}

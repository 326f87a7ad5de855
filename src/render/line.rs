use crate::data::model::{AltitudeAxis, TimeSeries};

use super::{Bounds, RenderError};

/// One altitude level drawn as temperature vs. time.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub altitude_m: i32,
    pub label: String,
    /// `[time seconds, °C]`
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineFigure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub legend_title: String,
    pub series: Vec<LineSeries>,
}

impl LineFigure {
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::of_points(self.series.iter().flat_map(|s| s.points.iter()))
    }
}

/// Temperature vs. time, one line per altitude level.
///
/// Draws `min(levels, columns)` lines: an altitude range wider than the file
/// is truncated, never rejected.
pub fn render_line(
    series: &TimeSeries,
    altitude_start: i32,
    altitude_end: i32,
) -> Result<LineFigure, RenderError> {
    let axis = AltitudeAxis::new(altitude_start, altitude_end)?;
    let times = series.time_axis();
    let count = axis.len().min(series.column_count());

    let lines = axis.levels()[..count]
        .iter()
        .enumerate()
        .map(|(col, &altitude_m)| LineSeries {
            altitude_m,
            label: format!("{altitude_m} m"),
            points: times
                .iter()
                .zip(series.column(col))
                .map(|(&t, temp)| [t, temp])
                .collect(),
        })
        .collect::<Vec<_>>();

    log::debug!(
        "Line figure: {} of {} levels, {} scans",
        lines.len(),
        axis.len(),
        series.len()
    );

    Ok(LineFigure {
        title: "Temperature vs. time at different altitudes".to_string(),
        x_label: "Time (hh:mm:ss)".to_string(),
        y_label: "Temperature (°C)".to_string(),
        legend_title: "Altitude".to_string(),
        series: lines,
    })
}

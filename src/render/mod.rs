//! Render layer: turns a loaded [`TimeSeries`](crate::data::model::TimeSeries)
//! into toolkit-independent figures.
//!
//! ```text
//!   TimeSeries + altitude range
//!        │
//!        ├──► line::render_line       → LineFigure    (one series per level)
//!        │
//!        └──► contour::render_contour → ContourFigure (grid, bands, iso-lines)
//!                     │
//!                     └── isoline: marching squares + stitching
//! ```
//!
//! Figures are plain data. The UI draws them with egui_plot and the export
//! module writes them to CSV/PNG.

pub mod contour;
pub mod isoline;
pub mod line;

use chrono::DateTime;
use thiserror::Error;

use crate::data::model::{ChartKind, InputValidationError};

pub use contour::{Colorbar, ContourFigure, render_contour};
pub use line::{LineFigure, render_line};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error(transparent)]
    InvalidAltitudeRange(#[from] InputValidationError),
    #[error(
        "altitude range needs {levels} levels but the file only has {columns} temperature columns"
    )]
    AltitudeRange { levels: usize, columns: usize },
    #[error("a contour needs at least 2 scans and 2 altitude levels (got {times} x {levels})")]
    DegenerateGrid { times: usize, levels: usize },
}

// ---------------------------------------------------------------------------
// Figure
// ---------------------------------------------------------------------------

/// A rendered chart, ready to be drawn or exported.
#[derive(Debug, Clone)]
pub enum Figure {
    Line(LineFigure),
    Contour(ContourFigure),
}

impl Figure {
    pub fn kind(&self) -> ChartKind {
        match self {
            Figure::Line(_) => ChartKind::Line,
            Figure::Contour(_) => ChartKind::Contour,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Figure::Line(f) => &f.title,
            Figure::Contour(f) => &f.title,
        }
    }
}

/// Axis-aligned data extents, `[min, max]` per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: [f64; 2],
    pub y: [f64; 2],
}

impl Bounds {
    pub(crate) fn of_points<'a>(points: impl IntoIterator<Item = &'a [f64; 2]>) -> Option<Self> {
        let mut bounds: Option<Bounds> = None;
        for p in points {
            if p[1].is_nan() {
                continue;
            }
            let b = bounds.get_or_insert(Bounds {
                x: [p[0], p[0]],
                y: [p[1], p[1]],
            });
            b.x = [b.x[0].min(p[0]), b.x[1].max(p[0])];
            b.y = [b.y[0].min(p[1]), b.y[1].max(p[1])];
        }
        bounds
    }
}

/// Format a numeric time-axis value (seconds since the Unix epoch) as `HH:MM:SS`.
pub fn format_time_of_day(seconds: f64) -> String {
    match DateTime::from_timestamp(seconds.round() as i64, 0) {
        Some(dt) => dt.format("%H:%M:%S").to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_of_day_ignores_date() {
        // 2019-06-15 13:05:42 UTC
        assert_eq!(format_time_of_day(1_560_603_942.0), "13:05:42");
        assert_eq!(format_time_of_day(0.0), "00:00:00");
    }

    #[test]
    fn bounds_skip_nan() {
        let pts = [[1.0, 5.0], [3.0, f64::NAN], [2.0, -1.0]];
        let b = Bounds::of_points(&pts).unwrap();
        assert_eq!(b.x, [1.0, 2.0]);
        assert_eq!(b.y, [-1.0, 5.0]);
        assert!(Bounds::of_points(&[] as &[[f64; 2]]).is_none());
    }
}

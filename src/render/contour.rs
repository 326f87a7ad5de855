use crate::color::{BandedScale, Coolwarm};
use crate::data::model::{AltitudeAxis, TimeSeries};

use super::{Bounds, RenderError, isoline};

/// Number of equal-width colour bands in the filled surface.
pub const FILL_BANDS: usize = 100;
/// Target number of labelled iso-lines.
pub const LINE_LEVELS: usize = 10;
/// Polylines shorter than this are drawn but not labelled.
const MIN_LABELLED_POINTS: usize = 4;

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// Temperature field sampled on a rectilinear (time, altitude) grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    /// Time axis, seconds since the Unix epoch.
    pub x: Vec<f64>,
    /// Altitude axis, meters.
    pub y: Vec<f64>,
    /// `z[altitude][time]`
    pub z: Vec<Vec<f64>>,
}

impl Grid {
    /// Broadcast the axes into two `y.len() x x.len()` coordinate matrices:
    /// x varies along columns, y along rows.
    pub fn mesh(&self) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
        let xs = self.y.iter().map(|_| self.x.clone()).collect();
        let ys = self
            .y
            .iter()
            .map(|&y| vec![y; self.x.len()])
            .collect();
        (xs, ys)
    }

    /// Smallest and largest finite temperature.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.z
            .iter()
            .flatten()
            .filter(|v| v.is_finite())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Bilinear interpolation at `(x, y)`, clamped to the grid.
    fn interpolate(&self, x: f64, y: f64) -> f64 {
        let (i, tx) = locate(&self.x, x);
        let (j, ty) = locate(&self.y, y);
        let z00 = self.z[j][i];
        let z10 = self.z[j][i + 1];
        let z01 = self.z[j + 1][i];
        let z11 = self.z[j + 1][i + 1];
        let bottom = z00 + tx * (z10 - z00);
        let top = z01 + tx * (z11 - z01);
        bottom + ty * (top - bottom)
    }
}

/// Cell index and fractional offset of `v` along an ascending axis.
fn locate(axis: &[f64], v: f64) -> (usize, f64) {
    let i = axis
        .partition_point(|a| *a <= v)
        .saturating_sub(1)
        .min(axis.len() - 2);
    let span = axis[i + 1] - axis[i];
    let t = if span > 0.0 { (v - axis[i]) / span } else { 0.0 };
    (i, t.clamp(0.0, 1.0))
}

// ---------------------------------------------------------------------------
// Figure
// ---------------------------------------------------------------------------

/// A traced iso-line at one temperature level.
#[derive(Debug, Clone, PartialEq)]
pub struct IsoLine {
    pub level: f64,
    pub points: Vec<[f64; 2]>,
    /// Where to put the inline value label, if the line is long enough.
    pub label_at: Option<[f64; 2]>,
}

impl IsoLine {
    pub fn label(&self) -> String {
        format!("{:.1}", self.level)
    }
}

/// Value scale attached to a filled contour surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Colorbar {
    pub label: String,
    pub min: f64,
    pub max: f64,
    /// Band boundaries of the surface it describes.
    pub boundaries: Vec<f64>,
    pub ticks: Vec<f64>,
}

impl Colorbar {
    pub fn scale(&self, map: &Coolwarm) -> BandedScale {
        BandedScale::new(&self.boundaries, map)
    }
}

#[derive(Debug, Clone)]
pub struct ContourFigure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub grid: Grid,
    /// `FILL_BANDS + 1` ascending band boundaries.
    pub fill_levels: Vec<f64>,
    pub line_levels: Vec<f64>,
    pub iso_lines: Vec<IsoLine>,
    pub colorbar: Colorbar,
}

/// RGBA pixels, row 0 at the top (highest altitude).
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

impl ContourFigure {
    pub fn bounds(&self) -> Bounds {
        let first_last = |v: &[f64]| [v[0], v[v.len() - 1]];
        Bounds {
            x: first_last(&self.grid.x),
            y: first_last(&self.grid.y),
        }
    }

    /// Paint the filled surface at `width x height` pixels.
    pub fn rasterize(&self, width: usize, height: usize) -> Raster {
        let scale = BandedScale::new(&self.fill_levels, &Coolwarm::new());
        let b = self.bounds();
        let mut rgba = Vec::with_capacity(width * height * 4);

        for py in 0..height {
            let fy = (py as f64 + 0.5) / height as f64;
            let y = b.y[1] - fy * (b.y[1] - b.y[0]);
            for px in 0..width {
                let fx = (px as f64 + 0.5) / width as f64;
                let x = b.x[0] + fx * (b.x[1] - b.x[0]);
                match scale.color_for(self.grid.interpolate(x, y)) {
                    Some(c) => rgba.extend_from_slice(&[c.r(), c.g(), c.b(), 255]),
                    None => rgba.extend_from_slice(&[0, 0, 0, 0]),
                }
            }
        }
        Raster {
            width,
            height,
            rgba,
        }
    }
}

/// Temperature as a function of time and altitude.
///
/// Unlike [`render_line`](super::render_line), the altitude range must fit
/// in the file's columns: a rectangular grid cannot be truncated silently.
pub fn render_contour(
    series: &TimeSeries,
    altitude_start: i32,
    altitude_end: i32,
) -> Result<ContourFigure, RenderError> {
    let axis = AltitudeAxis::new(altitude_start, altitude_end)?;
    if axis.len() > series.column_count() {
        return Err(RenderError::AltitudeRange {
            levels: axis.len(),
            columns: series.column_count(),
        });
    }
    if series.len() < 2 || axis.len() < 2 {
        return Err(RenderError::DegenerateGrid {
            times: series.len(),
            levels: axis.len(),
        });
    }

    let grid = Grid {
        x: series.time_axis(),
        y: axis.levels().iter().map(|&a| a as f64).collect(),
        z: (0..axis.len()).map(|col| series.column(col)).collect(),
    };

    let (lo, hi) = match grid.value_range() {
        Some((lo, hi)) if hi > lo => (lo, hi),
        Some((v, _)) => (v - 0.5, v + 0.5),
        None => (-0.5, 0.5),
    };
    let fill_levels = linspace(lo, hi, FILL_BANDS + 1);
    let line_levels = nice_levels(lo, hi, LINE_LEVELS);

    let extent = [
        grid.x[grid.x.len() - 1] - grid.x[0],
        grid.y[grid.y.len() - 1] - grid.y[0],
    ];
    let iso_lines = line_levels
        .iter()
        .flat_map(|&level| {
            isoline::trace(&grid, level)
                .into_iter()
                .map(move |points| IsoLine {
                    level,
                    label_at: (points.len() >= MIN_LABELLED_POINTS)
                        .then(|| halfway_along(&points, extent)),
                    points,
                })
        })
        .collect::<Vec<_>>();

    log::debug!(
        "Contour figure: {}x{} grid, {:.2}..{:.2} °C, {} iso-lines",
        grid.x.len(),
        grid.y.len(),
        lo,
        hi,
        iso_lines.len()
    );

    let colorbar = Colorbar {
        label: "Temperature (°C)".to_string(),
        min: lo,
        max: hi,
        boundaries: fill_levels.clone(),
        ticks: nice_levels(lo, hi, 8),
    };

    Ok(ContourFigure {
        title: "Temperature as a function of altitude and time".to_string(),
        x_label: "Time (hh:mm:ss)".to_string(),
        y_label: "Altitude (m)".to_string(),
        grid,
        fill_levels,
        line_levels,
        iso_lines,
        colorbar,
    })
}

// ---------------------------------------------------------------------------
// Level helpers
// ---------------------------------------------------------------------------

fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    let step = (hi - lo) / (n - 1) as f64;
    (0..n)
        .map(|k| if k == n - 1 { hi } else { lo + k as f64 * step })
        .collect()
}

/// Point halfway along a polyline by length. Each axis is scaled by its
/// `extent` first, since seconds and meters are not comparable.
fn halfway_along(points: &[[f64; 2]], extent: [f64; 2]) -> [f64; 2] {
    let scale = extent.map(|e| if e > 0.0 { 1.0 / e } else { 1.0 });
    let step = |a: [f64; 2], b: [f64; 2]| {
        ((b[0] - a[0]) * scale[0]).hypot((b[1] - a[1]) * scale[1])
    };
    let total: f64 = points.windows(2).map(|w| step(w[0], w[1])).sum();

    let mut travelled = 0.0;
    for w in points.windows(2) {
        let len = step(w[0], w[1]);
        if len > 0.0 && travelled + len >= total / 2.0 {
            let t = (total / 2.0 - travelled) / len;
            return [
                w[0][0] + t * (w[1][0] - w[0][0]),
                w[0][1] + t * (w[1][1] - w[0][1]),
            ];
        }
        travelled += len;
    }
    points[0]
}

/// Round-numbered levels (steps of 1, 2, 2.5 or 5 x 10^n) strictly inside
/// `(lo, hi)`, about `target` of them.
pub fn nice_levels(lo: f64, hi: f64, target: usize) -> Vec<f64> {
    if !(hi > lo) || target == 0 {
        return Vec::new();
    }
    let raw = (hi - lo) / target as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 2.5, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw)
        .unwrap_or(10.0 * magnitude);

    let first = (lo / step).ceil() as i64;
    let last = (hi / step).floor() as i64;
    (first..=last)
        .map(|k| k as f64 * step)
        .filter(|v| *v > lo && *v < hi)
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::data::model::Sample;

    fn series(rows: &[Vec<f64>]) -> TimeSeries {
        let day = NaiveDate::from_ymd_opt(2019, 6, 15).unwrap();
        let samples = rows
            .iter()
            .enumerate()
            .map(|(i, temps)| Sample {
                timestamp: day.and_hms_opt(10, 5 * i as u32, 0).unwrap(),
                temperatures: temps.clone(),
            })
            .collect();
        TimeSeries::from_samples(samples).unwrap()
    }

    fn three_by_three() -> TimeSeries {
        series(&[
            vec![12.0, 10.0, 8.0],
            vec![13.0, 11.0, 9.0],
            vec![14.0, 12.0, 10.0],
        ])
    }

    #[test]
    fn grid_is_transposed_series() {
        let ts = three_by_three();
        let fig = render_contour(&ts, 0, 100).unwrap();
        assert_eq!(fig.grid.y, vec![0.0, 50.0, 100.0]);
        assert_eq!(fig.grid.x, ts.time_axis());
        // Row = altitude, column = time.
        assert_eq!(fig.grid.z[0], vec![12.0, 13.0, 14.0]);
        assert_eq!(fig.grid.z[2], vec![8.0, 9.0, 10.0]);
    }

    #[test]
    fn mesh_follows_meshgrid_layout() {
        let fig = render_contour(&three_by_three(), 0, 100).unwrap();
        let (xs, ys) = fig.grid.mesh();
        assert_eq!(xs.len(), 3);
        assert_eq!(xs[2], fig.grid.x);
        assert_eq!(ys[1], vec![50.0; 3]);
    }

    #[test]
    fn extents_match_inputs() {
        let ts = three_by_three();
        let fig = render_contour(&ts, 0, 100).unwrap();
        let times = ts.time_axis();
        assert_eq!(fig.bounds().x, [times[0], times[2]]);
        assert_eq!(fig.bounds().y, [0.0, 100.0]);
        assert_eq!(fig.colorbar.min, 8.0);
        assert_eq!(fig.colorbar.max, 14.0);
    }

    #[test]
    fn altitude_range_wider_than_columns_is_rejected() {
        let ts = three_by_three();
        assert_eq!(
            render_contour(&ts, 0, 150).unwrap_err(),
            RenderError::AltitudeRange { levels: 4, columns: 3 }
        );
    }

    #[test]
    fn subset_of_columns_is_allowed() {
        let fig = render_contour(&three_by_three(), 0, 50).unwrap();
        assert_eq!(fig.grid.z.len(), 2);
    }

    #[test]
    fn degenerate_grids_are_rejected() {
        let one_scan = series(&[vec![1.0, 2.0, 3.0]]);
        assert!(matches!(
            render_contour(&one_scan, 0, 100),
            Err(RenderError::DegenerateGrid { times: 1, .. })
        ));
        assert!(matches!(
            render_contour(&three_by_three(), 0, 30),
            Err(RenderError::DegenerateGrid { levels: 1, .. })
        ));
        assert!(matches!(
            render_contour(&TimeSeries::default(), 0, 100),
            Err(RenderError::AltitudeRange { columns: 0, .. })
        ));
    }

    #[test]
    fn levels_and_labels() {
        let fig = render_contour(&three_by_three(), 0, 100).unwrap();
        assert_eq!(fig.fill_levels.len(), FILL_BANDS + 1);
        assert_eq!(fig.fill_levels[0], 8.0);
        assert_eq!(fig.fill_levels[FILL_BANDS], 14.0);
        assert!(fig.line_levels.len() <= LINE_LEVELS + 1);
        assert!(fig.line_levels.iter().all(|l| *l > 8.0 && *l < 14.0));
        assert!(!fig.iso_lines.is_empty());
        let line = &fig.iso_lines[0];
        assert_eq!(line.label(), format!("{:.1}", line.level));
    }

    #[test]
    fn label_sits_halfway_by_length() {
        let close = |a: [f64; 2], b: [f64; 2]| {
            (a[0] - b[0]).abs() < 1e-9 && (a[1] - b[1]).abs() < 1e-9
        };
        // Most of the length is in the last segment.
        let points = [[0.0, 0.0], [1.0, 0.0], [2.0, 0.0], [10.0, 0.0]];
        assert!(close(halfway_along(&points, [1.0, 1.0]), [5.0, 0.0]));
        // Axes are normalised before measuring.
        let points = [[0.0, 0.0], [100.0, 0.0], [100.0, 1.0]];
        assert!(close(halfway_along(&points, [100.0, 1.0]), [100.0, 0.0]));
    }

    #[test]
    fn nice_levels_use_round_steps() {
        assert_eq!(nice_levels(0.0, 10.0, 10), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        assert_eq!(nice_levels(8.0, 14.0, 10), vec![9.0, 10.0, 11.0, 12.0, 13.0]);
        assert!(nice_levels(3.0, 3.0, 10).is_empty());
    }

    #[test]
    fn constant_field_still_renders() {
        let ts = series(&[vec![5.0, 5.0], vec![5.0, 5.0]]);
        let fig = render_contour(&ts, 0, 50).unwrap();
        assert_eq!(fig.colorbar.min, 4.5);
        assert_eq!(fig.colorbar.max, 5.5);
        assert!(fig.iso_lines.is_empty());
    }

    #[test]
    fn raster_puts_warm_air_at_the_bottom() {
        let fig = render_contour(&three_by_three(), 0, 100).unwrap();
        let raster = fig.rasterize(8, 6);
        assert_eq!(raster.rgba.len(), 8 * 6 * 4);
        let pixel = |x: usize, y: usize| {
            let k = (y * raster.width + x) * 4;
            [raster.rgba[k], raster.rgba[k + 1], raster.rgba[k + 2], raster.rgba[k + 3]]
        };
        let top = pixel(0, 0);
        let bottom = pixel(7, 5);
        assert_eq!(top[3], 255);
        assert!(top[2] > top[0], "cold air is blue");
        assert!(bottom[0] > bottom[2], "warm air is red");
    }
}

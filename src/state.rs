use std::path::PathBuf;

use eframe::egui;

use crate::data::filter::HourWindow;
use crate::data::folder::{self, DayFile};
use crate::data::loader;
use crate::data::model::{ChartKind, ChartRequest, TimeSeries};
use crate::render::{self, Colorbar, Figure};

/// Altitude choices offered by the selectors, meters.
pub const ALTITUDE_CHOICES: std::ops::RangeInclusive<i32> = 0..=1000;

// ---------------------------------------------------------------------------
// Status line
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Info(String),
    Warning(String),
    Error(String),
}

// ---------------------------------------------------------------------------
// Interval settings
// ---------------------------------------------------------------------------

/// The time and altitude selectors. Disabled selectors fall back to the
/// whole day and 0–1000 m.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalSettings {
    pub time_enabled: bool,
    pub hour_start: u32,
    pub hour_end: u32,
    pub altitude_enabled: bool,
    pub altitude_start: i32,
    pub altitude_end: i32,
}

impl Default for IntervalSettings {
    fn default() -> Self {
        Self {
            time_enabled: false,
            hour_start: 0,
            hour_end: 1,
            altitude_enabled: false,
            altitude_start: 0,
            altitude_end: 50,
        }
    }
}

impl IntervalSettings {
    pub fn hours(&self) -> (u32, u32) {
        if self.time_enabled {
            (self.hour_start, self.hour_end)
        } else {
            (HourWindow::FULL_DAY.start(), HourWindow::FULL_DAY.end())
        }
    }

    pub fn altitudes(&self) -> (i32, i32) {
        if self.altitude_enabled {
            (self.altitude_start, self.altitude_end)
        } else {
            (*ALTITUDE_CHOICES.start(), *ALTITUDE_CHOICES.end())
        }
    }
}

// ---------------------------------------------------------------------------
// Displayed chart
// ---------------------------------------------------------------------------

/// Everything drawn for the current chart. Dropping it releases the
/// colorbar and the GPU texture of the contour surface.
pub struct ChartView {
    pub figure: Figure,
    pub colorbar: Option<Colorbar>,
    /// Created lazily by the plot widget from [`Figure::Contour`] data.
    pub texture: Option<egui::TextureHandle>,
}

impl ChartView {
    fn new(figure: Figure) -> Self {
        let colorbar = match &figure {
            Figure::Contour(f) => Some(f.colorbar.clone()),
            Figure::Line(_) => None,
        };
        Self {
            figure,
            colorbar,
            texture: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Folder chosen by the user.
    pub folder: Option<PathBuf>,

    /// Dated logs found in `folder`.
    pub files: Vec<DayFile>,

    /// Index into `files` of the selected log.
    pub selected: Option<usize>,

    pub intervals: IntervalSettings,

    /// Series behind the current chart, kept for the preview table.
    pub series: Option<TimeSeries>,

    /// Currently displayed chart.
    pub chart: Option<ChartView>,

    /// Status / error message shown in the UI.
    pub status: Option<Status>,

    /// Whether the about box is open.
    pub show_about: bool,
}

impl AppState {
    /// Scan a folder and offer its logs in the file selector.
    pub fn open_folder(&mut self, dir: PathBuf) {
        self.files.clear();
        self.selected = None;
        match folder::scan_folder(&dir) {
            Ok(files) if files.is_empty() => {
                log::warn!("No dated .txt logs in {}", dir.display());
                self.status = Some(Status::Warning("No text files found.".into()));
            }
            Ok(files) => {
                log::info!("Found {} logs in {}", files.len(), dir.display());
                self.status = Some(Status::Info(format!(
                    "Folder loaded: {} ({} files)",
                    dir.display(),
                    files.len()
                )));
                self.files = files;
            }
            Err(e) => {
                log::error!("Failed to open folder: {e:#}");
                self.status = Some(Status::Error(format!("Error: {e:#}")));
            }
        }
        self.folder = Some(dir);
    }

    /// Select the log shown as `YYYY-MM-DD` in the date selector.
    pub fn select_date(&mut self, display_date: &str) {
        let Some(file) = folder::find_by_date(&self.files, display_date) else {
            return;
        };
        log::info!("Selected {}", file.file_name);
        self.status = Some(Status::Info(format!("Selected file: {}", file.file_name)));
        self.selected = self.files.iter().position(|f| f == file);
    }

    pub fn selected_file(&self) -> Option<&DayFile> {
        self.selected.and_then(|i| self.files.get(i))
    }

    /// Assemble and validate the request for the current selections.
    pub fn request(&self) -> Result<ChartRequest, String> {
        let file = self
            .selected_file()
            .ok_or_else(|| "Select a file before showing a chart.".to_string())?;
        let (hour_start, hour_end) = self.intervals.hours();
        let (altitude_start, altitude_end) = self.intervals.altitudes();
        let request = ChartRequest {
            path: file.path.clone(),
            hour_start,
            hour_end,
            altitude_start,
            altitude_end,
        };
        request.validate().map_err(|e| e.to_string())?;
        Ok(request)
    }

    /// Drop the displayed chart along with its colorbar and texture.
    pub fn clear_chart(&mut self) {
        if let Some(old) = self.chart.take() {
            log::debug!(
                "Releasing previous {} (colorbar: {})",
                old.figure.kind(),
                old.colorbar.is_some()
            );
        }
    }

    /// Load the selected file and draw the requested chart.
    pub fn show_chart(&mut self, kind: ChartKind) {
        let request = match self.request() {
            Ok(r) => r,
            Err(msg) => {
                log::warn!("Rejected {kind} request: {msg}");
                self.status = Some(Status::Warning(msg));
                return;
            }
        };

        self.clear_chart();

        let series = match loader::load(&request.path, request.hour_start, request.hour_end) {
            Ok(s) => s,
            Err(e) => {
                let e = anyhow::Error::new(e);
                log::error!("Failed to load file: {e:#}");
                self.status = Some(Status::Error(format!("Error: {e:#}")));
                self.series = None;
                return;
            }
        };
        if series.is_empty() {
            self.status = Some(Status::Info(format!(
                "No data between {:02}:00 and {:02}:00.",
                request.hour_start, request.hour_end
            )));
            self.series = Some(series);
            return;
        }

        let figure = match kind {
            ChartKind::Line => render::render_line(
                &series,
                request.altitude_start,
                request.altitude_end,
            )
            .map(Figure::Line),
            ChartKind::Contour => render::render_contour(
                &series,
                request.altitude_start,
                request.altitude_end,
            )
            .map(Figure::Contour),
        };

        match figure {
            Ok(figure) => {
                log::info!("Rendered {kind} for {}", request.path.display());
                self.status = Some(Status::Info(format!(
                    "{} scans, {} temperature columns",
                    series.len(),
                    series.column_count()
                )));
                self.chart = Some(ChartView::new(figure));
            }
            Err(e) => {
                log::warn!("Cannot render {kind}: {e}");
                self.status = Some(Status::Error(format!("Error: {e}")));
            }
        }
        self.series = Some(series);
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::data::loader::PREAMBLE_LINES;

    fn write_log(dir: &std::path::Path, name: &str, columns: usize) {
        let mut file = std::fs::File::create(dir.join(name)).unwrap();
        for i in 0..PREAMBLE_LINES {
            writeln!(file, "preamble {i}").unwrap();
        }
        for minute in 0..4 {
            let temps: Vec<String> = (0..columns)
                .map(|c| format!("{},{}", 15 - c, minute))
                .collect();
            writeln!(file, "15/06/2019 06:0{minute}:00\t{}", temps.join("\t")).unwrap();
        }
    }

    fn state_with_log(columns: usize) -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        write_log(dir.path(), "TPR_20190615.txt", columns);
        let mut state = AppState::default();
        state.open_folder(dir.path().to_path_buf());
        state.select_date("2019-06-15");
        (dir, state)
    }

    #[test]
    fn disabled_selectors_use_full_ranges() {
        let intervals = IntervalSettings::default();
        assert_eq!(intervals.hours(), (0, 24));
        assert_eq!(intervals.altitudes(), (0, 1000));
    }

    #[test]
    fn chart_needs_a_file() {
        let mut state = AppState::default();
        state.show_chart(ChartKind::Line);
        assert!(matches!(state.status, Some(Status::Warning(_))));
        assert!(state.chart.is_none());
    }

    #[test]
    fn inverted_hours_are_rejected_before_loading() {
        let (_dir, mut state) = state_with_log(3);
        state.intervals.time_enabled = true;
        state.intervals.hour_start = 10;
        state.intervals.hour_end = 9;
        state.show_chart(ChartKind::Line);
        assert!(matches!(state.status, Some(Status::Warning(_))));
        assert!(state.series.is_none());
    }

    #[test]
    fn line_chart_truncates_wide_range() {
        let (_dir, mut state) = state_with_log(3);
        state.show_chart(ChartKind::Line);
        let chart = state.chart.as_ref().unwrap();
        match &chart.figure {
            Figure::Line(f) => assert_eq!(f.series.len(), 3),
            other => panic!("unexpected figure {other:?}"),
        }
        assert!(chart.colorbar.is_none());
    }

    #[test]
    fn contour_range_error_clears_previous_chart() {
        let (_dir, mut state) = state_with_log(3);
        state.intervals.altitude_enabled = true;
        state.intervals.altitude_start = 0;
        state.intervals.altitude_end = 100;
        state.show_chart(ChartKind::Contour);
        assert!(state.chart.as_ref().unwrap().colorbar.is_some());

        state.intervals.altitude_end = 1000;
        state.show_chart(ChartKind::Contour);
        assert!(state.chart.is_none());
        assert!(matches!(state.status, Some(Status::Error(_))));
    }

    #[test]
    fn rerender_replaces_colorbar() {
        let (_dir, mut state) = state_with_log(5);
        state.intervals.altitude_enabled = true;
        state.intervals.altitude_end = 200;
        state.show_chart(ChartKind::Contour);
        state.intervals.altitude_end = 100;
        state.show_chart(ChartKind::Contour);
        let chart = state.chart.as_ref().unwrap();
        let Figure::Contour(fig) = &chart.figure else {
            panic!("expected contour");
        };
        assert_eq!(fig.grid.y.len(), 3);
        assert_eq!(chart.colorbar.as_ref(), Some(&fig.colorbar));
    }

    #[test]
    fn empty_window_is_reported_as_info() {
        let (_dir, mut state) = state_with_log(3);
        state.intervals.time_enabled = true;
        state.intervals.hour_start = 12;
        state.intervals.hour_end = 18;
        state.show_chart(ChartKind::Line);
        assert!(state.chart.is_none());
        assert!(matches!(state.status, Some(Status::Info(ref m)) if m.starts_with("No data")));
    }

    #[test]
    fn missing_file_is_reported_as_error() {
        let (dir, mut state) = state_with_log(3);
        std::fs::remove_file(dir.path().join("TPR_20190615.txt")).unwrap();
        state.show_chart(ChartKind::Line);
        assert!(matches!(state.status, Some(Status::Error(ref m)) if m.contains("cannot read")));
    }
}

use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::data::model::{ALTITUDE_STEP_M, TimeSeries};

/// Temperature columns shown in the preview; the rest are left out.
const PREVIEW_COLUMNS: usize = 8;

/// Scrollable table of the loaded scans.
pub fn series_preview(ui: &mut Ui, series: &TimeSeries, altitude_start: i32) {
    let shown = series.column_count().min(PREVIEW_COLUMNS);

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .max_scroll_height(200.0)
        .column(Column::auto().at_least(130.0))
        .columns(Column::auto().at_least(55.0), shown)
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("Time");
            });
            for col in 0..shown {
                header.col(|ui| {
                    ui.strong(format!("{} m", altitude_start + col as i32 * ALTITUDE_STEP_M));
                });
            }
        })
        .body(|body| {
            body.rows(18.0, series.len(), |mut row| {
                let sample = &series.samples()[row.index()];
                row.col(|ui| {
                    ui.label(sample.timestamp.format("%d/%m/%Y %H:%M:%S").to_string());
                });
                for value in sample.temperatures.iter().take(shown) {
                    row.col(|ui| {
                        ui.label(format!("{value:.2}"));
                    });
                }
            });
        });
}

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::model::{ALTITUDE_STEP_M, ChartKind};
use crate::export;
use crate::render::Figure;
use crate::state::{ALTITUDE_CHOICES, AppState, Status};
use crate::ui::table;

/// Pixel size of exported contour images.
const EXPORT_RASTER: [usize; 2] = [1600, 800];

// ---------------------------------------------------------------------------
// Control panel – folder, file and interval widgets
// ---------------------------------------------------------------------------

/// Render the controls used by both layouts.
pub fn control_panel(ui: &mut Ui, state: &mut AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.vertical_centered(|ui: &mut Ui| {
                ui.label(
                    RichText::new(
                        "Altitude-time distribution of air temperature\nfrom MTP-5 profiler data",
                    )
                    .strong()
                    .size(16.0),
                );
            });
            ui.add_space(6.0);

            import_group(ui, state);
            file_group(ui, state);
            interval_group(ui, state);

            ui.group(|ui: &mut Ui| {
                ui.strong("Charts");
                ui.vertical_centered_justified(|ui: &mut Ui| {
                    if ui.button("Show contour chart").clicked() {
                        state.show_chart(ChartKind::Contour);
                    }
                    if ui.button("Show line chart").clicked() {
                        state.show_chart(ChartKind::Line);
                    }
                });
            });

            ui.add_space(6.0);
            ui.vertical_centered_justified(|ui: &mut Ui| {
                if ui.button("Quit").clicked() {
                    ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            if let Some(series) = &state.series {
                ui.add_space(6.0);
                egui::CollapsingHeader::new(format!("Data preview ({} scans)", series.len()))
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        let (altitude_start, _) = state.intervals.altitudes();
                        table::series_preview(ui, series, altitude_start);
                    });
            }
        });
}

fn import_group(ui: &mut Ui, state: &mut AppState) {
    ui.group(|ui: &mut Ui| {
        ui.strong("Import data");
        ui.vertical_centered_justified(|ui: &mut Ui| {
            if ui.button("Add data folder").clicked() {
                open_folder_dialog(state);
            }
        });
        let text = match &state.folder {
            Some(dir) => format!(
                "Folder: {}",
                dir.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| dir.display().to_string())
            ),
            None => "No folder selected".to_string(),
        };
        ui.label(text);
    });
}

fn file_group(ui: &mut Ui, state: &mut AppState) {
    ui.group(|ui: &mut Ui| {
        ui.strong("Select file");
        let current = state
            .selected_file()
            .map(|f| f.display_date())
            .unwrap_or_default();
        let dates: Vec<String> = state.files.iter().map(|f| f.display_date()).collect();

        let mut picked = None;
        egui::ComboBox::from_id_salt("file_date")
            .selected_text(&current)
            .width(ui.available_width() - 8.0)
            .show_ui(ui, |ui: &mut Ui| {
                for date in &dates {
                    if ui.selectable_label(current == *date, date).clicked() {
                        picked = Some(date.clone());
                    }
                }
            });
        if let Some(date) = picked {
            state.select_date(&date);
        }

        match state.selected_file() {
            Some(file) => ui.label(format!("File: {}", file.file_name)),
            None => ui.label("No file selected"),
        };
    });
}

fn interval_group(ui: &mut Ui, state: &mut AppState) {
    let intervals = &mut state.intervals;
    ui.group(|ui: &mut Ui| {
        ui.strong("Intervals");

        ui.checkbox(&mut intervals.time_enabled, "Enable time interval");
        ui.add_enabled_ui(intervals.time_enabled, |ui: &mut Ui| {
            ui.label("Start time:");
            hour_combo(ui, "hour_start", &mut intervals.hour_start, 0..=23);
            ui.label("End time:");
            hour_combo(ui, "hour_end", &mut intervals.hour_end, 1..=24);
        });

        ui.separator();

        ui.checkbox(&mut intervals.altitude_enabled, "Enable altitude range");
        ui.add_enabled_ui(intervals.altitude_enabled, |ui: &mut Ui| {
            let start = *ALTITUDE_CHOICES.start();
            let end = *ALTITUDE_CHOICES.end();
            ui.label("Start altitude (m):");
            altitude_combo(ui, "altitude_start", &mut intervals.altitude_start, start, end);
            ui.label("End altitude (m):");
            altitude_combo(
                ui,
                "altitude_end",
                &mut intervals.altitude_end,
                start + ALTITUDE_STEP_M,
                end,
            );
        });
    });
}

fn hour_combo(ui: &mut Ui, id: &str, value: &mut u32, hours: std::ops::RangeInclusive<u32>) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(format!("{:02}:00", *value))
        .show_ui(ui, |ui: &mut Ui| {
            for h in hours {
                ui.selectable_value(value, h, format!("{h:02}:00"));
            }
        });
}

fn altitude_combo(ui: &mut Ui, id: &str, value: &mut i32, first: i32, last: i32) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(value.to_string())
        .show_ui(ui, |ui: &mut Ui| {
            for alt in (first..=last).step_by(ALTITUDE_STEP_M as usize) {
                ui.selectable_value(value, alt, alt.to_string());
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open folder…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.chart.is_some(), egui::Button::new("Export chart data (CSV)…"))
                .clicked()
            {
                export_csv_dialog(state);
                ui.close_menu();
            }
            let has_contour = matches!(
                state.chart.as_ref().map(|c| &c.figure),
                Some(Figure::Contour(_))
            );
            if ui
                .add_enabled(has_contour, egui::Button::new("Export contour image (PNG)…"))
                .clicked()
            {
                export_png_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Quit").clicked() {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
            }
        });
        ui.menu_button("Help", |ui: &mut Ui| {
            if ui.button("About").clicked() {
                state.show_about = true;
                ui.close_menu();
            }
        });

        ui.separator();
        status_label(ui, state.status.as_ref());
    });
}

fn status_label(ui: &mut Ui, status: Option<&Status>) {
    let Some(status) = status else {
        return;
    };
    let warning = Color32::from_rgb(230, 160, 0);
    match status {
        Status::Info(msg) => ui.label(msg),
        Status::Warning(msg) => ui.label(RichText::new(msg).color(warning)),
        Status::Error(msg) => ui.label(RichText::new(msg).color(Color32::RED)),
    };
}

/// Modal-style about box.
pub fn about_window(ctx: &egui::Context, state: &mut AppState) {
    egui::Window::new("About")
        .open(&mut state.show_about)
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui: &mut Ui| {
            ui.label(
                "Analyse MTP-5 temperature profiles over altitude and time.\n\
                 Choose a data folder, select a file and adjust the intervals.",
            );
        });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_folder_dialog(state: &mut AppState) {
    if let Some(dir) = rfd::FileDialog::new()
        .set_title("Select data folder")
        .pick_folder()
    {
        state.open_folder(dir);
    }
}

fn export_csv_dialog(state: &mut AppState) {
    let Some(view) = &state.chart else {
        return;
    };
    let Some(path) = rfd::FileDialog::new()
        .set_title("Export chart data")
        .add_filter("CSV", &["csv"])
        .set_file_name("chart.csv")
        .save_file()
    else {
        return;
    };

    state.status = Some(match export::save_figure_csv(&view.figure, &path) {
        Ok(()) => {
            log::info!("Exported {} data to {}", view.figure.kind(), path.display());
            Status::Info(format!("Saved {}", path.display()))
        }
        Err(e) => {
            log::error!("CSV export failed: {e:#}");
            Status::Error(format!("Error: {e:#}"))
        }
    });
}

fn export_png_dialog(state: &mut AppState) {
    let Some(Figure::Contour(fig)) = state.chart.as_ref().map(|c| &c.figure) else {
        return;
    };
    let Some(path) = rfd::FileDialog::new()
        .set_title("Export contour image")
        .add_filter("PNG", &["png"])
        .set_file_name("contour.png")
        .save_file()
    else {
        return;
    };

    let raster = fig.rasterize(EXPORT_RASTER[0], EXPORT_RASTER[1]);
    state.status = Some(match export::save_png(&raster, &path) {
        Ok(()) => {
            log::info!("Exported contour image to {}", path.display());
            Status::Info(format!("Saved {}", path.display()))
        }
        Err(e) => {
            log::error!("PNG export failed: {e:#}");
            Status::Error(format!("Error: {e:#}"))
        }
    });
}

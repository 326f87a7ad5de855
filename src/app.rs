use eframe::egui;

use crate::config::{Layout, ViewerConfig};
use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct MtpViewerApp {
    pub state: AppState,
    layout: Layout,
}

impl MtpViewerApp {
    pub fn new(config: &ViewerConfig) -> Self {
        let mut state = AppState::default();
        if let Some(folder) = &config.folder {
            state.open_folder(folder.clone());
        }
        Self {
            state,
            layout: config.layout,
        }
    }

    /// Controls on the left, chart embedded in the same window.
    fn split_layout(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("control_panel")
            .default_width(320.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::control_panel(ui, &mut self.state);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            plot::chart_area(ui, &mut self.state.chart);
        });
    }

    /// Controls fill the main window; the chart opens in a window of its own.
    fn separate_layout(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::control_panel(ui, &mut self.state);
        });

        let Some(view) = &self.state.chart else {
            return;
        };
        let title = view.figure.title().to_string();
        let chart = &mut self.state.chart;
        let mut closed = false;

        ctx.show_viewport_immediate(
            egui::ViewportId::from_hash_of("chart_window"),
            egui::ViewportBuilder::default()
                .with_title(&title)
                .with_inner_size([1100.0, 650.0]),
            |ctx, class| {
                if class == egui::ViewportClass::Embedded {
                    // Backend without multi-window support.
                    let mut open = true;
                    egui::Window::new(&title)
                        .open(&mut open)
                        .default_size([900.0, 550.0])
                        .show(ctx, |ui| plot::chart_area(ui, chart));
                    closed = !open;
                } else {
                    egui::CentralPanel::default().show(ctx, |ui| plot::chart_area(ui, chart));
                    closed = ctx.input(|i| i.viewport().close_requested());
                }
            },
        );

        if closed {
            self.state.clear_chart();
        }
    }
}

impl eframe::App for MtpViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        match self.layout {
            Layout::Split => self.split_layout(ctx),
            Layout::Separate => self.separate_layout(ctx),
        }

        panels::about_window(ctx, &mut self.state);
    }
}

use eframe::egui::{self, Align2, Color32, FontId, Sense, Stroke, Ui, Vec2};
use egui_plot::{Legend, Line, Plot, PlotImage, PlotPoint, PlotPoints, Text};

use crate::color::{Coolwarm, generate_palette};
use crate::render::{Bounds, Colorbar, ContourFigure, Figure, LineFigure, format_time_of_day};
use crate::state::ChartView;

/// Pixel size of the contour texture; the plot scales it to the data extent.
const RASTER_SIZE: [usize; 2] = [900, 450];
const COLORBAR_WIDTH: f32 = 70.0;

// ---------------------------------------------------------------------------
// Chart area
// ---------------------------------------------------------------------------

/// Render the current chart, or a hint when nothing is displayed.
pub fn chart_area(ui: &mut Ui, chart: &mut Option<ChartView>) {
    let Some(view) = chart else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Choose a data folder and a file, then show a chart");
        });
        return;
    };

    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(view.figure.title());
    });

    match &view.figure {
        Figure::Line(fig) => line_plot(ui, fig),
        Figure::Contour(fig) => {
            let texture = view.texture.get_or_insert_with(|| {
                let raster = fig.rasterize(RASTER_SIZE[0], RASTER_SIZE[1]);
                let image = egui::ColorImage::from_rgba_unmultiplied(
                    [raster.width, raster.height],
                    &raster.rgba,
                );
                ui.ctx()
                    .load_texture("contour_surface", image, egui::TextureOptions::NEAREST)
            });
            let texture_id = texture.id();

            ui.horizontal_top(|ui: &mut Ui| {
                let plot_width = (ui.available_width() - COLORBAR_WIDTH).max(100.0);
                ui.allocate_ui(Vec2::new(plot_width, ui.available_height()), |ui: &mut Ui| {
                    contour_plot(ui, fig, texture_id);
                });
                if let Some(colorbar) = &view.colorbar {
                    colorbar_widget(ui, colorbar, &fig.line_levels);
                }
            });
        }
    }
}

fn time_axis_plot(id: &str, x_label: &str, y_label: &str) -> Plot<'static> {
    Plot::new(id.to_owned())
        .x_axis_label(x_label.to_owned())
        .y_axis_label(y_label.to_owned())
        .x_axis_formatter(|mark, _range| format_time_of_day(mark.value))
        .label_formatter(|name, value| {
            let time = format_time_of_day(value.x);
            if name.is_empty() {
                format!("{time}\n{:.2}", value.y)
            } else {
                format!("{name}\n{time}\n{:.2}", value.y)
            }
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
}

/// Make the default view cover the data extent.
fn fit_bounds(plot: Plot<'static>, b: Bounds) -> Plot<'static> {
    plot.include_x(b.x[0])
        .include_x(b.x[1])
        .include_y(b.y[0])
        .include_y(b.y[1])
}

// ---------------------------------------------------------------------------
// Line chart
// ---------------------------------------------------------------------------

fn line_plot(ui: &mut Ui, fig: &LineFigure) {
    ui.weak(format!("Legend: {}", fig.legend_title));
    let colors = generate_palette(fig.series.len());

    let mut plot = time_axis_plot("line_plot", &fig.x_label, &fig.y_label);
    if let Some(b) = fig.bounds() {
        plot = fit_bounds(plot, b);
    }
    plot.legend(Legend::default()).show(ui, |plot_ui| {
        for (series, color) in fig.series.iter().zip(colors) {
            let points: PlotPoints = series.points.clone().into();
            plot_ui.line(
                Line::new(points)
                    .name(&series.label)
                    .color(color)
                    .width(1.5),
            );
        }
    });
}

// ---------------------------------------------------------------------------
// Contour chart
// ---------------------------------------------------------------------------

fn contour_plot(ui: &mut Ui, fig: &ContourFigure, texture_id: egui::TextureId) {
    let b = fig.bounds();
    let centre = PlotPoint::new((b.x[0] + b.x[1]) / 2.0, (b.y[0] + b.y[1]) / 2.0);
    let size = Vec2::new((b.x[1] - b.x[0]) as f32, (b.y[1] - b.y[0]) as f32);

    let plot = fit_bounds(time_axis_plot("contour_plot", &fig.x_label, &fig.y_label), b);
    plot.show(ui, |plot_ui| {
        plot_ui.image(PlotImage::new(texture_id, centre, size));

        for iso in &fig.iso_lines {
            let points: PlotPoints = iso.points.clone().into();
            plot_ui.line(Line::new(points).color(Color32::BLACK).width(0.5));
            if let Some([x, y]) = iso.label_at {
                plot_ui.text(
                    Text::new(
                        PlotPoint::new(x, y),
                        egui::RichText::new(iso.label()).size(11.0),
                    )
                    .color(Color32::BLACK),
                );
            }
        }
    });
}

// ---------------------------------------------------------------------------
// Colorbar
// ---------------------------------------------------------------------------

/// Filled bands with value ticks; iso-line levels are marked across the bar.
fn colorbar_widget(ui: &mut Ui, colorbar: &Colorbar, iso_levels: &[f64]) {
    let height = (ui.available_height() - 40.0).max(120.0);
    let (rect, _) = ui.allocate_exact_size(Vec2::new(COLORBAR_WIDTH, height), Sense::hover());
    let painter = ui.painter_at(rect);

    let bar = egui::Rect::from_min_size(
        rect.min + Vec2::new(4.0, 10.0),
        Vec2::new(16.0, rect.height() - 20.0),
    );
    let scale = colorbar.scale(&Coolwarm::new());
    let bands = scale.band_count();
    let band_height = bar.height() / bands as f32;
    for band in 0..bands {
        // Band 0 (coldest) at the bottom.
        let top = bar.bottom() - (band + 1) as f32 * band_height;
        let band_rect = egui::Rect::from_min_size(
            egui::pos2(bar.left(), top),
            Vec2::new(bar.width(), band_height + 0.5),
        );
        painter.rect_filled(band_rect, 0.0, scale.band_color(band));
    }

    let text_color = ui.visuals().text_color();
    let span = colorbar.max - colorbar.min;
    for &level in iso_levels {
        let y = bar.bottom() - ((level - colorbar.min) / span) as f32 * bar.height();
        painter.line_segment(
            [egui::pos2(bar.left(), y), egui::pos2(bar.right(), y)],
            Stroke::new(1.0, Color32::BLACK),
        );
    }
    for &tick in &colorbar.ticks {
        let y = bar.bottom() - ((tick - colorbar.min) / span) as f32 * bar.height();
        painter.line_segment(
            [egui::pos2(bar.right(), y), egui::pos2(bar.right() + 4.0, y)],
            Stroke::new(1.0, text_color),
        );
        painter.text(
            egui::pos2(bar.right() + 6.0, y),
            Align2::LEFT_CENTER,
            format!("{tick:.1}"),
            FontId::proportional(11.0),
            text_color,
        );
    }

    painter.text(
        egui::pos2(rect.center().x, rect.bottom()),
        Align2::CENTER_BOTTOM,
        &colorbar.label,
        FontId::proportional(11.0),
        text_color,
    );
}

//! Chart Plotter Module
//! Interactive bar and dumbbell charts using egui_plot.

use crate::charts::palette;
use crate::stats::{AggregateRow, ComparisonDataset, DashboardView, Partition};
use egui::{Align2, Color32, RichText};
use egui_plot::{
    Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoint, PlotPoints, Points, Text, VLine,
};

const ROW_HEIGHT: f32 = 26.0;
const MIN_CHART_HEIGHT: f32 = 220.0;
/// Room right of 100% for value labels.
const X_MAX: f64 = 108.0;

pub fn color(rgb: [u8; 3]) -> Color32 {
    Color32::from_rgb(rgb[0], rgb[1], rgb[2])
}

/// Plot y coordinate of the `index`-th of `count` categories; the first is drawn on top.
pub fn category_y(index: usize, count: usize) -> f64 {
    (count - 1 - index) as f64
}

/// Category label for a y-axis grid mark, empty between categories.
pub fn category_label(labels: &[String], y: f64) -> String {
    let rounded = y.round();
    if (y - rounded).abs() > 0.01 || rounded < 0.0 {
        return String::new();
    }
    let from_top = labels.len() as isize - 1 - rounded as isize;
    if from_top < 0 {
        return String::new();
    }
    labels
        .get(from_top as usize)
        .cloned()
        .unwrap_or_default()
}

/// Creates the dashboard charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    fn chart_height(rows: usize) -> f32 {
        (rows as f32 * ROW_HEIGHT + 60.0).max(MIN_CHART_HEIGHT)
    }

    /// Category-axis plot shared by both charts.
    fn category_plot(id: &str, labels: Vec<String>, x_label: &str, y_label: &str) -> Plot<'static> {
        let count = labels.len();
        Plot::new(id.to_string())
            .height(Self::chart_height(count))
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .include_x(0.0)
            .include_x(X_MAX)
            .include_y(-0.6)
            .include_y(count as f64 - 0.4)
            .x_axis_label(x_label.to_string())
            .y_axis_label(y_label.to_string())
            .y_grid_spacer(move |_input| {
                (0..count)
                    .map(|i| GridMark {
                        value: i as f64,
                        step_size: 1.0,
                    })
                    .collect()
            })
            .y_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
    }

    /// Horizontal bar per category, colored against the highlight threshold.
    pub fn draw_bar_chart(ui: &mut egui::Ui, view: &DashboardView) {
        let rows: &[AggregateRow] = &view.bars;
        let labels: Vec<String> = rows.iter().map(|r| r.category.clone()).collect();
        let count = rows.len();
        let threshold = view.threshold;

        Self::category_plot("uptake_bars", labels, view.dose.label(), view.group_by.label()).show(
            ui,
            |plot_ui| {
                let bars: Vec<Bar> = rows
                    .iter()
                    .enumerate()
                    .map(|(i, row)| {
                        Bar::new(category_y(i, count), row.percent)
                            .width(0.7)
                            .fill(color(palette::bar_color(row.percent, threshold)))
                            .name(&row.category)
                    })
                    .collect();
                plot_ui.bar_chart(BarChart::new(bars).horizontal());

                for (i, row) in rows.iter().enumerate() {
                    plot_ui.text(
                        Text::new(
                            PlotPoint::new(row.percent + 1.0, category_y(i, count)),
                            RichText::new(format!("{:.1}", row.percent))
                                .size(11.0)
                                .color(color(palette::LABEL)),
                        )
                        .anchor(Align2::LEFT_CENTER),
                    );
                }

                plot_ui.vline(
                    VLine::new(threshold)
                        .color(Color32::GRAY)
                        .width(1.0)
                        .name("Highlight threshold"),
                );
            },
        );
    }

    /// Selected vs other percent per category, joined by a connector.
    pub fn draw_dumbbell_chart(ui: &mut egui::Ui, comparison: &ComparisonDataset) {
        let categories: Vec<String> = comparison
            .categories()
            .into_iter()
            .map(str::to_string)
            .collect();
        let count = categories.len();
        let selected_name = comparison.partition_label(Partition::Selected);
        let other_name = comparison.partition_label(Partition::Other);

        let mut selected_points: Vec<[f64; 2]> = Vec::new();
        let mut other_points: Vec<[f64; 2]> = Vec::new();
        let mut connectors: Vec<[[f64; 2]; 2]> = Vec::new();

        for (i, category) in categories.iter().enumerate() {
            let y = category_y(i, count);
            let selected = comparison.percent_of(category, Partition::Selected);
            let other = comparison.percent_of(category, Partition::Other);

            if let Some(p) = selected {
                selected_points.push([p, y]);
            }
            if let Some(p) = other {
                other_points.push([p, y]);
            }
            if let (Some(a), Some(b)) = (selected, other) {
                connectors.push([[a, y], [b, y]]);
            }
        }

        Self::category_plot(
            "uptake_dumbbell",
            categories,
            comparison.dose.label(),
            comparison.group_by.label(),
        )
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            for segment in connectors {
                plot_ui.line(
                    Line::new(PlotPoints::from_iter(segment))
                        .color(color(palette::CONNECTOR))
                        .width(3.0),
                );
            }

            plot_ui.points(
                Points::new(PlotPoints::from_iter(selected_points))
                    .radius(5.0)
                    .color(color(palette::SELECTED))
                    .name(selected_name),
            );
            plot_ui.points(
                Points::new(PlotPoints::from_iter(other_points))
                    .radius(5.0)
                    .color(color(palette::OTHER))
                    .name(other_name),
            );
        });
    }
}

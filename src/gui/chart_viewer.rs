//! Chart Viewer Widget
//! Central scrollable panel with the page header, dataset summary and chart cards.

use crate::charts::ChartPlotter;
use crate::data::{Dataset, SOURCE_REPOSITORY};
use crate::stats::DashboardView;
use egui::{Color32, RichText, ScrollArea};
use std::time::SystemTime;

const CARD_SPACING: f32 = 15.0;
const EMPTY_NOTE: &str = "No rows match the current selection";

/// Scrollable chart display area.
#[derive(Default)]
pub struct ChartViewer {
    pub view: Option<DashboardView>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_view(&mut self, view: DashboardView) {
        self.view = Some(view);
    }

    /// Draw header, summary and charts
    pub fn show(&self, ui: &mut egui::Ui, dataset: Option<&Dataset>) {
        Self::draw_header(ui);

        let Some(dataset) = dataset else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };
        Self::draw_summary(ui, dataset);
        ui.add_space(CARD_SPACING);

        let Some(view) = &self.view else {
            return;
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                let title = format!("{} by {}", view.dose.label(), view.group_by.label());
                Self::draw_card(ui, &title, |ui| {
                    if view.bars.is_empty() {
                        ui.label(RichText::new(EMPTY_NOTE).color(Color32::GRAY));
                    } else {
                        ChartPlotter::draw_bar_chart(ui, view);
                    }
                });

                if let Some(comparison) = &view.comparison {
                    ui.add_space(CARD_SPACING);
                    let title = format!(
                        "{} vs other {}",
                        comparison.filter_value,
                        comparison.filter_dimension.label()
                    );
                    Self::draw_card(ui, &title, |ui| {
                        if comparison.is_empty() {
                            ui.label(RichText::new(EMPTY_NOTE).color(Color32::GRAY));
                        } else {
                            ChartPlotter::draw_dumbbell_chart(ui, comparison);
                        }
                    });
                }
            });
    }

    fn draw_header(ui: &mut egui::Ui) {
        ui.label(
            RichText::new("New Zealand COVID-19 Vaccine Stats")
                .size(26.0)
                .strong(),
        );
        ui.label(RichText::new("Vaccine stats by Area, Ethnic Group, Age and Gender").size(16.0));
        ui.horizontal(|ui| {
            ui.label(RichText::new("Source:").size(11.0).color(Color32::GRAY));
            ui.hyperlink_to(
                RichText::new("Ministry of Health - Github").size(11.0),
                SOURCE_REPOSITORY,
            );
        });
        ui.add_space(8.0);
    }

    fn draw_summary(ui: &mut egui::Ui, dataset: &Dataset) {
        let age = SystemTime::now()
            .duration_since(dataset.loaded_at)
            .map(|d| d.as_secs() / 60)
            .unwrap_or(0);

        ui.horizontal(|ui| {
            ui.label(RichText::new(format!("{} rows", dataset.row_count())).size(12.0));
            ui.separator();
            ui.label(
                RichText::new(format!("Population {}", dataset.total_population())).size(12.0),
            );
            ui.separator();
            ui.label(RichText::new(format!("Loaded {} min ago", age)).size(12.0));
            if !dataset.warnings.is_clean() {
                ui.separator();
                ui.label(
                    RichText::new(format!(
                        "{} empty counts, {} rows dropped",
                        dataset.warnings.missing_counts, dataset.warnings.dropped_rows
                    ))
                    .size(12.0)
                    .color(Color32::from_rgb(243, 156, 18)),
                );
            }
        });
    }

    fn draw_card(ui: &mut egui::Ui, title: &str, add_contents: impl FnOnce(&mut egui::Ui)) {
        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(1.0, Color32::from_gray(90)))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(RichText::new(title).size(16.0).strong());
                ui.add_space(8.0);
                add_contents(ui);
            });
    }
}

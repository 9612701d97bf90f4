//! Control Panel Widget
//! Left side panel with the dashboard selection controls.

use crate::data::{Dimension, DoseKind};
use crate::stats::{DashboardQuery, FilterSelection};
use egui::{Color32, ComboBox, RichText};

/// Status line severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

/// Left side control panel with selection, reload and save controls.
pub struct ControlPanel {
    pub dose: DoseKind,
    pub group_by: Dimension,
    pub filter_dimension: Option<Dimension>,
    pub filter_value: String,
    pub threshold: f64,
    /// Distinct values of the filter dimension in the loaded data.
    pub filter_values: Vec<String>,
    pub status: String,
    pub status_kind: StatusKind,
    pub is_loading: bool,
}

impl ControlPanel {
    pub fn new(query: &DashboardQuery) -> Self {
        let (filter_dimension, filter_value) = match query.effective_filter() {
            Some(f) => (Some(f.dimension), f.value.clone()),
            None => (None, String::new()),
        };
        Self {
            dose: query.dose,
            group_by: query.group_by,
            filter_dimension,
            filter_value,
            threshold: query.threshold,
            filter_values: Vec::new(),
            status: "Ready".to_string(),
            status_kind: StatusKind::Info,
            is_loading: false,
        }
    }

    /// Current selection as a pipeline query.
    pub fn query(&self) -> DashboardQuery {
        let filter = self
            .filter_dimension
            .filter(|_| !self.filter_value.is_empty())
            .map(|dimension| FilterSelection {
                dimension,
                value: self.filter_value.clone(),
            });
        DashboardQuery {
            dose: self.dose,
            group_by: self.group_by,
            filter,
            threshold: self.threshold,
        }
    }

    /// Replace the filter value choices, keeping the current value when still offered.
    pub fn update_filter_values(&mut self, values: Vec<String>) {
        if !values.contains(&self.filter_value) {
            self.filter_value = values.first().cloned().unwrap_or_default();
        }
        self.filter_values = values;
    }

    /// Change the group-by axis, dropping a filter on the same axis.
    pub fn set_group_by(&mut self, group_by: Dimension) -> bool {
        self.group_by = group_by;
        if self.filter_dimension == Some(group_by) {
            self.filter_dimension = None;
            self.filter_value.clear();
            self.filter_values.clear();
            return true;
        }
        false
    }

    pub fn set_status(&mut self, kind: StatusKind, status: &str) {
        self.status_kind = kind;
        self.status = status.to_string();
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("NZ Vaccine Stats")
                    .size(22.0)
                    .color(Color32::from_rgb(255, 75, 75)),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Metric =====
        ui.label(RichText::new("X Axis").size(14.0).strong());
        ui.add_space(5.0);
        for dose in DoseKind::ALL {
            if ui.radio_value(&mut self.dose, dose, dose.label()).clicked() {
                action = ControlPanelAction::SelectionChanged;
            }
        }

        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Grouping and filter =====
        let label_width = 90.0;
        let combo_width = 170.0;

        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Y Axis:"));
            ComboBox::from_id_salt("group_by")
                .width(combo_width)
                .selected_text(self.group_by.label())
                .show_ui(ui, |ui| {
                    for dimension in Dimension::ALL {
                        if ui
                            .selectable_label(self.group_by == dimension, dimension.label())
                            .clicked()
                        {
                            action = if self.set_group_by(dimension) {
                                ControlPanelAction::FilterDimensionChanged
                            } else {
                                ControlPanelAction::SelectionChanged
                            };
                        }
                    }
                });
        });

        ui.add_space(5.0);

        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Compare by:"));
            let selected = self.filter_dimension.map(|d| d.label()).unwrap_or("None");
            ComboBox::from_id_salt("filter_dimension")
                .width(combo_width)
                .selected_text(selected)
                .show_ui(ui, |ui| {
                    if ui
                        .selectable_label(self.filter_dimension.is_none(), "None")
                        .clicked()
                    {
                        self.filter_dimension = None;
                        self.filter_value.clear();
                        self.filter_values.clear();
                        action = ControlPanelAction::SelectionChanged;
                    }
                    for dimension in self.group_by.others() {
                        if ui
                            .selectable_label(
                                self.filter_dimension == Some(dimension),
                                dimension.label(),
                            )
                            .clicked()
                        {
                            self.filter_dimension = Some(dimension);
                            action = ControlPanelAction::FilterDimensionChanged;
                        }
                    }
                });
        });

        if self.filter_dimension.is_some() {
            ui.add_space(5.0);
            ui.horizontal(|ui| {
                ui.add_sized([label_width, 20.0], egui::Label::new("Value:"));
                ComboBox::from_id_salt("filter_value")
                    .width(combo_width)
                    .selected_text(&self.filter_value)
                    .show_ui(ui, |ui| {
                        for value in &self.filter_values {
                            if ui
                                .selectable_label(self.filter_value == *value, value)
                                .clicked()
                            {
                                self.filter_value = value.clone();
                                action = ControlPanelAction::SelectionChanged;
                            }
                        }
                    });
            });
        }

        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Highlight =====
        ui.label(
            RichText::new("Highlight vaccine rate lower than percentage")
                .size(13.0)
                .strong(),
        );
        ui.add_space(5.0);
        if ui
            .add(egui::Slider::new(&mut self.threshold, 0.0..=100.0).step_by(1.0))
            .changed()
        {
            action = ControlPanelAction::SelectionChanged;
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Actions =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(!self.is_loading, |ui| {
                let reload = egui::Button::new(RichText::new("⟳ Reload data").size(14.0))
                    .min_size(egui::vec2(180.0, 30.0));
                if ui.add(reload).clicked() {
                    action = ControlPanelAction::Reload;
                }
            });

            ui.add_space(8.0);

            let save = egui::Button::new(RichText::new("💾 Save PNG").size(14.0))
                .min_size(egui::vec2(180.0, 30.0));
            if ui.add(save).clicked() {
                action = ControlPanelAction::SavePng;
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status =====
        if self.is_loading {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(RichText::new(&self.status).size(11.0).color(Color32::GRAY));
            });
        } else {
            let status_color = match self.status_kind {
                StatusKind::Error => Color32::from_rgb(220, 53, 69),
                StatusKind::Success => Color32::from_rgb(40, 167, 69),
                StatusKind::Info => Color32::GRAY,
            };
            ui.label(RichText::new(&self.status).size(11.0).color(status_color));
        }

        action
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    SelectionChanged,
    FilterDimensionChanged,
    Reload,
    SavePng,
}

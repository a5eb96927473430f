//! Control Panel Widget
//! Left side panel with file selection and filter controls.

use chrono::NaiveDate;
use egui::{Color32, ComboBox, RichText, ScrollArea};
use std::path::PathBuf;

use crate::data::loader::DATE_FORMAT;

/// Left side control panel with file selection, hub and date-range filters.
pub struct ControlPanel {
    pub csv_path: Option<PathBuf>,
    pub hubs: Vec<String>,
    pub selected_hubs: Vec<bool>,
    pub dates: Vec<NaiveDate>,
    pub start_idx: usize,
    pub end_idx: usize,
    pub status: String,
    pub download_enabled: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            csv_path: None,
            hubs: Vec::new(),
            selected_hubs: Vec::new(),
            dates: Vec::new(),
            start_idx: 0,
            end_idx: 0,
            status: "Ready".to_string(),
            download_enabled: false,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the hub list after a CSV load. All hubs start selected.
    pub fn update_hubs(&mut self, hubs: Vec<String>) {
        self.selected_hubs = vec![true; hubs.len()];
        self.hubs = hubs;
    }

    /// Update the selectable picked dates, keeping the previous selection
    /// when those dates still exist, otherwise snapping to the full range.
    pub fn update_dates(&mut self, dates: Vec<NaiveDate>) {
        let prev_start = self.dates.get(self.start_idx).copied();
        let prev_end = self.dates.get(self.end_idx).copied();
        self.dates = dates;

        self.start_idx = prev_start
            .and_then(|d| self.dates.iter().position(|x| *x == d))
            .unwrap_or(0);
        self.end_idx = prev_end
            .and_then(|d| self.dates.iter().position(|x| *x == d))
            .unwrap_or_else(|| self.dates.len().saturating_sub(1));

        if self.start_idx > self.end_idx {
            self.start_idx = 0;
            self.end_idx = self.dates.len().saturating_sub(1);
        }
    }

    /// Hub values currently checked.
    pub fn selected_hub_values(&self) -> Vec<String> {
        self.hubs
            .iter()
            .zip(self.selected_hubs.iter())
            .filter(|(_, &selected)| selected)
            .map(|(hub, _)| hub.clone())
            .collect()
    }

    /// Inclusive picked-date range, or `None` when no dates are selectable.
    pub fn selected_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let start = self.dates.get(self.start_idx)?;
        let end = self.dates.get(self.end_idx)?;
        Some((*start, *end))
    }

    /// Set the status line.
    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    /// Draw the control panel.
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🚚 Delivery Dash")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Delivery Status Analysis")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== CSV File Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = self
                        .csv_path
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file selected".to_string());

                    ui.label(RichText::new(&path_text).size(12.0).color(
                        if self.csv_path.is_some() {
                            Color32::WHITE
                        } else {
                            Color32::GRAY
                        },
                    ));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Browse").clicked() {
                            action = ControlPanelAction::BrowseCsv;
                        }
                    });
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Hub Filter Section =====
        ui.label(RichText::new("🏢 Delivery Hubs").size(14.0).strong());
        ui.add_space(5.0);

        if self.hubs.is_empty() {
            ui.label(RichText::new("Load a CSV to see hubs").size(11.0).color(Color32::GRAY));
        } else {
            egui::Frame::none()
                .fill(ui.visuals().widgets.noninteractive.bg_fill)
                .rounding(5.0)
                .inner_margin(5.0)
                .show(ui, |ui| {
                    ScrollArea::vertical()
                        .id_salt("hub_list")
                        .max_height(140.0)
                        .show(ui, |ui| {
                            for (i, hub) in self.hubs.iter().enumerate() {
                                if i < self.selected_hubs.len()
                                    && ui.checkbox(&mut self.selected_hubs[i], hub).changed()
                                {
                                    action = ControlPanelAction::FiltersChanged;
                                }
                            }
                        });
                });

            ui.add_space(5.0);
            ui.horizontal(|ui| {
                if ui.small_button("Select All").clicked() {
                    self.selected_hubs.iter_mut().for_each(|v| *v = true);
                    action = ControlPanelAction::FiltersChanged;
                }
                if ui.small_button("Clear All").clicked() {
                    self.selected_hubs.iter_mut().for_each(|v| *v = false);
                    action = ControlPanelAction::FiltersChanged;
                }
            });
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Date Range Section =====
        ui.label(RichText::new("📅 Picked Date Range").size(14.0).strong());
        ui.add_space(8.0);

        if self.dates.is_empty() {
            ui.label(RichText::new("No picked dates in selection").size(11.0).color(Color32::GRAY));
        } else {
            let label_width = 80.0;
            let combo_width = 150.0;

            ui.horizontal(|ui| {
                ui.add_sized([label_width, 20.0], egui::Label::new("Start Date:"));
                let selected = self.date_label(self.start_idx);
                ComboBox::from_id_salt("start_date")
                    .width(combo_width)
                    .selected_text(selected)
                    .show_ui(ui, |ui| {
                        for (i, date) in self.dates.iter().enumerate() {
                            let label = date.format(DATE_FORMAT).to_string();
                            if ui.selectable_label(self.start_idx == i, label).clicked() {
                                self.start_idx = i;
                                if self.start_idx > self.end_idx {
                                    self.end_idx = self.start_idx;
                                }
                                action = ControlPanelAction::FiltersChanged;
                            }
                        }
                    });
            });

            ui.add_space(5.0);

            ui.horizontal(|ui| {
                ui.add_sized([label_width, 20.0], egui::Label::new("End Date:"));
                let selected = self.date_label(self.end_idx);
                ComboBox::from_id_salt("end_date")
                    .width(combo_width)
                    .selected_text(selected)
                    .show_ui(ui, |ui| {
                        for (i, date) in self.dates.iter().enumerate() {
                            let label = date.format(DATE_FORMAT).to_string();
                            if ui.selectable_label(self.end_idx == i, label).clicked() {
                                self.end_idx = i;
                                if self.end_idx < self.start_idx {
                                    self.start_idx = self.end_idx;
                                }
                                action = ControlPanelAction::FiltersChanged;
                            }
                        }
                    });
            });
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Action Buttons =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.download_enabled, |ui| {
                let button =
                    egui::Button::new(RichText::new("💾 Download Records CSV").size(14.0))
                        .min_size(egui::vec2(200.0, 32.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::DownloadCsv;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.contains("Loaded") || self.status.contains("Exported") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    fn date_label(&self, idx: usize) -> String {
        self.dates
            .get(idx)
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_else(|| "—".to_string())
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseCsv,
    FiltersChanged,
    DownloadCsv,
}

//! Delivery Dash Main Application
//! Main window wiring the control panel to the pivot pipeline.

use crate::data::{DataLoader, FilterStage};
use crate::export::{self, EXPORT_FILE_NAME};
use crate::gui::{ControlPanel, ControlPanelAction, PivotViewer};
use crate::pivot::{build_pivot, eligible_records};
use crate::stats::StatsCalculator;
use egui::SidePanel;

/// Main application window.
pub struct DeliveryApp {
    loader: DataLoader,
    control_panel: ControlPanel,
    viewer: PivotViewer,

    /// A user interaction changed the inputs; rerun the pipeline once.
    dirty: bool,
}

impl DeliveryApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self {
            loader: DataLoader::new(),
            control_panel: ControlPanel::new(),
            viewer: PivotViewer::new(),
            dirty: false,
        }
    }

    /// Handle CSV file selection.
    fn handle_browse_csv(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        else {
            return;
        };

        self.viewer.clear();
        self.control_panel.download_enabled = false;
        self.control_panel.csv_path = Some(path.clone());

        match self.loader.load_csv(&path) {
            Ok(_) => {
                let row_count = self.loader.get_row_count();
                let col_count = self.loader.get_columns().len();
                let hubs = self
                    .loader
                    .get_dataframe()
                    .map(FilterStage::unique_hubs)
                    .unwrap_or_default();

                self.control_panel.update_hubs(hubs);
                self.refresh_date_options();
                self.control_panel
                    .set_status(&format!("Loaded {} rows, {} columns", row_count, col_count));
                self.dirty = true;
            }
            Err(e) => {
                self.control_panel.set_status(&format!("Error: {}", e));
            }
        }
    }

    /// Recompute the selectable picked dates from the hub-filtered table.
    fn refresh_date_options(&mut self) {
        let Some(df) = self.loader.get_dataframe().cloned() else {
            return;
        };

        let hubs = self.control_panel.selected_hub_values();
        let dates = match FilterStage::apply(&df, &hubs, None) {
            Ok(hub_filtered) => FilterStage::unique_picked_dates(&hub_filtered),
            Err(_) => Vec::new(),
        };
        self.control_panel.update_dates(dates);
    }

    /// One full pass: Filter → Aggregate → Summarize → Present.
    fn recompute(&mut self) {
        let Some(df) = self.loader.get_dataframe().cloned() else {
            return;
        };

        let hubs = self.control_panel.selected_hub_values();
        let range = self.control_panel.selected_range();

        let filtered = match FilterStage::apply(&df, &hubs, range) {
            Ok(filtered) => filtered,
            Err(e) => {
                self.control_panel.set_status(&format!("Error: {}", e));
                return;
            }
        };

        let aggregated = eligible_records(&filtered)
            .and_then(|records| Ok((build_pivot(&records)?, records)));

        match aggregated {
            Ok((pivot, records)) => {
                let stats = StatsCalculator::summarize(&pivot);
                self.control_panel.download_enabled = records.height() > 0;
                self.viewer.set_ready(pivot, stats, records);
            }
            Err(e) => {
                // Schema errors degrade to the unaggregated filtered rows.
                self.control_panel.download_enabled = false;
                self.viewer.set_fallback(filtered, e.to_string());
            }
        }
    }

    /// Handle the records download.
    fn handle_download_csv(&mut self) {
        let Some(records) = self.viewer.export_records() else {
            self.control_panel.set_status("No records to export");
            return;
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .set_file_name(EXPORT_FILE_NAME)
            .save_file()
        else {
            return; // User cancelled
        };

        match export::write_csv(&records, &path) {
            Ok(()) => {
                self.control_panel.set_status(&format!(
                    "Exported {} records to {}",
                    records.height(),
                    path.file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| EXPORT_FILE_NAME.to_string())
                ));
            }
            Err(e) => {
                self.control_panel.set_status(&format!("Error: {}", e));
            }
        }
    }
}

impl eframe::App for DeliveryApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::BrowseCsv => self.handle_browse_csv(),
                        ControlPanelAction::FiltersChanged => {
                            self.refresh_date_options();
                            self.dirty = true;
                        }
                        ControlPanelAction::DownloadCsv => self.handle_download_csv(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        if self.dirty {
            self.dirty = false;
            self.recompute();
        }

        // Central panel - Pivot Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            self.viewer.show(ui);
        });
    }
}

//! Pivot Viewer Widget
//! Central panel showing summary metrics, the pivot table with count-scaled
//! emphasis, a daily-totals chart and the underlying records.

use crate::data::loader::{cell_text, DATE_FORMAT};
use crate::pivot::{PivotTable, GRAND_TOTAL_LABEL, STATUS_VOCABULARY, TOTAL_LABEL};
use crate::stats::SummaryStats;
use egui::{Color32, RichText, ScrollArea};
use egui_plot::{Bar, BarChart, Plot};
use polars::prelude::*;

/// Accent used for metric values, chart bars and the cell gradient.
const ACCENT: Color32 = Color32::from_rgb(52, 152, 219);
/// Background of the Grand Total row.
const GRAND_TOTAL_BG: Color32 = Color32::from_rgb(173, 216, 230);

/// Records table display cap.
const MAX_RECORD_ROWS: usize = 200;

/// What the central panel currently shows.
enum ViewState {
    /// Nothing loaded yet.
    Empty,
    /// Aggregation failed on schema; show the unaggregated filtered rows.
    Fallback { rows: DataFrame, message: String },
    /// Full pipeline output.
    Ready {
        pivot: PivotTable,
        stats: SummaryStats,
        records: DataFrame,
    },
}

/// Scrollable results area for the pivot pipeline.
pub struct PivotViewer {
    state: ViewState,
}

impl Default for PivotViewer {
    fn default() -> Self {
        Self {
            state: ViewState::Empty,
        }
    }
}

impl PivotViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all results.
    pub fn clear(&mut self) {
        self.state = ViewState::Empty;
    }

    /// Show the full pipeline output.
    pub fn set_ready(&mut self, pivot: PivotTable, stats: SummaryStats, records: DataFrame) {
        self.state = ViewState::Ready {
            pivot,
            stats,
            records,
        };
    }

    /// Degrade to the unaggregated filtered rows plus a diagnostic.
    pub fn set_fallback(&mut self, rows: DataFrame, message: String) {
        self.state = ViewState::Fallback { rows, message };
    }

    /// The row set the download serializes, when one exists.
    pub fn export_records(&self) -> Option<DataFrame> {
        match &self.state {
            ViewState::Ready { records, .. } => Some(records.clone()),
            _ => None,
        }
    }

    /// Draw the viewer.
    pub fn show(&mut self, ui: &mut egui::Ui) {
        match &self.state {
            ViewState::Empty => {
                ui.centered_and_justified(|ui| {
                    ui.label(RichText::new("No Data").size(20.0));
                });
            }
            ViewState::Fallback { rows, message } => {
                ui.add_space(8.0);
                ui.label(
                    RichText::new(format!("⚠ {}", message))
                        .size(14.0)
                        .color(Color32::from_rgb(220, 53, 69)),
                );
                ui.add_space(8.0);
                ui.label(RichText::new("Filtered Records").size(16.0).strong());
                ui.add_space(5.0);
                Self::draw_records_table(ui, "fallback_records", rows);
            }
            ViewState::Ready {
                pivot,
                stats,
                records,
            } => {
                ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        ui.add_space(8.0);
                        ui.label(RichText::new("Summary Statistics").size(16.0).strong());
                        ui.add_space(5.0);
                        Self::draw_metrics(ui, stats);

                        ui.add_space(15.0);
                        ui.label(
                            RichText::new("Delivery Status Counts by Picked Date")
                                .size(16.0)
                                .strong(),
                        );
                        ui.add_space(5.0);
                        Self::draw_pivot_table(ui, pivot);

                        if !pivot.is_empty() {
                            ui.add_space(15.0);
                            ui.label(RichText::new("Orders per Day").size(16.0).strong());
                            ui.add_space(5.0);
                            Self::draw_daily_totals(ui, pivot);
                        }

                        ui.add_space(15.0);
                        ui.label(
                            RichText::new("Records Included in Pivot Table")
                                .size(16.0)
                                .strong(),
                        );
                        ui.add_space(5.0);
                        Self::draw_records_table(ui, "pivot_records", records);
                        ui.add_space(10.0);
                    });
            }
        }
    }

    fn draw_metrics(ui: &mut egui::Ui, stats: &SummaryStats) {
        ui.horizontal(|ui| {
            Self::metric_card(ui, "Total Orders", stats.total_orders.to_string());
            Self::metric_card(ui, "Unique Dates", stats.unique_dates.to_string());
            Self::metric_card(
                ui,
                "Average Orders per Day",
                format!("{:.1}", stats.avg_orders_per_day),
            );
        });
    }

    fn metric_card(ui: &mut egui::Ui, label: &str, value: String) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(8.0)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.vertical(|ui| {
                    ui.label(RichText::new(label).size(11.0).color(Color32::GRAY));
                    ui.label(RichText::new(value).size(22.0).strong().color(ACCENT));
                });
            });
        ui.add_space(10.0);
    }

    fn draw_pivot_table(ui: &mut egui::Ui, pivot: &PivotTable) {
        if pivot.is_empty() {
            ui.label(
                RichText::new("No records fall inside the current filters")
                    .size(12.0)
                    .color(Color32::GRAY),
            );
            return;
        }

        let max_cell = pivot.max_cell();

        ScrollArea::horizontal()
            .id_salt("pivot_scroll")
            .show(ui, |ui| {
                egui::Grid::new("pivot_table")
                    .striped(true)
                    .min_col_width(70.0)
                    .show(ui, |ui| {
                        ui.label(RichText::new("Picked Date").strong());
                        for status in STATUS_VOCABULARY {
                            ui.label(RichText::new(status).strong());
                        }
                        ui.label(RichText::new(TOTAL_LABEL).strong());
                        ui.end_row();

                        for (row, date) in pivot.dates.iter().enumerate() {
                            ui.label(date.format(DATE_FORMAT).to_string());
                            for count in &pivot.counts[row] {
                                ui.label(Self::heat_cell(*count, max_cell));
                            }
                            ui.label(RichText::new(pivot.totals[row].to_string()).strong());
                            ui.end_row();
                        }

                        // Column-wise sums, visually set apart from the
                        // per-date rows.
                        ui.label(
                            RichText::new(GRAND_TOTAL_LABEL)
                                .strong()
                                .color(Color32::BLACK)
                                .background_color(GRAND_TOTAL_BG),
                        );
                        for count in &pivot.grand_counts {
                            ui.label(
                                RichText::new(count.to_string())
                                    .strong()
                                    .color(Color32::BLACK)
                                    .background_color(GRAND_TOTAL_BG),
                            );
                        }
                        ui.label(
                            RichText::new(pivot.grand_total.to_string())
                                .strong()
                                .color(Color32::BLACK)
                                .background_color(GRAND_TOTAL_BG),
                        );
                        ui.end_row();
                    });
            });
    }

    /// Cell text with background intensity proportional to the count.
    fn heat_cell(count: u32, max_cell: u32) -> RichText {
        let text = RichText::new(count.to_string());
        if count == 0 || max_cell == 0 {
            return text.color(Color32::GRAY);
        }
        let t = count as f32 / max_cell as f32;
        let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t) as u8;
        let background = Color32::from_rgb(
            lerp(38, ACCENT.r()),
            lerp(50, ACCENT.g()),
            lerp(66, ACCENT.b()),
        );
        text.color(Color32::WHITE).background_color(background)
    }

    fn draw_daily_totals(ui: &mut egui::Ui, pivot: &PivotTable) {
        let bars: Vec<Bar> = pivot
            .totals
            .iter()
            .enumerate()
            .map(|(i, total)| Bar::new(i as f64, f64::from(*total)).width(0.6))
            .collect();

        let dates = pivot.dates.clone();
        Plot::new("daily_totals")
            .height(180.0)
            .allow_drag(false)
            .allow_scroll(false)
            .allow_zoom(false)
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round() as usize;
                if (mark.value - idx as f64).abs() < 1e-6 {
                    dates
                        .get(idx)
                        .map(|d| d.format("%m-%d").to_string())
                        .unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).color(ACCENT).name("Orders"));
            });
    }

    fn draw_records_table(ui: &mut egui::Ui, salt: &str, df: &DataFrame) {
        if df.height() == 0 {
            ui.label(RichText::new("No records").size(12.0).color(Color32::GRAY));
            return;
        }

        let shown = df.height().min(MAX_RECORD_ROWS);
        let columns = df.get_columns();

        ScrollArea::both()
            .id_salt(salt.to_string())
            .max_height(280.0)
            .show(ui, |ui| {
                egui::Grid::new(salt.to_string())
                    .striped(true)
                    .min_col_width(90.0)
                    .show(ui, |ui| {
                        for name in df.get_column_names() {
                            ui.label(RichText::new(name.as_str()).strong());
                        }
                        ui.end_row();

                        for i in 0..shown {
                            for column in columns {
                                let text = column
                                    .get(i)
                                    .ok()
                                    .and_then(|v| cell_text(&v))
                                    .unwrap_or_default();
                                ui.label(text);
                            }
                            ui.end_row();
                        }
                    });
            });

        if df.height() > shown {
            ui.label(
                RichText::new(format!("Showing first {} of {} records", shown, df.height()))
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        }
    }
}

//! Delivery Dash - Delivery Order CSV Analysis & Pivot Dashboard
//!
//! A Rust application for analyzing delivery-order CSV exports: filter by
//! hub and picked-date range, pivot order counts by status and date, and
//! export the underlying records.

mod data;
mod export;
mod gui;
mod pivot;
mod stats;

use eframe::egui;
use gui::DeliveryApp;

fn main() -> eframe::Result<()> {
    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([1100.0, 680.0])
            .with_title("Delivery Dash"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Delivery Dash",
        options,
        Box::new(|cc| Ok(Box::new(DeliveryApp::new(cc)))),
    )
}

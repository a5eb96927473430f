//! GUI module - User interface components

mod app;
mod control_panel;
mod pivot_viewer;

pub use app::DeliveryApp;
pub use control_panel::{ControlPanel, ControlPanelAction};
pub use pivot_viewer::PivotViewer;

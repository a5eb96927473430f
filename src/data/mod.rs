//! Data module - CSV loading and filtering

pub mod loader;

mod filter;

pub use filter::{parse_picked_date, FilterError, FilterStage};
pub use loader::{DataLoader, LoaderError};

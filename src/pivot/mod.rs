//! Pivot module - date × status aggregation

mod engine;

pub use engine::{
    build_pivot, eligible_records, PivotError, PivotTable, GRAND_TOTAL_LABEL, STATUS_VOCABULARY,
    TOTAL_LABEL,
};

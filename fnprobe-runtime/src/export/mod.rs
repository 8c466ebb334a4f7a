//! Result file export
//!
//! Call records are written as CSV, one row per call, with one delta column
//! per measured event.

pub mod csv;

pub use csv::{CsvExporter, BASE_COLUMNS};

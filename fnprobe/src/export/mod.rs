//! Edit plan export
//!
//! Writes what the transformer did to each unit as JSON, for tooling that
//! wants to review or replay the insertions rather than the rewritten text.

pub mod edit_plan;

pub use edit_plan::EditPlanExporter;

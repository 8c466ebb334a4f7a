//! # Front-end Ports
//!
//! The instrumentation passes never talk to a parser directly. They consume
//! two capabilities:
//!
//! - [`Frontend`] - `parse(source) -> TranslationUnit`
//! - [`EditApplier`] - `apply(source, edits) -> String`
//!
//! so eligibility, exit-path location and probe injection can be tested
//! against hand-built syntax trees.
//!
//! ## Provided Adapters
//!
//! - **`c_parser`**: tree-sitter C grammar, lowered into the owned model
//! - **`line_markers`**: system/project classification from `# <n> "file"` markers
//! - **`rewriter`**: single-pass insertion of edits into the original text

pub mod c_parser;
pub mod line_markers;
pub mod rewriter;
pub mod syntax;

pub use c_parser::CFrontend;
pub use line_markers::{OriginMap, DEFAULT_SYSTEM_PREFIXES};
pub use rewriter::TextRewriter;
pub use syntax::{Body, FunctionDecl, Statement, StatementKind, TranslationUnit};

use crate::domain::{InstrumentError, SourceEdit};

/// Parses a translation unit into the owned syntax model.
pub trait Frontend {
    /// # Errors
    /// Returns [`InstrumentError::Parse`] when the unit is malformed.
    fn parse(&mut self, source: &str) -> Result<TranslationUnit, InstrumentError>;
}

/// Applies location-based insertions to source text.
pub trait EditApplier {
    /// # Errors
    /// Returns an error if an edit does not address a valid position.
    fn apply(&self, source: &str, edits: &[SourceEdit]) -> Result<String, InstrumentError>;
}

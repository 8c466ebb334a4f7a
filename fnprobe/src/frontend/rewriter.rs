//! Offset-preserving text rewriter
//!
//! All edits address the original text. They are applied in one pass in
//! ascending offset order; edits sharing an offset keep the order in which
//! they were produced, so an entry probe and an exit probe targeting the same
//! spot of an empty body come out as entry-then-exit.

use super::EditApplier;
use crate::domain::{InstrumentError, SourceEdit};

/// Applies insertions to a source buffer
#[derive(Debug, Default, Clone, Copy)]
pub struct TextRewriter;

impl EditApplier for TextRewriter {
    fn apply(&self, source: &str, edits: &[SourceEdit]) -> Result<String, InstrumentError> {
        for edit in edits {
            if edit.offset > source.len() {
                return Err(InstrumentError::EditOutOfBounds {
                    offset: edit.offset,
                    len: source.len(),
                });
            }
            if !source.is_char_boundary(edit.offset) {
                return Err(InstrumentError::EditNotOnCharBoundary(edit.offset));
            }
        }

        let mut ordered: Vec<&SourceEdit> = edits.iter().collect();
        // Stable: equal offsets stay in production order
        ordered.sort_by_key(|edit| edit.offset);

        let inserted: usize = edits.iter().map(|edit| edit.text.len()).sum();
        let mut output = String::with_capacity(source.len() + inserted);
        let mut cursor = 0;
        for edit in ordered {
            output.push_str(&source[cursor..edit.offset]);
            output.push_str(&edit.text);
            cursor = edit.offset;
        }
        output.push_str(&source[cursor..]);

        Ok(output)
    }
}

//! Domain types providing compile-time safety and self-documentation
//!
//! Byte offsets index into the translation unit's source text. Every edit
//! and exit point is expressed against the *original* text; offset
//! bookkeeping while applying edits is the rewriter's job.

use serde::Serialize;
use std::fmt;

/// Half-open byte range `[start, end)` in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start after end");
        Self { start, end }
    }

    #[must_use]
    pub fn len(self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Where a piece of syntax came from, as classified by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// The translation unit itself or a project header
    #[default]
    Project,
    /// A system or otherwise externally supplied header
    System,
}

impl Origin {
    #[must_use]
    pub fn is_system(self) -> bool {
        matches!(self, Origin::System)
    }
}

/// A syntactic location where control leaves a function body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitPoint {
    /// An explicit `return` statement.
    ///
    /// `standalone` is false when the return is the sole, unbraced body of
    /// an `if`/`else`/loop, where inserting a statement in front of it
    /// would change which code the branch controls.
    Explicit { span: Span, standalone: bool },
    /// Control falls off the end: insert before the body's closing brace.
    Implicit { close_brace: usize },
}

impl ExitPoint {
    /// Offset the exit probe is inserted in front of.
    #[must_use]
    pub fn offset(self) -> usize {
        match self {
            ExitPoint::Explicit { span, .. } => span.start,
            ExitPoint::Implicit { close_brace } => close_brace,
        }
    }
}

/// Purpose of a text insertion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditKind {
    /// Probe declarations and the environment hook at the start of the file
    Prologue,
    /// Entry probe after a body's opening brace
    Entry,
    /// Exit probe before an exit point
    Exit,
    /// Closing brace completing a block opened by an `Exit` edit
    Close,
}

/// A literal text insertion at a byte offset of the original source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceEdit {
    pub offset: usize,
    pub text: String,
    pub kind: EditKind,
}

impl SourceEdit {
    pub fn new(offset: usize, text: impl Into<String>, kind: EditKind) -> Self {
        Self {
            offset,
            text: text.into(),
            kind,
        }
    }
}

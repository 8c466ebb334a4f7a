//! Owned syntax model handed from a front-end to the instrumentation passes.
//!
//! The model keeps only what instrumentation needs: function declarations,
//! their bodies, and the statement nesting inside those bodies. It owns its
//! data so passes can be tested against hand-built trees without a parser.

use crate::domain::{Origin, Span};

/// One parsed translation unit
#[derive(Debug, Clone, Default)]
pub struct TranslationUnit {
    pub functions: Vec<FunctionDecl>,
}

/// A function declaration or definition.
#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub name: String,
    pub span: Span,
    pub origin: Origin,
    /// True for definitions, false for prototypes
    pub is_definition: bool,
    /// Parsed body; `None` for prototypes and for bodies the front-end could not parse
    pub body: Option<Body>,
}

/// A function body delimited by braces.
#[derive(Debug, Clone)]
pub struct Body {
    /// From the opening `{` through the closing `}` inclusive
    pub span: Span,
    pub statements: Vec<Statement>,
}

impl Body {
    #[must_use]
    pub fn open_brace(&self) -> usize {
        self.span.start
    }

    #[must_use]
    pub fn close_brace(&self) -> usize {
        self.span.end - 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Return,
    Block,
    /// A function defined inside another body (GNU C); its returns are its own
    NestedFunction,
    Other,
}

/// A statement, or any syntax node nested inside one.
#[derive(Debug, Clone)]
pub struct Statement {
    pub kind: StatementKind,
    pub span: Span,
    pub origin: Origin,
    /// False when this node is the unbraced body of an `if`/`else`/loop
    pub standalone: bool,
    pub children: Vec<Statement>,
}

impl Statement {
    #[must_use]
    pub fn leaf(kind: StatementKind, span: Span) -> Self {
        Self {
            kind,
            span,
            origin: Origin::Project,
            standalone: true,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<Statement>) -> Self {
        self.children = children;
        self
    }

    #[must_use]
    pub fn unbraced(mut self) -> Self {
        self.standalone = false;
        self
    }

    #[must_use]
    pub fn from_system(mut self) -> Self {
        self.origin = Origin::System;
        self
    }
}

//! # Instrumentation Transformer
//!
//! Drives one translation unit through the pipeline:
//!
//! ```text
//! source ──▶ Frontend::parse ──▶ eligibility ──▶ locate_exits ──▶ inject_probes
//!                                                                     │
//! output ◀── EditApplier::apply ◀── prologue edit + all probe edits ◀─┘
//! ```
//!
//! A function is instrumented when it is a definition with a parsed body,
//! is not the program entry point, and does not come from a system header.

use fnprobe_common::EventList;
use log::debug;
use serde::Serialize;

use super::{inject_probes, locate_exits, render_prologue};
use crate::domain::{EditKind, InstrumentError, SourceEdit};
use crate::frontend::{Body, EditApplier, Frontend, FunctionDecl, TextRewriter};

/// Default name of the program entry point
pub const DEFAULT_ENTRY_POINT: &str = "main";

/// Per-run settings
#[derive(Debug, Clone)]
pub struct InstrumentOptions {
    /// Function never instrumented
    pub entry_point: String,
    /// Event selection baked into the startup hook; `None` emits no hook
    pub events: Option<EventList>,
}

impl Default for InstrumentOptions {
    fn default() -> Self {
        Self {
            entry_point: DEFAULT_ENTRY_POINT.to_string(),
            events: Some(EventList::default_pair()),
        }
    }
}

/// Why a function was left untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Declaration,
    EntryPoint,
    SystemHeader,
    NoBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FunctionStatus {
    Instrumented { exits: usize },
    Skipped { reason: SkipReason },
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionReport {
    pub name: String,
    #[serde(flatten)]
    pub status: FunctionStatus,
}

/// Result of instrumenting one translation unit
#[derive(Debug, Clone)]
pub struct Instrumented {
    pub output: String,
    pub edits: Vec<SourceEdit>,
    pub functions: Vec<FunctionReport>,
}

impl Instrumented {
    #[must_use]
    pub fn instrumented_count(&self) -> usize {
        self.functions
            .iter()
            .filter(|f| matches!(f.status, FunctionStatus::Instrumented { .. }))
            .count()
    }
}

/// Decide whether `function` gets probes.
///
/// # Errors
/// Returns the reason the function is skipped.
pub fn eligible_body<'f>(
    function: &'f FunctionDecl,
    entry_point: &str,
) -> Result<&'f Body, SkipReason> {
    if !function.is_definition {
        return Err(SkipReason::Declaration);
    }
    if function.name == entry_point {
        return Err(SkipReason::EntryPoint);
    }
    if function.origin.is_system() {
        return Err(SkipReason::SystemHeader);
    }
    function.body.as_ref().ok_or(SkipReason::NoBody)
}

/// Rewrites translation units through a [`Frontend`] and an [`EditApplier`]
pub struct Transformer<F, A = TextRewriter> {
    frontend: F,
    applier: A,
    options: InstrumentOptions,
}

impl<F: Frontend> Transformer<F> {
    pub fn new(frontend: F, options: InstrumentOptions) -> Self {
        Self {
            frontend,
            applier: TextRewriter,
            options,
        }
    }
}

impl<F: Frontend, A: EditApplier> Transformer<F, A> {
    pub fn with_applier(frontend: F, applier: A, options: InstrumentOptions) -> Self {
        Self {
            frontend,
            applier,
            options,
        }
    }

    /// Instrument one translation unit.
    ///
    /// # Errors
    /// Returns the front-end's diagnostic if the unit cannot be parsed, or an
    /// error if an edit cannot be applied.
    pub fn instrument(&mut self, source: &str) -> Result<Instrumented, InstrumentError> {
        let unit = self.frontend.parse(source)?;

        let prologue = render_prologue(self.options.events.as_ref());
        let mut edits = vec![SourceEdit::new(0, prologue, EditKind::Prologue)];
        let mut functions = Vec::with_capacity(unit.functions.len());

        for function in &unit.functions {
            let status = match eligible_body(function, &self.options.entry_point) {
                Ok(body) => {
                    let exits = locate_exits(body);
                    edits.extend(inject_probes(source, &function.name, body, &exits));
                    FunctionStatus::Instrumented { exits: exits.len() }
                }
                Err(reason) => {
                    debug!("skipping {}: {reason:?}", function.name);
                    FunctionStatus::Skipped { reason }
                }
            };
            functions.push(FunctionReport {
                name: function.name.clone(),
                status,
            });
        }

        let output = self.applier.apply(source, &edits)?;
        Ok(Instrumented {
            output,
            edits,
            functions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Origin, Span};
    use crate::frontend::{Statement, StatementKind, TranslationUnit};

    /// Serves a prebuilt tree regardless of the input text
    struct FakeFrontend(TranslationUnit);

    impl Frontend for FakeFrontend {
        fn parse(&mut self, _source: &str) -> Result<TranslationUnit, InstrumentError> {
            Ok(self.0.clone())
        }
    }

    struct FailingFrontend;

    impl Frontend for FailingFrontend {
        fn parse(&mut self, _source: &str) -> Result<TranslationUnit, InstrumentError> {
            Err(InstrumentError::Parse {
                line: 2,
                column: 5,
                message: "expected `;`".into(),
            })
        }
    }

    fn definition(name: &str, source: &str, origin: Origin) -> FunctionDecl {
        let start = source.find(&format!(" {name}(")).unwrap() + 1;
        let open = start + source[start..].find('{').unwrap();
        let close = open + source[open..].find('}').unwrap();
        let statements = source[open..=close]
            .match_indices("return")
            .map(|(i, _)| {
                let at = open + i;
                let end = at + source[at..].find(';').unwrap() + 1;
                Statement::leaf(StatementKind::Return, Span::new(at, end))
            })
            .collect();
        FunctionDecl {
            name: name.to_string(),
            span: Span::new(start, close + 1),
            origin,
            is_definition: true,
            body: Some(Body {
                span: Span::new(open, close + 1),
                statements,
            }),
        }
    }

    const SOURCE: &str =
        "int one(void) { return 1; }\nvoid two(void) { }\nint main(void) { return 0; }\n";

    fn skipped(reason: SkipReason) -> FunctionStatus {
        FunctionStatus::Skipped { reason }
    }

    fn transformer(unit: TranslationUnit) -> Transformer<FakeFrontend> {
        Transformer::new(FakeFrontend(unit), InstrumentOptions::default())
    }

    fn unit() -> TranslationUnit {
        TranslationUnit {
            functions: vec![
                definition("one", SOURCE, Origin::Project),
                definition("two", SOURCE, Origin::Project),
                definition("main", SOURCE, Origin::Project),
            ],
        }
    }

    #[test]
    fn test_skips_entry_point() {
        let result = transformer(unit()).instrument(SOURCE).unwrap();

        assert!(result.output.contains("fnprobe_entry(\"one\")"));
        assert!(result.output.contains("fnprobe_entry(\"two\")"));
        assert!(!result.output.contains("fnprobe_entry(\"main\")"));
        assert!(!result.output.contains("fnprobe_exit(\"main\")"));
        assert_eq!(result.instrumented_count(), 2);
        assert_eq!(result.functions[2].status, skipped(SkipReason::EntryPoint));
    }

    #[test]
    fn test_prologue_is_first() {
        let result = transformer(unit()).instrument(SOURCE).unwrap();

        assert_eq!(result.edits[0].kind, EditKind::Prologue);
        assert!(result.output.starts_with("/* fnprobe instrumentation */"));
        let hook = "setenv(\"FNPROBE_EVENTS\", \"instructions,L1-dcache-load-misses\", 1);";
        assert!(result.output.contains(hook));
    }

    #[test]
    fn test_one_exit_edit_per_return() {
        let result = transformer(unit()).instrument(SOURCE).unwrap();

        let return_at = SOURCE.find("return 1").unwrap();
        let edits = &result.edits;
        let exits: Vec<&SourceEdit> = edits.iter().filter(|e| e.kind == EditKind::Exit).collect();
        // one: explicit return, two: implicit end of body
        assert_eq!(exits.len(), 2);
        assert_eq!(exits[0].offset, return_at);
        assert_eq!(exits[1].offset, SOURCE.find("{ }").unwrap() + 2);
    }

    #[test]
    fn test_system_and_declarations_skipped() {
        let mut header = definition("one", SOURCE, Origin::System);
        header.name = "from_header".into();
        let prototype = FunctionDecl {
            name: "proto".into(),
            span: Span::new(0, 0),
            origin: Origin::Project,
            is_definition: false,
            body: None,
        };
        let mut no_body = definition("two", SOURCE, Origin::Project);
        no_body.body = None;

        let tu = TranslationUnit {
            functions: vec![header, prototype, no_body],
        };
        let result = transformer(tu).instrument(SOURCE).unwrap();

        let functions = &result.functions;
        let reasons: Vec<FunctionStatus> = functions.iter().map(|f| f.status.clone()).collect();
        assert_eq!(
            reasons,
            vec![
                skipped(SkipReason::SystemHeader),
                skipped(SkipReason::Declaration),
                skipped(SkipReason::NoBody),
            ]
        );
        assert_eq!(result.edits.len(), 1);
    }

    #[test]
    fn test_custom_entry_point() {
        let options = InstrumentOptions {
            entry_point: "one".into(),
            events: None,
        };
        let mut transformer = Transformer::new(FakeFrontend(unit()), options);
        let result = transformer.instrument(SOURCE).unwrap();

        assert!(!result.output.contains("fnprobe_entry(\"one\")"));
        assert!(result.output.contains("fnprobe_entry(\"main\")"));
        assert!(!result.output.contains("setenv"));
    }

    #[test]
    fn test_parse_failure_propagates() {
        let mut transformer = Transformer::new(FailingFrontend, InstrumentOptions::default());
        let err = transformer.instrument("int x").unwrap_err();
        assert_eq!(err.to_string(), "2:5: parse error: expected `;`");
    }
}

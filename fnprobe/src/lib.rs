//! # fnprobe - Automatic Function Probe Instrumentation for C
//!
//! fnprobe rewrites C translation units so that every function body is
//! bracketed by calls into a profiling runtime. The runtime
//! (`fnprobe-runtime`) pairs those calls into timed, counter-annotated
//! records and writes them as CSV when the program exits.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    C translation unit (.c/.i)                │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │ text
//!                                ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      fnprobe (This Crate)                    │
//! │                                                              │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐      │
//! │  │   Frontend   │──▶│   Locator    │──▶│   Injector   │      │
//! │  │ (tree-sitter)│   │ (exit paths) │   │ (probe text) │      │
//! │  └──────────────┘   └──────────────┘   └──────┬───────┘      │
//! │                                               │ edits        │
//! │  ┌──────────────┐   ┌──────────────┐          ▼              │
//! │  │   Prologue   │──▶│   Rewriter   │◀─────────┘              │
//! │  │ (setenv hook)│   │ (EditApplier)│──▶ edit plan (JSON)     │
//! │  └──────────────┘   └──────┬───────┘                         │
//! └────────────────────────────┼─────────────────────────────────┘
//!                              │ instrumented source
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │        compiled program + libfnprobe_runtime.a               │
//! │   fnprobe_entry / fnprobe_exit ──▶ function_metrics.csv      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`frontend`]: parser and edit-application ports plus the C adapter
//!   - `c_parser`: tree-sitter C grammar lowered into an owned syntax model
//!   - `line_markers`: system header detection from preprocessor markers
//!
//! - [`instrument`]: the passes that decide what to insert and where
//!
//! - [`export`]: JSON edit plan for inspection
//!
//! - [`cli`]: Command-line argument parsing
//!
//! - [`domain`]: Spans, exit points, edits and error types
//!
//! ## Typical Usage
//!
//! ```bash
//! fnprobe app.c --events cycles,instructions -o app.probed.c
//! cc app.probed.c -L target/release -lfnprobe_runtime -lpthread -ldl -o app
//! ./app   # writes function_metrics.csv
//! ```
//!
//! The event selection is fixed at instrumentation time: the emitted
//! constructor overwrites `FNPROBE_EVENTS` before `main`, so setting it when
//! launching the program has no effect. Pick events with `--events`.

pub mod cli;
pub mod domain;
pub mod export;
pub mod frontend;
pub mod instrument;

//! # fnprobe-runtime - Per-Call Profiling Runtime
//!
//! Linked into programs instrumented by `fnprobe`. Every instrumented
//! function calls [`ffi::fnprobe_entry`] on entry and [`ffi::fnprobe_exit`]
//! before each return; the runtime pairs them into timed records annotated
//! with hardware counter deltas and writes them as CSV at process exit.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │              Instrumented C program (any thread)            │
//! └───────────────┬─────────────────────────────┬───────────────┘
//!                 │ fnprobe_entry(name)         │ fnprobe_exit(name)
//!                 ▼                             ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  ffi: process-wide Runtime<PerfBackend>, atexit hook        │
//! │                                                             │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐     │
//! │  │  Thread slot │──▶│   CallLog    │──▶│ CsvExporter  │     │
//! │  │ (call + set) │   │ (Mutex<Vec>) │   │  (shutdown)  │     │
//! │  └──────┬───────┘   └──────────────┘   └──────┬───────┘     │
//! │         │ start/read/stop                     │             │
//! │         ▼                                     ▼             │
//! │  ┌──────────────┐                  function_metrics.csv     │
//! │  │ perf_event   │                                           │
//! │  │   Group      │                                           │
//! │  └──────────────┘                                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`collector`]: [`Runtime`] state machine, per-thread slots, call log
//! - [`counters`]: backend/event-set traits, perf backend, event catalog
//! - [`export`]: CSV result file
//! - [`ffi`]: the C ABI probes
//! - [`domain`]: timestamps, snapshots, records and error types
//!
//! ## C Interface
//!
//! `include/fnprobe.h` declares the two entry points for programs
//! instrumented by hand; `examples/simple.c` is such a program, with build steps in its
//! header comment. Sources rewritten by `fnprobe` carry their own
//! declarations.
//!
//! ## Configuration
//!
//! | Variable         | Meaning                                    | Default                  |
//! |------------------|--------------------------------------------|--------------------------|
//! | `FNPROBE_EVENTS` | comma-separated events, at most 4          | `instructions,L1-dcache-load-misses` |
//! | `FNPROBE_OUTPUT` | result file                                | `function_metrics.csv`   |
//! | `FNPROBE_LOG`    | `env_logger` filter                        | `warn`                   |
//!
//! Programs rewritten by `fnprobe` set `FNPROBE_EVENTS` from a constructor
//! before `main`, replacing any value given at launch.

pub mod collector;
pub mod counters;
pub mod domain;
pub mod export;
pub mod ffi;

pub use collector::{EntryOutcome, ExitOutcome, Runtime, RuntimeConfig, RuntimeStats};

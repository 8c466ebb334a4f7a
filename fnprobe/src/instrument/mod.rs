//! # Instrumentation Passes
//!
//! - **`locator`**: finds every exit point of a function body
//! - **`injector`**: turns exit points into entry/exit probe edits
//! - **`prologue`**: declarations and startup hook prepended to each unit
//! - **`transformer`**: per-unit driver tying the passes to a front-end

pub mod injector;
pub mod locator;
pub mod prologue;
pub mod transformer;

pub use injector::inject_probes;
pub use locator::locate_exits;
pub use prologue::{render_prologue, INIT_HOOK_NAME};
pub use transformer::{
    eligible_body, FunctionReport, FunctionStatus, InstrumentOptions, Instrumented, SkipReason,
    Transformer, DEFAULT_ENTRY_POINT,
};

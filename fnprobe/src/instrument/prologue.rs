//! Instrumentation prologue and environment initializer
//!
//! Text inserted at the very start of every instrumented unit. It declares
//! the runtime's probe functions and, when an event selection is given,
//! a constructor that exports it before `main` runs:
//!
//! ```c
//! #include <stdlib.h>
//! extern void fnprobe_entry(const char *func_name);
//! extern void fnprobe_exit(const char *func_name);
//! static void __fnprobe_init_env(void) __attribute__((constructor));
//! static void __fnprobe_init_env(void) {
//!     setenv("FNPROBE_EVENTS", "cycles,instructions", 1);
//! }
//! ```
//!
//! The runtime reads the variable on its first probe, which happens after
//! constructors have run.

use std::fmt::Write;

use fnprobe_common::{EventList, ENTRY_PROBE_SYMBOL, EVENTS_ENV_VAR, EXIT_PROBE_SYMBOL};

/// Name of the generated constructor
pub const INIT_HOOK_NAME: &str = "__fnprobe_init_env";

/// Render the prologue for one translation unit.
///
/// Without an event selection only the probe declarations are emitted and
/// the runtime falls back to its default events.
#[must_use]
pub fn render_prologue(events: Option<&EventList>) -> String {
    let mut text = String::new();

    text.push_str("/* fnprobe instrumentation */\n");
    if events.is_some() {
        text.push_str("#include <stdlib.h>\n");
    }
    for symbol in [ENTRY_PROBE_SYMBOL, EXIT_PROBE_SYMBOL] {
        let _ = writeln!(text, "extern void {symbol}(const char *func_name);");
    }

    if let Some(events) = events {
        let _ = writeln!(
            text,
            "static void {INIT_HOOK_NAME}(void) __attribute__((constructor));"
        );
        let _ = writeln!(text, "static void {INIT_HOOK_NAME}(void) {{");
        // EventList only admits characters that need no escaping
        let _ = writeln!(text, "    setenv(\"{EVENTS_ENV_VAR}\", \"{events}\", 1);");
        text.push_str("}\n");
    }

    text.push('\n');
    text
}

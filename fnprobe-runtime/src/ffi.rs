//! # C Probe Interface
//!
//! The two symbols instrumented code calls:
//!
//! ```c
//! void fnprobe_entry(const char *func_name);
//! void fnprobe_exit(const char *func_name);
//! ```
//!
//! C callers declare them through `include/fnprobe.h`. Both drive one
//! process-wide [`Runtime`] over [`PerfBackend`], created on
//! the first probe. Creation also sets up logging (`FNPROBE_LOG`, default
//! `warn`) and registers an `atexit` hook that writes the result file.
//! Initialization failures are fatal: the error is logged and the process
//! exits with status 1.

#![allow(unsafe_code)] // C ABI entry points and atexit() require unsafe

use std::borrow::Cow;
use std::ffi::{c_char, CStr};
use std::sync::OnceLock;

use fnprobe_common::LOG_ENV_VAR;
use log::error;

use crate::collector::{Runtime, RuntimeConfig};
use crate::counters::PerfBackend;
use crate::domain::RuntimeError;

static RUNTIME: OnceLock<Runtime<PerfBackend>> = OnceLock::new();

fn runtime() -> &'static Runtime<PerfBackend> {
    RUNTIME.get_or_init(|| {
        init_logging();
        let runtime = Runtime::builder(PerfBackend::new())
            .config(RuntimeConfig::from_env())
            .build();
        // SAFETY: shutdown_at_exit is a valid extern "C" fn with no arguments
        if unsafe { libc::atexit(shutdown_at_exit) } != 0 {
            log::warn!("fnprobe: could not register exit hook; results will not be written");
        }
        runtime
    })
}

fn init_logging() {
    let env = env_logger::Env::new().filter_or(LOG_ENV_VAR, "warn");
    // The host program may already have installed a logger
    let _ = env_logger::Builder::from_env(env).try_init();
}

extern "C" fn shutdown_at_exit() {
    if let Some(runtime) = RUNTIME.get() {
        if let Err(e) = runtime.shutdown() {
            error!("fnprobe: failed to write results: {e}");
        }
    }
}

fn fatal(err: &RuntimeError) -> ! {
    error!("fnprobe: {err}");
    std::process::exit(1)
}

/// Probe label for a C string; null becomes `<null>`, invalid UTF-8 is replaced.
///
/// # Safety
/// `name` must be null or point to a NUL-terminated string.
unsafe fn probe_name<'a>(name: *const c_char) -> Cow<'a, str> {
    if name.is_null() {
        Cow::Borrowed("<null>")
    } else {
        CStr::from_ptr(name).to_string_lossy()
    }
}

/// Entry probe, inserted as the first statement of each instrumented function.
///
/// # Safety
/// `func_name` must be null or point to a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn fnprobe_entry(func_name: *const c_char) {
    let name = probe_name(func_name);
    if let Err(e) = runtime().entry(&name) {
        fatal(&e);
    }
}

/// Exit probe, inserted before each exit point of an instrumented function.
///
/// An exit before any entry has nothing to close and is ignored.
///
/// # Safety
/// `func_name` must be null or point to a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn fnprobe_exit(func_name: *const c_char) {
    if let Some(runtime) = RUNTIME.get() {
        runtime.exit(&probe_name(func_name));
    }
}

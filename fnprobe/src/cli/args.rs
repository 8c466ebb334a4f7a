//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

use fnprobe_common::DEFAULT_EVENTS;

#[derive(Parser)]
#[command(
    name = "fnprobe",
    about = "Insert entry/exit performance probes into C functions",
    after_help = "\
EXAMPLES:
    fnprobe app.c -o app.probed.c                    Instrument with the default events
    fnprobe --events cycles,instructions a.c b.c     Several units to stdout
    fnprobe app.i -- -isystem /opt/sdk/include       Extra system header directory"
)]
pub struct Args {
    /// C translation units to instrument (preprocessed output is supported)
    #[arg(value_name = "SOURCE", required = true)]
    pub sources: Vec<PathBuf>,

    /// Comma-separated counter events, at most 4
    #[arg(long, value_name = "LIST", default_value_t = DEFAULT_EVENTS.join(","))]
    pub events: String,

    /// Function left uninstrumented
    #[arg(long, value_name = "NAME", default_value = "main")]
    pub entry_point: String,

    /// Write instrumented source here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Export the computed edits as JSON
    #[arg(long, value_name = "FILE")]
    pub emit_edits: Option<PathBuf>,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,

    /// Compiler-style flags for the front-end (only -isystem is used)
    #[arg(last = true, value_name = "FRONTEND_FLAGS")]
    pub frontend_flags: Vec<String>,
}

impl Args {
    /// Directories named by `-isystem <dir>` or `-isystem<dir>`.
    #[must_use]
    pub fn system_include_dirs(&self) -> Vec<String> {
        system_include_dirs(&self.frontend_flags)
    }
}

fn system_include_dirs(flags: &[String]) -> Vec<String> {
    let mut dirs = Vec::new();
    let mut iter = flags.iter();
    while let Some(flag) = iter.next() {
        match flag.strip_prefix("-isystem") {
            Some("") => {
                if let Some(dir) = iter.next() {
                    dirs.push(with_trailing_slash(dir));
                }
            }
            Some(dir) => dirs.push(with_trailing_slash(dir)),
            None => log::debug!("ignoring front-end flag {flag}"),
        }
    }
    dirs
}

fn with_trailing_slash(dir: &str) -> String {
    if dir.ends_with('/') {
        dir.to_string()
    } else {
        format!("{dir}/")
    }
}

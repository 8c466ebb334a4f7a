//! Probe injection
//!
//! Turns a function's exit points into text insertions:
//!
//! ```text
//! int clamp(int v) {                 int clamp(int v) {
//!     if (v < 0) return 0;      ->       fnprobe_entry("clamp");
//!     return v;                          if (v < 0) { fnprobe_exit("clamp"); return 0; }
//! }                                      fnprobe_exit("clamp");
//!                                        return v;
//!                                    }
//! ```
//!
//! Layout follows the surrounding lines where it can; beyond that,
//! formatting is not preserved.

use fnprobe_common::{ENTRY_PROBE_SYMBOL, EXIT_PROBE_SYMBOL};

use crate::domain::{EditKind, ExitPoint, SourceEdit};
use crate::frontend::Body;

const INDENT_STEP: &str = "    ";

/// Edits bracketing `body` with entry and exit probes for `name`.
///
/// The first edit is always the entry probe, followed by the exit edits in
/// the order of `exits`.
#[must_use]
pub fn inject_probes(
    source: &str,
    name: &str,
    body: &Body,
    exits: &[ExitPoint],
) -> Vec<SourceEdit> {
    let literal = c_string_literal(name);
    let entry_call = format!("{ENTRY_PROBE_SYMBOL}({literal});");
    let exit_call = format!("{EXIT_PROBE_SYMBOL}({literal});");

    let mut edits = Vec::with_capacity(exits.len() + 1);
    edits.push(entry_edit(source, body, &entry_call));

    for exit in exits {
        match *exit {
            ExitPoint::Explicit { span, standalone } if standalone => {
                let text = match line_indent(source, span.start) {
                    Some(indent) => format!("{exit_call}\n{indent}"),
                    None => format!("{exit_call} "),
                };
                edits.push(SourceEdit::new(span.start, text, EditKind::Exit));
            }
            ExitPoint::Explicit { span, .. } => {
                edits.push(SourceEdit::new(span.start, format!("{{ {exit_call} "), EditKind::Exit));
                edits.push(SourceEdit::new(span.end, " }", EditKind::Close));
            }
            ExitPoint::Implicit { close_brace } => {
                let text = match line_indent(source, close_brace) {
                    Some(indent) => format!("{INDENT_STEP}{exit_call}\n{indent}"),
                    None => format!("{exit_call} "),
                };
                edits.push(SourceEdit::new(close_brace, text, EditKind::Exit));
            }
        }
    }

    edits
}

fn entry_edit(source: &str, body: &Body, entry_call: &str) -> SourceEdit {
    let after_brace = body.open_brace() + 1;
    let rest = &source[after_brace..];
    let next = rest.len() - rest.trim_start().len();
    let gap = &rest[..next];

    let text = match gap.rfind('\n') {
        // Body continues on a later line: match its indentation
        Some(newline) if next < rest.len() && after_brace + next != body.close_brace() => {
            let indent = &gap[newline + 1..];
            format!("\n{indent}{entry_call}")
        }
        Some(_) => {
            let outer = line_indent_of_line(source, body.open_brace());
            format!("\n{outer}{INDENT_STEP}{entry_call}")
        }
        None => format!(" {entry_call}"),
    };

    SourceEdit::new(after_brace, text, EditKind::Entry)
}

/// Whitespace before `offset` when it is the first non-blank character of its line.
fn line_indent(source: &str, offset: usize) -> Option<&str> {
    let line_start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
    let prefix = &source[line_start..offset];
    let blank = prefix.chars().all(|c| c == ' ' || c == '\t');
    blank.then_some(prefix)
}

/// Leading whitespace of the line containing `offset`.
fn line_indent_of_line(source: &str, offset: usize) -> &str {
    let line_start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
    let line = &source[line_start..];
    let width = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..width]
}

/// Quote `name` as a C string literal.
fn c_string_literal(name: &str) -> String {
    let mut literal = String::with_capacity(name.len() + 2);
    literal.push('"');
    for c in name.chars() {
        if c == '"' || c == '\\' {
            literal.push('\\');
        }
        literal.push(c);
    }
    literal.push('"');
    literal
}

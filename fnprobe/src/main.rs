//! # fnprobe - Main Entry Point
//!
//! Instruments each SOURCE independently. A unit that fails to parse is
//! reported and skipped; the others are still written. Instrumented text goes
//! to `--output` or stdout, progress to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use fnprobe_common::{EventList, EventListError};
use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use fnprobe::cli::Args;
use fnprobe::export::EditPlanExporter;
use fnprobe::frontend::{CFrontend, DEFAULT_SYSTEM_PREFIXES};
use fnprobe::instrument::{InstrumentOptions, Instrumented, Transformer};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    if err.chain().any(|cause| cause.is::<EventListError>()) {
        EXIT_USAGE
    } else {
        EXIT_ERROR
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let events = EventList::parse(&args.events).context("--events")?;
    let options = InstrumentOptions {
        entry_point: args.entry_point.clone(),
        events: Some(events),
    };

    let mut system_prefixes: Vec<String> = DEFAULT_SYSTEM_PREFIXES
        .iter()
        .map(|p| (*p).to_string())
        .collect();
    system_prefixes.extend(args.system_include_dirs());
    debug!("system header prefixes: {system_prefixes:?}");

    let frontend = CFrontend::new()
        .context("Failed to initialize the C front-end")?
        .with_system_prefixes(system_prefixes);
    let mut transformer = Transformer::new(frontend, options);

    let mut output: Box<dyn Write> = match args.output {
        Some(ref path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    };
    let mut plan = args.emit_edits.as_ref().map(|_| EditPlanExporter::new());

    let mut failed = 0usize;
    for source in &args.sources {
        match instrument_file(&mut transformer, source) {
            Ok(result) => {
                output
                    .write_all(result.output.as_bytes())
                    .context("Failed to write instrumented source")?;
                if !args.quiet {
                    eprintln!(
                        "instrumented: {} ({} functions)",
                        source.display(),
                        result.instrumented_count()
                    );
                }
                info!("{}: {} edits", source.display(), result.edits.len());
                if let Some(ref mut plan) = plan {
                    plan.add_unit(source, &result);
                }
            }
            Err(e) => {
                failed += 1;
                eprintln!("error: {e:#}");
            }
        }
    }
    output.flush().context("Failed to flush output")?;

    if let (Some(plan), Some(path)) = (plan, args.emit_edits.as_ref()) {
        let file = File::create(path)
            .with_context(|| format!("Failed to create edit plan {}", path.display()))?;
        let units = plan.unit_count();
        plan.export(BufWriter::new(file))
            .context("Failed to export edit plan")?;
        if !args.quiet {
            eprintln!("edit plan: {} ({units} units)", path.display());
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} units failed", args.sources.len());
    }
    Ok(())
}

fn instrument_file(
    transformer: &mut Transformer<CFrontend>,
    path: &Path,
) -> Result<Instrumented> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    transformer
        .instrument(&source)
        .with_context(|| path.display().to_string())
}

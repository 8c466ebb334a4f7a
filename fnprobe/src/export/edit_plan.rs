use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::domain::{ExportError, SourceEdit};
use crate::instrument::{FunctionReport, Instrumented};

/// One translation unit in the plan
#[derive(Debug, Clone, Serialize)]
struct UnitPlan {
    /// Path of the unit as given on the command line
    source: String,
    functions: Vec<FunctionReport>,
    /// Insertions in the order they were generated
    edits: Vec<SourceEdit>,
}

#[derive(Debug, Serialize)]
struct EditPlan<'a> {
    units: &'a [UnitPlan],
}

/// Collects per-unit results and serializes them as one document:
///
/// ```json
/// { "units": [ { "source": "a.c", "functions": [...], "edits": [...] } ] }
/// ```
#[derive(Debug, Default)]
pub struct EditPlanExporter {
    units: Vec<UnitPlan>,
}

impl EditPlanExporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_unit(&mut self, source: &Path, result: &Instrumented) {
        self.units.push(UnitPlan {
            source: source.display().to_string(),
            functions: result.functions.clone(),
            edits: result.edits.clone(),
        });
    }

    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Write the plan as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns an error if serialization or the underlying write fails.
    pub fn export<W: Write>(&self, mut writer: W) -> Result<(), ExportError> {
        let plan = EditPlan { units: &self.units };
        serde_json::to_writer_pretty(&mut writer, &plan)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EditKind;
    use crate::instrument::{FunctionStatus, SkipReason};

    fn report(name: &str, status: FunctionStatus) -> FunctionReport {
        FunctionReport {
            name: name.into(),
            status,
        }
    }

    fn sample() -> Instrumented {
        let entry_point = FunctionStatus::Skipped {
            reason: SkipReason::EntryPoint,
        };
        Instrumented {
            output: String::new(),
            edits: vec![
                SourceEdit::new(0, "/* prologue */\n", EditKind::Prologue),
                SourceEdit::new(12, " fnprobe_entry(\"f\");", EditKind::Entry),
            ],
            functions: vec![
                report("f", FunctionStatus::Instrumented { exits: 1 }),
                report("main", entry_point),
            ],
        }
    }

    #[test]
    fn test_empty_plan() {
        let mut buffer = Vec::new();
        EditPlanExporter::new().export(&mut buffer).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(parsed["units"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_unit_shape() {
        let mut exporter = EditPlanExporter::new();
        exporter.add_unit(Path::new("src/a.c"), &sample());

        let mut buffer = Vec::new();
        exporter.export(&mut buffer).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&buffer).unwrap();

        assert_eq!(exporter.unit_count(), 1);
        let unit = &parsed["units"][0];
        assert_eq!(unit["source"], "src/a.c");
        assert_eq!(unit["edits"][0]["kind"], "prologue");
        assert_eq!(unit["edits"][1]["offset"], 12);
        assert_eq!(unit["functions"][0]["status"], "instrumented");
        assert_eq!(unit["functions"][0]["exits"], 1);
        assert_eq!(unit["functions"][1]["reason"], "entry_point");
    }
}

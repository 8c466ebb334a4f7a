use std::io::{self, Write};

use crate::domain::CallRecord;

/// Leading columns of every result file
pub const BASE_COLUMNS: [&str; 3] = ["function_name", "start_timestamp", "end_timestamp"];

/// CSV writer for call records.
///
/// ```text
/// function_name,start_timestamp,end_timestamp,instructions,L1-dcache-load-misses
/// parse,12.000001000,12.000004500,5120,37
/// ```
///
/// Timestamps are monotonic seconds with nanosecond precision; event columns
/// hold `end - start`. Fields are not quoted.
pub struct CsvExporter<'a> {
    event_names: &'a [String],
}

impl<'a> CsvExporter<'a> {
    #[must_use]
    pub fn new(event_names: &'a [String]) -> Self {
        Self { event_names }
    }

    /// Write the header and one row per record, returning the row count.
    ///
    /// # Errors
    /// Returns any error from the underlying writer.
    pub fn export<W: Write>(&self, mut writer: W, records: &[CallRecord]) -> io::Result<usize> {
        writer.write_all(BASE_COLUMNS.join(",").as_bytes())?;
        for name in self.event_names {
            write!(writer, ",{name}")?;
        }
        writer.write_all(b"\n")?;

        for record in records {
            let (name, start, end) = (&record.function_name, record.start, record.end);
            write!(writer, "{name},{start},{end}")?;
            for delta in record.deltas() {
                write!(writer, ",{delta}")?;
            }
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CounterSnapshot, FunctionName, Timestamp};

    #[test]
    fn test_header_without_events() {
        let mut buffer = Vec::new();
        let rows = CsvExporter::new(&[]).export(&mut buffer, &[]).unwrap();
        assert_eq!(rows, 0);
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "function_name,start_timestamp,end_timestamp\n"
        );
    }

    #[test]
    fn test_row_format() {
        let names = vec!["instructions".to_string(), "cycles".to_string()];
        let record = CallRecord {
            function_name: FunctionName::new("parse"),
            start: Timestamp(12_000_001_000),
            end: Timestamp(12_000_004_500),
            start_counters: CounterSnapshot::from_values(&[100, 7]),
            end_counters: CounterSnapshot::from_values(&[5220, 44]),
        };

        let mut buffer = Vec::new();
        CsvExporter::new(&names)
            .export(&mut buffer, &[record])
            .unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "function_name,start_timestamp,end_timestamp,instructions,cycles"
        );
        assert_eq!(lines[1], "parse,12.000001000,12.000004500,5120,37");
    }
}

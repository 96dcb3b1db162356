//! CSV export of stored events.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::core::FileEvent;

pub const CSV_HEADER: &str = "FileName,Extension,FilePath,EventType,Timestamp";

/// Renders events as CSV rows with RFC 3339 timestamps.
#[derive(Debug, Default)]
pub struct CsvExporter;

impl CsvExporter {
    pub fn new() -> Self {
        Self
    }

    pub fn export<P: AsRef<Path>>(&self, events: &[FileEvent], path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        self.export_to_writer(events, &mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Export to a writer (for streaming or custom outputs).
    pub fn export_to_writer<W: Write>(&self, events: &[FileEvent], writer: &mut W) -> Result<()> {
        writeln!(writer, "{CSV_HEADER}")?;
        for event in events {
            writeln!(
                writer,
                "{},{},{},{},{}",
                escape(&event.file_name),
                escape(&event.extension),
                escape(&event.path.to_string_lossy()),
                event.kind,
                event.timestamp.to_rfc3339(),
            )?;
        }
        Ok(())
    }
}

/// Quotes a field containing a comma or quote, doubling embedded quotes.
fn escape(field: &str) -> Cow<'_, str> {
    if field.contains(',') || field.contains('"') {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

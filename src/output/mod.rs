//! Output consumers
//!
//! Formatters that receive a finished `PerPersonData` and write it to any
//! `std::io::Write` destination.

pub mod format;
pub mod json;
pub mod table;

pub use format::{CompactFormat, OutputFormat};
pub use json::JsonFormatter;
pub use table::{format_compact_table, TableFormatter};

use std::io::Write;

use crate::dated::day_key;
use crate::error::Result;
use crate::perperson::{PerPersonData, RecordOrdering};
use crate::processor::OutputFormatter;

/// Default threshold for reporting commits with many patch sets
pub const DEFAULT_PATCH_SET_COUNT_THRESHOLD: u32 = 5;

/// Settings shared by all output formatters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRules {
    /// Report commits needing more patch sets than this; `None` disables the report
    pub patch_set_count_threshold: Option<u32>,
}

impl Default for OutputRules {
    fn default() -> Self {
        Self { patch_set_count_threshold: Some(DEFAULT_PATCH_SET_COUNT_THRESHOLD) }
    }
}

impl OutputRules {
    /// Rules from a raw threshold where any negative value disables the report
    pub fn from_threshold(threshold: i64) -> Self {
        Self { patch_set_count_threshold: u32::try_from(threshold).ok() }
    }
}

/// Writes one compact line per identity
pub struct CompactFormatter<W: Write> {
    writer: W,
}

impl<W: Write> CompactFormatter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutputFormatter<PerPersonData> for CompactFormatter<W> {
    fn format(&mut self, data: &PerPersonData) -> Result<()> {
        for record in data.to_ordered_list(RecordOrdering::Alphabetical) {
            writeln!(self.writer, "{}", record.to_compact_format())?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// Create the formatter for `format` writing to `writer`
pub fn create_formatter<'a, W: Write + 'a>(
    format: OutputFormat,
    writer: W,
    rules: OutputRules,
) -> Box<dyn OutputFormatter<PerPersonData> + 'a> {
    match format {
        OutputFormat::Table => Box::new(TableFormatter::new(writer, rules)),
        OutputFormat::Compact => Box::new(CompactFormatter::new(writer)),
        OutputFormat::Json => Box::new(JsonFormatter::new(writer, rules)),
    }
}

fn format_date(millis: Option<i64>) -> String {
    millis.map(day_key).unwrap_or_else(|| "-".to_string())
}

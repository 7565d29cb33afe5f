//! Output formats and the compact one-line representation

use std::str::FromStr;

use crate::error::StatsError;
use crate::perperson::IdentityRecord;

/// How a result set is written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Overview table
    #[default]
    Table,
    /// One line per identity
    Compact,
    /// JSON document
    Json,
}

impl FromStr for OutputFormat {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "compact" => Ok(OutputFormat::Compact),
            "json" => Ok(OutputFormat::Json),
            other => Err(StatsError::configuration(format!(
                "Invalid output format '{}'. Valid formats: table, compact, json",
                other
            ))),
        }
    }
}

/// Trait for types that can be formatted compactly
pub trait CompactFormat {
    /// Single-line summary without a trailing newline
    fn to_compact_format(&self) -> String;
}

impl CompactFormat for IdentityRecord {
    fn to_compact_format(&self) -> String {
        format!(
            "{}: {} commits, +2:{} +1:{} -1:{} -2:{}, {} comments written, {} received, {} active days",
            self.identifier().replace(['\n', '\r'], " "),
            self.commit_count(),
            self.review_count_plus2(),
            self.review_count_plus1(),
            self.review_count_minus1(),
            self.review_count_minus2(),
            self.all_comments_written().len(),
            self.all_comments_received().len(),
            self.active_day_count(),
        )
    }
}

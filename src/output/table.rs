//! Console overview table

use std::io::Write;

use prettytable::{format, Cell, Row, Table};

use super::{format_date, OutputRules};
use crate::error::Result;
use crate::perperson::{IdentityRecord, PerPersonData, RecordOrdering};
use crate::processor::OutputFormatter;

const HEADERS: [&str; 12] = [
    "Identity",
    "Commits",
    "+2",
    "+1",
    "-1",
    "-2",
    "Written",
    "Received",
    "Reviewer for",
    "Comment ratio",
    "Self-reviewed",
    "Avg time in review",
];

/// Format a compact table with headers and rows using prettytable-rs clean format
pub fn format_compact_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_CLEAN);
    table.add_row(Row::new(headers.iter().map(|header| Cell::new(header)).collect()));
    for row in rows {
        table.add_row(Row::new(row.iter().map(|cell| Cell::new(cell)).collect()));
    }

    let mut result = String::new();
    for line in table.to_string().lines() {
        result.push_str("  ");
        result.push_str(line);
        result.push('\n');
    }
    result
}

/// Writes a dataset summary followed by one table row per identity
pub struct TableFormatter<W: Write> {
    writer: W,
    rules: OutputRules,
}

impl<W: Write> TableFormatter<W> {
    pub fn new(writer: W, rules: OutputRules) -> Self {
        Self { writer, rules }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn row_for(record: &IdentityRecord) -> Vec<String> {
        vec![
            record.identity().to_string(),
            record.commit_count().to_string(),
            record.review_count_plus2().to_string(),
            record.review_count_plus1().to_string(),
            record.review_count_minus1().to_string(),
            record.review_count_minus2().to_string(),
            record.all_comments_written().len().to_string(),
            record.all_comments_received().len().to_string(),
            record.added_as_reviewer_to_count().to_string(),
            format!("{:.3}", record.review_comment_ratio()),
            record.self_reviewed_commits().len().to_string(),
            record.printable_average_time_in_code_review(),
        ]
    }
}

impl<W: Write> OutputFormatter<PerPersonData> for TableFormatter<W> {
    fn format(&mut self, data: &PerPersonData) -> Result<()> {
        let query = data.query_data();
        writeln!(self.writer, "Project: {}", query.displayable_project_name())?;
        writeln!(self.writer, "Branches: {}", query.displayable_branch_list())?;
        writeln!(
            self.writer,
            "From {} to {}",
            format_date(data.from_date()),
            format_date(data.to_date())
        )?;
        if !query.gerrit_version.is_invalid() {
            writeln!(self.writer, "Gerrit version: {}", query.gerrit_version)?;
        }
        writeln!(self.writer)?;

        let ordered = data.to_ordered_list(RecordOrdering::Alphabetical);
        let rows: Vec<Vec<String>> = ordered.iter().map(|record| Self::row_for(record)).collect();
        if rows.is_empty() {
            writeln!(self.writer, "  No matching review data")?;
        } else {
            write!(self.writer, "{}", format_compact_table(&HEADERS, &rows))?;
        }

        if let Some(threshold) = self.rules.patch_set_count_threshold {
            let exceeding: Vec<(String, String)> = ordered
                .iter()
                .map(|record| {
                    let commits = record.printable_commits_with_n_patch_sets(threshold);
                    (record.identity().to_string(), commits)
                })
                .filter(|(_, commits)| !commits.is_empty())
                .collect();
            if !exceeding.is_empty() {
                writeln!(self.writer)?;
                writeln!(self.writer, "Commits with more than {} patch sets after review:", threshold)?;
                for (identity, commits) in exceeding {
                    writeln!(self.writer, "  {}: {}", identity, commits)?;
                }
            }
        }
        self.writer.flush()?;
        Ok(())
    }
}

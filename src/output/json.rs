//! JSON result document

use std::io::Write;
use std::sync::Arc;

use serde_json::{json, Value};

use super::OutputRules;
use crate::dated::{DatedList, MONTHS_IN_YEAR};
use crate::error::Result;
use crate::model::{Commit, PatchSetKind};
use crate::perperson::{IdentityRecord, PerPersonData, RecordOrdering};
use crate::processor::OutputFormatter;

/// Writes `{"datasetOverview": {..}, "overview": [..]}`
pub struct JsonFormatter<W: Write> {
    writer: W,
    rules: OutputRules,
}

impl<W: Write> JsonFormatter<W> {
    pub fn new(writer: W, rules: OutputRules) -> Self {
        Self { writer, rules }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    pub fn to_value(&self, data: &PerPersonData) -> Value {
        let overview: Vec<Value> = data
            .to_ordered_list(RecordOrdering::Alphabetical)
            .into_iter()
            .map(|record| self.record_overview(record))
            .collect();
        json!({
            "datasetOverview": dataset_overview(data),
            "overview": overview,
        })
    }

    fn record_overview(&self, record: &IdentityRecord) -> Value {
        let reviewers: Vec<Value> = record
            .my_reviewer_list()
            .into_iter()
            .map(|reviewer| {
                json!({
                    "identity": reviewer,
                    "reviewData": record.reviewer_data_for_own_commit_for(reviewer),
                })
            })
            .collect();

        let exceeding: Vec<Value> = self
            .rules
            .patch_set_count_threshold
            .map(|threshold| record.commits_with_n_patch_sets(threshold))
            .unwrap_or_default()
            .iter()
            .map(|commit| {
                json!({
                    "url": commit.url,
                    "subject": commit.subject,
                    "patchSetCount": commit.patch_set_count_for_kind(PatchSetKind::Rework),
                })
            })
            .collect();

        json!({
            "identifier": record.identifier(),
            "identity": record.identity(),
            "reviewCountPlus2": record.review_count_plus2(),
            "reviewCountPlus1": record.review_count_plus1(),
            "reviewCountMinus1": record.review_count_minus1(),
            "reviewCountMinus2": record.review_count_minus2(),
            "receivedReviews": record.received_reviews(),
            "allCommentsWritten": record.all_comments_written().len(),
            "allCommentsReceived": record.all_comments_received().len(),
            "commitCount": record.commit_count(),
            "averageTimeInCodeReview": record.average_time_in_code_review(),
            "receivedCommentRatio": record.received_comment_ratio(),
            "reviewCommentRatio": record.review_comment_ratio(),
            "averagePatchSetCount": record.average_patch_set_count(),
            "maxPatchSetCount": record.max_patch_set_count(),
            "addedAsReviewerToCount": record.added_as_reviewer_to_count(),
            "selfReviewedCommitCount": record.self_reviewed_commits().len(),
            "abandonedCommitCount": record.abandoned_commit_count(),
            "inReviewCommitCount": record.in_review_commit_count(),
            "projects": record.projects(),
            "firstActiveDate": record.first_active_date(),
            "lastActiveDate": record.last_active_date(),
            "activeDayCount": record.active_day_count(),
            "myReviewerList": reviewers,
            "commitsExceedingPatchSetThreshold": exceeding,
            "monthlyCommitTrend": monthly_commit_trend(record.commits()),
        })
    }
}

/// Commit counts and change figures for every month within the record's active range
fn monthly_commit_trend(commits: &DatedList<Arc<Commit>>) -> Vec<Value> {
    commits
        .year_range()
        .into_iter()
        .flat_map(|year| MONTHS_IN_YEAR.into_iter().map(move |month| (year, month)))
        .filter(|(year, month)| commits.is_date_within_range(*year, *month))
        .map(|(year, month)| {
            json!({
                "year": year,
                "month": month,
                "commitCount": commits.monthly_item_count(year, month),
                "monthOnMonthChange": commits.displayable_month_on_month_change(year, month),
                "quarterOnQuarterChange": commits.displayable_quarter_on_quarter_change(year, month),
            })
        })
        .collect()
}

fn dataset_overview(data: &PerPersonData) -> Value {
    let query = data.query_data();
    let gerrit_version = if query.gerrit_version.is_invalid() {
        Value::Null
    } else {
        Value::String(query.gerrit_version.to_string())
    };
    json!({
        "projectName": query.displayable_project_name(),
        "filenames": query.filenames,
        "branchList": query.displayable_branch_list(),
        "fromDate": data.from_date(),
        "toDate": data.to_date(),
        "gerritVersion": gerrit_version,
    })
}

impl<W: Write> OutputFormatter<PerPersonData> for JsonFormatter<W> {
    fn format(&mut self, data: &PerPersonData) -> Result<()> {
        let document = self.to_value(data);
        serde_json::to_writer_pretty(&mut self.writer, &document)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

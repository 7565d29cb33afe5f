//! Per-person aggregation
//!
//! Drives one filtered pass over the query data and builds an
//! `IdentityRecord` for every contributor encountered.

use std::sync::Arc;

use super::data::PerPersonData;
use crate::error::Result;
use crate::filter::CommitFilter;
use crate::model::{Approval, Commit, PatchSet, PatchSetComment};
use crate::processor::{visit, CommitDataProcessor, CommitVisitor, OutputFormatter, QueryData};

/// Aggregates query data into [`PerPersonData`]
#[derive(Debug, Default)]
pub struct PerPersonDataProcessor {
    filter: CommitFilter,
    records: PerPersonData,
}

impl PerPersonDataProcessor {
    pub fn new(filter: CommitFilter) -> Self {
        Self { filter, records: PerPersonData::new() }
    }

    /// Rebuild the result set from `query` and return it
    pub fn aggregate(&mut self, query: &QueryData) -> Result<&PerPersonData> {
        self.records.clear();

        let mut collector = RecordCollector {
            filter: &self.filter,
            records: &mut self.records,
            from_date: None,
            to_date: None,
        };
        visit(&query.commits, &self.filter, &mut collector)?;
        let (from_date, to_date) = (collector.from_date, collector.to_date);

        self.records.set_query_data(query);
        self.records.set_date_range(from_date, to_date);

        log::info!(
            "Aggregated {} commits into {} identity records",
            query.commits.len(),
            self.records.len()
        );
        Ok(&self.records)
    }

    /// Result of the last run
    pub fn records(&self) -> &PerPersonData {
        &self.records
    }
}

impl CommitDataProcessor for PerPersonDataProcessor {
    type Output = PerPersonData;

    fn commit_filter(&self) -> &CommitFilter {
        &self.filter
    }

    fn process(
        &mut self,
        formatter: &mut dyn OutputFormatter<PerPersonData>,
        query: &QueryData,
    ) -> Result<()> {
        let records = self.aggregate(query)?;
        formatter.format(records)
    }
}

/// Visitor that feeds traversal events into the per-person records
struct RecordCollector<'a> {
    filter: &'a CommitFilter,
    records: &'a mut PerPersonData,
    from_date: Option<i64>,
    to_date: Option<i64>,
}

impl RecordCollector<'_> {
    fn track_date_range(&mut self, last_updated: i64) {
        self.from_date = Some(self.from_date.map_or(last_updated, |d| d.min(last_updated)));
        self.to_date = Some(self.to_date.map_or(last_updated, |d| d.max(last_updated)));
    }
}

impl CommitVisitor for RecordCollector<'_> {
    fn visit_commit(&mut self, commit: &Arc<Commit>) -> Result<()> {
        log::trace!("Visiting change {}", commit.change_key());
        self.records.get_or_create(&commit.owner).add_commit(commit);
        self.track_date_range(commit.last_updated);

        for reviewer in &commit.reviewers {
            if !self.filter.is_identity_included(reviewer) || *reviewer == commit.owner {
                continue;
            }
            self.records.get_or_create(&commit.owner).add_reviewer_for_own_commit(reviewer);
            self.records.get_or_create(reviewer).add_reviewed_commit(commit);
        }
        Ok(())
    }

    fn visit_patch_set(&mut self, commit: &Arc<Commit>, patch_set: &PatchSet) -> Result<()> {
        for approval in &patch_set.approvals {
            if approval.is_code_review() {
                if self.filter.is_identity_included(&approval.granted_by)
                    && approval.granted_by != commit.owner
                {
                    let owner_record = self.records.get_or_create(&commit.owner);
                    owner_record.add_approval_for_own_commit(&approval.granted_by, approval);
                    owner_record.add_received_code_review(approval);
                }
            } else if approval.is_submitted() {
                self.records
                    .get_or_create(&commit.owner)
                    .update_average_time_in_code_review(approval.granted_on - commit.created_on);
            }
        }
        Ok(())
    }

    fn visit_approval(&mut self, patch_set: &PatchSet, approval: &Approval) -> Result<()> {
        if approval.granted_by != patch_set.author {
            self.records
                .get_or_create(&approval.granted_by)
                .add_approval_by_this_identity(&patch_set.author, approval);
        }
        Ok(())
    }

    fn visit_patch_set_comment(
        &mut self,
        commit: &Arc<Commit>,
        patch_set: &PatchSet,
        comment: &PatchSetComment,
    ) -> Result<()> {
        if comment.reviewer == patch_set.author {
            return Ok(());
        }
        self.records.get_or_create(&comment.reviewer).add_written_comment(commit, patch_set, comment)?;
        self.records.get_or_create(&patch_set.author).add_received_comment(commit, patch_set, comment)?;

        if comment.reviewer != commit.owner {
            self.records.get_or_create(&commit.owner).add_comment_from_reviewer(&comment.reviewer);
            self.records.get_or_create(&comment.reviewer).add_comment_for_requestor(&commit.owner);
        }
        Ok(())
    }
}

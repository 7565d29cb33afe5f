//! Per-identity statistics record
//!
//! An `IdentityRecord` accumulates everything known about one contributor
//! during a single aggregation pass: own commits, reviews given and
//! received, comments written and received, and reviewer relationships.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use serde::Serialize;

use super::comments::{PatchSetCommentEntry, PatchSetCommentTable};
use crate::dated::{day_key, DatedList};
use crate::error::Result;
use crate::model::{Approval, Commit, Identity, PatchSet, PatchSetComment, PatchSetKind};

/// Review relationship between two identities
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewerData {
    pub added_as_reviewer_count: u32,
    pub approval_count: u32,
    pub comment_count: u32,
    /// Approval value → number of approvals with that value
    pub approvals: BTreeMap<i32, u32>,
}

impl ReviewerData {
    pub fn approvals_for_score(&self, score: i32) -> u32 {
        self.approvals.get(&score).copied().unwrap_or(0)
    }

    fn record_approval(&mut self, approval: &Approval) {
        self.approval_count += 1;
        *self.approvals.entry(approval.value).or_insert(0) += 1;
    }
}

/// Reviewer relationships keyed by the other identity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewerDataTable {
    entries: HashMap<Identity, ReviewerData>,
}

impl ReviewerDataTable {
    pub fn get(&self, identity: &Identity) -> Option<&ReviewerData> {
        self.entries.get(identity)
    }

    fn entry(&mut self, identity: &Identity) -> &mut ReviewerData {
        self.entries.entry(identity.clone()).or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Identity, &ReviewerData)> {
        self.entries.iter()
    }

    /// Identities ordered by added-as-reviewer count, highest first; ties by email
    pub fn sorted_identities(&self) -> Vec<&Identity> {
        let mut identities: Vec<(&Identity, &ReviewerData)> = self.entries.iter().collect();
        identities.sort_by(|(left, left_data), (right, right_data)| {
            right_data
                .added_as_reviewer_count
                .cmp(&left_data.added_as_reviewer_count)
                .then_with(|| sort_key(left).cmp(&sort_key(right)))
        });
        identities.into_iter().map(|(identity, _)| identity).collect()
    }

    /// `"a@example.com (3), b@example.com (1)"`
    pub fn printable_list(&self) -> String {
        self.sorted_identities()
            .into_iter()
            .map(|identity| {
                let count = self.entries.get(identity).map_or(0, |data| data.added_as_reviewer_count);
                format!("{} ({})", identity, count)
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Total ordering key: raw email, then raw username, then identifier.
///
/// Sorting needs a total order, which [`Identity::contact_cmp`] does not
/// provide for identities of mixed kinds.
pub(crate) fn sort_key(identity: &Identity) -> (String, String, String) {
    (
        identity.email.clone().unwrap_or_default(),
        identity.username.clone().unwrap_or_default(),
        identity.identifier(),
    )
}

/// Statistics of one contributor
#[derive(Debug, Clone)]
pub struct IdentityRecord {
    identity: Identity,

    review_count_plus2: u32,
    review_count_plus1: u32,
    review_count_minus1: u32,
    review_count_minus2: u32,

    received_reviews: BTreeMap<i32, u32>,

    commits: DatedList<Arc<Commit>>,
    added_as_reviewer_to: Vec<Arc<Commit>>,

    review_requestors: ReviewerDataTable,
    reviewers_for_own_commits: ReviewerDataTable,

    comments_written: PatchSetCommentTable,
    comments_received: PatchSetCommentTable,

    first_active_date: Option<i64>,
    last_active_date: Option<i64>,
    active_days: BTreeSet<String>,

    average_time_in_code_review: i64,
}

impl IdentityRecord {
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            review_count_plus2: 0,
            review_count_plus1: 0,
            review_count_minus1: 0,
            review_count_minus2: 0,
            received_reviews: BTreeMap::new(),
            commits: DatedList::new(|commit: &Arc<Commit>| commit.created_on),
            added_as_reviewer_to: Vec::new(),
            review_requestors: ReviewerDataTable::default(),
            reviewers_for_own_commits: ReviewerDataTable::default(),
            comments_written: PatchSetCommentTable::new(),
            comments_received: PatchSetCommentTable::new(),
            first_active_date: None,
            last_active_date: None,
            active_days: BTreeSet::new(),
            average_time_in_code_review: 0,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn identifier(&self) -> String {
        self.identity.identifier()
    }

    // Accumulation

    pub fn add_commit(&mut self, commit: &Arc<Commit>) {
        self.commits.push(Arc::clone(commit));
        self.update_activity(commit.created_on);
    }

    /// Count an approval granted by this identity; only values ±1 and ±2 are tallied
    pub fn add_approval(&mut self, approval: &Approval) {
        match approval.value {
            2 => self.review_count_plus2 += 1,
            1 => self.review_count_plus1 += 1,
            -1 => self.review_count_minus1 += 1,
            -2 => self.review_count_minus2 += 1,
            _ => {}
        }
    }

    /// An approval this identity granted on a patch set authored by `author`
    pub fn add_approval_by_this_identity(&mut self, author: &Identity, approval: &Approval) {
        self.add_approval(approval);
        self.review_requestors.entry(author).record_approval(approval);
        self.update_activity(approval.granted_on);
    }

    /// An approval `reviewer` granted on one of this identity's commits
    pub fn add_approval_for_own_commit(&mut self, reviewer: &Identity, approval: &Approval) {
        self.reviewers_for_own_commits.entry(reviewer).record_approval(approval);
    }

    /// A Code-Review score received from someone else
    pub fn add_received_code_review(&mut self, approval: &Approval) {
        *self.received_reviews.entry(approval.value).or_insert(0) += 1;
    }

    pub fn add_reviewer_for_own_commit(&mut self, reviewer: &Identity) {
        self.reviewers_for_own_commits.entry(reviewer).added_as_reviewer_count += 1;
    }

    /// This identity was added as a reviewer to `commit`
    pub fn add_reviewed_commit(&mut self, commit: &Arc<Commit>) {
        self.added_as_reviewer_to.push(Arc::clone(commit));
        self.review_requestors.entry(&commit.owner).added_as_reviewer_count += 1;
    }

    /// `reviewer` commented on one of this identity's commits
    pub fn add_comment_from_reviewer(&mut self, reviewer: &Identity) {
        self.reviewers_for_own_commits.entry(reviewer).comment_count += 1;
    }

    /// This identity commented on a commit owned by `owner`
    pub fn add_comment_for_requestor(&mut self, owner: &Identity) {
        self.review_requestors.entry(owner).comment_count += 1;
    }

    pub fn add_written_comment(
        &mut self,
        commit: &Arc<Commit>,
        patch_set: &PatchSet,
        comment: &PatchSetComment,
    ) -> Result<()> {
        self.comments_written.add_comment_for_commit(commit, patch_set, comment)?;
        self.update_activity(comment.timestamp);
        Ok(())
    }

    pub fn add_received_comment(
        &mut self,
        commit: &Arc<Commit>,
        patch_set: &PatchSet,
        comment: &PatchSetComment,
    ) -> Result<()> {
        self.comments_received.add_comment_for_commit(commit, patch_set, comment)?;
        self.update_activity(comment.timestamp);
        Ok(())
    }

    /// Fold a new time-in-review sample into the running average.
    ///
    /// The average is over this identity's commit count, so the commit the
    /// sample belongs to must already have been added.
    pub fn update_average_time_in_code_review(&mut self, sample_millis: i64) {
        let count = self.commits.len() as i64;
        if count == 0 {
            log::debug!("No commits for {}, ignoring time in review sample", self.identity);
            return;
        }
        let previous_total = self.average_time_in_code_review * (count - 1);
        self.average_time_in_code_review = (previous_total + sample_millis) / count;
    }

    fn update_activity(&mut self, timestamp: i64) {
        if timestamp <= 0 {
            return;
        }
        self.first_active_date = Some(self.first_active_date.map_or(timestamp, |d| d.min(timestamp)));
        self.last_active_date = Some(self.last_active_date.map_or(timestamp, |d| d.max(timestamp)));
        self.active_days.insert(day_key(timestamp));
    }

    // Counters

    pub fn review_count_plus2(&self) -> u32 {
        self.review_count_plus2
    }

    pub fn review_count_plus1(&self) -> u32 {
        self.review_count_plus1
    }

    pub fn review_count_minus1(&self) -> u32 {
        self.review_count_minus1
    }

    pub fn review_count_minus2(&self) -> u32 {
        self.review_count_minus2
    }

    pub fn received_reviews(&self) -> &BTreeMap<i32, u32> {
        &self.received_reviews
    }

    pub fn received_reviews_for_score(&self, score: i32) -> u32 {
        self.received_reviews.get(&score).copied().unwrap_or(0)
    }

    pub fn commits(&self) -> &DatedList<Arc<Commit>> {
        &self.commits
    }

    pub fn commit_count(&self) -> usize {
        self.commits.len()
    }

    pub fn added_as_reviewer_to(&self) -> &[Arc<Commit>] {
        &self.added_as_reviewer_to
    }

    pub fn added_as_reviewer_to_count(&self) -> usize {
        self.added_as_reviewer_to.len()
    }

    pub fn comments_written(&self) -> &PatchSetCommentTable {
        &self.comments_written
    }

    pub fn comments_received(&self) -> &PatchSetCommentTable {
        &self.comments_received
    }

    pub fn all_comments_written(&self) -> &DatedList<PatchSetComment> {
        self.comments_written.all_comments()
    }

    pub fn all_comments_received(&self) -> &DatedList<PatchSetComment> {
        self.comments_received.all_comments()
    }

    pub fn review_requestors(&self) -> &ReviewerDataTable {
        &self.review_requestors
    }

    pub fn reviewers_for_own_commits(&self) -> &ReviewerDataTable {
        &self.reviewers_for_own_commits
    }

    pub fn reviewer_data_for_own_commit_for(&self, reviewer: &Identity) -> Option<&ReviewerData> {
        self.reviewers_for_own_commits.get(reviewer)
    }

    pub fn review_requestor_data_for(&self, owner: &Identity) -> Option<&ReviewerData> {
        self.review_requestors.get(owner)
    }

    pub fn first_active_date(&self) -> Option<i64> {
        self.first_active_date
    }

    pub fn last_active_date(&self) -> Option<i64> {
        self.last_active_date
    }

    /// Calendar days (`YYYY-MM-DD`, UTC) with any activity, ascending
    pub fn active_days(&self) -> &BTreeSet<String> {
        &self.active_days
    }

    pub fn active_day_count(&self) -> usize {
        self.active_days.len()
    }

    /// Average time from creation to submission, in milliseconds
    pub fn average_time_in_code_review(&self) -> i64 {
        self.average_time_in_code_review
    }

    pub fn printable_average_time_in_code_review(&self) -> String {
        format_printable_duration(self.average_time_in_code_review)
    }

    // Derived figures

    /// Comments received per own commit; 0 without commits
    pub fn received_comment_ratio(&self) -> f64 {
        ratio(self.comments_received.comment_count(), self.commits.len())
    }

    /// Comments written per change this identity was added to; 0 if never added
    pub fn review_comment_ratio(&self) -> f64 {
        ratio(self.comments_written.comment_count(), self.added_as_reviewer_to.len())
    }

    /// Average number of rework patch sets per own commit
    pub fn average_patch_set_count(&self) -> f64 {
        let total: usize = self.commits.iter().map(|commit| rework_count(commit)).sum();
        ratio(total, self.commits.len())
    }

    pub fn max_patch_set_count(&self) -> usize {
        self.commits.iter().map(|commit| rework_count(commit)).max().unwrap_or(0)
    }

    /// Merged commits on which every +2 was given by the owner
    pub fn self_reviewed_commits(&self) -> Vec<Arc<Commit>> {
        self.commits
            .iter()
            .filter(|commit| is_self_reviewed(commit))
            .cloned()
            .collect()
    }

    pub fn abandoned_commit_count(&self) -> usize {
        self.commits.iter().filter(|commit| commit.is_abandoned()).count()
    }

    pub fn in_review_commit_count(&self) -> usize {
        self.commits.iter().filter(|commit| commit.is_in_review()).count()
    }

    /// Projects of own commits, sorted and unique
    pub fn projects(&self) -> Vec<String> {
        let projects: BTreeSet<&str> = self.commits.iter().map(|commit| commit.project.as_str()).collect();
        projects.into_iter().map(str::to_string).collect()
    }

    /// Own commits that needed more than `threshold` rework patch sets after review started.
    ///
    /// Sorted by rework patch set count, highest first.
    pub fn commits_with_n_patch_sets(&self, threshold: u32) -> Vec<Arc<Commit>> {
        let threshold = threshold as usize;
        let mut exceeding: Vec<Arc<Commit>> = self
            .commits
            .iter()
            .filter(|commit| rework_count(commit) > threshold)
            .filter(|commit| {
                commit
                    .first_patch_set_index_with_non_author_review()
                    .is_some_and(|index| commit.patch_sets.len() - index > threshold)
            })
            .cloned()
            .collect();
        exceeding.sort_by(|left, right| rework_count(right).cmp(&rework_count(left)));
        exceeding
    }

    /// `"<url> (<count>), ..."` for [`IdentityRecord::commits_with_n_patch_sets`]
    pub fn printable_commits_with_n_patch_sets(&self, threshold: u32) -> String {
        self.commits_with_n_patch_sets(threshold)
            .iter()
            .map(|commit| format!("{} ({})", commit.url, rework_count(commit)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn my_reviewer_list(&self) -> Vec<&Identity> {
        self.reviewers_for_own_commits.sorted_identities()
    }

    pub fn displayable_my_reviewer_list(&self) -> String {
        self.reviewers_for_own_commits.printable_list()
    }

    pub fn review_requestor_list(&self) -> Vec<&Identity> {
        self.review_requestors.sorted_identities()
    }

    pub fn displayable_added_reviewer_list(&self) -> String {
        self.review_requestors.printable_list()
    }

    /// Changes this identity commented on, oldest first
    pub fn commits_with_written_comments(&self) -> Vec<Arc<Commit>> {
        let mut commits: Vec<Arc<Commit>> = self.comments_written.commits().cloned().collect();
        commits.sort_by_key(|commit| commit.created_on);
        commits
    }

    pub fn written_comments_for_commit(&self, commit: &Commit) -> &[PatchSetCommentEntry] {
        self.comments_written.get(commit).unwrap_or(&[])
    }

    /// Every written comment message, one per line
    pub fn printable_all_review_comments(&self) -> String {
        self.all_comments_written()
            .iter()
            .map(|comment| format!("{}\n", comment.message))
            .collect()
    }
}

fn rework_count(commit: &Commit) -> usize {
    commit.patch_set_count_for_kind(PatchSetKind::Rework)
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn is_self_reviewed(commit: &Commit) -> bool {
    if !commit.is_merged() {
        return false;
    }
    let Some(last_patch_set) = commit.last_patch_set() else {
        return false;
    };
    if last_patch_set.has_full_approval_by_other_than(&commit.owner) {
        return false;
    }
    !commit
        .patch_sets
        .iter()
        .any(|patch_set| patch_set.has_full_approval_by_other_than(&commit.owner))
}

/// `"{days}d {hours}h {minutes}min"`
pub fn format_printable_duration(duration_millis: i64) -> String {
    let seconds = duration_millis / 1000;
    let days = seconds / (60 * 60 * 24);
    let hours = seconds / (60 * 60) % 24;
    let minutes = seconds / 60 % 60;
    format!("{}d {}h {}min", days, hours, minutes)
}

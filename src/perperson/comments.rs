//! Inline comments grouped by change

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::dated::DatedList;
use crate::error::Result;
use crate::model::{Commit, PatchSet, PatchSetComment};

/// A comment together with where it was made
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchSetCommentEntry {
    pub patch_set_number: u32,
    pub url: String,
    pub comment: PatchSetComment,
}

/// All comments of one change
#[derive(Debug, Clone)]
pub struct CommentGroup {
    pub commit: Arc<Commit>,
    pub comments: Vec<PatchSetCommentEntry>,
}

/// Comments keyed by change, in first-seen order
#[derive(Debug, Clone)]
pub struct PatchSetCommentTable {
    groups: Vec<CommentGroup>,
    index: HashMap<String, usize>,
    all_comments: DatedList<PatchSetComment>,
}

impl Default for PatchSetCommentTable {
    fn default() -> Self {
        Self::new()
    }
}

impl PatchSetCommentTable {
    pub fn new() -> Self {
        Self {
            groups: Vec::new(),
            index: HashMap::new(),
            all_comments: DatedList::new(|comment: &PatchSetComment| comment.timestamp),
        }
    }

    /// Record `comment`, made on `patch_set`, against `commit`.
    ///
    /// Fails with `StatsError::OrphanComment` when `patch_set` does not hold
    /// the comment or is not part of `commit`.
    pub fn add_comment_for_commit(
        &mut self,
        commit: &Arc<Commit>,
        patch_set: &PatchSet,
        comment: &PatchSetComment,
    ) -> Result<()> {
        commit.verify_comment_owner(patch_set, comment)?;
        let entry = PatchSetCommentEntry {
            patch_set_number: patch_set.number,
            url: commit.url_for_comment(patch_set, comment),
            comment: comment.clone(),
        };

        let key = commit.change_key();
        let position = match self.index.get(&key) {
            Some(position) => *position,
            None => {
                self.groups.push(CommentGroup { commit: Arc::clone(commit), comments: Vec::new() });
                self.index.insert(key, self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        self.groups[position].comments.push(entry);
        self.all_comments.push(comment.clone());
        Ok(())
    }

    /// Number of changes with at least one comment
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of comments across all changes
    pub fn comment_count(&self) -> usize {
        self.all_comments.len()
    }

    pub fn get(&self, commit: &Commit) -> Option<&[PatchSetCommentEntry]> {
        self.index
            .get(&commit.change_key())
            .map(|position| self.groups[*position].comments.as_slice())
    }

    pub fn groups(&self) -> &[CommentGroup] {
        &self.groups
    }

    pub fn commits(&self) -> impl Iterator<Item = &Arc<Commit>> {
        self.groups.iter().map(|group| &group.commit)
    }

    pub fn all_comments(&self) -> &DatedList<PatchSetComment> {
        &self.all_comments
    }
}

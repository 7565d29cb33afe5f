//! Review records
//!
//! A `Commit` is one Gerrit change with its patch sets, approvals and
//! inline comments. Records are built once by the parser and only read
//! afterwards; timestamps are epoch milliseconds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, StatsError};
use super::identity::Identity;

/// Change status strings as reported by Gerrit
pub const STATUS_NEW: &str = "NEW";
pub const STATUS_MERGED: &str = "MERGED";
pub const STATUS_ABANDONED: &str = "ABANDONED";

/// What a patch set changed relative to its predecessor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatchSetKind {
    /// Gerrit versions before 2.9 do not report a kind; treat everything as rework
    #[default]
    Rework,
    TrivialRebase,
    NoCodeChange,
    NoChange,
}

impl FromStr for PatchSetKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "REWORK" => Ok(PatchSetKind::Rework),
            "TRIVIAL_REBASE" => Ok(PatchSetKind::TrivialRebase),
            "NO_CODE_CHANGE" => Ok(PatchSetKind::NoCodeChange),
            "NO_CHANGE" => Ok(PatchSetKind::NoChange),
            _ => Err(format!("Unknown patch set kind '{}'", s)),
        }
    }
}

impl fmt::Display for PatchSetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PatchSetKind::Rework => "REWORK",
            PatchSetKind::TrivialRebase => "TRIVIAL_REBASE",
            PatchSetKind::NoCodeChange => "NO_CODE_CHANGE",
            PatchSetKind::NoChange => "NO_CHANGE",
        };
        write!(f, "{}", name)
    }
}

/// A score given to a patch set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Approval {
    /// Label name, e.g. `Code-Review`; empty when the input omitted it
    pub approval_type: String,
    pub description: String,
    pub value: i32,
    pub granted_on: i64,
    pub granted_by: Identity,
}

impl Approval {
    pub const TYPE_CODE_REVIEW: &'static str = "Code-Review";
    pub const TYPE_VERIFIED: &'static str = "Verified";
    pub const TYPE_SUBMITTED: &'static str = "SUBM";

    pub fn is_code_review(&self) -> bool {
        self.approval_type == Self::TYPE_CODE_REVIEW
    }

    pub fn is_submitted(&self) -> bool {
        self.approval_type == Self::TYPE_SUBMITTED
    }

    /// A +2 on any label; untyped approvals count too
    pub fn is_full_approval(&self) -> bool {
        self.value == 2
    }
}

/// An inline comment on a file of a patch set.
///
/// Gerrit does not report when the comment was written, so `timestamp` is
/// the creation time of the owning patch set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatchSetComment {
    pub file: String,
    pub line: u32,
    pub reviewer: Identity,
    pub message: String,
    pub timestamp: i64,
}

/// A change-level message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeComment {
    pub timestamp: i64,
    pub reviewer: Identity,
    pub message: String,
}

/// One uploaded revision of a change
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatchSet {
    pub number: u32,
    pub revision: String,
    pub parents: Vec<String>,
    pub ref_name: String,
    pub uploader: Identity,
    /// Defaults to the uploader when the input has no author
    pub author: Identity,
    pub created_on: i64,
    pub is_draft: bool,
    pub kind: PatchSetKind,
    pub approvals: Vec<Approval>,
    pub comments: Vec<PatchSetComment>,
    pub size_insertions: i64,
    pub size_deletions: i64,
}

impl PatchSet {
    /// Whether any +2 on this patch set came from someone other than `owner`
    pub fn has_full_approval_by_other_than(&self, owner: &Identity) -> bool {
        self.approvals
            .iter()
            .any(|approval| approval.is_full_approval() && approval.granted_by != *owner)
    }
}

/// A Gerrit change
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Commit {
    pub project: String,
    pub branch: String,
    /// Change-Id
    pub id: String,
    pub commit_number: u32,
    pub subject: String,
    pub owner: Identity,
    pub url: String,
    pub commit_message: String,
    pub created_on: i64,
    pub last_updated: i64,
    pub is_open: bool,
    pub status: String,
    pub reviewers: Vec<Identity>,
    pub comments: Vec<ChangeComment>,
    pub patch_sets: Vec<PatchSet>,
}

impl Commit {
    /// Unique key of the change: `project~branch~Change-Id~number`.
    ///
    /// The Change-Id may be empty in decoded data, so the change number is
    /// part of the key.
    pub fn change_key(&self) -> String {
        format!("{}~{}~{}~{}", self.project, self.branch, self.id, self.commit_number)
    }

    pub fn is_merged(&self) -> bool {
        self.status == STATUS_MERGED
    }

    pub fn is_abandoned(&self) -> bool {
        self.status == STATUS_ABANDONED
    }

    pub fn is_in_review(&self) -> bool {
        self.status == STATUS_NEW
    }

    pub fn last_patch_set(&self) -> Option<&PatchSet> {
        self.patch_sets.last()
    }

    pub fn patch_set_count_for_kind(&self, kind: PatchSetKind) -> usize {
        self.patch_sets.iter().filter(|ps| ps.kind == kind).count()
    }

    /// Index of the first patch set that received a comment from someone
    /// other than the change owner.
    pub fn first_patch_set_index_with_non_author_review(&self) -> Option<usize> {
        self.patch_sets.iter().position(|patch_set| {
            patch_set
                .comments
                .iter()
                .any(|comment| comment.reviewer != self.owner)
        })
    }

    /// Check that `comment` was made on `patch_set` and that the patch set
    /// belongs to this change.
    ///
    /// A mismatch means the input is corrupt and is reported as an error.
    pub fn verify_comment_owner(&self, patch_set: &PatchSet, comment: &PatchSetComment) -> Result<()> {
        let owned = patch_set.comments.contains(comment)
            && self.patch_sets.iter().any(|candidate| candidate.number == patch_set.number);
        if owned {
            Ok(())
        } else {
            Err(StatsError::orphan_comment(self.change_key(), comment.file.clone(), comment.line))
        }
    }

    /// Web link to an inline comment.
    ///
    /// Commit url `https://gerrit.example.com/29251` becomes
    /// `https://gerrit.example.com/#/c/29251/13/path/to/file`.
    pub fn url_for_comment(&self, patch_set: &PatchSet, comment: &PatchSetComment) -> String {
        let base_url = match self.url.rfind('/') {
            Some(index) => &self.url[..index],
            None => self.url.as_str(),
        };
        format!("{}/#/c/{}/{}/{}", base_url, self.commit_number, patch_set.number, comment.file)
    }
}

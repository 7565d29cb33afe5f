//! Commit processing
//!
//! Shared plumbing for processors that turn loaded review data into a
//! result set: the loaded query data, the filtered traversal and the
//! consumer interface results are handed to.

pub mod visitor;

pub use visitor::{visit, CommitVisitor};

use std::sync::Arc;

use crate::error::Result;
use crate::filter::CommitFilter;
use crate::model::{Commit, GerritVersion};

/// Review data loaded from one or more files
#[derive(Debug, Clone, Default)]
pub struct QueryData {
    /// Commits in input order
    pub commits: Vec<Arc<Commit>>,
    /// Files the commits were read from
    pub filenames: Vec<String>,
    /// Branches the run was restricted to; empty means all branches
    pub branches: Vec<String>,
    /// Oldest valid Gerrit version seen across the files
    pub gerrit_version: GerritVersion,
}

impl QueryData {
    pub fn new(commits: Vec<Commit>) -> Self {
        Self {
            commits: commits.into_iter().map(Arc::new).collect(),
            ..Self::default()
        }
    }

    pub fn with_filenames(mut self, filenames: Vec<String>) -> Self {
        self.filenames = filenames;
        self
    }

    pub fn with_branches(mut self, branches: Vec<String>) -> Self {
        self.branches = branches;
        self
    }

    pub fn with_gerrit_version(mut self, version: GerritVersion) -> Self {
        self.gerrit_version = version;
        self
    }

    pub fn displayable_project_name(&self) -> String {
        format!("all data from file(s) {}", self.filenames.join(", "))
    }

    pub fn displayable_branch_list(&self) -> String {
        if self.branches.is_empty() {
            "(all branches)".to_string()
        } else {
            self.branches.join(", ")
        }
    }
}

/// Consumer of a finished result set
pub trait OutputFormatter<T> {
    fn format(&mut self, data: &T) -> Result<()>;
}

/// A processor aggregating query data into a result set of type `Output`
pub trait CommitDataProcessor {
    type Output;

    /// Filter the processor runs with
    fn commit_filter(&self) -> &CommitFilter;

    /// Aggregate `query` from scratch and hand the result to `formatter`
    fn process(
        &mut self,
        formatter: &mut dyn OutputFormatter<Self::Output>,
        query: &QueryData,
    ) -> Result<()>;
}

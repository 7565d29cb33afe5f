//! Inclusion filter
//!
//! Decides which changes and which identities take part in aggregation.
//! A filter is configured once per run and only read afterwards.

use crate::model::{Commit, Identity};

/// Branch and identity inclusion rules
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitFilter {
    included_emails: Vec<String>,
    excluded_emails: Vec<String>,
    included_branches: Vec<String>,
    include_empty_emails: bool,
}

impl CommitFilter {
    /// Create a filter that includes every change and every identity with an email
    pub fn new() -> Self {
        Self::default()
    }

    /// Only these emails are included; the exclude list is ignored when this is non-empty
    pub fn with_included_emails<I, S>(mut self, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.included_emails.extend(emails.into_iter().map(Into::into));
        self
    }

    pub fn with_excluded_emails<I, S>(mut self, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_emails.extend(emails.into_iter().map(Into::into));
        self
    }

    /// Only changes on these branches are included; empty means all branches
    pub fn with_included_branches<I, S>(mut self, branches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.included_branches.extend(branches.into_iter().map(Into::into));
        self
    }

    /// Whether identities without an email take part
    pub fn with_include_empty_emails(mut self, include: bool) -> Self {
        self.include_empty_emails = include;
        self
    }

    pub fn included_branches(&self) -> &[String] {
        &self.included_branches
    }

    pub fn included_emails(&self) -> &[String] {
        &self.included_emails
    }

    pub fn excluded_emails(&self) -> &[String] {
        &self.excluded_emails
    }

    pub fn includes_empty_emails(&self) -> bool {
        self.include_empty_emails
    }

    pub fn is_commit_included(&self, commit: &Commit) -> bool {
        self.included_branches.is_empty() || self.included_branches.contains(&commit.branch)
    }

    pub fn is_identity_included(&self, identity: &Identity) -> bool {
        match identity.email() {
            None => self.include_empty_emails,
            Some(email) if !self.included_emails.is_empty() => {
                self.included_emails.iter().any(|e| e == email)
            }
            Some(email) => !self.excluded_emails.iter().any(|e| e == email),
        }
    }
}

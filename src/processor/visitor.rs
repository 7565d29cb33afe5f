//! Filtered traversal of commit data
//!
//! Walks commit → patch set → {approval, comment} in input order and
//! dispatches each included node to a `CommitVisitor`.

use std::sync::Arc;

use crate::error::Result;
use crate::filter::CommitFilter;
use crate::model::{Approval, Commit, PatchSet, PatchSetComment};

/// Hooks invoked by `visit` for every included node
pub trait CommitVisitor {
    fn visit_commit(&mut self, _commit: &Arc<Commit>) -> Result<()> {
        Ok(())
    }

    fn visit_patch_set(&mut self, _commit: &Arc<Commit>, _patch_set: &PatchSet) -> Result<()> {
        Ok(())
    }

    fn visit_approval(&mut self, _patch_set: &PatchSet, _approval: &Approval) -> Result<()> {
        Ok(())
    }

    fn visit_patch_set_comment(
        &mut self,
        _commit: &Arc<Commit>,
        _patch_set: &PatchSet,
        _comment: &PatchSetComment,
    ) -> Result<()> {
        Ok(())
    }
}

/// Traverse `commits`, skipping whatever `filter` excludes.
///
/// A commit is skipped with all of its patch sets unless both its branch and
/// its owner are included. A patch set is skipped unless its author is
/// included; approvals and comments are skipped individually by granter and
/// reviewer. The first hook error aborts the traversal.
pub fn visit<V>(commits: &[Arc<Commit>], filter: &CommitFilter, visitor: &mut V) -> Result<()>
where
    V: CommitVisitor + ?Sized,
{
    for commit in commits {
        if !filter.is_commit_included(commit) || !filter.is_identity_included(&commit.owner) {
            log::trace!("Skipping change {}", commit.change_key());
            continue;
        }
        visitor.visit_commit(commit)?;

        for patch_set in &commit.patch_sets {
            if !filter.is_identity_included(&patch_set.author) {
                continue;
            }
            visitor.visit_patch_set(commit, patch_set)?;

            for approval in &patch_set.approvals {
                if filter.is_identity_included(&approval.granted_by) {
                    visitor.visit_approval(patch_set, approval)?;
                }
            }

            for comment in &patch_set.comments {
                if filter.is_identity_included(&comment.reviewer) {
                    visitor.visit_patch_set_comment(commit, patch_set, comment)?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StatsError;
    use crate::model::Identity;

    #[derive(Default)]
    struct RecordingVisitor {
        events: Vec<String>,
    }

    impl CommitVisitor for RecordingVisitor {
        fn visit_commit(&mut self, commit: &Arc<Commit>) -> Result<()> {
            self.events.push(format!("commit {}", commit.id));
            Ok(())
        }

        fn visit_patch_set(&mut self, commit: &Arc<Commit>, patch_set: &PatchSet) -> Result<()> {
            self.events.push(format!("patch set {}/{}", commit.id, patch_set.number));
            Ok(())
        }

        fn visit_approval(&mut self, patch_set: &PatchSet, approval: &Approval) -> Result<()> {
            self.events.push(format!("approval {} {}", patch_set.number, approval.value));
            Ok(())
        }

        fn visit_patch_set_comment(
            &mut self,
            _commit: &Arc<Commit>,
            patch_set: &PatchSet,
            comment: &PatchSetComment,
        ) -> Result<()> {
            self.events.push(format!("comment {} {}", patch_set.number, comment.line));
            Ok(())
        }
    }

    fn person(name: &str) -> Identity {
        Identity::from_email(format!("{}@example.com", name))
    }

    fn sample_commit(id: &str, branch: &str, owner: &Identity, reviewer: &Identity) -> Arc<Commit> {
        Arc::new(Commit {
            id: id.to_string(),
            branch: branch.to_string(),
            owner: owner.clone(),
            patch_sets: vec![PatchSet {
                number: 1,
                author: owner.clone(),
                approvals: vec![Approval {
                    approval_type: Approval::TYPE_CODE_REVIEW.to_string(),
                    value: 1,
                    granted_by: reviewer.clone(),
                    ..Approval::default()
                }],
                comments: vec![PatchSetComment {
                    file: "lib.rs".to_string(),
                    line: 4,
                    reviewer: reviewer.clone(),
                    ..PatchSetComment::default()
                }],
                ..PatchSet::default()
            }],
            ..Commit::default()
        })
    }

    #[test]
    fn test_visit_order() {
        let commits = vec![sample_commit("I1", "master", &person("alice"), &person("bob"))];
        let mut visitor = RecordingVisitor::default();
        visit(&commits, &CommitFilter::new(), &mut visitor).unwrap();

        assert_eq!(
            visitor.events,
            vec!["commit I1", "patch set I1/1", "approval 1 1", "comment 1 4"]
        );
    }

    #[test]
    fn test_excluded_branch_fires_no_hooks() {
        let commits = vec![
            sample_commit("I1", "feature", &person("alice"), &person("bob")),
            sample_commit("I2", "master", &person("alice"), &person("bob")),
        ];
        let filter = CommitFilter::new().with_included_branches(["master"]);
        let mut visitor = RecordingVisitor::default();
        visit(&commits, &filter, &mut visitor).unwrap();

        assert!(visitor.events.iter().all(|event| !event.contains("I1")));
        assert_eq!(visitor.events[0], "commit I2");
    }

    #[test]
    fn test_excluded_owner_skips_commit() {
        let commits = vec![sample_commit("I1", "master", &person("alice"), &person("bob"))];
        let filter = CommitFilter::new().with_excluded_emails(["alice@example.com"]);
        let mut visitor = RecordingVisitor::default();
        visit(&commits, &filter, &mut visitor).unwrap();

        assert!(visitor.events.is_empty());
    }

    #[test]
    fn test_excluded_reviewer_skips_leaf_nodes() {
        let commits = vec![sample_commit("I1", "master", &person("alice"), &person("bot"))];
        let filter = CommitFilter::new().with_excluded_emails(["bot@example.com"]);
        let mut visitor = RecordingVisitor::default();
        visit(&commits, &filter, &mut visitor).unwrap();

        assert_eq!(visitor.events, vec!["commit I1", "patch set I1/1"]);
    }

    #[test]
    fn test_anonymous_reviewer_is_excluded_by_default() {
        let commits = vec![sample_commit("I1", "master", &person("alice"), &Identity::default())];
        let mut visitor = RecordingVisitor::default();
        visit(&commits, &CommitFilter::new(), &mut visitor).unwrap();

        assert_eq!(visitor.events.len(), 2);
    }

    #[test]
    fn test_hook_error_aborts_traversal() {
        struct FailingVisitor {
            commits_seen: usize,
        }

        impl CommitVisitor for FailingVisitor {
            fn visit_commit(&mut self, _commit: &Arc<Commit>) -> Result<()> {
                self.commits_seen += 1;
                Err(StatsError::parse("broken"))
            }
        }

        let commits = vec![
            sample_commit("I1", "master", &person("alice"), &person("bob")),
            sample_commit("I2", "master", &person("alice"), &person("bob")),
        ];
        let mut visitor = FailingVisitor { commits_seen: 0 };
        assert!(visit(&commits, &CommitFilter::new(), &mut visitor).is_err());
        assert_eq!(visitor.commits_seen, 1);
    }
}

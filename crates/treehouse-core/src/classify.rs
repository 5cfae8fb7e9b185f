//! Worktree status classification
//!
//! Priority, first match wins: dirty > merged > pr-out > clean. The classifier
//! evaluates the two git signals; pr-out is layered on afterwards by
//! [`promote_with_pr`] once the PR lookup has run.

use std::path::Path;

use crate::error::Diagnostic;
use crate::git::{Git, REMOTE};
use crate::process::CommandRunner;
use crate::types::{PrState, PrStatus, WorktreeStatus};

/// Classifier result plus any signal that could not be evaluated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub status: WorktreeStatus,
    /// Signals treated as absent because their query failed
    pub diagnostics: Vec<Diagnostic>,
}

/// Classify the worktree at `worktree` with `branch` checked out.
///
/// A failed query means "signal absent": a status failure never makes a
/// worktree dirty, a merge listing failure never makes it merged.
pub async fn classify(runner: &dyn CommandRunner, worktree: &Path, branch: &str) -> Classification {
    let git = Git::new(runner, worktree);
    let mut diagnostics = Vec::new();

    match git.is_dirty().await {
        Ok(true) => {
            return Classification {
                status: WorktreeStatus::Dirty,
                diagnostics,
            };
        }
        Ok(false) => {}
        Err(e) => diagnostics.push(Diagnostic::from_error("status", &e)),
    }

    match git.merged_into_default().await {
        Ok(merged) => {
            let qualified = format!("{}/{}", REMOTE, branch);
            if merged.iter().any(|b| *b == qualified) {
                return Classification {
                    status: WorktreeStatus::Merged,
                    diagnostics,
                };
            }
        }
        Err(e) => diagnostics.push(Diagnostic::from_error("merged", &e)),
    }

    Classification {
        status: WorktreeStatus::Clean,
        diagnostics,
    }
}

/// Promote a clean worktree to pr-out when its branch has a PR that is not merged
pub fn promote_with_pr(status: WorktreeStatus, pr: Option<&PrStatus>) -> WorktreeStatus {
    match (status, pr) {
        (WorktreeStatus::Clean, Some(pr)) if pr.state != PrState::Merged => WorktreeStatus::PrOut,
        (status, _) => status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::fake::{Reply, ScriptedRunner};

    fn pr(state: PrState) -> PrStatus {
        PrStatus {
            number: 1,
            title: "t".to_string(),
            url: "u".to_string(),
            state,
            is_draft: false,
            checks: None,
        }
    }

    #[tokio::test]
    async fn test_dirty_wins_over_merged() {
        let runner = ScriptedRunner::new()
            .on("git", &["status"], Reply::Ok(" M src/lib.rs\n".into()))
            .on("git", &["branch", "-r"], Reply::Ok("  origin/feature-x\n".into()));

        let result = classify(&runner, Path::new("/wt"), "feature-x").await;
        assert_eq!(result.status, WorktreeStatus::Dirty);
        assert!(result.diagnostics.is_empty());
        // Merge listing is never consulted once dirty
        assert_eq!(runner.position("branch -r"), None);
    }

    #[tokio::test]
    async fn test_merged_when_clean() {
        let runner = ScriptedRunner::new()
            .on("git", &["status"], Reply::Ok(String::new()))
            .on(
                "git",
                &["branch", "-r", "--merged", "origin/main"],
                Reply::Ok("  origin/HEAD -> origin/main\n  origin/main\n  origin/old\n".into()),
            );

        let result = classify(&runner, Path::new("/wt"), "old").await;
        assert_eq!(result.status, WorktreeStatus::Merged);
    }

    #[tokio::test]
    async fn test_prefix_branch_is_not_merged() {
        let runner = ScriptedRunner::new()
            .on("git", &["status"], Reply::Ok(String::new()))
            .on("git", &["branch", "-r"], Reply::Ok("  origin/old-feature\n".into()));

        let result = classify(&runner, Path::new("/wt"), "old").await;
        assert_eq!(result.status, WorktreeStatus::Clean);
    }

    #[tokio::test]
    async fn test_failures_fail_open() {
        let runner = ScriptedRunner::new()
            .on("git", &["status"], Reply::Missing)
            .on("git", &["branch", "-r"], Reply::Fail("no remote".into()));

        let result = classify(&runner, Path::new("/wt"), "feature").await;
        assert_eq!(result.status, WorktreeStatus::Clean);
        let sources: Vec<_> = result.diagnostics.iter().map(|d| d.source).collect();
        assert_eq!(sources, vec!["status", "merged"]);
    }

    #[test]
    fn test_promote_with_pr() {
        let open = pr(PrState::Open);
        assert_eq!(
            promote_with_pr(WorktreeStatus::Clean, Some(&open)),
            WorktreeStatus::PrOut
        );
        assert_eq!(
            promote_with_pr(WorktreeStatus::Dirty, Some(&open)),
            WorktreeStatus::Dirty
        );
        assert_eq!(
            promote_with_pr(WorktreeStatus::Merged, Some(&open)),
            WorktreeStatus::Merged
        );
        assert_eq!(
            promote_with_pr(WorktreeStatus::Clean, Some(&pr(PrState::Merged))),
            WorktreeStatus::Clean
        );
        assert_eq!(
            promote_with_pr(WorktreeStatus::Clean, Some(&pr(PrState::Closed))),
            WorktreeStatus::PrOut
        );
        assert_eq!(promote_with_pr(WorktreeStatus::Clean, None), WorktreeStatus::Clean);
    }
}

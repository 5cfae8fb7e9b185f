//! Git CLI wrapper for the handful of subcommands treehouse needs

use std::path::Path;

use tracing::debug;

use crate::error::TreehouseError;
use crate::process::CommandRunner;

/// Remote that merge detection runs against
pub const REMOTE: &str = "origin";

/// Default branches tried, in order, for merge detection
pub const DEFAULT_BRANCHES: [&str; 2] = ["main", "master"];

/// Git CLI bound to one working directory
pub struct Git<'a> {
    runner: &'a dyn CommandRunner,
    dir: &'a Path,
}

impl<'a> Git<'a> {
    pub fn new(runner: &'a dyn CommandRunner, dir: &'a Path) -> Self {
        Self { runner, dir }
    }

    /// Run git and return stdout, failing on non-zero exit
    async fn run(&self, args: &[&str]) -> Result<String, TreehouseError> {
        let output = self.runner.run("git", args, Some(self.dir)).await?;

        if !output.success {
            return Err(TreehouseError::GitCommand(format!(
                "git {} failed in {}: {}",
                args.join(" "),
                self.dir.display(),
                output.stderr.trim()
            )));
        }

        Ok(output.stdout)
    }

    /// Whether the working tree has any uncommitted change, including
    /// untracked files
    pub async fn is_dirty(&self) -> Result<bool, TreehouseError> {
        let porcelain = self.run(&["status", "--porcelain"]).await?;
        Ok(!porcelain.trim().is_empty())
    }

    /// Currently checked-out branch, or `None` on a detached HEAD
    pub async fn current_branch(&self) -> Result<Option<String>, TreehouseError> {
        let out = self.run(&["branch", "--show-current"]).await?;
        let branch = out.trim();
        Ok((!branch.is_empty()).then(|| branch.to_string()))
    }

    /// Remote branches already merged into `origin/<base>`
    pub async fn merged_remote_branches(&self, base: &str) -> Result<Vec<String>, TreehouseError> {
        let target = format!("{}/{}", REMOTE, base);
        let out = self.run(&["branch", "-r", "--merged", &target]).await?;
        Ok(parse_branch_listing(&out))
    }

    /// Remote branches merged into the remote default branch.
    ///
    /// Tries each of [`DEFAULT_BRANCHES`] until one query succeeds.
    pub async fn merged_into_default(&self) -> Result<Vec<String>, TreehouseError> {
        let mut last_err = None;
        for base in DEFAULT_BRANCHES {
            match self.merged_remote_branches(base).await {
                Ok(branches) => return Ok(branches),
                Err(e) => {
                    debug!(base, error = %e, "Merged listing failed, trying next default branch");
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| TreehouseError::GitCommand("no default branch".into())))
    }

    /// Force-remove a linked worktree (run from the main repository)
    pub async fn worktree_remove(&self, path: &Path) -> Result<(), TreehouseError> {
        let path_str = path.to_str().ok_or_else(|| {
            TreehouseError::GitCommand(format!(
                "worktree path is not valid UTF-8: {}",
                path.display()
            ))
        })?;

        self.run(&["worktree", "remove", "--force", path_str]).await?;
        Ok(())
    }

    /// Prune stale worktree metadata
    pub async fn worktree_prune(&self) -> Result<(), TreehouseError> {
        self.run(&["worktree", "prune"]).await?;
        Ok(())
    }

    /// Force-delete a local branch
    pub async fn delete_branch(&self, branch: &str) -> Result<(), TreehouseError> {
        self.run(&["branch", "-D", branch]).await?;
        Ok(())
    }
}

/// Parse `git branch` output into bare branch names.
///
/// Drops the current-branch marker and symbolic entries such as
/// `origin/HEAD -> origin/main`.
pub fn parse_branch_listing(out: &str) -> Vec<String> {
    out.lines()
        .map(|line| line.trim_start_matches(['*', '+']).trim())
        .filter(|line| !line.is_empty() && !line.contains(" -> "))
        .map(str::to_string)
        .collect()
}

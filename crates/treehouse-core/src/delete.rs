//! Worktree deletion
//!
//! Deletion is a non-transactional sequence: resolve the owning repository,
//! remove the worktree, prune stale metadata, then optionally delete the
//! branch. Each step records its outcome in a [`DeleteReport`]; nothing is
//! rolled back.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::error::TreehouseError;
use crate::git::Git;
use crate::gitdir::resolve_main_repo;
use crate::process::CommandRunner;

/// What to delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
    /// Directory name under the scan directory
    pub id: String,
    /// Branch checked out in the worktree
    pub branch_name: String,
    /// Also run `git branch -D` once the worktree is gone
    pub delete_branch: bool,
    pub scan_dir: PathBuf,
}

impl DeleteRequest {
    pub fn new(id: impl Into<String>, scan_dir: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            branch_name: String::new(),
            delete_branch: false,
            scan_dir: scan_dir.into(),
        }
    }

    pub fn with_branch(mut self, branch_name: impl Into<String>, delete_branch: bool) -> Self {
        self.branch_name = branch_name.into();
        self.delete_branch = delete_branch;
        self
    }
}

/// Steps of the deletion sequence, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeleteStep {
    ResolveRepo,
    RemoveWorktree,
    Prune,
    DeleteBranch,
}

impl fmt::Display for DeleteStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeleteStep::ResolveRepo => "resolve repository",
            DeleteStep::RemoveWorktree => "remove worktree",
            DeleteStep::Prune => "prune worktrees",
            DeleteStep::DeleteBranch => "delete branch",
        };
        f.write_str(name)
    }
}

/// How a step ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "reason")]
pub enum StepOutcome {
    Done,
    /// Primary action failed, the fallback succeeded
    FellBack,
    Failed(String),
    Skipped,
}

impl StepOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, StepOutcome::Failed(_))
    }
}

/// One executed step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepResult {
    pub step: DeleteStep,
    pub outcome: StepOutcome,
}

/// Per-step account of one deletion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteReport {
    pub id: String,
    pub path: PathBuf,
    /// Directory the git steps ran in
    pub repo_dir: PathBuf,
    pub steps: Vec<StepResult>,
}

impl DeleteReport {
    /// No step failed
    pub fn is_success(&self) -> bool {
        !self.steps.iter().any(|s| s.outcome.is_failed())
    }

    pub fn outcome(&self, step: DeleteStep) -> Option<&StepOutcome> {
        self.steps.iter().find(|s| s.step == step).map(|s| &s.outcome)
    }

    fn record(&mut self, step: DeleteStep, outcome: StepOutcome) {
        if let StepOutcome::Failed(reason) = &outcome {
            warn!(id = %self.id, %step, reason = %reason, "Deletion step failed");
        }
        self.steps.push(StepResult { step, outcome });
    }
}

fn violation(path: &Path, scan_dir: &Path) -> TreehouseError {
    TreehouseError::SecurityViolation {
        path: path.display().to_string(),
        scan_dir: scan_dir.display().to_string(),
    }
}

/// Resolve `id` to a path strictly inside `scan_dir`.
///
/// The id must be a single normal path component. An existing entry must be
/// a real directory, not a symbolic link, and its canonical form must stay
/// inside the scan directory. The returned path is always `<scan_dir>/<id>`,
/// never the canonical one, so destructive steps act on the entry itself.
pub fn resolve_target(id: &str, scan_dir: &Path) -> Result<PathBuf, TreehouseError> {
    let mut components = Path::new(id).components();
    let single_normal = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if id.is_empty() || !single_normal || id.contains(['/', '\\']) {
        return Err(violation(Path::new(id), scan_dir));
    }

    let root = scan_dir
        .canonicalize()
        .or_else(|_| std::path::absolute(scan_dir))
        .map_err(|_| violation(Path::new(id), scan_dir))?;
    let target = root.join(id);

    let meta = match std::fs::symlink_metadata(&target) {
        Ok(meta) => meta,
        Err(_) => return Ok(target),
    };
    if meta.file_type().is_symlink() {
        return Err(TreehouseError::SymlinkTarget {
            path: target.display().to_string(),
        });
    }

    let canonical = target
        .canonicalize()
        .map_err(|_| violation(&target, scan_dir))?;
    if canonical == root || !canonical.starts_with(&root) {
        return Err(violation(&canonical, scan_dir));
    }
    Ok(target)
}

/// Delete the worktree named by `request`.
///
/// Errors only when the target escapes the scan directory or is a symbolic
/// link, in which case nothing has been touched. Step failures are reported in the returned
/// [`DeleteReport`].
#[instrument(skip_all, fields(id = %request.id))]
pub async fn delete_worktree(
    runner: &dyn CommandRunner,
    request: &DeleteRequest,
) -> Result<DeleteReport, TreehouseError> {
    let target = resolve_target(&request.id, &request.scan_dir)?;

    let (repo_dir, resolve_outcome) = match resolve_main_repo(&target) {
        Ok(repo) => (repo, StepOutcome::Done),
        Err(e) => {
            warn!(error = %e, "Main repository not found, using scan directory");
            (request.scan_dir.clone(), StepOutcome::FellBack)
        }
    };

    let mut report = DeleteReport {
        id: request.id.clone(),
        path: target.clone(),
        repo_dir: repo_dir.clone(),
        steps: Vec::new(),
    };
    report.record(DeleteStep::ResolveRepo, resolve_outcome);

    let git = Git::new(runner, &repo_dir);

    let remove_outcome = match git.worktree_remove(&target).await {
        Ok(()) => StepOutcome::Done,
        Err(e) => {
            warn!(error = %e, "git worktree remove failed, removing directory");
            match tokio::fs::remove_dir_all(&target).await {
                Ok(()) => StepOutcome::FellBack,
                Err(io) if io.kind() == std::io::ErrorKind::NotFound => StepOutcome::FellBack,
                Err(io) => StepOutcome::Failed(format!("{}; fallback removal failed: {}", e, io)),
            }
        }
    };
    report.record(DeleteStep::RemoveWorktree, remove_outcome);

    let prune_outcome = match git.worktree_prune().await {
        Ok(()) => StepOutcome::Done,
        Err(e) => StepOutcome::Failed(e.to_string()),
    };
    report.record(DeleteStep::Prune, prune_outcome);

    let branch_outcome = if !request.delete_branch || request.branch_name.is_empty() {
        StepOutcome::Skipped
    } else {
        match git.delete_branch(&request.branch_name).await {
            Ok(()) => StepOutcome::Done,
            Err(e) => StepOutcome::Failed(e.to_string()),
        }
    };
    report.record(DeleteStep::DeleteBranch, branch_outcome);

    info!(path = %target.display(), success = report.is_success(), "Deleted worktree");
    Ok(report)
}

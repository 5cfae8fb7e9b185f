//! Scan directory discovery
//!
//! Lists the immediate children of the scan directory, keeps linked
//! worktrees, and builds one [`WorktreeRecord`] per worktree. Candidates are
//! processed concurrently; one failing candidate is logged and dropped
//! without affecting the others.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};

use crate::classify::{classify, promote_with_pr};
use crate::config::{Config, SidecarConfig, expand_home};
use crate::error::TreehouseError;
use crate::git::Git;
use crate::gitdir::{GitEntry, git_entry, resolve_main_repo};
use crate::github::GitHub;
use crate::process::CommandRunner;
use crate::sidecar::{detect_live_status, detect_origin_type};
use crate::types::WorktreeRecord;

/// Directory-name separator of the `<repo>-<branch>` convention
const NAME_SEPARATOR: char = '-';

/// Inputs for one scan
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Directory whose children are scanned (already `~`-expanded)
    pub directory: PathBuf,
    pub sidecar: SidecarConfig,
    /// Look up PRs via `gh` when it is available
    pub github: bool,
    /// Candidates processed at once
    pub max_concurrency: usize,
}

impl ScanOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            directory: config.scan.scan_dir(),
            sidecar: config.sidecar.clone(),
            github: config.github.enabled,
            max_concurrency: config.scan.max_concurrency,
        }
    }

    /// Override the scan directory; `~` is expanded
    pub fn with_directory(mut self, directory: &str) -> Self {
        self.directory = expand_home(directory);
        self
    }

    pub fn with_github(mut self, enabled: bool) -> Self {
        self.github = enabled;
        self
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// A child directory that may be a worktree
#[derive(Debug, Clone, PartialEq, Eq)]
struct Candidate {
    id: String,
    path: PathBuf,
}

/// Shared per-scan context handed to every candidate pipeline
struct ScanContext<'a> {
    runner: &'a dyn CommandRunner,
    sidecar: &'a SidecarConfig,
    github_available: bool,
    now: DateTime<Utc>,
}

/// Scan `options.directory` for worktrees.
///
/// A missing directory yields an empty list. Results follow filesystem
/// enumeration order.
#[instrument(skip_all, fields(dir = %options.directory.display()))]
pub async fn scan(
    runner: &dyn CommandRunner,
    options: &ScanOptions,
) -> Result<Vec<WorktreeRecord>, TreehouseError> {
    if !options.directory.is_dir() {
        info!("Scan directory not found, returning empty list");
        return Ok(Vec::new());
    }

    let root = options.directory.canonicalize()?;
    let candidates = list_candidates(&root)?;
    debug!(count = candidates.len(), "Found candidate directories");

    let github_available = options.github && GitHub::new(runner).is_available().await;
    if options.github && !github_available {
        info!("GitHub CLI unavailable, skipping PR lookups");
    }

    let ctx = ScanContext {
        runner,
        sidecar: &options.sidecar,
        github_available,
        now: Utc::now(),
    };

    let results: Vec<(String, Result<Option<WorktreeRecord>, TreehouseError>)> =
        stream::iter(candidates)
            .map(|candidate| {
                let ctx = &ctx;
                async move {
                    let result = process_candidate(ctx, &candidate).await;
                    (candidate.id, result)
                }
            })
            .buffered(options.max_concurrency.max(1))
            .collect()
            .await;

    let mut records = Vec::with_capacity(results.len());
    for (id, result) in results {
        match result {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {}
            Err(e) => warn!(id = %id, error = %e, "Failed to process worktree, skipping"),
        }
    }

    info!(count = records.len(), "Scan finished");
    Ok(records)
}

/// Immediate child directories whose name follows `<repo>-<branch>`
fn list_candidates(root: &Path) -> Result<Vec<Candidate>, TreehouseError> {
    let entries = std::fs::read_dir(root).map_err(|e| TreehouseError::ScanDirectory {
        path: root.display().to_string(),
        reason: e.to_string(),
    })?;

    let mut candidates = Vec::new();
    for entry in entries.flatten() {
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if !is_dir {
            continue;
        }

        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            debug!(path = %entry.path().display(), "Skipping non UTF-8 directory name");
            continue;
        };

        if name.contains(NAME_SEPARATOR) {
            candidates.push(Candidate {
                id: name,
                path: entry.path(),
            });
        }
    }

    Ok(candidates)
}

/// Build the record for one candidate, or `None` if it is not a worktree
async fn process_candidate(
    ctx: &ScanContext<'_>,
    candidate: &Candidate,
) -> Result<Option<WorktreeRecord>, TreehouseError> {
    let path = &candidate.path;

    match git_entry(path) {
        GitEntry::PointerFile => {}
        GitEntry::Directory => {
            debug!(id = %candidate.id, "Regular git clone (not a worktree), skipping");
            return Ok(None);
        }
        GitEntry::Missing => {
            debug!(id = %candidate.id, "No .git file, skipping");
            return Ok(None);
        }
    }

    let branch_name = match Git::new(ctx.runner, path).current_branch().await {
        Ok(Some(branch)) => branch,
        Ok(None) => {
            debug!(id = %candidate.id, "Detached HEAD, using directory name as branch");
            candidate.id.clone()
        }
        Err(e) => {
            debug!(id = %candidate.id, error = %e, "Branch lookup failed, using directory name");
            candidate.id.clone()
        }
    };

    let pr_lookup = async {
        if !ctx.github_available {
            return None;
        }
        // PRs are repository-scoped; gh also resolves the repo from a
        // worktree checkout, so that is the fallback.
        let repo = resolve_main_repo(path).unwrap_or_else(|_| path.clone());
        GitHub::new(ctx.runner).pr_for_branch(&branch_name, &repo).await
    };

    let (classification, pr_status) =
        tokio::join!(classify(ctx.runner, path, &branch_name), pr_lookup);

    for diag in &classification.diagnostics {
        warn!(id = %candidate.id, "Signal unavailable: {}", diag);
    }

    let status = promote_with_pr(classification.status, pr_status.as_ref());
    let origin_type = detect_origin_type(path, ctx.sidecar);
    let liveness = detect_live_status(path, ctx.sidecar, ctx.now);
    let last_modified: DateTime<Utc> = std::fs::metadata(path)?.modified()?.into();

    Ok(Some(WorktreeRecord {
        id: candidate.id.clone(),
        path: path.clone(),
        branch_name,
        origin_type,
        status,
        pr_status,
        live_status: liveness.status,
        last_active: liveness.last_active,
        last_modified,
    }))
}

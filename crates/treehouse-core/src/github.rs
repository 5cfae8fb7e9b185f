//! GitHub CLI (`gh`) wrapper for PR lookups.
//!
//! Authentication and repository resolution are left to `gh` itself
//! (`gh auth login`). The only text-matching in this module is
//! [`parse_auth_status`]; everything else reads `gh`'s JSON output.

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::error::{Diagnostic, TreehouseError};
use crate::process::CommandRunner;
use crate::types::{CheckState, CheckSummary, PrState, PrStatus};

const GH: &str = "gh";

/// Fields requested from `gh pr list`
const PR_FIELDS: &str = "number,title,url,state,isDraft,statusCheckRollup";

/// Authentication state reported by `gh auth status`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Authenticated,
    NotAuthenticated,
    /// The auth probe could not be run
    Unknown,
}

/// Typed result of probing the `gh` installation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GhProbe {
    pub installed: bool,
    /// First line of `gh --version`
    pub version: Option<String>,
    pub auth: AuthState,
}

impl GhProbe {
    pub fn is_available(&self) -> bool {
        self.installed && self.auth == AuthState::Authenticated
    }
}

/// Interpret `gh auth status` output.
///
/// Older `gh` releases exit 0 even when logged out, so the combined text must
/// also carry a success marker.
pub fn parse_auth_status(success: bool, combined: &str) -> AuthState {
    if success && (combined.contains("Logged in") || combined.contains('✓')) {
        AuthState::Authenticated
    } else {
        AuthState::NotAuthenticated
    }
}

/// Entry of `gh pr list --json ...`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GhPrListItem {
    number: u64,
    title: String,
    url: String,
    state: String,
    #[serde(default)]
    is_draft: bool,
    #[serde(default)]
    status_check_rollup: Option<Vec<RollupItem>>,
}

/// One entry of `statusCheckRollup`: either a CheckRun (`status` +
/// `conclusion`) or a commit StatusContext (`state`)
#[derive(Debug, Default, Deserialize)]
pub struct RollupItem {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub conclusion: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

impl RollupItem {
    fn is_pending(&self) -> bool {
        matches!(
            self.status.as_deref(),
            Some("PENDING" | "IN_PROGRESS" | "QUEUED" | "WAITING" | "REQUESTED")
        ) || matches!(self.state.as_deref(), Some("PENDING" | "EXPECTED"))
    }

    fn is_failure(&self) -> bool {
        matches!(
            self.conclusion.as_deref(),
            Some("FAILURE" | "TIMED_OUT" | "STARTUP_FAILURE")
        ) || matches!(self.state.as_deref(), Some("FAILURE" | "ERROR"))
    }
}

/// Aggregate CI state: pending > failure > success.
///
/// Returns `None` for an empty rollup.
pub fn aggregate_checks(rollup: &[RollupItem]) -> Option<CheckState> {
    if rollup.is_empty() {
        None
    } else if rollup.iter().any(RollupItem::is_pending) {
        Some(CheckState::Pending)
    } else if rollup.iter().any(RollupItem::is_failure) {
        Some(CheckState::Failure)
    } else {
        Some(CheckState::Success)
    }
}

/// Map `gh pr list` JSON to at most one PR
pub fn parse_pr_list(json: &str) -> Result<Option<PrStatus>, TreehouseError> {
    let items: Vec<GhPrListItem> = serde_json::from_str(json)?;

    Ok(items.into_iter().next().map(|pr| {
        let checks = pr
            .status_check_rollup
            .as_deref()
            .and_then(aggregate_checks)
            .map(|state| {
                vec![CheckSummary {
                    state,
                    summary: state.summary().to_string(),
                }]
            });

        PrStatus {
            number: pr.number,
            title: pr.title,
            url: pr.url,
            state: PrState::from_gh(&pr.state),
            is_draft: pr.is_draft,
            checks,
        }
    }))
}

/// GitHub CLI wrapper
pub struct GitHub<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> GitHub<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// Probe `gh --version`, then `gh auth status`
    #[instrument(skip(self))]
    pub async fn probe(&self) -> GhProbe {
        let version = match self.runner.run(GH, &["--version"], None).await {
            Ok(out) if out.success => out.stdout.lines().next().map(str::to_string),
            Ok(out) => {
                debug!(stderr = %out.stderr.trim(), "gh --version failed");
                None
            }
            Err(e) => {
                debug!(error = %e, "gh not available");
                None
            }
        };

        if version.is_none() {
            return GhProbe {
                installed: false,
                version: None,
                auth: AuthState::Unknown,
            };
        }

        let auth = match self.runner.run(GH, &["auth", "status"], None).await {
            Ok(out) => parse_auth_status(out.success, &out.combined()),
            Err(e) => {
                warn!(error = %e, "gh auth status could not be run");
                AuthState::Unknown
            }
        };
        debug!(?version, ?auth, "gh probe finished");

        GhProbe {
            installed: true,
            version,
            auth,
        }
    }

    /// Installed and authenticated. Never fails.
    pub async fn is_available(&self) -> bool {
        self.probe().await.is_available()
    }

    /// Look up the PR whose head is `branch`, run inside `repo_path`
    #[instrument(skip(self))]
    pub async fn lookup_pr(
        &self,
        branch: &str,
        repo_path: &Path,
    ) -> Result<Option<PrStatus>, Diagnostic> {
        let output = self
            .runner
            .run(
                GH,
                &[
                    "pr", "list", "--head", branch, "--json", PR_FIELDS, "--limit", "1",
                ],
                Some(repo_path),
            )
            .await
            .map_err(|e| Diagnostic::from_error("pr", &e))?;

        if !output.success {
            return Err(Diagnostic::new(
                "pr",
                format!("gh pr list failed: {}", output.stderr.trim()),
            ));
        }

        parse_pr_list(&output.stdout).map_err(|e| Diagnostic::from_error("pr", &e))
    }

    /// Like [`GitHub::lookup_pr`], but failures are logged and yield `None`
    pub async fn pr_for_branch(&self, branch: &str, repo_path: &Path) -> Option<PrStatus> {
        match self.lookup_pr(branch, repo_path).await {
            Ok(pr) => pr,
            Err(diag) => {
                warn!(branch, repo = %repo_path.display(), "{}", diag);
                None
            }
        }
    }
}

//! Core data types for treehouse

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One discovered worktree, rebuilt from scratch on every scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorktreeRecord {
    /// Directory name under the scan root (unique within one scan)
    pub id: String,
    /// Absolute path to the worktree root
    pub path: PathBuf,
    /// Checked-out branch as reported by git
    pub branch_name: String,
    /// How the worktree was created
    pub origin_type: OriginType,
    /// Classified status
    pub status: WorktreeStatus,
    /// Pull request for the branch, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pr_status: Option<PrStatus>,
    /// Agent heartbeat state
    pub live_status: LiveStatus,
    /// Last heartbeat timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_active: Option<DateTime<Utc>>,
    /// Modification time of the worktree root
    pub last_modified: DateTime<Utc>,
}

/// Worktree status, in priority order dirty > merged > pr-out > clean
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorktreeStatus {
    /// No uncommitted changes, not merged, no open PR
    Clean,
    /// Uncommitted changes (tracked, staged, or untracked)
    Dirty,
    /// Branch merged into the remote default branch
    Merged,
    /// Open pull request awaiting merge
    PrOut,
}

impl WorktreeStatus {
    pub const ALL: [WorktreeStatus; 4] = [
        WorktreeStatus::Dirty,
        WorktreeStatus::Merged,
        WorktreeStatus::PrOut,
        WorktreeStatus::Clean,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorktreeStatus::Clean => "clean",
            WorktreeStatus::Dirty => "dirty",
            WorktreeStatus::Merged => "merged",
            WorktreeStatus::PrOut => "pr-out",
        }
    }

    /// Parse a status name as printed by `as_str`
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for WorktreeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a worktree came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginType {
    /// Created by hand
    #[default]
    Manual,
    /// Created by an agent process
    Automated,
}

impl fmt::Display for OriginType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OriginType::Manual => write!(f, "manual"),
            OriginType::Automated => write!(f, "automated"),
        }
    }
}

/// Whether an agent is currently working in the worktree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiveStatus {
    /// Fresh heartbeat with the active marker
    Active,
    /// Heartbeat present but stale or not active
    Idle,
    /// No readable heartbeat
    #[default]
    Unknown,
}

impl fmt::Display for LiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiveStatus::Active => write!(f, "active"),
            LiveStatus::Idle => write!(f, "idle"),
            LiveStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// Pull request summary for a branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrStatus {
    pub number: u64,
    pub title: String,
    pub url: String,
    pub state: PrState,
    pub is_draft: bool,
    /// Aggregate CI state; absent when the PR has no checks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<Vec<CheckSummary>>,
}

impl PrStatus {
    /// Aggregate CI state, if the PR has checks
    pub fn check_state(&self) -> Option<CheckState> {
        self.checks
            .as_ref()
            .and_then(|checks| checks.first())
            .map(|check| check.state)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrState {
    Open,
    Closed,
    Merged,
}

impl PrState {
    /// Map the upper-case state string reported by `gh`
    pub fn from_gh(state: &str) -> Self {
        match state.to_uppercase().as_str() {
            "OPEN" => PrState::Open,
            "MERGED" => PrState::Merged,
            _ => PrState::Closed,
        }
    }
}

impl fmt::Display for PrState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrState::Open => write!(f, "open"),
            PrState::Closed => write!(f, "closed"),
            PrState::Merged => write!(f, "merged"),
        }
    }
}

/// One CI summary entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSummary {
    pub state: CheckState,
    pub summary: String,
}

/// CI state, in precedence order pending > failure > success
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckState {
    Pending,
    Success,
    Failure,
}

impl CheckState {
    pub fn summary(&self) -> &'static str {
        match self {
            CheckState::Pending => "Checks running",
            CheckState::Success => "All checks passed",
            CheckState::Failure => "Some checks failed",
        }
    }
}

impl fmt::Display for CheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckState::Pending => write!(f, "pending"),
            CheckState::Success => write!(f, "success"),
            CheckState::Failure => write!(f, "failure"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_strings() {
        assert_eq!(WorktreeStatus::PrOut.to_string(), "pr-out");
        assert_eq!(WorktreeStatus::parse("PR-OUT"), Some(WorktreeStatus::PrOut));
        assert_eq!(WorktreeStatus::parse(" dirty "), Some(WorktreeStatus::Dirty));
        assert_eq!(WorktreeStatus::parse("stale"), None);
    }

    #[test]
    fn test_pr_state_from_gh() {
        assert_eq!(PrState::from_gh("OPEN"), PrState::Open);
        assert_eq!(PrState::from_gh("merged"), PrState::Merged);
        assert_eq!(PrState::from_gh("CLOSED"), PrState::Closed);
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = WorktreeRecord {
            id: "myrepo-feature-x".to_string(),
            path: PathBuf::from("/home/me/Projects/myrepo-feature-x"),
            branch_name: "feature-x".to_string(),
            origin_type: OriginType::Automated,
            status: WorktreeStatus::PrOut,
            pr_status: None,
            live_status: LiveStatus::Idle,
            last_active: None,
            last_modified: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        };

        let json = serde_json::to_value(&record).expect("serialization should succeed");
        assert_eq!(json["branchName"], "feature-x");
        assert_eq!(json["originType"], "automated");
        assert_eq!(json["status"], "pr-out");
        assert_eq!(json["liveStatus"], "idle");
        assert!(json.get("prStatus").is_none());
        assert!(json.get("lastActive").is_none());
    }

    #[test]
    fn test_check_state_of_pr() {
        let pr = PrStatus {
            number: 7,
            title: "Add thing".to_string(),
            url: "https://github.com/o/r/pull/7".to_string(),
            state: PrState::Open,
            is_draft: false,
            checks: Some(vec![CheckSummary {
                state: CheckState::Failure,
                summary: CheckState::Failure.summary().to_string(),
            }]),
        };
        assert_eq!(pr.check_state(), Some(CheckState::Failure));

        let json = serde_json::to_value(&pr).unwrap();
        assert_eq!(json["isDraft"], false);
        assert_eq!(json["state"], "open");
        assert_eq!(json["checks"][0]["state"], "failure");
    }
}

//! JSON output formatting

use serde::Serialize;
use treehouse_core::{DeleteReport, TreehouseError, WorktreeRecord};

const SCHEMA_VERSION: &str = "1";

/// Issue code for a deletion step that failed without aborting the delete
pub const STEP_FAILED: &str = "W001";

/// JSON response envelope
#[derive(Debug, Clone, Serialize)]
pub struct JsonResponse<T> {
    /// Schema version for forward compatibility
    pub schema_version: String,
    /// Command that generated this response
    pub command: String,
    /// Status: "ok" or "error"
    pub status: String,
    /// Command-specific payload
    pub data: T,
    /// Errors and warnings
    pub issues: Vec<JsonIssue>,
}

impl<T> JsonResponse<T> {
    /// Create a successful response
    pub fn ok(command: &str, data: T) -> Self {
        Self::ok_with_issues(command, data, vec![])
    }

    /// Create a successful response with issues
    pub fn ok_with_issues(command: &str, data: T, issues: Vec<JsonIssue>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            command: command.to_string(),
            status: "ok".to_string(),
            data,
            issues,
        }
    }

    /// Create an error response
    pub fn error(command: &str, data: T, issues: Vec<JsonIssue>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            command: command.to_string(),
            status: "error".to_string(),
            data,
            issues,
        }
    }
}

impl<T: Serialize> JsonResponse<T> {
    /// Pretty-print to stdout
    pub fn print(&self) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("failed to serialize output: {}", e))?;
        println!("{}", json);
        Ok(())
    }
}

/// Issue object structure
#[derive(Debug, Clone, Serialize)]
pub struct JsonIssue {
    /// Error/warning code (e.g., "T001")
    pub code: String,
    /// Severity level
    pub severity: String,
    /// Human-readable message
    pub message: String,
    /// Worktree id the issue concerns
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worktree: Option<String>,
}

impl From<&TreehouseError> for JsonIssue {
    fn from(err: &TreehouseError) -> Self {
        Self {
            code: err.code().to_string(),
            severity: "error".to_string(),
            message: err.to_string(),
            worktree: None,
        }
    }
}

impl JsonIssue {
    pub fn warning(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            severity: "warning".to_string(),
            message: message.into(),
            worktree: None,
        }
    }

    /// Set the worktree id
    pub fn with_worktree(mut self, id: &str) -> Self {
        self.worktree = Some(id.to_string());
        self
    }
}

/// Data payload for list command
#[derive(Debug, Clone, Serialize)]
pub struct ListData {
    /// Directory that was scanned
    pub scan_dir: String,
    /// PR lookups were requested
    pub github: bool,
    pub worktrees: Vec<WorktreeRecord>,
}

/// Data payload for delete command
#[derive(Debug, Clone, Serialize)]
pub struct DeleteData {
    pub id: String,
    /// Report is absent when deletion was refused
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<DeleteReport>,
}

/// Data payload for github command
#[derive(Debug, Clone, Serialize)]
pub struct GithubData {
    pub installed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// "authenticated", "not-authenticated" or "unknown"
    pub auth: String,
    /// PR lookups will run
    pub available: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let response = JsonResponse::ok(
            "delete",
            DeleteData {
                id: "myrepo-old".to_string(),
                report: None,
            },
        );
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["schema_version"], "1");
        assert_eq!(json["command"], "delete");
        assert_eq!(json["status"], "ok");
        assert_eq!(json["data"]["id"], "myrepo-old");
        assert!(json["data"].get("report").is_none());
        assert_eq!(json["issues"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_issue_from_error() {
        let err = TreehouseError::SecurityViolation {
            path: "/etc".to_string(),
            scan_dir: "/home/me/Projects".to_string(),
        };
        let issue = JsonIssue::from(&err);
        assert_eq!(issue.code, "T001");
        assert_eq!(issue.severity, "error");

        let json = serde_json::to_value(JsonIssue::warning(STEP_FAILED, "prune failed").with_worktree("a-b"))
            .unwrap();
        assert_eq!(json["worktree"], "a-b");
        assert_eq!(json["severity"], "warning");
    }
}

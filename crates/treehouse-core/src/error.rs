//! Error types for treehouse operations

use std::fmt;

use thiserror::Error;

/// Core error type for treehouse operations
#[derive(Error, Debug)]
pub enum TreehouseError {
    // === Safety errors (T001) ===
    /// T001: Delete target escapes the scan directory
    #[error("T001: Invalid worktree path - security violation: {path} is not inside {scan_dir}")]
    SecurityViolation { path: String, scan_dir: String },

    /// T001: Delete target is a symbolic link rather than a worktree directory
    #[error("T001: Invalid worktree path - security violation: {path} is a symbolic link")]
    SymlinkTarget { path: String },

    // === External tool errors (T002-T005) ===
    /// T002: Binary not installed or not on PATH
    #[error("T002: {program} not installed or not found")]
    ToolNotFound { program: String },

    /// T003: External command did not finish in time
    #[error("T003: {program} timed out after {secs} seconds")]
    CommandTimeout { program: String, secs: u64 },

    /// T004: External command could not be spawned
    #[error("T004: failed to run {program}: {reason}")]
    CommandFailed { program: String, reason: String },

    /// T005: Git exited unsuccessfully
    #[error("T005: git command failed: {0}")]
    GitCommand(String),

    // === Worktree errors (T006-T007) ===
    /// T006: Directory is not a linked git worktree
    #[error("T006: not a git worktree: {path}")]
    NotAWorktree { path: String },

    /// T007: Scan directory exists but could not be read
    #[error("T007: failed to read scan directory {path}: {reason}")]
    ScanDirectory { path: String, reason: String },

    // === IO and system errors ===
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TreehouseError {
    /// Get the error code (e.g., "T001")
    pub fn code(&self) -> &'static str {
        match self {
            TreehouseError::SecurityViolation { .. } | TreehouseError::SymlinkTarget { .. } => {
                "T001"
            }
            TreehouseError::ToolNotFound { .. } => "T002",
            TreehouseError::CommandTimeout { .. } => "T003",
            TreehouseError::CommandFailed { .. } => "T004",
            TreehouseError::GitCommand(_) => "T005",
            TreehouseError::NotAWorktree { .. } => "T006",
            TreehouseError::ScanDirectory { .. } => "T007",
            TreehouseError::Config(_) => "T008",
            TreehouseError::Io(_) => "T009",
            TreehouseError::Json(_) => "T009",
        }
    }

    /// Get the exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            TreehouseError::SecurityViolation { .. } | TreehouseError::SymlinkTarget { .. } => 3,

            TreehouseError::ToolNotFound { .. } => 5,

            TreehouseError::CommandTimeout { .. }
            | TreehouseError::CommandFailed { .. }
            | TreehouseError::GitCommand(_) => 1,

            TreehouseError::NotAWorktree { .. } => 6,

            TreehouseError::ScanDirectory { .. } | TreehouseError::Io(_) => 2,

            TreehouseError::Config(_) => 4,

            TreehouseError::Json(_) => 1,
        }
    }
}

/// A non-fatal problem observed while evaluating one step of the pipeline.
///
/// Steps that fail open (status queries, merge checks, PR lookups, prune)
/// return these instead of errors; the aggregating stage decides how loudly
/// to log them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Step that produced the diagnostic (e.g. "status", "merged")
    pub source: &'static str,
    /// Human-readable detail
    pub message: String,
}

impl Diagnostic {
    pub fn new(source: &'static str, message: impl Into<String>) -> Self {
        Self {
            source,
            message: message.into(),
        }
    }

    /// Wrap an error as an informational diagnostic
    pub fn from_error(source: &'static str, err: &TreehouseError) -> Self {
        Self::new(source, err.to_string())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = TreehouseError::SecurityViolation {
            path: "/tmp/other".to_string(),
            scan_dir: "/home/me/Projects".to_string(),
        };
        assert_eq!(err.code(), "T001");
        assert_eq!(err.exit_code(), 3);

        let err = TreehouseError::SymlinkTarget {
            path: "/home/me/Projects/myrepo-link".to_string(),
        };
        assert_eq!(err.code(), "T001");
        assert_eq!(err.exit_code(), 3);

        let err = TreehouseError::ToolNotFound {
            program: "gh".to_string(),
        };
        assert_eq!(err.code(), "T002");
        assert_eq!(err.exit_code(), 5);

        let err = TreehouseError::GitCommand("boom".to_string());
        assert_eq!(err.code(), "T005");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_error_display() {
        let err = TreehouseError::SecurityViolation {
            path: "/etc".to_string(),
            scan_dir: "/home/me/Projects".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "T001: Invalid worktree path - security violation: /etc is not inside /home/me/Projects"
        );

        let err = TreehouseError::CommandTimeout {
            program: "gh".to_string(),
            secs: 10,
        };
        assert!(err.to_string().contains("10 seconds"));
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::new("status", "git not found");
        assert_eq!(diag.to_string(), "status: git not found");

        let err = TreehouseError::GitCommand("fatal: not a git repository".to_string());
        let diag = Diagnostic::from_error("merged", &err);
        assert_eq!(diag.source, "merged");
        assert!(diag.message.contains("not a git repository"));
    }
}

//! treehouse-core: Core library for worktree discovery, classification, and cleanup
//!
//! This crate inventories the git worktrees that live directly under a scan
//! directory, classifies each one, and removes them on request.

/// Core error types for treehouse operations
pub mod error;

/// Configuration handling
pub mod config;

/// Core data types (WorktreeRecord, WorktreeStatus, PrStatus, etc.)
pub mod types;

/// External process execution
pub mod process;

/// Git CLI wrapper
pub mod git;

/// `.git` pointer file parsing
pub mod gitdir;

/// GitHub CLI (`gh`) wrapper for PR lookups
pub mod github;

/// Origin and liveness sidecar files
pub mod sidecar;

/// Worktree status classification
pub mod classify;

/// Scan directory discovery
pub mod scan;

/// Worktree deletion
pub mod delete;

/// Filtering and ordering of scan results
pub mod filter;

// Re-exports for convenience
pub use classify::{Classification, classify, promote_with_pr};
pub use config::{Config, ScanConfig, SidecarConfig, expand_home};
pub use delete::{DeleteReport, DeleteRequest, DeleteStep, StepOutcome, delete_worktree};
pub use error::{Diagnostic, TreehouseError};
pub use filter::{apply_order, filter_records};
pub use github::{AuthState, GhProbe, GitHub};
pub use process::{CommandOutput, CommandRunner, SystemRunner};
pub use scan::{ScanOptions, scan};
pub use types::{
    CheckState, CheckSummary, LiveStatus, OriginType, PrState, PrStatus, WorktreeRecord,
    WorktreeStatus,
};

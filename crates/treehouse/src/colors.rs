//! Semantic color theme for consistent terminal output
//!
//! - `ACTIVE` => blue - Spinners, headers
//! - `SUCCESS` => green - Completed steps, pr-out, live agents
//! - `WARNING` => yellow - Fallbacks, partial failures
//! - `FAIL` => red - Errors, dirty worktrees
//! - `MERGED` => purple - Merged worktrees, safe to delete
//! - `MUTED` => dimmed - Clean worktrees, secondary text

use std::sync::LazyLock;

use owo_colors::Style;
use treehouse_core::WorktreeStatus;

/// Semantic color definitions for terminal output
pub struct SemanticColors {
    /// Blue - spinners, table headers
    pub active: Style,
    /// Green - completed steps, pr-out worktrees, live agents
    pub success: Style,
    /// Yellow - fallback steps, partial cleanup warnings
    pub warning: Style,
    /// Red - failed steps, dirty worktrees
    pub fail: Style,
    /// Purple - merged worktrees
    pub merged: Style,
    /// Dimmed - clean worktrees, skipped steps, refresh notices
    pub muted: Style,
}

impl Default for SemanticColors {
    fn default() -> Self {
        Self {
            active: Style::new().blue(),
            success: Style::new().green(),
            warning: Style::new().yellow(),
            fail: Style::new().red(),
            merged: Style::new().purple(),
            muted: Style::new().dimmed(),
        }
    }
}

impl SemanticColors {
    /// Style for a worktree status badge
    pub fn status(&self, status: WorktreeStatus) -> Style {
        match status {
            WorktreeStatus::Dirty => self.fail,
            WorktreeStatus::PrOut => self.success,
            WorktreeStatus::Merged => self.merged,
            WorktreeStatus::Clean => self.muted,
        }
    }
}

/// Global default theme
pub static COLORS: LazyLock<SemanticColors> = LazyLock::new(SemanticColors::default);

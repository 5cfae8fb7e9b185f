//! CLI argument parsing with clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use treehouse_core::WorktreeStatus;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Treehouse - Inventory and clean up git worktrees
#[derive(Parser)]
#[command(name = "treehouse")]
#[command(version = VERSION)]
#[command(about = "Inventory and clean up git worktrees")]
#[command(long_about = "Treehouse finds the git worktrees living directly under a scan directory (~/Projects by default), classifies each one as dirty, merged, pr-out or clean, and removes them safely on request.\n\nPR lookups use the GitHub CLI (gh) when it is installed and authenticated.")]
pub struct Cli {
    /// Increase output verbosity
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file (default: <config dir>/treehouse/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List worktrees under the scan directory
    ///
    /// Shows status, branch, PR and agent activity for each worktree.
    #[command(long_about = "List worktrees under the scan directory.\n\nStatus, first match wins:\n  dirty   Uncommitted changes, including untracked files\n  merged  Branch merged into origin/main (or origin/master)\n  pr-out  Clean with an open pull request\n  clean   Everything else\n\nRegular clones and directories without a .git file are ignored.")]
    List {
        /// Directory to scan (overrides config)
        #[arg(long, value_name = "DIR")]
        dir: Option<String>,

        /// Case-insensitive match against branch, id and path
        #[arg(long, value_name = "TEXT")]
        filter: Option<String>,

        /// Only show worktrees with this status (clean, dirty, merged, pr-out)
        #[arg(long, value_parser = parse_status)]
        status: Option<WorktreeStatus>,

        /// Skip GitHub PR lookups
        #[arg(long)]
        no_github: bool,

        /// Re-scan on an interval until interrupted
        #[arg(short, long)]
        watch: bool,

        /// Seconds between scans in watch mode (overrides config)
        #[arg(long, value_name = "SECS", requires = "watch")]
        interval: Option<u64>,
    },

    /// Delete a worktree
    ///
    /// Removes the worktree registration and directory, then prunes.
    #[command(long_about = "Delete a worktree.\n\nSteps:\n  1. git worktree remove --force (falls back to deleting the directory)\n  2. git worktree prune\n  3. git branch -D <branch>, only with --delete-branch\n\nThe ID is the directory name under the scan directory. Nothing is rolled back if a later step fails.")]
    Delete {
        /// Worktree directory name
        id: String,

        /// Branch to delete (default: the branch checked out in the worktree)
        #[arg(long, value_name = "NAME")]
        branch: Option<String>,

        /// Also delete the local branch
        #[arg(long)]
        delete_branch: bool,

        /// Scan directory containing the worktree (overrides config)
        #[arg(long, value_name = "DIR")]
        dir: Option<String>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show GitHub CLI availability
    Github,
}

fn parse_status(s: &str) -> Result<WorktreeStatus, String> {
    WorktreeStatus::parse(s).ok_or_else(|| {
        let valid: Vec<_> = WorktreeStatus::ALL.iter().map(|s| s.as_str()).collect();
        format!("invalid status '{}' (expected one of: {})", s, valid.join(", "))
    })
}

/// Get the command args for use in the application
pub fn parse() -> Cli {
    Cli::parse()
}

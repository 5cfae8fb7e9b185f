//! `.git` pointer file parsing
//!
//! A linked worktree has a `.git` *file* containing
//! `gitdir: <main-repo>/.git/worktrees/<name>`. A standalone clone has a
//! `.git` directory instead.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::TreehouseError;

static WORKTREE_GITDIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^gitdir:\s*(.+?)[/\\]\.git[/\\]worktrees[/\\]")
        .expect("valid gitdir regex")
});

/// What the `.git` entry of a directory is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitEntry {
    /// `.git` is a file: linked worktree
    PointerFile,
    /// `.git` is a directory: standalone clone
    Directory,
    /// No `.git` entry
    Missing,
}

/// Inspect `<dir>/.git`, following a symbolic link to what it points at.
///
/// A dangling link counts as [`GitEntry::Missing`].
pub fn git_entry(dir: &Path) -> GitEntry {
    match std::fs::metadata(dir.join(".git")) {
        Ok(meta) if meta.is_file() => GitEntry::PointerFile,
        Ok(meta) if meta.is_dir() => GitEntry::Directory,
        _ => GitEntry::Missing,
    }
}

/// Extract the main repository path from `.git` pointer file content.
///
/// Relative paths are resolved against `worktree_dir`.
pub fn main_repo_from_pointer(content: &str, worktree_dir: &Path) -> Option<PathBuf> {
    let captures = WORKTREE_GITDIR.captures(content)?;
    let raw = captures.get(1)?.as_str().trim();
    if raw.is_empty() {
        return None;
    }

    let path = PathBuf::from(raw);
    if path.is_absolute() {
        Some(path)
    } else {
        let joined = worktree_dir.join(path);
        Some(joined.canonicalize().unwrap_or(joined))
    }
}

/// Resolve the main repository that owns the worktree at `worktree_dir`
pub fn resolve_main_repo(worktree_dir: &Path) -> Result<PathBuf, TreehouseError> {
    let not_a_worktree = || TreehouseError::NotAWorktree {
        path: worktree_dir.display().to_string(),
    };

    if git_entry(worktree_dir) != GitEntry::PointerFile {
        return Err(not_a_worktree());
    }

    let content = std::fs::read_to_string(worktree_dir.join(".git"))?;
    main_repo_from_pointer(&content, worktree_dir).ok_or_else(not_a_worktree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_absolute_pointer() {
        let content = "gitdir: /home/me/Projects/myrepo/.git/worktrees/myrepo-feature-x\n";
        assert_eq!(
            main_repo_from_pointer(content, Path::new("/home/me/Projects/myrepo-feature-x")),
            Some(PathBuf::from("/home/me/Projects/myrepo"))
        );
    }

    #[test]
    fn test_path_with_spaces_and_crlf() {
        let content = "gitdir: /home/me/My Projects/repo/.git/worktrees/feat\r\n";
        assert_eq!(
            main_repo_from_pointer(content, Path::new("/home/me/My Projects/repo-feat")),
            Some(PathBuf::from("/home/me/My Projects/repo"))
        );
    }

    #[test]
    fn test_relative_pointer() {
        let temp = tempfile::tempdir().unwrap();
        let main = temp.path().join("myrepo");
        let wt = temp.path().join("myrepo-feat");
        fs::create_dir_all(main.join(".git/worktrees/myrepo-feat")).unwrap();
        fs::create_dir_all(&wt).unwrap();

        let resolved =
            main_repo_from_pointer("gitdir: ../myrepo/.git/worktrees/myrepo-feat\n", &wt).unwrap();
        assert_eq!(resolved, main.canonicalize().unwrap());
    }

    #[test]
    fn test_malformed_pointer() {
        let wt = Path::new("/tmp/x");
        assert_eq!(main_repo_from_pointer("", wt), None);
        assert_eq!(main_repo_from_pointer("gitdir: /repo/.git\n", wt), None);
        assert_eq!(main_repo_from_pointer("not a pointer", wt), None);
        // Submodules point into .git/modules, not .git/worktrees
        assert_eq!(
            main_repo_from_pointer("gitdir: ../.git/modules/sub\n", wt),
            None
        );
    }

    #[test]
    fn test_git_entry_kinds() {
        let temp = tempfile::tempdir().unwrap();

        let clone = temp.path().join("clone");
        fs::create_dir_all(clone.join(".git")).unwrap();
        assert_eq!(git_entry(&clone), GitEntry::Directory);

        let worktree = temp.path().join("wt");
        fs::create_dir_all(&worktree).unwrap();
        fs::write(worktree.join(".git"), "gitdir: /r/.git/worktrees/wt\n").unwrap();
        assert_eq!(git_entry(&worktree), GitEntry::PointerFile);

        let plain = temp.path().join("plain");
        fs::create_dir_all(&plain).unwrap();
        assert_eq!(git_entry(&plain), GitEntry::Missing);
    }

    #[cfg(unix)]
    #[test]
    fn test_git_entry_follows_links() {
        let temp = tempfile::tempdir().unwrap();
        let pointer = temp.path().join("pointer");
        fs::write(&pointer, "gitdir: /r/.git/worktrees/wt\n").unwrap();

        let wt = temp.path().join("wt");
        fs::create_dir_all(&wt).unwrap();
        std::os::unix::fs::symlink(&pointer, wt.join(".git")).unwrap();
        assert_eq!(git_entry(&wt), GitEntry::PointerFile);

        let dangling = temp.path().join("dangling");
        fs::create_dir_all(&dangling).unwrap();
        std::os::unix::fs::symlink(temp.path().join("nowhere"), dangling.join(".git")).unwrap();
        assert_eq!(git_entry(&dangling), GitEntry::Missing);
    }

    #[test]
    fn test_resolve_main_repo_rejects_clone() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir_all(temp.path().join(".git")).unwrap();
        let err = resolve_main_repo(temp.path()).unwrap_err();
        assert!(matches!(err, TreehouseError::NotAWorktree { .. }));
    }
}

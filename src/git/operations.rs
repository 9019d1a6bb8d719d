//! Low-level git operations
//!
//! Thin spawns of the `git` binary. Every helper takes the directory to
//! operate from; failures carry git's stderr.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

fn git(dir: &Path, args: &[&str]) -> Result<std::process::Output> {
    Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .with_context(|| format!("Failed to run git {}", args.join(" ")))
}

/// Check if a directory is inside a git repository
pub fn is_git_repo(dir: &Path) -> Result<bool> {
    let output = git(dir, &["rev-parse", "--git-dir"])?;
    Ok(output.status.success())
}

/// Get the top-level directory of the work tree containing `dir`
pub fn top_level(dir: &Path) -> Result<PathBuf> {
    let output = git(dir, &["rev-parse", "--show-toplevel"])?;

    if !output.status.success() {
        anyhow::bail!(
            "Not inside a git work tree: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    let top = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok(PathBuf::from(top))
}

/// Get the URL of a named remote
pub fn remote_url(dir: &Path, remote: &str) -> Result<String> {
    let output = git(dir, &["remote", "get-url", remote])?;

    if !output.status.success() {
        anyhow::bail!("Remote '{}' not found", remote);
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Get the origin remote URL
pub fn origin_url(dir: &Path) -> Result<String> {
    remote_url(dir, "origin")
}

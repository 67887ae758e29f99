//! The small git command surface this tool consumes.

use anyhow::{Context, Result, anyhow};
use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Existence probe; exit code only.
pub fn inside_git_repository() -> bool {
    Command::new("git")
        .args(["rev-parse", "--git-dir"])
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

pub fn repo_root() -> Result<PathBuf> {
    let root = run_git(Path::new("."), &["rev-parse", "--show-toplevel"])?;
    Ok(PathBuf::from(root))
}

/// Hooks directory, worktree-aware: `--git-common-dir` resolves to the
/// main repository's git dir even from a linked worktree. A relative
/// answer is made absolute against the current directory.
pub fn hooks_dir() -> Result<PathBuf> {
    let common_dir = run_git(Path::new("."), &["rev-parse", "--git-common-dir"])?;
    let mut path = PathBuf::from(common_dir);
    if path.is_relative() {
        let cwd = env::current_dir().context("Failed to determine current directory")?;
        path = cwd.join(path);
    }
    Ok(path.join("hooks"))
}

/// Existence probe for the `origin` remote of a repository.
pub fn has_origin(repo: &Path) -> bool {
    Command::new("git")
        .args(["remote", "get-url", "origin"])
        .current_dir(repo)
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Best-effort `git pull --rebase` in the backing repository. Failure
/// is logged, never fatal; the pull is an optimization.
pub fn pull_backing_repo(repo: &Path) {
    if !has_origin(repo) {
        return;
    }
    println!("{}", t!("git.pulling", path = repo.display()));
    match Command::new("git")
        .args(["pull", "--rebase"])
        .current_dir(repo)
        .output()
    {
        Ok(output) if output.status.success() => {}
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            eprintln!("{}", t!("git.pull_failed", error = stderr));
        }
        Err(err) => {
            eprintln!("{}", t!("git.pull_failed", error = err));
        }
    }
}

fn run_git(root: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(root)
        .output()
        .with_context(|| format!("Failed to run git {}", args.join(" ")))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if stderr.is_empty() {
            return Err(anyhow!(t!("git.command_failed", args = args.join(" "))));
        }
        return Err(anyhow!(stderr));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

//! Versioned git hook generation and installation.
//!
//! Hooks are plain POSIX sh scripts carrying a product marker and a
//! `Version: <n>` line. Installation never destroys a foreign hook: an
//! unmarked file is preserved as `<name>.old`, while a stale hook of
//! our own is simply regenerated.

use crate::platform::make_file_executable;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Marker identifying scripts we generated. The update check greps for
/// this exact string.
pub const HOOK_MARKER: &str = "Generated by thoughts";

pub const PRE_COMMIT: &str = "pre-commit";
pub const POST_COMMIT: &str = "post-commit";

pub const PRE_COMMIT_VERSION: u32 = 4;
pub const POST_COMMIT_VERSION: u32 = 3;

/// A hook payload held as structured data; the version marker is
/// serialized as a comment only at render time.
#[derive(Debug, Clone)]
pub struct HookScript {
    pub name: &'static str,
    pub version: u32,
    pub body: String,
}

impl HookScript {
    pub fn render(&self) -> String {
        format!(
            "#!/bin/sh\n# {HOOK_MARKER} - do not edit\n# Version: {}\n\n{}",
            self.version, self.body
        )
    }
}

/// The pre-commit script refuses to commit anything under `thoughts/`
/// and unstages it. Stand-alone: runnable without this binary present.
pub fn pre_commit_hook() -> HookScript {
    let body = r#"staged=$(git diff --cached --name-only | grep '^thoughts/' || true)
if [ -n "$staged" ]; then
    echo "thoughts/ files must not be committed to this repository:" >&2
    echo "$staged" >&2
    git reset HEAD -- thoughts/ >/dev/null
    echo "the files above were unstaged" >&2
    exit 1
fi
exit 0
"#
    .to_string();
    HookScript {
        name: PRE_COMMIT,
        version: PRE_COMMIT_VERSION,
        body,
    }
}

/// The post-commit script skips worktree checkouts and fires a
/// detached, out-of-process sync tagged with the commit message.
pub fn post_commit_hook() -> HookScript {
    let body = r#"git_dir=$(git rev-parse --git-dir)
case "$git_dir" in
    */worktrees/*) exit 0 ;;
esac
message=$(git log -1 --pretty=%B)
(thoughts sync --message "$message" >/dev/null 2>&1 &)
exit 0
"#
    .to_string();
    HookScript {
        name: POST_COMMIT,
        version: POST_COMMIT_VERSION,
        body,
    }
}

/// Extracts the integer from the first `Version: <n>` line.
fn embedded_version(content: &str) -> Option<u32> {
    for line in content.lines() {
        if let Some(idx) = line.find("Version:") {
            let rest = line[idx + "Version:".len()..].trim();
            if let Ok(version) = rest.parse::<u32>() {
                return Some(version);
            }
        }
    }
    None
}

/// Installs `content` at `hooks_dir/hook_name`. Returns whether a write
/// happened.
///
/// Decision procedure:
/// 1. no existing file: install unconditionally
/// 2. existing file without [`HOOK_MARKER`]: foreign hook, rename it to
///    `<name>.old` before installing
/// 3. marker present: install only when the installed version is older
pub fn install_git_hook(hooks_dir: &Path, hook_name: &str, content: &str) -> Result<bool> {
    let hook_path = hooks_dir.join(hook_name);

    if hook_path.exists() {
        let existing = fs::read_to_string(&hook_path)
            .with_context(|| format!("Failed to read existing hook: {}", hook_path.display()))?;

        if !existing.contains(HOOK_MARKER) {
            // Foreign hook: preserve it, never delete foreign content.
            let backup_path = hooks_dir.join(format!("{hook_name}.old"));
            fs::rename(&hook_path, &backup_path).with_context(|| {
                format!("Failed to back up foreign hook to {}", backup_path.display())
            })?;
        } else {
            let installed = embedded_version(&existing);
            let new = embedded_version(content);
            let needs_update = match (installed, new) {
                (Some(installed), Some(new)) => installed < new,
                // Unparseable marker state is treated as stale.
                _ => true,
            };
            if !needs_update {
                return Ok(false);
            }
            // Our own hook is fully regenerable, no backup needed.
            fs::remove_file(&hook_path).with_context(|| {
                format!("Failed to remove stale hook: {}", hook_path.display())
            })?;
        }
    }

    fs::write(&hook_path, content)
        .with_context(|| format!("Failed to write hook: {}", hook_path.display()))?;
    make_file_executable(&hook_path);
    Ok(true)
}

/// Installs both generated hooks, reporting which were updated.
pub fn install_hooks(hooks_dir: &Path) -> Result<()> {
    fs::create_dir_all(hooks_dir)
        .with_context(|| format!("Failed to create hooks dir: {}", hooks_dir.display()))?;

    for script in [pre_commit_hook(), post_commit_hook()] {
        let updated = install_git_hook(hooks_dir, script.name, &script.render())?;
        if updated {
            println!("{}", t!("hooks.installed", name = script.name));
        } else {
            println!("{}", t!("hooks.up_to_date", name = script.name));
        }
    }
    Ok(())
}

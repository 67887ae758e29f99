//! Platform-specific filesystem capabilities.
//!
//! Directory links are symlinks on Unix and junctions on Windows;
//! junctions are used because they do not require elevated privileges.
//! Permission normalization is best-effort on both platforms and never
//! raises.

use std::fmt;
use std::fs;
use std::path::Path;

pub fn is_windows() -> bool {
    cfg!(windows)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkType {
    Symlink,
    Junction,
}

impl LinkType {
    /// The link kind this platform is expected to produce, whether or
    /// not creation succeeds.
    pub fn expected() -> Self {
        if is_windows() {
            LinkType::Junction
        } else {
            LinkType::Symlink
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkType::Symlink => write!(f, "symlink"),
            LinkType::Junction => write!(f, "junction"),
        }
    }
}

/// Outcome of one link attempt. Never retried; the caller aggregates.
#[derive(Debug, Clone)]
pub struct LinkResult {
    pub success: bool,
    pub link_type: LinkType,
    pub message: Option<String>,
}

/// Creates a directory link at `link_path` pointing to `target`.
///
/// The target must already exist as a directory; neither the target nor
/// the parent of `link_path` is created here.
pub fn create_directory_link(target: &Path, link_path: &Path) -> LinkResult {
    match platform_link(target, link_path) {
        Ok(()) => LinkResult {
            success: true,
            link_type: LinkType::expected(),
            message: None,
        },
        Err(err) => LinkResult {
            success: false,
            link_type: LinkType::expected(),
            message: Some(link_error_message(&err.to_string())),
        },
    }
}

#[cfg(unix)]
fn platform_link(target: &Path, link_path: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link_path)
}

#[cfg(windows)]
fn platform_link(target: &Path, link_path: &Path) -> std::io::Result<()> {
    junction::create(target, link_path)
}

/// Windows permission failures carry the "EPERM" marker; those get a
/// remediation hint. Everything else passes through verbatim.
pub(crate) fn link_error_message(raw: &str) -> String {
    if is_windows() && raw.contains("EPERM") {
        return t!("platform.junction_permission_denied").to_string();
    }
    raw.to_string()
}

/// True when `path` is itself a directory link (symlink or junction),
/// examined without following it.
#[cfg(not(windows))]
pub fn is_directory_link(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|meta| meta.file_type().is_symlink())
        .unwrap_or(false)
}

/// True when `path` is itself a directory link, examined without
/// following it. Junctions carry a mount-point reparse tag that
/// `FileType::is_symlink` does not report, so both kinds are checked.
#[cfg(windows)]
pub fn is_directory_link(path: &Path) -> bool {
    if junction::exists(path).unwrap_or(false) {
        return true;
    }
    fs::symlink_metadata(path)
        .map(|meta| meta.file_type().is_symlink())
        .unwrap_or(false)
}

/// Removes a link or file or directory tree at `path`, whichever it is.
pub fn remove_path(path: &Path) -> std::io::Result<()> {
    let meta = fs::symlink_metadata(path)?;
    if meta.file_type().is_symlink() || meta.is_file() {
        fs::remove_file(path)
    } else {
        fs::remove_dir_all(path)
    }
}

/// Best-effort removal of read-only/locked attributes over a whole
/// subtree. Never raises; a precursor to forced deletion of regenerable
/// trees (the searchable index) that may carry restrictive modes.
#[cfg(unix)]
pub fn remove_read_only(dir_path: &Path) {
    use std::process::Command;

    // One recursive pass: owner rwx, group/world rx.
    let _ = Command::new("chmod")
        .arg("-R")
        .arg("755")
        .arg(dir_path)
        .output();
}

#[cfg(windows)]
pub fn remove_read_only(dir_path: &Path) {
    use walkdir::WalkDir;

    for entry in WalkDir::new(dir_path).into_iter().flatten() {
        let Ok(meta) = entry.metadata() else {
            continue;
        };
        let mut perms = meta.permissions();
        if perms.readonly() {
            perms.set_readonly(false);
            let _ = fs::set_permissions(entry.path(), perms);
        }
    }
}

/// Best-effort `755` on a generated script. Failures are swallowed;
/// an unexecutable hook is diagnosed by git, not by us.
#[cfg(unix)]
pub fn make_file_executable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    let Ok(meta) = fs::metadata(path) else {
        return;
    };
    let mut perms = meta.permissions();
    perms.set_mode(0o755);
    let _ = fs::set_permissions(path, perms);
}

#[cfg(windows)]
pub fn make_file_executable(_path: &Path) {}

/// Deletes a directory tree that may have been created read-only.
pub fn force_remove_dir_all(dir_path: &Path) -> std::io::Result<()> {
    if !dir_path.exists() {
        return Ok(());
    }
    remove_read_only(dir_path);
    fs::remove_dir_all(dir_path)
}

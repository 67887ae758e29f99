//! The `init` pass: resolve configuration, establish the backing
//! directories and the three directory links, and install the hooks.
//!
//! A partial set of successful links is left on disk on failure; a
//! later re-run detects and repairs the inconsistency instead of
//! rolling back.

use crate::config::{ConfigStore, GlobalConfig, MappingValue};
use crate::error::ThoughtsError;
use crate::git_utils;
use crate::hooks;
use crate::platform::{create_directory_link, force_remove_dir_all, is_directory_link, remove_path};
use crate::profile::{self, ProfileConfig};
use crate::status::{self, GLOBAL_LINK, OLD_LOCAL_LINK, SHARED_LINK, THOUGHTS_DIR};
use anyhow::{Context, Result};
use inquire::{Confirm, Text};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const CLAUDE_MD_FILE: &str = "CLAUDE.md";
pub const SEARCHABLE_DIR: &str = "searchable";

const CLAUDE_MD_CONTENT: &str = "\
# Thoughts Directory

Developer notes for this repository. Everything in here lives in a
separate backing repository and is only linked into this working tree;
the pre-commit hook keeps it out of version control.

- `thoughts/<user>/` - your personal notes for this repository
- `thoughts/shared/` - notes shared with everyone working on it
- `thoughts/global/` - notes that span repositories

Do not commit files under `thoughts/` to this repository.
";

#[derive(Debug, Default)]
pub struct InitOptions {
    pub directory: Option<String>,
    pub profile: Option<String>,
    pub user: Option<String>,
    pub force: bool,
    pub interactive: bool,
}

pub fn run_init(store: &ConfigStore, opts: &InitOptions) -> Result<()> {
    if !git_utils::inside_git_repository() {
        return Err(ThoughtsError::NotGitRepository.into());
    }
    let root = git_utils::repo_root()?;

    let mut config = match store.load()? {
        Some(config) => config,
        None => bootstrap_config(opts)?,
    };
    config.validate()?;

    let (mapping, is_new_mapping) = resolve_mapping(&config, &root, opts)?;
    if is_new_mapping {
        config.set_mapping(&root, mapping.clone());
    }
    let profile = profile::resolve(&config, &root);

    ensure_backing_repo(&profile, opts)?;
    git_utils::pull_backing_repo(&profile.thoughts_repo_path());

    let repo_dir = profile::repo_thoughts_path(&profile, mapping.directory_name());
    let global_dir = profile::global_thoughts_path(&profile);

    let existing = status::check_setup_at(&root, Some(&config));
    if existing.is_valid && !opts.force {
        println!("{}", t!("setup.already_initialized"));
        // A mapping is only persisted once its directory exists.
        if is_new_mapping {
            create_backing_dirs(&repo_dir, &global_dir, &config.user)?;
        }
        store.save(&config)?;
        hooks::install_hooks(&git_utils::hooks_dir()?)?;
        return Ok(());
    }

    let thoughts_dir = root.join(THOUGHTS_DIR);
    prepare_thoughts_dir(&thoughts_dir, &config, &existing)?;

    create_backing_dirs(&repo_dir, &global_dir, &config.user)?;

    // Directories exist now, so the mapping may be persisted.
    store.save(&config)?;

    create_links(&thoughts_dir, &repo_dir, &global_dir, &config.user)?;

    fs::write(thoughts_dir.join(CLAUDE_MD_FILE), CLAUDE_MD_CONTENT)
        .with_context(|| "Failed to write thoughts/CLAUDE.md")?;

    hooks::install_hooks(&git_utils::hooks_dir()?)?;

    if let Some(name) = &profile.profile_name {
        println!("{}", t!("setup.done_with_profile", profile = name));
    } else {
        println!("{}", t!("setup.done"));
    }
    Ok(())
}

/// First-run global configuration, prompted when interactive and
/// assembled from defaults and the environment otherwise.
fn bootstrap_config(opts: &InitOptions) -> Result<GlobalConfig> {
    let fallback_user = opts
        .user
        .clone()
        .or_else(|| env::var("USER").ok())
        .or_else(|| env::var("USERNAME").ok())
        .unwrap_or_else(|| "user".to_string());

    let mut config = if opts.interactive {
        let user = Text::new(&t!("setup.prompt_user"))
            .with_default(&fallback_user)
            .prompt()
            .map_err(ThoughtsError::Inquire)?;
        let thoughts_repo = Text::new(&t!("setup.prompt_thoughts_repo"))
            .with_default(crate::config::DEFAULT_THOUGHTS_REPO)
            .prompt()
            .map_err(ThoughtsError::Inquire)?;
        let mut config = GlobalConfig::new(user);
        config.thoughts_repo = thoughts_repo;
        config
    } else {
        GlobalConfig::new(fallback_user)
    };

    if let Some(user) = &opts.user {
        config.user = user.clone();
    }
    Ok(config)
}

/// Finds or creates the mapping for this repository.
///
/// An explicitly requested profile is validated up front; an unknown
/// name is a hard error listing the available profiles.
fn resolve_mapping(
    config: &GlobalConfig,
    root: &Path,
    opts: &InitOptions,
) -> Result<(MappingValue, bool)> {
    if let Some(existing) = config.mapping_for(root) {
        return Ok((existing.clone(), false));
    }

    let profile_name = match &opts.profile {
        Some(name) => {
            profile::resolve_named(config, name)?;
            Some(name.clone())
        }
        None => None,
    };

    let name = match &opts.directory {
        Some(name) => name.clone(),
        None if opts.interactive => {
            let default_name = default_directory_name(root);
            Text::new(&t!("setup.prompt_directory"))
                .with_default(&default_name)
                .prompt()
                .map_err(ThoughtsError::Inquire)?
        }
        None => return Err(ThoughtsError::DirectoryNameRequired.into()),
    };

    let mapping = match profile_name {
        Some(profile) => MappingValue::Qualified {
            repo: name,
            profile,
        },
        None => MappingValue::Name(name),
    };
    Ok((mapping, true))
}

fn default_directory_name(root: &Path) -> String {
    root.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "repo".to_string())
}

/// The backing repository must exist before anything is linked into
/// it. Interactively we offer to recreate it; declining is fatal.
fn ensure_backing_repo(profile: &ProfileConfig, opts: &InitOptions) -> Result<()> {
    let backing = profile.thoughts_repo_path();
    if backing.is_dir() {
        return Ok(());
    }

    let missing = ThoughtsError::BackingRepoMissing {
        path: backing.display().to_string(),
    };
    if !opts.interactive {
        return Err(missing.into());
    }

    let recreate = Confirm::new(&t!("setup.prompt_recreate", path = backing.display()))
        .with_default(true)
        .prompt()
        .map_err(ThoughtsError::Inquire)?;
    if !recreate {
        return Err(missing.into());
    }

    fs::create_dir_all(&backing)
        .with_context(|| format!("Failed to create {}", backing.display()))?;
    Ok(())
}

/// Clears whatever is in the way of a fresh set of links: the
/// deprecated layout, a stale searchable index, or broken links.
fn prepare_thoughts_dir(
    thoughts_dir: &Path,
    config: &GlobalConfig,
    existing: &status::SetupStatus,
) -> Result<()> {
    if existing.exists && !thoughts_dir.is_dir() {
        return Err(ThoughtsError::Config {
            message: t!("setup.thoughts_not_a_directory", path = thoughts_dir.display())
                .to_string(),
        }
        .into());
    }

    if existing.is_old_structure {
        println!("{}", t!("setup.upgrading_old_structure"));
        let old_link = thoughts_dir.join(OLD_LOCAL_LINK);
        if is_directory_link(&old_link) {
            remove_path(&old_link)
                .with_context(|| format!("Failed to remove {}", old_link.display()))?;
        }
        // The index tree is regenerable and may carry restrictive modes.
        force_remove_dir_all(&thoughts_dir.join(SEARCHABLE_DIR))
            .with_context(|| "Failed to remove stale searchable index")?;
    }

    for name in [config.user.as_str(), SHARED_LINK, GLOBAL_LINK] {
        let link = thoughts_dir.join(name);
        if fs::symlink_metadata(&link).is_ok() {
            remove_path(&link).with_context(|| format!("Failed to remove {}", link.display()))?;
        }
    }

    fs::create_dir_all(thoughts_dir)
        .with_context(|| format!("Failed to create {}", thoughts_dir.display()))?;
    Ok(())
}

fn create_backing_dirs(repo_dir: &Path, global_dir: &Path, user: &str) -> Result<()> {
    for dir in [
        repo_dir.join(user),
        repo_dir.join(SHARED_LINK),
        global_dir.join(user),
        global_dir.join(SHARED_LINK),
    ] {
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    Ok(())
}

/// All three links are attempted regardless of individual failures;
/// each result is surfaced on its own and the pass fails afterwards if
/// any link failed.
fn create_links(
    thoughts_dir: &Path,
    repo_dir: &Path,
    global_dir: &Path,
    user: &str,
) -> Result<()> {
    let links: [(PathBuf, PathBuf); 3] = [
        (repo_dir.join(user), thoughts_dir.join(user)),
        (repo_dir.join(SHARED_LINK), thoughts_dir.join(SHARED_LINK)),
        (global_dir.to_path_buf(), thoughts_dir.join(GLOBAL_LINK)),
    ];

    let mut failed = 0;
    for (target, link) in &links {
        let result = create_directory_link(target, link);
        if result.success {
            println!(
                "{}",
                t!(
                    "setup.linked",
                    link = link.display(),
                    kind = result.link_type
                )
            );
        } else {
            failed += 1;
            let message = result.message.unwrap_or_default();
            eprintln!(
                "{}",
                t!(
                    "setup.link_failed",
                    link = link.display(),
                    error = message
                )
            );
        }
    }

    if failed > 0 {
        return Err(ThoughtsError::LinksFailed {
            failed,
            total: links.len(),
        }
        .into());
    }
    Ok(())
}

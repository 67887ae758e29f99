//! Profile resolution and backing-store path planning.
//!
//! Resolution is deterministic and side-effect-free: it is called
//! several times per run and must return identical results for
//! identical input. Path planning is pure path arithmetic; it never
//! follows links or touches disk.

use crate::config::{GlobalConfig, ProfileSettings};
use crate::error::ThoughtsError;
use crate::path_utils::expand_home;
use std::path::{Path, PathBuf};

/// Effective backing location for one repository (ephemeral, never
/// persisted apart from the profile name it came from).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileConfig {
    pub thoughts_repo: String,
    pub repos_dir: String,
    pub global_dir: String,
    pub profile_name: Option<String>,
}

impl ProfileConfig {
    fn from_settings(settings: &ProfileSettings, name: &str) -> Self {
        Self {
            thoughts_repo: settings.thoughts_repo.clone(),
            repos_dir: settings.repos_dir.clone(),
            global_dir: settings.global_dir.clone(),
            profile_name: Some(name.to_string()),
        }
    }

    fn from_top_level(config: &GlobalConfig) -> Self {
        Self {
            thoughts_repo: config.thoughts_repo.clone(),
            repos_dir: config.repos_dir.clone(),
            global_dir: config.global_dir.clone(),
            profile_name: None,
        }
    }

    /// Backing repository root with `~`/`$HOME` expanded.
    pub fn thoughts_repo_path(&self) -> PathBuf {
        expand_home(&self.thoughts_repo)
    }
}

/// Resolves the effective profile for a repository.
///
/// A mapping that names a profile wins when that profile exists;
/// everything else falls back to the top-level triple.
pub fn resolve(config: &GlobalConfig, repo_path: &Path) -> ProfileConfig {
    if let Some(mapping) = config.mapping_for(repo_path)
        && let Some(name) = mapping.profile_name()
        && let Some(settings) = config.profiles.get(name)
    {
        return ProfileConfig::from_settings(settings, name);
    }
    ProfileConfig::from_top_level(config)
}

/// Resolves an explicitly requested profile name.
///
/// An unknown name is a hard error listing the available profiles.
pub fn resolve_named(config: &GlobalConfig, name: &str) -> Result<ProfileConfig, ThoughtsError> {
    match config.profiles.get(name) {
        Some(settings) => Ok(ProfileConfig::from_settings(settings, name)),
        None => {
            let available = if config.profiles.is_empty() {
                t!("profile.none_defined").to_string()
            } else {
                config
                    .profiles
                    .keys()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            Err(ThoughtsError::UnknownProfile {
                profile: name.to_string(),
                available,
            })
        }
    }
}

/// `thoughtsRepo/reposDir/<mappedName>`: home of one repository's notes.
pub fn repo_thoughts_path(profile: &ProfileConfig, mapped_name: &str) -> PathBuf {
    profile
        .thoughts_repo_path()
        .join(&profile.repos_dir)
        .join(mapped_name)
}

/// `thoughtsRepo/globalDir`: home of the cross-repo notes.
pub fn global_thoughts_path(profile: &ProfileConfig) -> PathBuf {
    profile.thoughts_repo_path().join(&profile.global_dir)
}

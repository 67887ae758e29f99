//! Global configuration store.
//!
//! The whole configuration is a single JSON document: read fully into
//! memory, mutated there, and written back as a complete replacement.
//! There is no file locking; two concurrent runs race and the last
//! writer wins.

use crate::error::ThoughtsError;
use crate::path_utils::{safe_parent_for_creation, validate_path_str};
use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_CONFIG_DIR: &str = "THOUGHTS_CONFIG_DIR";
pub const APP_NAME: &str = "thoughts";
pub const CONFIG_FILE: &str = "thoughts.json";

/// Reserved link name inside `thoughts/`; never a valid user name.
pub const RESERVED_GLOBAL_NAME: &str = "global";

pub const DEFAULT_THOUGHTS_REPO: &str = "~/thoughts";
pub const DEFAULT_REPOS_DIR: &str = "repos";
pub const DEFAULT_GLOBAL_DIR: &str = "global";

/// Value of one repository mapping.
///
/// The legacy form is a bare directory name and implies the default
/// (top-level) profile; the qualified form pins a named profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MappingValue {
    Name(String),
    Qualified { repo: String, profile: String },
}

impl MappingValue {
    pub fn directory_name(&self) -> &str {
        match self {
            MappingValue::Name(name) => name,
            MappingValue::Qualified { repo, .. } => repo,
        }
    }

    pub fn profile_name(&self) -> Option<&str> {
        match self {
            MappingValue::Name(_) => None,
            MappingValue::Qualified { profile, .. } => Some(profile),
        }
    }
}

/// Alternate backing location selectable per repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSettings {
    pub thoughts_repo: String,
    pub repos_dir: String,
    pub global_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConfig {
    pub thoughts_repo: String,
    pub repos_dir: String,
    pub global_dir: String,
    pub user: String,
    #[serde(default)]
    pub repo_mappings: BTreeMap<String, MappingValue>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub profiles: BTreeMap<String, ProfileSettings>,
}

impl GlobalConfig {
    pub fn new(user: String) -> Self {
        Self {
            thoughts_repo: DEFAULT_THOUGHTS_REPO.to_string(),
            repos_dir: DEFAULT_REPOS_DIR.to_string(),
            global_dir: DEFAULT_GLOBAL_DIR.to_string(),
            user,
            repo_mappings: BTreeMap::new(),
            profiles: BTreeMap::new(),
        }
    }

    /// The `global` name is taken by the cross-repo link.
    pub fn validate(&self) -> Result<(), ThoughtsError> {
        if self.user == RESERVED_GLOBAL_NAME {
            return Err(ThoughtsError::ReservedUserName {
                user: self.user.clone(),
            });
        }
        Ok(())
    }

    pub fn mapping_for(&self, repo_path: &Path) -> Option<&MappingValue> {
        self.repo_mappings.get(&repo_path.to_string_lossy().to_string())
    }

    pub fn set_mapping(&mut self, repo_path: &Path, value: MappingValue) {
        self.repo_mappings
            .insert(repo_path.to_string_lossy().to_string(), value);
    }
}

pub fn resolve_config_dir_with(
    cli_override: Option<&Path>,
    env_override: Option<&str>,
) -> Result<PathBuf> {
    if let Some(path) = cli_override {
        validate_path_str(&path.to_string_lossy())
            .map_err(|e| anyhow!(t!("errors.invalid_config_dir", error = e)))?;
        return Ok(path.to_path_buf());
    }

    if let Some(env_config_dir) = env_override {
        validate_path_str(env_config_dir)
            .map_err(|e| anyhow!(t!("errors.invalid_config_dir_env", error = e)))?;
        return Ok(PathBuf::from(env_config_dir));
    }

    let project_dirs = ProjectDirs::from("", "", APP_NAME)
        .ok_or_else(|| anyhow!(t!("errors.not_find_config_dir")))?;
    Ok(project_dirs.config_dir().to_path_buf())
}

pub fn resolve_config_dir(cli_override: Option<&Path>) -> Result<PathBuf> {
    let env_override = env::var(ENV_CONFIG_DIR).ok();
    resolve_config_dir_with(cli_override, env_override.as_deref())
}

/// Load/save access to the configuration document.
pub struct ConfigStore {
    config_dir: PathBuf,
    config_path: PathBuf,
}

impl ConfigStore {
    pub fn new() -> Result<Self> {
        Self::with_config_dir(None)
    }

    pub fn with_config_dir(config_dir_override: Option<&Path>) -> Result<Self> {
        let config_dir = resolve_config_dir(config_dir_override)?;
        let config_path = config_dir.join(CONFIG_FILE);
        Ok(Self {
            config_dir,
            config_path,
        })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Returns `None` when no configuration document exists yet.
    pub fn load(&self) -> Result<Option<GlobalConfig>> {
        if !self.config_path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.config_path).with_context(|| {
            format!("Failed to read config file: {}", self.config_path.display())
        })?;
        let config: GlobalConfig = serde_json::from_str(&content).with_context(|| {
            format!(
                "Failed to parse config file: {}",
                self.config_path.display()
            )
        })?;
        Ok(Some(config))
    }

    /// Whole-document rewrite; there is no partial-field update protocol.
    pub fn save(&self, config: &GlobalConfig) -> Result<()> {
        if let Some(parent) = safe_parent_for_creation(&self.config_path) {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        let content = serde_json::to_string_pretty(config)
            .with_context(|| "Failed to serialize config to JSON")?;
        fs::write(&self.config_path, content).with_context(|| {
            format!(
                "Failed to write config file: {}",
                self.config_path.display()
            )
        })?;
        Ok(())
    }
}

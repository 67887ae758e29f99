use anyhow::Result as _Result;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ThoughtsError {
    #[error("Config Error: {message}")]
    Config { message: String },

    #[error("Current directory is not inside a git repository")]
    NotGitRepository,

    #[error("The user name \"{user}\" is reserved")]
    ReservedUserName { user: String },

    #[error("Unknown profile: {profile} (available: {available})")]
    UnknownProfile { profile: String, available: String },

    #[error("Profile already exists: {profile}")]
    ProfileExists { profile: String },

    #[error("Thoughts repository not found: {path}")]
    BackingRepoMissing { path: String },

    #[error("Directory name is required in non-interactive mode")]
    DirectoryNameRequired,

    #[error("Failed to create {failed} of {total} thoughts links")]
    LinksFailed { failed: usize, total: usize },

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON Parse Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Inquire Error: {0}")]
    Inquire(#[from] inquire::InquireError),
}

impl ThoughtsError {
    pub fn display_localized(&self) -> String {
        match self {
            ThoughtsError::Config { message } => {
                t!("errors.config_error", message = message).to_string()
            }
            ThoughtsError::NotGitRepository => t!("errors.not_git_repository").to_string(),
            ThoughtsError::ReservedUserName { user } => {
                t!("errors.reserved_user_name", user = user).to_string()
            }
            ThoughtsError::UnknownProfile { profile, available } => t!(
                "errors.unknown_profile",
                profile = profile,
                available = available
            )
            .to_string(),
            ThoughtsError::ProfileExists { profile } => {
                t!("errors.profile_exists", profile = profile).to_string()
            }
            ThoughtsError::BackingRepoMissing { path } => {
                t!("errors.backing_repo_missing", path = path).to_string()
            }
            ThoughtsError::DirectoryNameRequired => {
                t!("errors.directory_name_required").to_string()
            }
            ThoughtsError::LinksFailed { failed, total } => {
                t!("errors.links_failed", failed = failed, total = total).to_string()
            }
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = _Result<T, ThoughtsError>;

//! Classification of the on-disk `thoughts/` directory.

use crate::config::GlobalConfig;
use crate::platform::is_directory_link;
use std::env;
use std::path::Path;

pub const THOUGHTS_DIR: &str = "thoughts";
pub const SHARED_LINK: &str = "shared";
pub const GLOBAL_LINK: &str = "global";

/// Deprecated layout marker: a single `thoughts/local` link.
pub const OLD_LOCAL_LINK: &str = "local";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupStatus {
    pub exists: bool,
    pub is_valid: bool,
    pub is_old_structure: bool,
    pub message: Option<String>,
}

impl SetupStatus {
    fn absent() -> Self {
        Self {
            exists: false,
            is_valid: false,
            is_old_structure: false,
            message: None,
        }
    }

    fn invalid(message: impl Into<String>) -> Self {
        Self {
            exists: true,
            is_valid: false,
            is_old_structure: false,
            message: Some(message.into()),
        }
    }

    fn old_structure() -> Self {
        Self {
            exists: true,
            is_valid: false,
            is_old_structure: true,
            message: None,
        }
    }

    fn valid() -> Self {
        Self {
            exists: true,
            is_valid: true,
            is_old_structure: false,
            message: None,
        }
    }
}

/// Classifies `<cwd>/thoughts` against the expected layout.
pub fn check_existing_setup(config: Option<&GlobalConfig>) -> SetupStatus {
    let Ok(cwd) = env::current_dir() else {
        return SetupStatus::absent();
    };
    check_setup_at(&cwd, config)
}

/// Classifies `<root>/thoughts` against the expected layout.
///
/// The evaluation order is fixed: the old-structure check runs before
/// the per-link checks, because an old-structure tree has none of the
/// three expected links and would otherwise be misreported as broken
/// instead of needing an upgrade.
pub fn check_setup_at(root: &Path, config: Option<&GlobalConfig>) -> SetupStatus {
    let thoughts_dir = root.join(THOUGHTS_DIR);

    if !thoughts_dir.exists() {
        return SetupStatus::absent();
    }
    if !thoughts_dir.is_dir() {
        return SetupStatus::invalid(t!("status.not_a_directory"));
    }
    if is_directory_link(&thoughts_dir.join(OLD_LOCAL_LINK)) {
        return SetupStatus::old_structure();
    }
    let Some(config) = config else {
        return SetupStatus::invalid(t!("status.missing_config"));
    };

    let expected = [
        config.user.as_str(),
        SHARED_LINK,
        GLOBAL_LINK,
    ];
    for name in expected {
        if !is_directory_link(&thoughts_dir.join(name)) {
            return SetupStatus::invalid(t!("status.links_broken"));
        }
    }

    SetupStatus::valid()
}

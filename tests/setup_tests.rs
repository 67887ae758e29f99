//! End-to-end coverage of the init pass against a real git repository.

#![cfg(unix)]

mod common;

use common::{TestEnv, git_init};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use thoughts::config::{
    ConfigStore, ENV_CONFIG_DIR, GlobalConfig, MappingValue, ProfileSettings,
};
use thoughts::setup::{InitOptions, run_init};
use thoughts::status::check_setup_at;

struct Fixture {
    // Dropped first so the cwd is restored before the tempdir goes away.
    env: TestEnv,
    _temp: TempDir,
    pub repo: PathBuf,
    pub backing: PathBuf,
    pub config_dir: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let temp = TempDir::new().expect("temp dir");
        let root = temp.path().canonicalize().expect("canonicalize");

        let repo = root.join("code-repo");
        let backing = root.join("backing");
        let config_dir = root.join("config");
        let home = root.join("home");
        for dir in [&repo, &backing, &config_dir, &home] {
            fs::create_dir_all(dir).expect("fixture dir");
        }
        git_init(&repo);

        let mut env = TestEnv::new();
        env.set_var(ENV_CONFIG_DIR, &config_dir);
        env.set_var("HOME", &home);
        env.chdir(&repo);

        Self {
            _temp: temp,
            env,
            repo,
            backing,
            config_dir,
        }
    }

    fn store(&self) -> ConfigStore {
        ConfigStore::with_config_dir(Some(&self.config_dir)).expect("store")
    }

    fn write_config(&self, config: &GlobalConfig) {
        self.store().save(config).expect("save config");
    }

    fn base_config(&self) -> GlobalConfig {
        let mut config = GlobalConfig::new("alice".to_string());
        config.thoughts_repo = self.backing.to_string_lossy().to_string();
        config
    }
}

fn init_opts(directory: &str) -> InitOptions {
    InitOptions {
        directory: Some(directory.to_string()),
        ..InitOptions::default()
    }
}

fn assert_link(link: &Path, target: &Path) {
    let meta = fs::symlink_metadata(link).expect("link metadata");
    assert!(meta.file_type().is_symlink(), "{} is not a link", link.display());
    assert_eq!(fs::read_link(link).expect("read link"), target);
}

#[test]
fn init_creates_links_hooks_and_mapping() {
    let fixture = Fixture::new();
    fixture.write_config(&fixture.base_config());

    run_init(&fixture.store(), &init_opts("widget")).expect("init");

    let thoughts = fixture.repo.join("thoughts");
    let repo_notes = fixture.backing.join("repos").join("widget");
    assert_link(&thoughts.join("alice"), &repo_notes.join("alice"));
    assert_link(&thoughts.join("shared"), &repo_notes.join("shared"));
    assert_link(&thoughts.join("global"), &fixture.backing.join("global"));

    // Backing store subdirectories were created for both scopes.
    assert!(repo_notes.join("alice").is_dir());
    assert!(repo_notes.join("shared").is_dir());
    assert!(fixture.backing.join("global").join("alice").is_dir());
    assert!(fixture.backing.join("global").join("shared").is_dir());

    // CLAUDE.md is a plain generated file, not a link.
    let claude_md = thoughts.join("CLAUDE.md");
    assert!(claude_md.is_file());
    assert!(
        !fs::symlink_metadata(&claude_md)
            .expect("metadata")
            .file_type()
            .is_symlink()
    );

    // Hooks landed in the repository with our marker.
    for hook in ["pre-commit", "post-commit"] {
        let content = fs::read_to_string(fixture.repo.join(".git/hooks").join(hook))
            .expect("hook content");
        assert!(content.contains("Generated by thoughts"));
        assert!(content.contains("Version:"));
    }

    // The mapping was persisted under the repository's absolute path.
    let saved = fixture.store().load().expect("load").expect("config");
    assert_eq!(
        saved.mapping_for(&fixture.repo),
        Some(&MappingValue::Name("widget".to_string()))
    );

    let status = check_setup_at(&fixture.repo, Some(&saved));
    assert!(status.is_valid);
}

#[test]
fn init_is_idempotent() {
    let fixture = Fixture::new();
    fixture.write_config(&fixture.base_config());

    run_init(&fixture.store(), &init_opts("widget")).expect("first init");
    // Second run hits the valid-setup gate; no directory flag needed
    // because the mapping already exists.
    run_init(&fixture.store(), &InitOptions::default()).expect("second init");

    let saved = fixture.store().load().expect("load").expect("config");
    assert!(check_setup_at(&fixture.repo, Some(&saved)).is_valid);
}

#[test]
fn valid_gate_creates_backing_dir_for_new_mapping() {
    let fixture = Fixture::new();
    fixture.write_config(&fixture.base_config());
    run_init(&fixture.store(), &init_opts("widget")).expect("init");

    // A config document synced from another machine: the on-disk links
    // are valid but no mapping exists for this repository.
    let mut config = fixture.store().load().expect("load").expect("config");
    config.repo_mappings.clear();
    fixture.write_config(&config);

    run_init(&fixture.store(), &init_opts("fresh-name")).expect("re-init");

    let saved = fixture.store().load().expect("load").expect("config");
    assert_eq!(
        saved.mapping_for(&fixture.repo),
        Some(&MappingValue::Name("fresh-name".to_string()))
    );
    // A persisted mapping always has its directory in the backing store.
    assert!(
        fixture
            .backing
            .join("repos")
            .join("fresh-name")
            .join("alice")
            .is_dir()
    );
}

#[test]
fn init_repairs_broken_links() {
    let fixture = Fixture::new();
    fixture.write_config(&fixture.base_config());
    run_init(&fixture.store(), &init_opts("widget")).expect("init");

    let shared = fixture.repo.join("thoughts").join("shared");
    fs::remove_file(&shared).expect("break link");
    let saved = fixture.store().load().expect("load").expect("config");
    assert!(!check_setup_at(&fixture.repo, Some(&saved)).is_valid);

    run_init(&fixture.store(), &InitOptions::default()).expect("repair");
    assert!(check_setup_at(&fixture.repo, Some(&saved)).is_valid);
}

#[test]
fn init_upgrades_old_structure() {
    let fixture = Fixture::new();
    fixture.write_config(&fixture.base_config());

    // Deprecated layout: thoughts/local link plus a read-only
    // searchable index tree.
    let thoughts = fixture.repo.join("thoughts");
    fs::create_dir_all(&thoughts).expect("thoughts dir");
    let old_target = fixture.backing.join("old-notes");
    fs::create_dir_all(&old_target).expect("old target");
    std::os::unix::fs::symlink(&old_target, thoughts.join("local")).expect("old link");
    let searchable = thoughts.join("searchable");
    fs::create_dir_all(&searchable).expect("searchable");
    fs::write(searchable.join("index.md"), "indexed").expect("index file");

    let saved = fixture.store().load().expect("load").expect("config");
    assert!(check_setup_at(&fixture.repo, Some(&saved)).is_old_structure);

    run_init(&fixture.store(), &init_opts("widget")).expect("upgrade");

    assert!(!thoughts.join("local").exists());
    assert!(!searchable.exists());
    let saved = fixture.store().load().expect("load").expect("config");
    assert!(check_setup_at(&fixture.repo, Some(&saved)).is_valid);
}

#[test]
fn init_with_profile_links_into_profile_store() {
    let fixture = Fixture::new();
    let mut config = fixture.base_config();
    let work_backing = fixture.backing.parent().expect("parent").join("work-backing");
    config.profiles.insert(
        "work".to_string(),
        ProfileSettings {
            thoughts_repo: work_backing.to_string_lossy().to_string(),
            repos_dir: "repos".to_string(),
            global_dir: "global".to_string(),
        },
    );
    fixture.write_config(&config);
    fs::create_dir_all(&work_backing).expect("work backing");

    let opts = InitOptions {
        directory: Some("widget".to_string()),
        profile: Some("work".to_string()),
        ..InitOptions::default()
    };
    run_init(&fixture.store(), &opts).expect("init");

    let thoughts = fixture.repo.join("thoughts");
    assert_link(
        &thoughts.join("alice"),
        &work_backing.join("repos").join("widget").join("alice"),
    );
    assert_link(&thoughts.join("global"), &work_backing.join("global"));

    let saved = fixture.store().load().expect("load").expect("config");
    assert_eq!(
        saved.mapping_for(&fixture.repo),
        Some(&MappingValue::Qualified {
            repo: "widget".to_string(),
            profile: "work".to_string(),
        })
    );
}

#[test]
fn init_rejects_unknown_profile_without_mutating_config() {
    let fixture = Fixture::new();
    fixture.write_config(&fixture.base_config());

    let opts = InitOptions {
        directory: Some("widget".to_string()),
        profile: Some("missing".to_string()),
        ..InitOptions::default()
    };
    run_init(&fixture.store(), &opts).expect_err("unknown profile");

    let saved = fixture.store().load().expect("load").expect("config");
    assert!(saved.mapping_for(&fixture.repo).is_none());
    assert!(!fixture.repo.join("thoughts").exists());
}

#[test]
fn init_fails_outside_git_repository() {
    let mut fixture = Fixture::new();
    fixture.write_config(&fixture.base_config());
    let plain_dir = fixture.config_dir.parent().expect("parent").join("plain");
    fs::create_dir_all(&plain_dir).expect("plain dir");
    fixture.env.chdir(&plain_dir);

    run_init(&fixture.store(), &init_opts("widget")).expect_err("not a git repo");
}

#[test]
fn init_fails_when_backing_repo_missing_non_interactive() {
    let fixture = Fixture::new();
    let mut config = fixture.base_config();
    config.thoughts_repo = fixture
        .backing
        .parent()
        .expect("parent")
        .join("nowhere")
        .to_string_lossy()
        .to_string();
    fixture.write_config(&config);

    run_init(&fixture.store(), &init_opts("widget")).expect_err("backing repo missing");
}

#[test]
fn init_refuses_reserved_user_name() {
    let fixture = Fixture::new();
    let mut config = fixture.base_config();
    config.user = "global".to_string();
    fixture.write_config(&config);

    run_init(&fixture.store(), &init_opts("widget")).expect_err("reserved user");
}

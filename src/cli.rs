use crate::config::{ConfigStore, ENV_CONFIG_DIR, ProfileSettings, resolve_config_dir_with};
use crate::error::ThoughtsError;
use crate::setup::{InitOptions, run_init};
use anyhow::{Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand};
use std::env;
use std::fs;
use std::io::IsTerminal;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Configuration directory for thoughts (default: ~/.config/thoughts)
    /// Required when running within the thoughts project for development
    #[arg(short = 'C', long = "config-dir", global = true)]
    pub config_dir: Option<PathBuf>,

    /// Print the resolved configuration directory path and exit
    #[arg(long)]
    pub print_config_dir_path: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up the thoughts directory for the current repository
    #[command(alias = "setup")]
    Init {
        /// Directory name for this repository inside the backing store
        #[arg(long)]
        directory: Option<String>,
        /// Profile to use for a first-time setup
        #[arg(long)]
        profile: Option<String>,
        /// User name recorded on first-time configuration
        #[arg(long)]
        user: Option<String>,
        /// Re-create links even when the current setup is valid
        #[arg(long)]
        force: bool,
    },
    /// Manage named backing-store profiles
    Profile(ProfileArgs),
}

#[derive(Parser)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommands,
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// List configured profiles
    List,
    /// Add a named profile
    Add {
        name: String,
        #[arg(long)]
        thoughts_repo: String,
        #[arg(long, default_value = crate::config::DEFAULT_REPOS_DIR)]
        repos_dir: String,
        #[arg(long, default_value = crate::config::DEFAULT_GLOBAL_DIR)]
        global_dir: String,
        /// Overwrite an existing profile with the same name
        #[arg(long)]
        force: bool,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_config_dir_path {
        let env_override = env::var(ENV_CONFIG_DIR).ok();
        let config_dir =
            resolve_config_dir_with(cli.config_dir.as_deref(), env_override.as_deref())?;
        println!("{}", config_dir.display());
        return Ok(());
    }

    if cli.command.is_none() {
        let mut command = Cli::command();
        command.print_help()?;
        println!();
        return Ok(());
    }

    let config_dir = determine_config_dir(cli.config_dir.as_ref())?;
    let store = ConfigStore::with_config_dir(Some(&config_dir))?;

    match cli.command.as_ref().expect("command is present") {
        Commands::Init {
            directory,
            profile,
            user,
            force,
        } => {
            let opts = InitOptions {
                directory: directory.clone(),
                profile: profile.clone(),
                user: user.clone(),
                force: *force,
                interactive: std::io::stdin().is_terminal(),
            };
            run_init(&store, &opts)
        }
        Commands::Profile(args) => handle_profile_command(&store, args),
    }
}

/// Determine the configuration directory to use
fn determine_config_dir(cli_config_dir: Option<&PathBuf>) -> Result<PathBuf> {
    let has_cli_override = cli_config_dir.is_some();
    let env_override = env::var(ENV_CONFIG_DIR).ok();
    let has_env_override = env_override.is_some();

    // Check if we're in the thoughts development project
    if !has_cli_override && !has_env_override && is_thoughts_dev_project() {
        let message = t!(
            "errors.dev_project_config_required",
            env_var = ENV_CONFIG_DIR
        );
        return Err(anyhow!(message));
    }

    resolve_config_dir_with(
        cli_config_dir.map(|path| path.as_path()),
        env_override.as_deref(),
    )
}

/// Check if current directory is the thoughts development project
fn is_thoughts_dev_project() -> bool {
    let Ok(current_dir) = env::current_dir() else {
        return false;
    };
    let cargo_toml = current_dir.join("Cargo.toml");
    if !cargo_toml.exists() {
        return false;
    }
    let Ok(content) = fs::read_to_string(&cargo_toml) else {
        return false;
    };
    let Ok(parsed) = toml::from_str::<toml::Value>(&content) else {
        return false;
    };
    parsed
        .get("package")
        .and_then(|pkg| pkg.get("name"))
        .and_then(|name| name.as_str())
        == Some("thoughts")
}

fn handle_profile_command(store: &ConfigStore, args: &ProfileArgs) -> Result<()> {
    match &args.command {
        ProfileCommands::List => {
            let Some(config) = store.load()? else {
                println!("{}", t!("profile.no_config"));
                return Ok(());
            };
            println!(
                "{}",
                t!("profile.default_entry", repo = config.thoughts_repo)
            );
            for (name, settings) in &config.profiles {
                println!(
                    "{}",
                    t!(
                        "profile.entry",
                        name = name,
                        repo = settings.thoughts_repo,
                        repos_dir = settings.repos_dir,
                        global_dir = settings.global_dir
                    )
                );
            }
            Ok(())
        }
        ProfileCommands::Add {
            name,
            thoughts_repo,
            repos_dir,
            global_dir,
            force,
        } => {
            let Some(mut config) = store.load()? else {
                return Err(ThoughtsError::Config {
                    message: t!("profile.no_config").to_string(),
                }
                .into());
            };
            if config.profiles.contains_key(name) && !force {
                return Err(ThoughtsError::ProfileExists {
                    profile: name.clone(),
                }
                .into());
            }
            config.profiles.insert(
                name.clone(),
                ProfileSettings {
                    thoughts_repo: thoughts_repo.clone(),
                    repos_dir: repos_dir.clone(),
                    global_dir: global_dir.clone(),
                },
            );
            store.save(&config)?;
            println!("{}", t!("profile.added", name = name));
            Ok(())
        }
    }
}

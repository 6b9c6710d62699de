//! Config command - manage configuration.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Subcommand};
use console::style;
use tracing::debug;

use meme_core::MemeConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Initialize a new configuration file
    Init(InitArgs),

    /// Show configuration file path
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Output path for configuration file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

pub fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(config_path),
        ConfigCommand::Init(init_args) => init_config(init_args),
        ConfigCommand::Path => show_path(config_path),
    }
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("meme")
        .join("config.json")
}

/// The file `load_config` reads, if any.
///
/// An explicit `--config` always wins; otherwise the default location is
/// used when it exists.
fn config_source(config_path: Option<&str>) -> Option<PathBuf> {
    match config_path {
        Some(path) => Some(PathBuf::from(path)),
        None => Some(default_config_path()).filter(|path| path.exists()),
    }
}

/// Load and validate the configuration used by every command.
///
/// Built-in defaults apply when no file is found.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<MemeConfig> {
    let config = match config_source(config_path) {
        Some(path) => {
            debug!("Using config file {}", path.display());
            MemeConfig::from_file(&path)
                .with_context(|| format!("Failed to read config {}", path.display()))?
        }
        None => MemeConfig::default(),
    };

    config.validate()?;
    Ok(config)
}

fn show_config(config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    match config_source(config_path) {
        Some(path) => eprintln!("{} Loaded from {}", style("ℹ").blue(), path.display()),
        None => eprintln!("{} No config file found, built-in defaults", style("ℹ").blue()),
    }
    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}

fn init_config(args: InitArgs) -> anyhow::Result<()> {
    let output_path = args.output.unwrap_or_else(default_config_path);

    if output_path.exists() && !args.force {
        anyhow::bail!(
            "{} already exists, pass --force to overwrite it",
            output_path.display()
        );
    }
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    MemeConfig::default().save(&output_path)?;
    println!("{} Wrote default config to {}", style("✓").green(), output_path.display());

    Ok(())
}

fn show_path(config_path: Option<&str>) -> anyhow::Result<()> {
    let path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);
    let status = if path.exists() {
        style("exists").green()
    } else {
        style("missing, run 'meme config init'").yellow()
    };

    println!("{} ({})", path.display(), status);
    Ok(())
}

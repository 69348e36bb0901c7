use std::{
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;

const SUPPORTED_CONFIG_VERSION: u32 = 1;

/// Leaderboard file used when neither the command line nor the config names one.
pub(crate) const DEFAULT_LEADERBOARD_PATH: &str = "reflex-leaderboard.json";

/// Command-line arguments accepted by the `reflex` binary.
#[derive(Debug, Parser)]
#[command(name = "reflex", about = "Match the color and shape before the clock runs out")]
pub(crate) struct Args {
    /// Optional TOML configuration file.
    #[arg(short, long, default_value = "reflex.toml")]
    pub(crate) config: PathBuf,

    /// Name recorded on the leaderboard.
    #[arg(short, long)]
    pub(crate) player: Option<String>,

    /// JSON file holding the leaderboard.
    #[arg(long)]
    pub(crate) leaderboard: Option<PathBuf>,

    /// Seed for reproducible rounds.
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    #[command(subcommand)]
    pub(crate) mode: Option<Mode>,
}

/// What the binary does once configured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Subcommand)]
pub(crate) enum Mode {
    /// Play in the terminal.
    #[default]
    Play,
    /// Print the top scores and exit.
    Leaderboard,
}

/// Effective settings after merging the config file with command-line flags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Settings {
    pub(crate) mode: Mode,
    pub(crate) player: Option<String>,
    pub(crate) leaderboard_path: PathBuf,
    pub(crate) seed: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    version: u32,
    leaderboard_path: Option<PathBuf>,
    seed: Option<u64>,
    player: Option<String>,
}

impl Settings {
    /// Loads the config file named by `args`, if present, and applies flag overrides.
    pub(crate) fn resolve(args: Args) -> Result<Self> {
        let file = load_config(&args.config)?.unwrap_or_default();
        Ok(Self::merge(args, file))
    }

    fn merge(args: Args, file: ConfigFile) -> Self {
        Self {
            mode: args.mode.unwrap_or_default(),
            player: args.player.or(file.player),
            leaderboard_path: args
                .leaderboard
                .or(file.leaderboard_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LEADERBOARD_PATH)),
            seed: args.seed.or(file.seed),
        }
    }
}

fn load_config(path: &Path) -> Result<Option<ConfigFile>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config at {}", path.display()))
        }
    };
    parse_config(&contents)
        .with_context(|| format!("invalid config at {}", path.display()))
        .map(Some)
}

fn parse_config(contents: &str) -> Result<ConfigFile> {
    let config: ConfigFile =
        toml::from_str(contents).context("failed to parse config toml contents")?;
    if config.version != SUPPORTED_CONFIG_VERSION {
        bail!(
            "unsupported config version {}; expected {}",
            config.version,
            SUPPORTED_CONFIG_VERSION
        );
    }
    Ok(config)
}

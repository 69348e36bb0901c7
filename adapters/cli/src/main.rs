#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays the reflex game in a terminal.

mod config;
mod game;
mod identity;
mod terminal;

use anyhow::Result;
use clap::Parser;
use reflex_system_reconciler::resolve_player;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    config::{Args, Mode, Settings},
    identity::EnvIdentity,
};

/// Entry point for the reflex command-line interface.
fn main() -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("reflex=info"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::resolve(Args::parse())?;
    let player = resolve_player(&EnvIdentity::new(settings.player.clone()));
    info!(%player, leaderboard = %settings.leaderboard_path.display(), "reflex starting");

    match settings.mode {
        Mode::Play => game::play(&settings, player),
        Mode::Leaderboard => game::print_leaderboard(&settings, &player),
    }
}

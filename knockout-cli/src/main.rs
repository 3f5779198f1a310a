mod commands;
mod config;
mod logger;
mod render;
mod store;

use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use snowflaked::sync::Generator;
use thiserror::Error;

use crate::commands::Command;
use crate::config::{Config, ConfigError};

/// Generates ids for participants registered without one.
pub static ID_GENERATOR: Generator = Generator::new_unchecked(0);

#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Args {
    /// Path to the config file.
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
    /// Use this state file instead of the configured one.
    #[arg(short, long)]
    state: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Tournament(#[from] knockout_core::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("invalid state file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to install logger: {0}")]
    Logger(log::SetLoggerError),
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    if let Err(err) = run(args).await {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Error> {
    let mut config = Config::from_file(&args.config).await?.with_environment()?;
    if let Some(state) = args.state {
        config.state = state;
    }

    logger::init(config.loglevel).map_err(Error::Logger)?;
    config.validate()?;

    log::debug!("Using config: {:?}", config);

    let mut tournament = store::load(&config.state, config.capacity).await?;

    let mutating = args.command.is_mutating();
    args.command.run(&mut tournament, &mut io::stdout().lock())?;

    if mutating {
        store::save(&config.state, &tournament).await?;
    }

    Ok(())
}

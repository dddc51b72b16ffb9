//! Developer CLI for deriving passkeys and hierarchical keys from a seed phrase.

mod cli;
mod config;
mod handlers;

use anyhow::{Error, Result};
use clap::Parser;
use seedpass_common::logging::{self, LoggerConfig};

use crate::{
    cli::{Cli, Commands},
    handlers::{check_path, derive, passkey},
};

fn main() -> Result<(), Error> {
    let cli = Cli::parse();

    let mut log_config = LoggerConfig::with_base_name("seedpass-cli");
    if cli.log_source_location {
        log_config.set_source_location(true);
    }
    logging::init(log_config);

    let output = match cli.command {
        Commands::Passkey(args) => passkey::handle_passkey(&cli.config, args)?,
        Commands::Derive(args) => derive::handle_derive(&cli.config, args)?,
        Commands::CheckPath(args) => check_path::handle_check_path(args)?,
    };
    println!("{output}");

    Ok(())
}

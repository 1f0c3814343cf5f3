mod cli;
mod commands;
mod config;
mod errors;
mod gate;
mod processing;

use clap::Parser;
use tracing::subscriber::set_global_default;
use tracing_bunyan_formatter::{
    BunyanFormattingLayer,
    JsonStorageLayer,
};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::Registry;

use crate::cli::{
    Cli,
    Commands,
};
use crate::commands::{
    main_annotate,
    main_run,
    main_write_template,
};
use crate::errors::CliError;

// mimalloc seems to work better for windows
#[cfg(target_os = "windows")]
use mimalloc::MiMalloc;

#[cfg(target_os = "windows")]
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn init_logging(json_logs: bool) -> Result<(), CliError> {
    // RUST_LOG wins over the default level
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    if json_logs {
        let formatting_layer = BunyanFormattingLayer::new("analyteseek".into(), std::io::stdout);
        let subscriber = Registry::default()
            .with(env_filter)
            .with(JsonStorageLayer)
            .with(formatting_layer);
        set_global_default(subscriber).map_err(|e| CliError::Config {
            source: format!("Setting default subscriber failed: {}", e),
        })
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .try_init()
            .map_err(|e| CliError::Config {
                source: format!("Setting default subscriber failed: {}", e),
            })
    }
}

fn main() -> Result<(), CliError> {
    let args = Cli::parse();
    init_logging(args.json_logs)?;

    match args.command {
        Some(Commands::Run(args)) => main_run(args)?,
        Some(Commands::Annotate(args)) => main_annotate(args)?,
        Some(Commands::WriteTemplate(args)) => main_write_template(args)?,
        None => {
            println!("No command provided");
        }
    }
    Ok(())
}

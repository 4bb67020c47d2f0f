mod cli;
mod commands;

use anyhow::Context;
use cli::{Cli, Commands};
use commands::{destinations, origins};
use odhex::PipelineConfig;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn load_config(cli: &Cli) -> anyhow::Result<PipelineConfig> {
    match &cli.config {
        Some(path) => PipelineConfig::from_path(path)
            .with_context(|| format!("[cli] failed to load config {}", path.display())),
        None => Ok(PipelineConfig::default()),
    }
}

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Origins(args) => origins::run(&cli, config, args),
        Commands::Destinations(args) => destinations::run(&cli, config, args),
    }
}

fn main() -> anyhow::Result<()> { run() }

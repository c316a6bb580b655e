mod cli;
mod config;
mod logger;

use anyhow::Result;
use clap::Parser;

use cli::Cli;
use config::Config;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::from_env();
    logger::init_logger(&config.log_level, config.log_dir.as_deref());

    cli::run(cli, &config)
}

//! Command-line interface wiring for the `recu` binary.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use recu_printer::PolicyStore;
use tracing::info;

use crate::config::{Config, Settings};

pub mod inspect;
pub mod print;

/// Parsed CLI entrypoint for the `recu` binary.
#[derive(Parser, Debug)]
#[command(
    name = "recu",
    version,
    about = "Build ESC/POS receipt print jobs for thermal printers"
)]
pub struct Cli {
    /// Settings file (default: RECU_CONFIG_FILE or printer_config.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a print request file to printer bytes
    Render(print::RenderArgs),
    /// Build the device test page
    TestPage(print::TestPageArgs),
    /// Show the bytes a text encodes to
    Encode(inspect::EncodeArgs),
    /// Show width and encoding decisions for a printer
    Detect(inspect::DetectArgs),
}

/// Settings and policy shared by every command
pub struct Context {
    pub settings: Settings,
    pub policy: PolicyStore,
}

impl Context {
    pub fn load(config: &Config, settings_path: &Path) -> Result<Self> {
        let settings = Settings::load(settings_path)
            .with_context(|| format!("loading settings from {}", settings_path.display()))?
            .with_overrides(config);
        let policy = settings.policy().context("building encoding policy")?;
        Ok(Self {
            settings,
            policy: PolicyStore::new(policy),
        })
    }

    /// Explicit printer name, else the configured default
    pub fn printer_name(&self, explicit: Option<String>) -> Option<String> {
        explicit.or_else(|| self.settings.default_printer_name.clone())
    }
}

/// Execute the requested command.
pub fn run(cli: Cli, config: &Config) -> Result<()> {
    let settings_path = cli.config.as_deref().unwrap_or(&config.config_file);
    let ctx = Context::load(config, settings_path)?;

    match cli.command {
        Command::Render(args) => print::render(&ctx, args),
        Command::TestPage(args) => print::test_page(&ctx, args),
        Command::Encode(args) => inspect::encode(&ctx, args),
        Command::Detect(args) => inspect::detect(&ctx, args),
    }
}

/// Write a print buffer to a file, or to stdout
pub fn write_output(bytes: &[u8], output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), bytes = bytes.len(), "print buffer written");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(bytes).context("writing to stdout")?;
            stdout.flush().context("flushing stdout")?;
        }
    }
    Ok(())
}

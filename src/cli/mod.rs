//! CLI entry point for promptgraph.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::BridgeConfig;
use crate::error::Result;
use crate::types::{links_from_dir, AttachmentLink};

/// promptgraph CLI
#[derive(Parser, Debug)]
#[command(name = "promptgraph", version, about = "Stream prompts through the agent graph")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream a prompt through a session backed by the echo source
    Chat(ChatArgs),
    /// Print the agent name and version
    Info(InfoArgs),
}

/// Arguments for the `chat` subcommand.
#[derive(Parser, Debug)]
pub struct ChatArgs {
    /// File to attach (repeatable)
    #[arg(short, long = "attach", value_name = "PATH")]
    pub attach: Vec<PathBuf>,

    /// Attach every file in a directory
    #[arg(long, value_name = "DIR")]
    pub dataset: Option<PathBuf>,

    /// Config file (defaults to PROMPTGRAPH_CONFIG or the platform config dir)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// User prompt (positional)
    pub prompt: Option<String>,
}

/// Arguments for the `info` subcommand.
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Config file (defaults to PROMPTGRAPH_CONFIG or the platform config dir)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Parse CLI arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl ChatArgs {
    /// Links for `--attach` paths followed by the `--dataset` directory.
    pub fn links(&self) -> Result<Vec<AttachmentLink>> {
        let mut links = self
            .attach
            .iter()
            .map(AttachmentLink::from_path)
            .collect::<Result<Vec<_>>>()?;
        if let Some(dir) = &self.dataset {
            links.extend(links_from_dir(dir)?);
        }
        Ok(links)
    }
}

/// Resolve config from an explicit file, or fall back to [`BridgeConfig::load`].
pub fn load_config(path: Option<&PathBuf>) -> Result<BridgeConfig> {
    match path {
        Some(path) => {
            let config = BridgeConfig::from_file(path)?.apply_env()?;
            config.validate()?;
            Ok(config)
        }
        None => BridgeConfig::load(),
    }
}

/// Install the stderr subscriber; `RUST_LOG` wins over the `info` default.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

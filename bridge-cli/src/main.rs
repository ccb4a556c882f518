use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use sonos_bridge::logging::{init_logging_from_env, LoggingMode};
use sonos_bridge::{BridgeConfig, EqSwitch, JsonFileHost, SonosEqController, SonosPlatform};

mod commands;

/// Sonos EQ bridge
///
/// Discovers Sonos speakers, keeps the configured ones as accessories, and
/// toggles Night Sound and Speech Enhancement on them.
#[derive(Parser, Debug)]
#[command(name = "sonos-bridge")]
#[command(version)]
pub struct Args {
    /// Bridge configuration file (JSON)
    #[arg(short, long, env = "SONOS_BRIDGE_CONFIG", default_value = "config.json")]
    pub config: PathBuf,

    /// Accessory cache file (JSON)
    #[arg(long, env = "SONOS_BRIDGE_CACHE", default_value = "accessories.json")]
    pub cache: PathBuf,

    /// Verbose diagnostics with source locations
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one discovery pass and store matching speakers
    Discover {
        /// Print the pass report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show cached accessories
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Turn a switch on or off
    Set {
        /// Accessory display name (room name)
        name: String,
        /// night-sound or speech-enhancement
        switch: EqSwitch,
        /// on or off
        #[arg(value_parser = commands::parse_on_off, action = clap::ArgAction::Set)]
        value: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_mode = if args.verbose {
        LoggingMode::Debug
    } else {
        LoggingMode::Development
    };
    init_logging_from_env(default_mode).context("Failed to initialize logging")?;

    let config = load_config(&args)?;
    let host = Arc::new(
        JsonFileHost::open(&args.cache)
            .with_context(|| format!("Failed to open accessory cache {}", args.cache.display()))?,
    );
    let controller = Arc::new(SonosEqController::from_config(&config));
    let discovery_window = config.discovery_window();

    let platform = SonosPlatform::new(config, host.clone(), controller)
        .context("Failed to initialize platform")?;

    match args.command {
        Command::Discover { json } => {
            commands::discover(&platform, discovery_window, json).await
        }
        Command::List { json } => commands::list(&platform, json),
        Command::Set {
            name,
            switch,
            value,
        } => commands::set(&platform, &host, &name, switch, value).await,
    }
}

/// A missing config file behaves like an empty configuration
fn load_config(args: &Args) -> Result<BridgeConfig> {
    if !args.config.exists() {
        debug!("No config at {}, using defaults", args.config.display());
        return Ok(BridgeConfig::default());
    }
    BridgeConfig::load(&args.config)
        .with_context(|| format!("Failed to load config {}", args.config.display()))
}

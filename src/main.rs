//! appconfig - command-line client for AppConfig records
//!
//! Drives the AppConfig store against the configured REST service.

mod cli;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;

use appconfig_store::config::ConfigLoader;
use appconfig_store::{
    AppConfigService, BusyCounter, ConfigStore, FileKeyValueStore, HttpAppConfigService,
    RelationFlattening,
};
use cli::{ConfigSubcommand, RecordCommand};

/// appconfig - manage AppConfig key/value records
#[derive(Parser, Debug)]
#[command(name = "appconfig")]
#[command(about = "Manage AppConfig key/value records on a remote service", long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd')]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

/// Main commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
    /// Show version information
    Version,
    #[command(flatten)]
    Record(RecordCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let record_command = match args.command {
        Command::Config { subcommand } => return cli::handle_config_command(subcommand),
        Command::Version => {
            cli::display_version();
            return Ok(());
        }
        Command::Record(cmd) => cmd,
    };

    // Initialize logging if debug flag is set
    let log_file = cli::init_logging(args.debug);
    if let Some(ref log_path) = log_file {
        eprintln!(
            "Debug logging enabled. Logs written to: {}",
            log_path.display()
        );
    }

    // Load configuration
    let config = ConfigLoader::load().unwrap_or_else(|e| {
        tracing::warn!("Failed to load configuration: {:#}, using defaults", e);
        ConfigLoader::load_defaults()
    });
    tracing::debug!(
        "Configuration loaded: baseUrl={}, resourcePath={}",
        config.api.base_url,
        config.api.resource_path
    );

    let service = HttpAppConfigService::new(&config.api).context("Failed to create API client")?;
    tracing::debug!("Using {} AppConfig service", service.service_type());

    let storage = FileKeyValueStore::new(config.storage_path());
    tracing::debug!("Preferences stored in {}", storage.path().display());

    let store = ConfigStore::new(Arc::new(service), Arc::new(storage), BusyCounter::new())
        .with_relations(RelationFlattening::new(config.relational_fields.iter().cloned()));

    cli::handle_record_command(&store, record_command).await
}

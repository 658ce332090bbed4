//! Mist Guest Logger CLI
//!
//! Long-running entry point. Ctrl-C closes the stream connection and
//! reconnects; terminate the process to stop it.

use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use clap::{Parser, Subcommand};
use guest_logger::{
    error::Result,
    logging,
    models::Config,
    pipeline::{GuestTracker, ReconnectSignal, StreamSession, WsConnector},
    services::{GuestRules, MistClient, RetryPolicy},
    storage::LocalStorage,
};

/// Mist Guest Logger - records guest Wi-Fi sessions
#[derive(Parser, Debug)]
#[command(
    name = "guest-logger",
    version,
    about = "Logs guest Wi-Fi sessions from the Mist client stream"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Watch the stream and record guests until the process is terminated
    Run,

    /// List the sites that would be monitored
    Sites,

    /// Validate configuration
    Validate,

    /// Show output location and today's record count
    Info,
}

/// Forward every Ctrl-C to the session as a reconnect request.
fn spawn_interrupt_handler(signal: ReconnectSignal, delay: Duration) {
    tokio::spawn(async move {
        loop {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Cannot listen for Ctrl-C: {}", e);
                return;
            }
            log::info!(
                "Interrupt captured: closing the stream, reconnecting in {:?}. \
                 Terminate the process to exit.",
                delay
            );
            signal.trigger();
        }
    });
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = Config::load(&cli.config);
    let mut config = match &loaded {
        Ok(config) => config.clone(),
        Err(_) => Config::default(),
    };
    config.apply_env();
    let _log_guard = logging::init(&config.logging, cli.verbose)?;

    match loaded {
        Ok(_) => log::info!("Loaded configuration from {}", cli.config.display()),
        Err(e) => log::warn!(
            "Config load failed from {}: {}. Using defaults.",
            cli.config.display(),
            e
        ),
    }

    if let Err(e) = execute(cli.command, &config).await {
        log::error!("Fatal error: {}", e);
        return Err(e);
    }
    Ok(())
}

async fn execute(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Run => {
            config.validate()?;
            log::info!("Starting. Watching guest user sessions...");

            let client = MistClient::new(&config.api)?;
            let sites = client
                .fetch_sites(&RetryPolicy::from_config(&config.retry))
                .await;

            let tracker = GuestTracker::new(
                client,
                LocalStorage::from_config(&config.storage),
                GuestRules::from_config(&config.classifier),
                sites,
            );
            let delay = config.stream.reconnect_delay();
            let mut session =
                StreamSession::new(WsConnector::from_config(&config.api), tracker, delay);

            spawn_interrupt_handler(session.signal(), delay);
            session.run().await;
        }

        Command::Sites => {
            config.validate()?;
            let client = MistClient::new(&config.api)?;
            let sites = client
                .fetch_sites(&RetryPolicy::from_config(&config.retry))
                .await;

            if sites.is_empty() {
                log::info!("No sites to monitor.");
            }
            for site in &sites {
                println!("{}\t{}", site.id, site.name);
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");
        }

        Command::Info => {
            let storage = LocalStorage::from_config(&config.storage);
            let today = Utc::now().date_naive();
            let records = storage.read_day(today).await?;

            log::info!("Output directory: {}", storage.root_dir().display());
            log::info!("Today's file: {}", storage.partition_path(today).display());
            log::info!("Guests recorded today: {}", records.len());
        }
    }

    Ok(())
}

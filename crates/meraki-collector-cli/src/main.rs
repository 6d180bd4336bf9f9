//! meraki-collector CLI: collect Meraki Dashboard resources into the push
//! service.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use meraki_collector::{resource, CollectError, Collector, Config, MerakiClient, PushClient};
use tokio::sync::watch;
use tracing::{info, warn, Level};

#[derive(Parser)]
#[command(name = "meraki-collector")]
#[command(about = "Collect resources from the Meraki Dashboard API")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file [default: $MERAKI_COLLECTOR_CONFIG or config.yaml]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Perform lookups and encoding but suppress destination writes
    #[arg(long)]
    dry_run: bool,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), CollectError> {
    let cli = Cli::parse();

    let level = match cli.verbosity.as_str() {
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    let config_path = cli.config.unwrap_or_else(Config::default_path);
    let config = Config::load(&config_path)?;

    let api = Arc::new(MerakiClient::new(&config.meraki)?);
    let push = Arc::new(PushClient::new(&config.push)?);

    let (cancel_tx, cancel) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling collection");
            let _ = cancel_tx.send(true);
        }
    });

    let mut collector = Collector::new(api, push).with_dry_run(cli.dry_run);

    // Collect from the Meraki API root (organizations).
    collector.collect(&resource::organizations(), cancel).await?;

    info!("collection complete");
    Ok(())
}

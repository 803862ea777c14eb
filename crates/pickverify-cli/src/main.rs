//! pickverify
//!
//! Pick-and-verify scan station simulator. Lines typed on stdin play the
//! role of a keyboard-wedge scanner, a mock device stands in for the
//! point-of-sale scanner, and every feedback signal is printed as the
//! station publishes it.

mod commands;
mod logging;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use commands::{Command, HELP};
use logging::setup_logging;
use pickverify_hardware::devices::AnyScannerProvider;
use pickverify_hardware::mock::{MockScanner, MockScannerHandle, MockScannerProvider};
use pickverify_hardware::DeviceSessionManager;
use pickverify_station::{FeedbackSignal, Station, StationConfig, StationHandle};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "pickverify")]
#[command(author, version, about = "Pick-and-verify scan station simulator")]
#[command(long_about = "
Simulates a warehouse pick-and-verify station. Scan the operator identity
code, then the box label; every accepted scan prints the resulting state,
visual theme and audio cue.

EXAMPLES:
    # Run with default config
    pickverify

    # Run without a scanning device (keystrokes only)
    pickverify --no-device

    # Run with debug logging
    pickverify --log-level debug

INPUT:
    Plain lines are typed followed by Enter. Lines starting with ':' are
    commands; type :help for the list.

CONFIGURATION:
    1. Path specified with --config
    2. <config dir>/pickverify/station.toml
    3. Built-in defaults
")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Save default configuration to default location and exit
    #[arg(long)]
    save_config: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Run without a scanning device
    #[arg(long)]
    no_device: bool,

    /// Make the simulated scanner refuse to be claimed
    #[arg(long)]
    deny_claim: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.save_config {
        let config = StationConfig::default();
        let path = StationConfig::default_path();
        config.save(&path).context("Failed to save configuration")?;
        println!("Configuration saved to: {}", path.display());
        return Ok(());
    }

    let mut config =
        StationConfig::load(args.config.clone()).context("Failed to load configuration")?;

    if args.no_device {
        config.device.attached = false;
    }
    if args.deny_claim {
        config.device.deny_claim = true;
    }

    let log_level = args
        .log_level
        .as_deref()
        .unwrap_or(&config.station.log_level);
    setup_logging(log_level).context("Failed to setup logging")?;

    info!("pickverify v{}", env!("CARGO_PKG_VERSION"));

    let station = Station::new(&config);
    let handle = station.handle();

    let (provider, scanner) = build_scanner(&config);
    let mut session = DeviceSessionManager::new(provider);
    match session.initialize(handle.sender()).await {
        Ok(status) => info!(%status, "scanner ready"),
        Err(e) => warn!("Continuing with keystroke input only: {}", e),
    }

    let (handle, station_task) = station.start();
    let printer = tokio::spawn(print_feedback(handle.subscribe()));

    println!("Scan the identity code, then the box label. Type :help for commands.");

    let result = tokio::select! {
        result = read_commands(&handle, scanner.as_ref()) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted");
            Ok(())
        }
    };

    session.teardown().await;

    if let Err(e) = handle.shutdown().await {
        warn!("Station already stopped: {}", e);
    }
    match station_task.await {
        Ok(machine) => info!(transitions = machine.history().len(), "station finished"),
        Err(e) => error!("Station task failed: {}", e),
    }
    printer.abort();

    result
}

/// Build the scanner provider described by the `[device]` section.
fn build_scanner(config: &StationConfig) -> (AnyScannerProvider, Option<MockScannerHandle>) {
    if !config.device.attached {
        info!("No scanning device attached");
        return (AnyScannerProvider::Mock(MockScannerProvider::empty()), None);
    }

    let (scanner, handle) = MockScanner::with_name(config.device.name.clone());
    handle.set_deny_claim(config.device.deny_claim);

    (
        AnyScannerProvider::Mock(MockScannerProvider::new(scanner)),
        Some(handle),
    )
}

async fn read_commands(handle: &StationHandle, scanner: Option<&MockScannerHandle>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let command = match commands::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{e:#}");
                continue;
            }
        };

        match command {
            Command::Type(text) => handle.type_scan(&text).await?,
            Command::Escape => handle.escape().await?,
            Command::Acknowledge => handle.acknowledge_completion().await?,
            Command::Scan { symbology, payload } => match scanner {
                Some(scanner) => {
                    if let Err(e) = scanner.scan(symbology, payload).await {
                        println!("Scan not delivered: {e}");
                    }
                }
                None => println!("No scanning device attached"),
            },
            Command::Release => match scanner {
                Some(scanner) => {
                    if let Err(e) = scanner.request_release().await {
                        println!("Release request not delivered: {e}");
                    }
                }
                None => println!("No scanning device attached"),
            },
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
        }
    }

    Ok(())
}

async fn print_feedback(mut feedback: broadcast::Receiver<FeedbackSignal>) {
    loop {
        match feedback.recv().await {
            Ok(signal) => println!("{signal}"),
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                warn!(missed, "feedback printer fell behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

//! saferoute-share - Share your live location over WhatsApp and SMS

use anyhow::{Context, Result};
use clap::Parser;
use libsaferoute::broadcast::PrintingOpener;
use libsaferoute::location::fixed::FixedPositionSource;
use libsaferoute::location::Locator;
use libsaferoute::logging::LoggingConfig;
use libsaferoute::service::{Backends, SafeRouteService};
use libsaferoute::{Config, SafeRouteError};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "saferoute-share")]
#[command(version, about = "Share your live location over WhatsApp and SMS")]
#[command(long_about = r#"Share your live location over WhatsApp and SMS.

The current position is read from the configured position source and a
live-tracking message with a map link is composed. The WhatsApp link opens
first; the SMS link follows after a short delay. When the position cannot be
read, the message links to the destination instead.

EXAMPLES:
    # Share while travelling
    saferoute-share --from Mumbai --to Pune

    # Use a known coordinate instead of the position source
    saferoute-share --lat 19.076 --lon 72.8777

    # Print the links instead of opening them
    saferoute-share --to "Gateway of India" --dry-run

    # Give the position source more time
    saferoute-share --timeout 30s

EXIT CODES:
    0 - Success (at least one link was opened)
    1 - Error (configuration, or no link could be opened)
"#)]
struct Cli {
    /// Where you are travelling from
    #[arg(long, value_name = "PLACE", default_value = "")]
    from: String,

    /// Where you are travelling to
    #[arg(long, value_name = "PLACE", default_value = "")]
    to: String,

    /// Latitude of your position (skips the position source)
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Longitude of your position (skips the position source)
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Behave as if no position source existed
    #[arg(long, conflicts_with_all = ["lat", "lon"])]
    no_gps: bool,

    /// How long to wait for a position, e.g. "10s" (overrides config)
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    timeout: Option<Duration>,

    /// Print the links to stdout instead of opening them
    #[arg(long)]
    dry_run: bool,

    /// Output format for the summary on stderr
    #[arg(short, long, default_value = "text", value_name = "FORMAT")]
    #[arg(value_parser = ["text", "json"])]
    format: String,

    /// Configuration file (default: ~/.config/saferoute/config.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Serialize)]
struct ShareSummary<'a> {
    message: &'a str,
    whatsapp: &'a str,
    sms: &'a str,
    latitude: Option<f64>,
    longitude: Option<f64>,
    position_error: Option<String>,
    alerts: Vec<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    LoggingConfig::from_env("warn", cli.verbose).init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        let code = e
            .downcast_ref::<SafeRouteError>()
            .map(SafeRouteError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

/// Whole milliseconds, saturating at `u64::MAX`
fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load_from(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(timeout) = cli.timeout {
        config.share.share_timeout_ms = duration_ms(timeout);
    }

    let mut backends = Backends::from_config(&config)?;
    if let (Some(lat), Some(lon)) = (cli.lat, cli.lon) {
        backends.locator = Locator::new(Arc::new(FixedPositionSource::new(lat, lon)));
    } else if cli.no_gps {
        backends.locator = Locator::unsupported();
    }
    if cli.dry_run {
        backends.opener = Arc::new(PrintingOpener);
    }

    let service = SafeRouteService::with_backends(config, backends);
    let handle = service.share().share(&cli.from, &cli.to).await;

    let summary_message = handle.message().to_string();
    let whatsapp_link = handle.links.whatsapp.clone();
    let sms_link = handle.links.sms.clone();
    let position = handle.fix.as_ref().map(|fix| fix.position);
    let position_error = handle.position_error.map(|e| e.to_string());
    let whatsapp = handle.whatsapp.clone();

    let sms = handle.wait_sms().await;
    info!("Share finished");

    let alerts = service.page().alerts;
    if cli.format == "json" {
        let summary = ShareSummary {
            message: &summary_message,
            whatsapp: &whatsapp_link,
            sms: &sms_link,
            latitude: position.map(|p| p.lat),
            longitude: position.map(|p| p.lon),
            position_error,
            alerts,
        };
        eprintln!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        for alert in &alerts {
            eprintln!("{}", alert);
        }
    }

    match (whatsapp, sms) {
        (Err(e), Err(_)) => Err(SafeRouteError::from(e).into()),
        (Err(e), Ok(())) | (Ok(()), Err(e)) => {
            eprintln!("Warning: {}", e);
            Ok(())
        }
        (Ok(()), Ok(())) => Ok(()),
    }
}

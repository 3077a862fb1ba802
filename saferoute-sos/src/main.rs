//! saferoute-sos - Send an emergency alert with your location

use anyhow::{Context, Result};
use clap::Parser;
use libsaferoute::broadcast::templates::SOS_CONFIRM_PROMPT;
use libsaferoute::broadcast::PrintingOpener;
use libsaferoute::location::fixed::FixedPositionSource;
use libsaferoute::location::Locator;
use libsaferoute::logging::LoggingConfig;
use libsaferoute::service::{Backends, SafeRouteService};
use libsaferoute::{Config, SafeRouteError};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "saferoute-sos")]
#[command(version, about = "Send an SOS alert with your location over WhatsApp and SMS")]
#[command(long_about = r#"Send an SOS alert with your location over WhatsApp and SMS.

A fresh position is requested (cached positions are never used). On success
the alert carries a map link to it. When the position cannot be read, the
cause is explained and a fallback alert naming the place given with --near is
sent anyway: an SOS never stops silently.

You are asked to confirm first unless --yes is given. Without a terminal on
stdin, --yes is required.

EXAMPLES:
    # Interactive confirmation
    saferoute-sos --near "Andheri Station"

    # From a script or a shortcut
    saferoute-sos --yes --near "Andheri Station"

    # Print the links instead of opening them
    saferoute-sos --yes --dry-run --lat 19.1197 --lon 72.8464

EXIT CODES:
    0 - Alert sent, or cancelled at the prompt
    1 - Error (configuration, or no link could be opened)
    3 - Confirmation required but stdin is not a terminal
"#)]
struct Cli {
    /// Last known place, named in the alert if the position cannot be read
    #[arg(long, value_name = "PLACE", default_value = "")]
    near: String,

    /// Latitude of your position (skips the position source)
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Longitude of your position (skips the position source)
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Behave as if no position source existed
    #[arg(long, conflicts_with_all = ["lat", "lon"])]
    no_gps: bool,

    /// Send without asking for confirmation
    #[arg(short, long)]
    yes: bool,

    /// Print the links to stdout instead of opening them
    #[arg(long)]
    dry_run: bool,

    /// Configuration file (default: ~/.config/saferoute/config.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,
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

async fn run(cli: Cli) -> Result<()> {
    if !cli.yes && !confirm()? {
        eprintln!("SOS cancelled");
        return Ok(());
    }

    let config = Config::load_from(cli.config.as_deref()).context("Failed to load configuration")?;

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
    let handle = service.share().sos(&cli.near).await;

    for alert in service.page().alerts {
        eprintln!("{}", alert);
    }

    let whatsapp = handle.whatsapp.clone();
    let sms = handle.wait_sms().await;
    eprintln!("{}", service.page().sos_overlay.text);
    info!("SOS finished");

    match (whatsapp, sms) {
        (Err(e), Err(_)) => Err(SafeRouteError::from(e).into()),
        (Err(e), Ok(())) | (Ok(()), Err(e)) => {
            eprintln!("Warning: {}", e);
            Ok(())
        }
        (Ok(()), Ok(())) => Ok(()),
    }
}

/// Ask on stderr and read the answer from stdin
fn confirm() -> Result<bool> {
    if !atty::is(atty::Stream::Stdin) {
        return Err(SafeRouteError::InvalidInput(
            "confirmation required but stdin is not a terminal; pass --yes".to_string(),
        )
        .into());
    }

    let mut stderr = std::io::stderr();
    write!(stderr, "{}\n\n[y/N] ", SOS_CONFIRM_PROMPT)?;
    stderr.flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

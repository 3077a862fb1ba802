//! saferoute-find - Find and display a route between two places

use anyhow::{Context, Result};
use clap::Parser;
use libsaferoute::logging::LoggingConfig;
use libsaferoute::map::MapSnapshot;
use libsaferoute::routing::RoutePath;
use libsaferoute::service::events::Event;
use libsaferoute::service::route::{RenderedRoute, RouteEvent};
use libsaferoute::service::SafeRouteService;
use libsaferoute::{Config, Place, RouteRequest, SafeRouteError, Theme};
use serde::Serialize;
use std::path::PathBuf;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::warn;

#[derive(Parser, Debug)]
#[command(name = "saferoute-find")]
#[command(version, about = "Find a route between two places and check it for safety")]
#[command(long_about = r#"Find a route between two places and check it for safety.

Both places are looked up with the configured geocoder (the country
qualifier is appended when missing), a safety verdict is produced, and the
route is drawn on a headless map whose view is fitted to the result.

The safety verdict is a placeholder: no analysis is performed.

EXAMPLES:
    # Route between two cities
    saferoute-find Mumbai Pune

    # Light map theme, JSON report for scripting
    saferoute-find "Gateway of India" "Bandra" --light --format json

    # GeoJSON of the drawn markers, circles and route line
    saferoute-find Delhi Agra --format geojson > route.geojson

    # Stop after drawing; do not wait for the routing service
    saferoute-find Mumbai Pune --no-wait

OUTPUT FORMATS:
    text    - Human-readable summary (default)
    json    - Places, verdict, route and map snapshot
    geojson - Map overlays as a FeatureCollection

EXIT CODES:
    0 - Success (a failed route calculation is reported, not an error)
    1 - Error (configuration, network setup, etc.)
    2 - A place could not be found
    3 - Invalid input (empty origin or destination)
"#)]
struct Cli {
    /// Where the route starts
    #[arg(value_name = "FROM")]
    from: String,

    /// Where the route ends
    #[arg(value_name = "TO")]
    to: String,

    /// Use the light map theme
    #[arg(long)]
    light: bool,

    /// Output format
    #[arg(short, long, default_value = "text", value_name = "FORMAT")]
    #[arg(value_parser = ["text", "json", "geojson"])]
    format: String,

    /// Return once the route is drawn, without waiting for the routing outcome
    #[arg(long)]
    no_wait: bool,

    /// Configuration file (default: ~/.config/saferoute/config.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Serialize)]
struct Report {
    request_id: String,
    origin: Place,
    destination: Place,
    safety: SafetyReport,
    route: Option<RoutePath>,
    routing_error: Option<String>,
    status: Option<String>,
    map: MapSnapshot,
}

#[derive(Debug, Serialize)]
struct SafetyReport {
    safe: bool,
    message: String,
    details: String,
    placeholder: bool,
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
    let mut config = Config::load_from(cli.config.as_deref()).context("Failed to load configuration")?;
    if cli.light {
        config.map.theme = Theme::Light;
    }

    let service = SafeRouteService::from_config(config)?;
    let show_progress = cli.format == "text";
    let mut events = service.subscribe();

    // Print progress while the request runs, on this task, so nothing
    // emitted before `find` returns can be lost
    let find = find(&service, &cli);
    tokio::pin!(find);
    let result = loop {
        tokio::select! {
            result = &mut find => break result,
            received = events.recv() => {
                if let Ok(event) = received {
                    print_event(&event, show_progress);
                }
            }
        }
    };

    loop {
        match events.try_recv() {
            Ok(event) => print_event(&event, show_progress),
            Err(TryRecvError::Lagged(skipped)) => warn!("{} progress events dropped", skipped),
            Err(_) => break,
        }
    }
    result
}

/// Status lines go to stderr in text mode; alerts always do
fn print_event(event: &Event, show_progress: bool) {
    match event {
        Event::StatusChanged { text, .. } if show_progress => eprintln!("{}", text),
        Event::Alert { text } => eprintln!("{}", text),
        _ => {}
    }
}

async fn find(service: &SafeRouteService, cli: &Cli) -> Result<()> {
    let request = RouteRequest::new(cli.from.as_str(), cli.to.as_str());
    let pending = service.route().find_route(&request).await?;
    let rendered = pending.route.clone();

    let (route, routing_error) = if cli.no_wait {
        (None, None)
    } else {
        match pending.wait().await.event {
            RouteEvent::RoutesFound(path) => (Some(path), None),
            RouteEvent::RoutingError(e) => (None, Some(e.to_string())),
        }
    };

    let report = Report {
        request_id: rendered.request_id.clone(),
        origin: rendered.origin.clone(),
        destination: rendered.destination.clone(),
        safety: SafetyReport {
            safe: rendered.verdict.safe,
            message: rendered.verdict.message.clone(),
            details: rendered.verdict.details.clone(),
            placeholder: true,
        },
        route,
        routing_error,
        status: service.page().status.map(|s| s.text),
        map: service.map_snapshot(),
    };

    match cli.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        "geojson" => {
            let geojson = service.with_map(|map| map.to_geojson());
            println!("{}", serde_json::to_string_pretty(&geojson)?);
        }
        _ => print_text(&report, &rendered),
    }

    Ok(())
}

fn print_text(report: &Report, rendered: &RenderedRoute) {
    println!("From:   {} ({})", rendered.origin.display_name, rendered.origin.position);
    println!("To:     {} ({})", rendered.destination.display_name, rendered.destination.position);
    println!("Safety: {} [placeholder]", report.safety.message);
    println!("        {}", report.safety.details);

    match (&report.route, &report.routing_error) {
        (Some(path), _) => println!("Route:  {}", path.summary()),
        (None, Some(error)) => println!("Route:  unavailable ({}); showing endpoints only", error),
        (None, None) => println!("Route:  pending"),
    }

    let view = report.map.view;
    println!(
        "Map:    {} theme, zoom {} centered at {}",
        report.map.theme, view.zoom, view.center
    );
    println!("Tile:   {}", report.map.center_tile);
}

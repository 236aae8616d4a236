//! EV Rental command line driver
//!
//! Builds the fleet described by a configuration file, optionally runs
//! rentals and change requests against it, and prints the fleet report.
//!
//! ```sh
//! # Run with default config (~/.config/ev-rental/config.toml)
//! ev-rental
//!
//! # Rent vehicle 10 at station 1 as a verified user
//! ev-rental --capability "verified user" --rent 1:10
//!
//! # Push a change request through the escalation chain
//! ev-rental --escalate urgent --description "relocate station 2"
//!
//! # Validate config without running anything
//! ev-rental --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info, warn};

use ev_rental::config::AppConfig;
use ev_rental::domain::{CapabilitySet, ChangeRequest, StationId, VehicleId};
use ev_rental::runtime::{init_tracing, FleetRuntime};
use ev_rental::support::to_json_pretty;

/// Fleet inventory and rental driver for EV charging stations.
#[derive(Parser, Debug)]
#[command(
    name = "ev-rental",
    version,
    about = "Inventory, rental and escalation driver for EV charging stations",
    long_about = "Loads stations and vehicles from a TOML config, runs the requested \
                  rentals and change requests, then prints a JSON fleet report.\n\n\
                  Default config: ~/.config/ev-rental/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "EV_RENTAL_CONFIG")]
    config: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit.
    #[arg(long)]
    check: bool,

    /// Capability granted to the caller (repeatable).
    #[arg(long = "capability")]
    capabilities: Vec<String>,

    /// Rent a vehicle, given as STATION:VEHICLE (repeatable).
    #[arg(long, value_parser = parse_rental)]
    rent: Vec<(StationId, VehicleId)>,

    /// Submit a change request of this type to the escalation chain.
    #[arg(long)]
    escalate: Option<String>,

    /// Description for --escalate.
    #[arg(long, default_value = "")]
    description: String,
}

fn parse_rental(s: &str) -> Result<(StationId, VehicleId), String> {
    let (station, vehicle) = s
        .split_once(':')
        .ok_or_else(|| format!("expected STATION:VEHICLE, got '{s}'"))?;
    let station = station
        .trim()
        .parse()
        .map_err(|e| format!("invalid station id '{station}': {e}"))?;
    let vehicle = vehicle
        .trim()
        .parse()
        .map_err(|e| format!("invalid vehicle id '{vehicle}': {e}"))?;
    Ok((station, vehicle))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli.config.unwrap_or_else(ev_rental::default_config_path);

    let mut config = match AppConfig::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", config_path.display(), e);
            if cli.check {
                return Err(e.into());
            }
            eprintln!("Using default configuration.");
            AppConfig::default()
        }
    };

    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config);
    info!("Configuration from {}", config_path.display());

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        println!("✅ Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   Stations    : {}", config.stations.len());
        println!("   Capability  : {}", config.rental.required_capability);
        println!("   Channel     : {}", config.rental.channel);
        println!("   Log level   : {}", config.logging.level);
        return Ok(());
    }

    // ── Build fleet ────────────────────────────────────────────
    let runtime = FleetRuntime::start(config).await?;
    let caps: CapabilitySet = cli.capabilities.iter().map(String::as_str).collect();

    for (station_id, vehicle_id) in cli.rent {
        let station = match runtime.fleet.get(station_id) {
            Ok(station) => station,
            Err(e) => {
                warn!(station_id, "{}", e);
                continue;
            }
        };
        match runtime.rental.rent_car(&station, &caps, vehicle_id).await {
            Ok(status) => info!(station_id, vehicle_id, %status, "Rental processed"),
            Err(e) => error!(station_id, vehicle_id, "Rental failed: {}", e),
        }
    }

    if let Some(change_type) = cli.escalate {
        let request = ChangeRequest::new(change_type, cli.description);
        let resolution = runtime.escalation.submit(&request);
        println!("{}", to_json_pretty(&resolution)?);
    }

    let report = runtime.fleet.fleet_report().await;
    println!("{}", to_json_pretty(&report)?);

    Ok(())
}

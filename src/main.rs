//! Sparc Telemetry Simulator - fake meters for the metering backend
//!
//! Posts one randomized reading per simulated device to the store-data
//! endpoint, waits, and repeats until interrupted.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables:
//!
//! - `SPARC_SIMULATOR_API_URL`: backend base URL (default: http://localhost:8080)
//! - `SPARC_SIMULATOR_INTERVAL_SECS`: seconds between cycles (default: 5)
//! - `SPARC_SIMULATOR_REQUEST_TIMEOUT_SECS`: per-request timeout (default: none)
//! - `RUST_LOG`: Logging level filter (default: info)

use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use sparc_simulator::client::StoreClient;
use sparc_simulator::config::Config;
use sparc_simulator::measurement::MeasurementGenerator;
use sparc_simulator::simulator::Simulator;

#[tokio::main]
async fn main() {
    init_tracing();

    info!("📡 Starting Sparc telemetry simulator...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    let client = match StoreClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to create HTTP client");
            std::process::exit(1);
        }
    };

    info!(
        target_url = %client.store_url(),
        devices = config.devices.len(),
        interval_secs = config.interval.as_secs(),
        "Target: {}",
        client.store_url()
    );
    info!("Press Ctrl+C to stop.");

    let simulator = Simulator::new(
        config.devices,
        client,
        MeasurementGenerator::from_entropy(),
        config.interval,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received, stopping..."),
            Err(e) => error!(error = %e, "Failed to listen for shutdown signal"),
        }
        let _ = shutdown_tx.send(true);
    });

    let stats = simulator.run(shutdown_rx).await;

    info!(cycles = stats.cycles, "Telemetry simulator exited");
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

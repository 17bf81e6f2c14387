//! Sparc Telemetry Simulator Library
//!
//! Simulated metering devices that post randomized readings to the
//! `store-data` ingestion endpoint, to generate development traffic:
//!
//! - **config**: Environment-based configuration (endpoint, interval, roster)
//! - **device**: Device descriptors and measurement kinds
//! - **measurement**: Randomized readings and the JSON payload
//! - **client**: HTTP delivery behind the `MeasurementSink` trait
//! - **simulator**: The send/wait loop with shutdown support
//!
//! # Example
//!
//! ```no_run
//! use sparc_simulator::client::StoreClient;
//! use sparc_simulator::config::Config;
//! use sparc_simulator::measurement::MeasurementGenerator;
//! use sparc_simulator::simulator::Simulator;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::from_env().expect("Failed to load config");
//!     let client = StoreClient::new(&config).expect("Failed to create client");
//!
//!     let mut simulator = Simulator::new(
//!         config.devices.clone(),
//!         client,
//!         MeasurementGenerator::from_entropy(),
//!         config.interval,
//!     );
//!
//!     // One pass over every device
//!     let reports = simulator.run_cycle().await;
//!     println!("{} readings sent", reports.len());
//! }
//! ```

pub mod client;
pub mod config;
pub mod device;
pub mod measurement;
pub mod simulator;

pub use client::{ClientError, Delivery, MeasurementSink, StoreClient};
pub use config::{Config, ConfigError};
pub use device::{default_roster, DeviceDescriptor, MeasureKind};
pub use measurement::{MeasureRecord, MeasurementGenerator, MeasurementPayload};
pub use simulator::{DeviceReport, Outcome, Simulator, SimulatorStats};

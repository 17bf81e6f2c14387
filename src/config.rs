//! Configuration module for the telemetry simulator.
//!
//! This module provides environment-based configuration for the simulator,
//! including the ingestion URL, the pause between cycles and the device roster.

use std::env;
use std::time::Duration;

use thiserror::Error;

use crate::device::{default_roster, DeviceDescriptor};

/// Default base URL of the metering backend
const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Path of the store-data endpoint under the base URL
const STORE_DATA_PATH: &str = "/api/store-data";

/// Default pause between cycles in seconds
const DEFAULT_INTERVAL_SECS: u64 = 5;

/// Minimum pause between cycles to avoid hammering the backend
const MIN_INTERVAL_SECS: u64 = 1;

/// Maximum pause between cycles
const MAX_INTERVAL_SECS: u64 = 3600;

const API_URL_VAR: &str = "SPARC_SIMULATOR_API_URL";
const INTERVAL_VAR: &str = "SPARC_SIMULATOR_INTERVAL_SECS";
const REQUEST_TIMEOUT_VAR: &str = "SPARC_SIMULATOR_REQUEST_TIMEOUT_SECS";

/// Configuration for the simulator.
///
/// Settings can be overridden via environment variables:
/// - `SPARC_SIMULATOR_API_URL`: backend base URL (default: http://localhost:8080)
/// - `SPARC_SIMULATOR_INTERVAL_SECS`: seconds between cycles (default: 5)
/// - `SPARC_SIMULATOR_REQUEST_TIMEOUT_SECS`: per-request timeout (default: none)
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL for the metering backend
    pub api_url: String,

    /// Full URL of the store-data endpoint
    pub store_url: String,

    /// Pause after every device has been sent once
    pub interval: Duration,

    /// Explicit request timeout, `None` leaves it to the transport
    pub request_timeout: Option<Duration>,

    /// Simulated devices, in send order
    pub devices: Vec<DeviceDescriptor>,
}

/// Error type for configuration loading failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error for {var}: '{value}' is not a valid number")]
    InvalidNumber { var: &'static str, value: String },

    #[error("Configuration error for {var}: {value}s is out of range ({min}..={max}s)")]
    OutOfRange {
        var: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },

    #[error("Configuration error for {var}: URL must not be empty")]
    EmptyUrl { var: &'static str },

    #[error("Configuration error for {var}: timeout must be at least 1s")]
    ZeroTimeout { var: &'static str },
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset variables fall back to the defaults. The device roster is always
    /// the built-in one.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - `SPARC_SIMULATOR_API_URL` is set but empty
    /// - `SPARC_SIMULATOR_INTERVAL_SECS` is not a number or outside 1..=3600
    /// - `SPARC_SIMULATOR_REQUEST_TIMEOUT_SECS` is not a number or zero
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = match env::var(API_URL_VAR) {
            Ok(value) => {
                let trimmed = value.trim().trim_end_matches('/').to_string();
                if trimmed.is_empty() {
                    return Err(ConfigError::EmptyUrl { var: API_URL_VAR });
                }
                trimmed
            }
            Err(_) => DEFAULT_API_URL.to_string(),
        };

        let interval = Duration::from_secs(Self::parse_interval()?);
        let request_timeout = Self::parse_request_timeout()?;

        Ok(Self {
            store_url: store_url_for(&api_url),
            api_url,
            interval,
            request_timeout,
            devices: default_roster(),
        })
    }

    /// Parse the cycle interval from the environment with validation.
    fn parse_interval() -> Result<u64, ConfigError> {
        match env::var(INTERVAL_VAR) {
            Ok(value) => {
                let secs = parse_secs(INTERVAL_VAR, &value)?;
                if !(MIN_INTERVAL_SECS..=MAX_INTERVAL_SECS).contains(&secs) {
                    return Err(ConfigError::OutOfRange {
                        var: INTERVAL_VAR,
                        value: secs,
                        min: MIN_INTERVAL_SECS,
                        max: MAX_INTERVAL_SECS,
                    });
                }
                Ok(secs)
            }
            Err(_) => Ok(DEFAULT_INTERVAL_SECS),
        }
    }

    fn parse_request_timeout() -> Result<Option<Duration>, ConfigError> {
        match env::var(REQUEST_TIMEOUT_VAR) {
            Ok(value) => {
                let secs = parse_secs(REQUEST_TIMEOUT_VAR, &value)?;
                if secs == 0 {
                    return Err(ConfigError::ZeroTimeout {
                        var: REQUEST_TIMEOUT_VAR,
                    });
                }
                Ok(Some(Duration::from_secs(secs)))
            }
            Err(_) => Ok(None),
        }
    }

    /// Replace the backend base URL, keeping everything else.
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self.store_url = store_url_for(&self.api_url);
        self
    }
}

fn parse_secs(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        var,
        value: value.to_string(),
    })
}

/// Full store-data endpoint URL for a backend base URL.
pub fn store_url_for(api_url: &str) -> String {
    format!("{}{}", api_url, STORE_DATA_PATH)
}

impl Default for Config {
    /// The built-in constants, without looking at the environment.
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            store_url: store_url_for(DEFAULT_API_URL),
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            request_timeout: None,
            devices: default_roster(),
        }
    }
}

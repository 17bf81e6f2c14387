//! HTTP client module for delivering measurements to the store-data endpoint.
//!
//! Every send is a single POST with no retry: a failed reading is dropped
//! and the next cycle produces a fresh one.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::measurement::MeasurementPayload;

/// Acknowledgement body returned by the backend, e.g. `{"message":"data stored."}`.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreAck {
    #[serde(default)]
    pub message: Option<String>,
}

/// Result of a request that got an HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    /// 200 or 201
    Accepted {
        status: StatusCode,
        message: Option<String>,
    },

    /// Any other status, with the body text as returned
    Rejected { status: StatusCode, body: String },
}

impl Delivery {
    pub fn status(&self) -> StatusCode {
        match self {
            Delivery::Accepted { status, .. } | Delivery::Rejected { status, .. } => *status,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Delivery::Accepted { .. })
    }
}

/// Transport-level failures: no response was obtained.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection refused, DNS failure, malformed response...
    #[error("HTTP request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Request timed out")]
    Timeout,

    /// Client configuration error
    #[error("Client configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else {
            ClientError::Request(err)
        }
    }
}

/// Destination for measurement payloads.
///
/// The simulator only talks to this trait, so tests can swap the HTTP
/// endpoint for an in-memory one.
#[async_trait]
pub trait MeasurementSink: Send + Sync {
    /// Deliver one payload. Non-success statuses are `Ok(Delivery::Rejected)`.
    async fn deliver(&self, payload: &MeasurementPayload) -> Result<Delivery, ClientError>;

    /// Where payloads go, for log output.
    fn endpoint(&self) -> &str;
}

/// HTTP client posting payloads to the store-data endpoint.
///
/// # Example
///
/// ```no_run
/// use sparc_simulator::client::{MeasurementSink, StoreClient};
/// use sparc_simulator::config::Config;
/// use sparc_simulator::device::default_roster;
/// use sparc_simulator::measurement::MeasurementPayload;
///
/// #[tokio::main]
/// async fn main() {
///     let client = StoreClient::new(&Config::default()).expect("Failed to create client");
///     let payload = MeasurementPayload::for_device(&default_roster()[0], 12.37);
///
///     match client.deliver(&payload).await {
///         Ok(delivery) => println!("Status: {}", delivery.status()),
///         Err(e) => eprintln!("Failed to send: {}", e),
///     }
/// }
/// ```
pub struct StoreClient {
    /// The underlying HTTP client
    client: Client,

    /// URL of the store-data endpoint
    store_url: String,

    /// Explicit per-request timeout, if any
    timeout: Option<Duration>,
}

impl StoreClient {
    /// Create a client for the endpoint and timeout in `config`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Config` if the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        Self::with_settings(config.store_url.clone(), config.request_timeout)
    }

    /// Create a client with custom settings.
    pub fn with_settings(
        store_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, ClientError> {
        // One connection per request, nothing kept idle between sends
        let mut builder = Client::builder().pool_max_idle_per_host(0);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        Ok(Self {
            client,
            store_url: store_url.into(),
            timeout,
        })
    }

    /// Get the configured store-data URL.
    pub fn store_url(&self) -> &str {
        &self.store_url
    }

    /// Get the request timeout, if one was configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

/// Only 200 and 201 count as success for the store-data endpoint.
pub fn is_success_status(status: StatusCode) -> bool {
    status == StatusCode::OK || status == StatusCode::CREATED
}

#[async_trait]
impl MeasurementSink for StoreClient {
    async fn deliver(&self, payload: &MeasurementPayload) -> Result<Delivery, ClientError> {
        debug!(
            url = %self.store_url,
            mac_address = %payload.mac_address,
            "Posting measurement"
        );

        let response = self
            .client
            .post(&self.store_url)
            .json(payload)
            .send()
            .await?;

        let status = response.status();

        if is_success_status(status) {
            // The acknowledgement is informational, an odd body is not a failure
            let message = response
                .json::<StoreAck>()
                .await
                .ok()
                .and_then(|ack| ack.message);
            Ok(Delivery::Accepted { status, message })
        } else {
            let body = response.text().await?;
            Ok(Delivery::Rejected { status, body })
        }
    }

    fn endpoint(&self) -> &str {
        &self.store_url
    }
}

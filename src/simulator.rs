//! The telemetry loop.
//!
//! One cycle sends a fresh reading for every device, in roster order, then
//! the loop waits for the configured interval. Every failure is logged and
//! dropped, nothing stops the loop except the shutdown channel.

use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::client::{Delivery, MeasurementSink};
use crate::device::DeviceDescriptor;
use crate::measurement::MeasurementGenerator;

/// What happened to one device's reading in a cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Endpoint answered 200 or 201
    Delivered { status: u16 },

    /// Endpoint answered with any other status
    Rejected { status: u16, body: String },

    /// No response at all
    Failed { error: String },
}

/// Per-device result of a cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceReport {
    pub device: String,
    pub value: f64,
    pub outcome: Outcome,
}

/// Counters over the lifetime of a simulator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulatorStats {
    /// Completed cycles
    pub cycles: u64,

    /// Readings answered with 200/201
    pub delivered: u64,

    /// Readings answered with another status
    pub rejected: u64,

    /// Readings that got no response
    pub failed: u64,
}

impl SimulatorStats {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Delivered { .. } => self.delivered += 1,
            Outcome::Rejected { .. } => self.rejected += 1,
            Outcome::Failed { .. } => self.failed += 1,
        }
    }
}

/// Sends simulated readings for a fixed roster through a [`MeasurementSink`].
pub struct Simulator<S> {
    devices: Vec<DeviceDescriptor>,
    sink: S,
    generator: MeasurementGenerator,
    interval: Duration,
    stats: SimulatorStats,
}

impl<S: MeasurementSink> Simulator<S> {
    pub fn new(
        devices: Vec<DeviceDescriptor>,
        sink: S,
        generator: MeasurementGenerator,
        interval: Duration,
    ) -> Self {
        Self {
            devices,
            sink,
            generator,
            interval,
            stats: SimulatorStats::default(),
        }
    }

    pub fn stats(&self) -> &SimulatorStats {
        &self.stats
    }

    /// Send one reading per device, in order, and count the cycle.
    ///
    /// A device whose send fails does not affect the devices after it.
    pub async fn run_cycle(&mut self) -> Vec<DeviceReport> {
        let mut reports = Vec::with_capacity(self.devices.len());

        for device in &self.devices {
            let (payload, value) = self.generator.next_payload(device);

            let outcome = match self.sink.deliver(&payload).await {
                Ok(Delivery::Accepted { status, message }) => {
                    info!(
                        device = %device.name,
                        value = value,
                        kind = %device.kind,
                        status = status.as_u16(),
                        ack = message.as_deref().unwrap_or(""),
                        "✅ [{}] sent {} | status {}",
                        device.name,
                        value,
                        status.as_u16()
                    );
                    Outcome::Delivered {
                        status: status.as_u16(),
                    }
                }
                Ok(Delivery::Rejected { status, body }) => {
                    warn!(
                        device = %device.name,
                        status = status.as_u16(),
                        "❌ [{}] error {} - {}",
                        device.name,
                        status.as_u16(),
                        body
                    );
                    Outcome::Rejected {
                        status: status.as_u16(),
                        body,
                    }
                }
                Err(e) => {
                    error!(
                        device = %device.name,
                        error = %e,
                        "🚨 connection error: {}",
                        e
                    );
                    Outcome::Failed {
                        error: e.to_string(),
                    }
                }
            };

            self.stats.record(&outcome);
            reports.push(DeviceReport {
                device: device.name.clone(),
                value,
                outcome,
            });
        }

        self.stats.cycles += 1;
        reports
    }

    /// Run cycles until `shutdown` flips to `true` or its sender is dropped.
    ///
    /// Shutdown is honoured mid-cycle as well as during the wait; an
    /// interrupted cycle is not counted. Returns the final counters.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> SimulatorStats {
        info!(
            endpoint = %self.sink.endpoint(),
            devices = self.devices.len(),
            interval_secs = self.interval.as_secs_f64(),
            "Simulator started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let finished = tokio::select! {
                _ = self.run_cycle() => true,
                _ = stop_requested(&mut shutdown) => false,
            };
            if !finished {
                break;
            }

            info!(
                cycle = self.stats.cycles,
                "⏳ waiting {}s...",
                self.interval.as_secs_f64()
            );

            let woke = tokio::select! {
                _ = tokio::time::sleep(self.interval) => true,
                _ = stop_requested(&mut shutdown) => false,
            };
            if !woke {
                break;
            }
        }

        info!(
            cycles = self.stats.cycles,
            delivered = self.stats.delivered,
            rejected = self.stats.rejected,
            failed = self.stats.failed,
            "Simulator stopped"
        );
        self.stats
    }
}

/// Resolves once the flag reads `true` or the sender is gone.
async fn stop_requested(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}

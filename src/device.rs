//! Device descriptors for the simulated meters.
//!
//! The roster is built once at startup and never changes for the lifetime
//! of the process.

use serde::{Deserialize, Serialize};

/// Kind of reading a device reports, encoded as an integer on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u16", into = "u16")]
pub enum MeasureKind {
    /// Water volume in litres (code 1)
    Volume,
    /// Energy in kWh (code 2)
    Energy,
    /// Current in Ampere (code 4)
    Current,
    /// Any code the simulator has no name for
    Other(u16),
}

impl MeasureKind {
    /// Integer code sent in the `type` field.
    pub fn code(&self) -> u16 {
        match self {
            MeasureKind::Volume => 1,
            MeasureKind::Energy => 2,
            MeasureKind::Current => 4,
            MeasureKind::Other(code) => *code,
        }
    }

    /// Human label used in log output.
    pub fn label(&self) -> &'static str {
        match self {
            MeasureKind::Volume => "Volume (L)",
            MeasureKind::Energy => "kWh",
            MeasureKind::Current => "Ampere",
            MeasureKind::Other(_) => "unknown",
        }
    }
}

impl From<u16> for MeasureKind {
    fn from(code: u16) -> Self {
        match code {
            1 => MeasureKind::Volume,
            2 => MeasureKind::Energy,
            4 => MeasureKind::Current,
            other => MeasureKind::Other(other),
        }
    }
}

impl From<MeasureKind> for u16 {
    fn from(kind: MeasureKind) -> Self {
        kind.code()
    }
}

impl std::fmt::Display for MeasureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.label(), self.code())
    }
}

/// Static description of one simulated device.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceDescriptor {
    /// Display name, only used for logging
    pub name: String,

    /// Hardware identifier presented to the endpoint
    pub mac_address: String,

    /// Credential the endpoint uses to look the device up
    pub api_token: String,

    /// Kind of reading this device reports
    pub kind: MeasureKind,

    /// Center of the randomized readings
    pub base_value: f64,
}

impl DeviceDescriptor {
    pub fn new(
        name: impl Into<String>,
        mac_address: impl Into<String>,
        api_token: impl Into<String>,
        kind: MeasureKind,
        base_value: f64,
    ) -> Self {
        Self {
            name: name.into(),
            mac_address: mac_address.into(),
            api_token: api_token.into(),
            kind,
            base_value,
        }
    }
}

/// The devices seeded on the backend, in send order.
pub fn default_roster() -> Vec<DeviceDescriptor> {
    vec![
        DeviceDescriptor::new(
            "Água",
            "AA:BB:CC:DD:EE:FF",
            "TOKEN-AGUA-123",
            MeasureKind::Volume,
            12.0,
        ),
        DeviceDescriptor::new(
            "Energia",
            "11:22:33:44:55:66",
            "TOKEN-ENERGIA-123",
            MeasureKind::Energy,
            3.5,
        ),
    ]
}

//! Measurement generation for the simulated devices.
//!
//! Each reading is a random perturbation around the device's base value,
//! clamped at zero and rounded to two decimals, wrapped in the JSON body
//! the `store-data` endpoint expects.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::device::{DeviceDescriptor, MeasureKind};

/// Lower bound of the perturbation added to the base value (inclusive).
pub const PERTURBATION_MIN: f64 = -1.0;

/// Upper bound of the perturbation added to the base value (exclusive).
pub const PERTURBATION_MAX: f64 = 2.0;

/// One reading inside a payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureRecord {
    #[serde(rename = "type")]
    pub kind: MeasureKind,

    pub value: f64,
}

/// Request body for `POST /api/store-data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementPayload {
    /// Hardware identifier of the sending device
    pub mac_address: String,

    /// Device credential
    pub api_token: String,

    /// Readings, always exactly one per send
    pub measure: Vec<MeasureRecord>,
}

impl MeasurementPayload {
    /// Build the single-reading payload for `device`.
    pub fn for_device(device: &DeviceDescriptor, value: f64) -> Self {
        Self {
            mac_address: device.mac_address.clone(),
            api_token: device.api_token.clone(),
            measure: vec![MeasureRecord {
                kind: device.kind,
                value,
            }],
        }
    }

    /// Value of the first reading, if any.
    pub fn value(&self) -> Option<f64> {
        self.measure.first().map(|record| record.value)
    }
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Draw one reading around `base`: never negative, two decimals.
pub fn sample_value(rng: &mut impl Rng, base: f64) -> f64 {
    let perturbation = rng.gen_range(PERTURBATION_MIN..PERTURBATION_MAX);
    round2((base + perturbation).max(0.0))
}

/// Produces readings from a seedable random source.
pub struct MeasurementGenerator {
    rng: StdRng,
}

impl MeasurementGenerator {
    /// Deterministic generator, the same seed yields the same readings.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generator seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Draw a reading for `device`.
    pub fn next_value(&mut self, device: &DeviceDescriptor) -> f64 {
        sample_value(&mut self.rng, device.base_value)
    }

    /// Draw a reading for `device` and wrap it in a fresh payload.
    pub fn next_payload(&mut self, device: &DeviceDescriptor) -> (MeasurementPayload, f64) {
        let value = self.next_value(device);
        (MeasurementPayload::for_device(device, value), value)
    }
}

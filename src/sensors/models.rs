use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::conditions::{classify, ConditionLabel};

/// A single normalised soil/climate reading.
///
/// All measurements are finite. Fields that were missing or unusable in the
/// upstream payload have already been coerced to `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Raw capacitive soil-moisture value as reported by the probe.
    pub soil_moisture: f64,
    /// Degrees Celsius
    pub temperature: f64,
    /// Relative humidity percentage
    pub humidity: f64,
    pub taken_at: DateTime<Utc>,
}

impl SensorReading {
    pub fn condition(&self) -> ConditionLabel {
        classify(self.temperature, self.soil_moisture)
    }

    /// `true` when every measurement is exactly zero.
    pub(crate) fn is_all_zero(&self) -> bool {
        self.soil_moisture == 0.0 && self.temperature == 0.0 && self.humidity == 0.0
    }
}

/// Where a normalised series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReadingSource {
    /// Derived from the upstream sensor store.
    Live,
    /// Synthetic filler produced because upstream data was missing or degenerate.
    Fallback,
}

/// Readings of one device in chronological order (oldest first).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceTimeSeries {
    pub device_id: String,
    readings: Vec<SensorReading>,
}

impl DeviceTimeSeries {
    /// Build a series from readings already in chronological order.
    pub fn new(device_id: impl Into<String>, readings: Vec<SensorReading>) -> Self {
        Self {
            device_id: device_id.into(),
            readings,
        }
    }

    pub fn latest(&self) -> Option<&SensorReading> {
        self.readings.last()
    }

    /// Empty, or every numeric field of every entry is exactly zero.
    pub fn is_degenerate(&self) -> bool {
        self.readings.iter().all(SensorReading::is_all_zero)
    }

    /// The last `n` readings, oldest first.
    pub fn last_n(&self, n: usize) -> &[SensorReading] {
        let start = self.readings.len().saturating_sub(n);
        &self.readings[start..]
    }
}

/// Output of [`normalize`](super::normalizer::normalize).
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    /// Device the live data came from; `None` for fallback data.
    pub device_id: Option<String>,
    /// The current reading; always the last element of `history`.
    pub reading: SensorReading,
    /// Recent readings, oldest first.
    pub history: Vec<SensorReading>,
    pub source: ReadingSource,
}

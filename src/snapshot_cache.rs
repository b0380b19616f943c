use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::{
    irrigation::{Forecast, ForecastSource, IrrigationAdvisory},
    sensors::models::{Normalized, ReadingSource, SensorReading},
};

/// Result of one sensor poll.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorSnapshot {
    pub device_id: Option<String>,
    pub reading: SensorReading,
    /// Oldest first; the last entry equals `reading`.
    pub history: Vec<SensorReading>,
    pub source: ReadingSource,
    pub updated_at: DateTime<Utc>,
}

impl SensorSnapshot {
    pub fn new(normalized: Normalized, updated_at: DateTime<Utc>) -> Self {
        Self {
            device_id: normalized.device_id,
            reading: normalized.reading,
            history: normalized.history,
            source: normalized.source,
            updated_at,
        }
    }
}

/// Result of one forecast poll.
#[derive(Debug, Clone, PartialEq)]
pub struct AdvisorySnapshot {
    pub forecast: Forecast,
    pub advisory: IrrigationAdvisory,
    pub source: ForecastSource,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Inner {
    sensors: Option<SensorSnapshot>,
    advisory: Option<AdvisorySnapshot>,
}

/// Latest derived state shared between the poll loops and the HTTP handlers.
///
/// Wrapped in `Arc` so it can be cheaply cloned and shared across tasks.
/// Uses `tokio::sync::RwLock` so concurrent readers never block each other.
#[derive(Debug, Clone, Default)]
pub struct SnapshotCache {
    inner: Arc<RwLock<Inner>>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the sensor snapshot.
    pub async fn set_sensors(&self, snapshot: SensorSnapshot) {
        self.inner.write().await.sensors = Some(snapshot);
    }

    pub async fn sensors(&self) -> Option<SensorSnapshot> {
        self.inner.read().await.sensors.clone()
    }

    pub async fn has_sensors(&self) -> bool {
        self.inner.read().await.sensors.is_some()
    }

    /// Replace the advisory snapshot.
    pub async fn set_advisory(&self, snapshot: AdvisorySnapshot) {
        self.inner.write().await.advisory = Some(snapshot);
    }

    pub async fn advisory(&self) -> Option<AdvisorySnapshot> {
        self.inner.read().await.advisory.clone()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{irrigation::evaluate, sensors::normalizer::normalize};

    fn sensor_snapshot(temperature: f64) -> SensorSnapshot {
        let payload = json!({ "dev1": { "2024-05-01T10:00:00Z": { "temperature": temperature } } });
        SensorSnapshot::new(normalize(&payload, Utc::now()), Utc::now())
    }

    #[tokio::test]
    async fn empty_cache_returns_nothing() {
        let cache = SnapshotCache::new();
        assert!(cache.sensors().await.is_none());
        assert!(!cache.has_sensors().await);
        assert!(cache.advisory().await.is_none());
    }

    #[tokio::test]
    async fn set_sensors_overwrites_previous_snapshot() {
        let cache = SnapshotCache::new();
        cache.set_sensors(sensor_snapshot(20.0)).await;
        cache.set_sensors(sensor_snapshot(25.0)).await;

        let got = cache.sensors().await.unwrap();
        assert_eq!(got.reading.temperature, 25.0);
        assert_eq!(got.source, ReadingSource::Live);
        assert!(cache.has_sensors().await);
    }

    #[tokio::test]
    async fn advisory_is_independent_of_sensors() {
        let cache = SnapshotCache::new();
        cache
            .set_advisory(AdvisorySnapshot {
                forecast: Forecast::FALLBACK,
                advisory: evaluate(&Forecast::FALLBACK),
                source: ForecastSource::Fallback,
                updated_at: Utc::now(),
            })
            .await;

        assert!(cache.sensors().await.is_none());
        let got = cache.advisory().await.unwrap();
        assert!(got.advisory.needed);
        assert_eq!(got.source, ForecastSource::Fallback);
    }

    #[tokio::test]
    async fn clone_shares_state() {
        let cache = SnapshotCache::new();
        let clone = cache.clone();

        cache.set_sensors(sensor_snapshot(22.0)).await;

        // Clone sees the same data
        assert_eq!(clone.sensors().await.unwrap().reading.temperature, 22.0);
    }
}

use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use serde_json::Value;
use tokio::time;
use tracing::{error, info, warn};

use crate::{
    firebase::FirebaseClient,
    sensors::{models::ReadingSource, normalizer},
    snapshot_cache::{SensorSnapshot, SnapshotCache},
};

pub struct SensorService {
    firebase: FirebaseClient,
    cache: SnapshotCache,
    interval: Duration,
}

impl SensorService {
    pub fn new(firebase: FirebaseClient, cache: SnapshotCache, interval_secs: u64) -> Self {
        Self {
            firebase,
            cache,
            interval: Duration::from_secs(interval_secs),
        }
    }

    /// Runs the sensor polling loop indefinitely.
    /// Spawn this via `tokio::spawn`.
    pub async fn run(self) {
        info!(interval_secs = self.interval.as_secs(), "Sensor polling loop started");
        let mut ticker = time::interval(self.interval);

        loop {
            ticker.tick().await;
            let fetched = self.firebase.get_sensor_tree().await;
            if let Err(e) = apply(&self.cache, fetched).await {
                error!(error = %e, "Sensor poll iteration failed");
            }
        }
    }
}

/// Normalise a fetched payload and publish it.
///
/// A failed fetch keeps the previous snapshot; if there is none yet a
/// synthetic series is published so the dashboard never starts empty. The
/// fetch error is returned for the caller to log.
pub(crate) async fn apply(cache: &SnapshotCache, fetched: Result<Value>) -> Result<()> {
    let now = Utc::now();

    let payload = match fetched {
        Ok(payload) => payload,
        Err(e) => {
            if !cache.has_sensors().await {
                warn!("No sensor data yet and fetch failed; publishing fallback series");
                let normalized = normalizer::normalize(&Value::Null, now);
                cache.set_sensors(SensorSnapshot::new(normalized, now)).await;
            }
            return Err(e);
        }
    };

    let normalized = normalizer::normalize(&payload, now);

    match normalized.source {
        ReadingSource::Live => info!(
            device_id = ?normalized.device_id,
            soil_moisture = normalized.reading.soil_moisture,
            temperature = normalized.reading.temperature,
            humidity = normalized.reading.humidity,
            condition = ?normalized.reading.condition(),
            points = normalized.history.len(),
            "Sensor snapshot updated"
        ),
        ReadingSource::Fallback => warn!(
            "Sensor store returned no usable data; publishing fallback series"
        ),
    }

    cache.set_sensors(SensorSnapshot::new(normalized, now)).await;
    Ok(())
}

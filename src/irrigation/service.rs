use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use tokio::time;
use tracing::{info, warn};

use crate::{
    irrigation::{evaluate, Forecast, ForecastSource},
    snapshot_cache::{AdvisorySnapshot, SnapshotCache},
    weather::WeatherClient,
};

pub struct AdvisoryService {
    weather: WeatherClient,
    cache: SnapshotCache,
    interval: Duration,
}

impl AdvisoryService {
    pub fn new(weather: WeatherClient, cache: SnapshotCache, interval_secs: u64) -> Self {
        Self {
            weather,
            cache,
            interval: Duration::from_secs(interval_secs),
        }
    }

    /// Runs the forecast polling loop indefinitely.
    /// Spawn this via `tokio::spawn`.
    pub async fn run(self) {
        info!(interval_secs = self.interval.as_secs(), "Forecast polling loop started");
        let mut ticker = time::interval(self.interval);

        loop {
            ticker.tick().await;
            let fetched = self.weather.get_forecast().await;
            apply(&self.cache, fetched).await;
        }
    }
}

/// Evaluate the fetched forecast, or [`Forecast::FALLBACK`] if the fetch
/// failed, and publish the advisory.
pub(crate) async fn apply(cache: &SnapshotCache, fetched: Result<Forecast>) {
    let (forecast, source) = match fetched {
        Ok(forecast) => (forecast, ForecastSource::Live),
        Err(e) => {
            warn!(error = %e, "Forecast fetch failed; using fallback forecast");
            (Forecast::FALLBACK, ForecastSource::Fallback)
        }
    };

    let advisory = evaluate(&forecast);
    info!(
        needed = advisory.needed,
        advice = %advisory.advice,
        source = ?source,
        "Irrigation advisory updated"
    );

    cache
        .set_advisory(AdvisorySnapshot {
            forecast,
            advisory,
            source,
            updated_at: Utc::now(),
        })
        .await;
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;
    use crate::irrigation::{DayForecast, ADVICE_RAIN_TOMORROW};

    #[tokio::test]
    async fn live_forecast_is_evaluated() {
        let cache = SnapshotCache::new();
        let forecast = Forecast {
            today: DayForecast::new(0.0, 0),
            tomorrow: DayForecast::new(8.0, 90),
            day_after: DayForecast::new(0.0, 0),
        };

        apply(&cache, Ok(forecast)).await;

        let snap = cache.advisory().await.unwrap();
        assert_eq!(snap.source, ForecastSource::Live);
        assert_eq!(snap.forecast, forecast);
        assert!(!snap.advisory.needed);
        assert_eq!(snap.advisory.advice, ADVICE_RAIN_TOMORROW);
    }

    #[tokio::test]
    async fn failed_fetch_uses_fallback_forecast() {
        let cache = SnapshotCache::new();
        apply(&cache, Err(anyhow!("503 Service Unavailable"))).await;

        let snap = cache.advisory().await.unwrap();
        assert_eq!(snap.source, ForecastSource::Fallback);
        assert_eq!(snap.forecast, Forecast::FALLBACK);
        assert_eq!(snap.advisory, evaluate(&Forecast::FALLBACK));
    }
}

pub mod models;

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{Client, Url};
use tracing::debug;

use crate::{config::Config, irrigation::Forecast, response_store::ResponseStore};

use self::models::ForecastResponse;

const DAILY_FIELDS: &str = "precipitation_sum,precipitation_probability_max";

/// Client for an Open-Meteo compatible daily forecast endpoint.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    http: Client,
    base_url: String,
    latitude: f64,
    longitude: f64,
    responses: ResponseStore,
}

impl WeatherClient {
    pub fn new(config: &Config, responses: ResponseStore) -> Self {
        Self {
            inner: Arc::new(Inner {
                http: Client::new(),
                base_url: config.weather_base_url.clone(),
                latitude: config.farm_latitude,
                longitude: config.farm_longitude,
                responses,
            }),
        }
    }

    /// Fetch today, tomorrow and the day after for the farm location.
    pub async fn get_forecast(&self) -> Result<Forecast> {
        let url = forecast_url(&self.inner.base_url, self.inner.latitude, self.inner.longitude)?;
        debug!(url = %url, "Fetching precipitation forecast");

        let bytes = self
            .inner
            .http
            .get(url)
            .send()
            .await
            .context("Forecast request failed")?
            .error_for_status()
            .context("Forecast endpoint returned error status")?
            .bytes()
            .await
            .context("Failed to read forecast response body")?;

        self.inner.responses.save("forecast", "", &bytes).await;

        let resp = serde_json::from_slice::<ForecastResponse>(&bytes)
            .context("Failed to deserialize forecast response")?;

        Forecast::try_from(&resp.daily).context("Forecast response is incomplete")
    }
}

pub(crate) fn forecast_url(base_url: &str, latitude: f64, longitude: f64) -> Result<Url> {
    let mut url = Url::parse(&format!("{base_url}/v1/forecast"))
        .with_context(|| format!("invalid weather base URL: {base_url}"))?;
    url.query_pairs_mut()
        .append_pair("latitude", &latitude.to_string())
        .append_pair("longitude", &longitude.to_string())
        .append_pair("daily", DAILY_FIELDS)
        .append_pair("forecast_days", "3")
        .append_pair("timezone", "auto");
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forecast_url_carries_location_and_fields() {
        let url = forecast_url("https://api.open-meteo.com", 52.52, -13.41).unwrap();
        assert_eq!(url.path(), "/v1/forecast");

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("latitude".into(), "52.52".into())));
        assert!(pairs.contains(&("longitude".into(), "-13.41".into())));
        assert!(pairs.contains(&("daily".into(), DAILY_FIELDS.into())));
        assert!(pairs.contains(&("forecast_days".into(), "3".into())));
    }

    #[test]
    fn forecast_url_rejects_garbage_base() {
        let err = forecast_url("not a url", 0.0, 0.0).unwrap_err();
        assert!(err.to_string().contains("invalid weather base URL"));
    }
}

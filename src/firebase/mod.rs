use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::debug;

use crate::{config::Config, response_store::ResponseStore};

/// Read-only client for the Firebase Realtime Database REST API holding the
/// raw `device → timestamp → reading` tree.
#[derive(Debug, Clone)]
pub struct FirebaseClient {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    http: Client,
    base_url: String,
    path: String,
    auth: Option<String>,
    responses: ResponseStore,
}

impl FirebaseClient {
    pub fn new(config: &Config, responses: ResponseStore) -> Self {
        Self {
            inner: Arc::new(Inner {
                http: Client::new(),
                base_url: config.sensor_db_url.clone(),
                path: config.sensor_db_path.clone(),
                auth: config.sensor_db_auth.clone(),
                responses,
            }),
        }
    }

    /// Fetch the whole sensor tree. A path with no data yields `Value::Null`.
    pub async fn get_sensor_tree(&self) -> Result<Value> {
        let url = node_url(&self.inner.base_url, &self.inner.path, self.inner.auth.as_deref())?;
        // The URL may carry a secret; log the node path only.
        debug!(path = %self.inner.path, "Fetching sensor tree");

        let bytes = self
            .inner
            .http
            .get(url)
            .send()
            .await
            .context("Sensor store request failed")?
            .error_for_status()
            .context("Sensor store returned error status")?
            .bytes()
            .await
            .context("Failed to read sensor store response body")?;

        self.inner.responses.save("sensors", "", &bytes).await;

        serde_json::from_slice::<Value>(&bytes)
            .context("Failed to deserialize sensor store response")
    }
}

/// `{base}/{path}.json`, with `?auth=` appended when a credential is set.
pub(crate) fn node_url(base_url: &str, path: &str, auth: Option<&str>) -> Result<Url> {
    let mut url = Url::parse(&format!("{base_url}/{path}.json"))
        .with_context(|| format!("invalid sensor store URL: {base_url}"))?;
    if let Some(token) = auth {
        url.query_pairs_mut().append_pair("auth", token);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_url_without_auth() {
        let url = node_url("https://farm-default-rtdb.firebaseio.com", "sensors", None).unwrap();
        assert_eq!(
            url.as_str(),
            "https://farm-default-rtdb.firebaseio.com/sensors.json"
        );
    }

    #[test]
    fn node_url_with_nested_path_and_auth() {
        let url = node_url(
            "https://farm.firebaseio.com",
            "farms/north/sensors",
            Some("s3cr&t"),
        )
        .unwrap();
        assert_eq!(url.path(), "/farms/north/sensors.json");
        assert_eq!(url.query(), Some("auth=s3cr%26t"));
    }

    #[test]
    fn node_url_rejects_relative_base() {
        assert!(node_url("farm.firebaseio.com", "sensors", None).is_err());
    }
}

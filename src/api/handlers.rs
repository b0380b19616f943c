use axum::{extract::State, Json};
use utoipa::OpenApi;

use super::{
    dto::{
        AdvisoryDto, ClassifyRequest, ConditionDto, HistoryDto, LatestReadingDto,
        SensorReadingDto,
    },
    errors::AppError,
};
use crate::{
    conditions::{classify, ConditionLabel},
    irrigation::{evaluate, DayForecast, Forecast, ForecastSource, IrrigationAdvisory},
    sensors::models::ReadingSource,
    snapshot_cache::SnapshotCache,
};

const SENSOR_DATA: &str = "sensor data";
const IRRIGATION_ADVISORY: &str = "irrigation advisory";

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// Latest normalised reading together with its field condition.
#[utoipa::path(
    get,
    path = "/sensors/latest",
    responses(
        (status = 200, description = "Latest sensor reading", body = LatestReadingDto),
        (status = 503, description = "No sensor poll has completed yet"),
    ),
    tag = "sensors"
)]
pub async fn get_latest_reading(
    State(cache): State<SnapshotCache>,
) -> Result<Json<LatestReadingDto>, AppError> {
    let snapshot = cache.sensors().await.ok_or(AppError::NotReady(SENSOR_DATA))?;
    Ok(Json(snapshot.into()))
}

/// Recent readings for charts, ordered oldest first.
#[utoipa::path(
    get,
    path = "/sensors/history",
    responses(
        (status = 200, description = "Recent sensor readings", body = HistoryDto),
        (status = 503, description = "No sensor poll has completed yet"),
    ),
    tag = "sensors"
)]
pub async fn get_history(
    State(cache): State<SnapshotCache>,
) -> Result<Json<HistoryDto>, AppError> {
    let snapshot = cache.sensors().await.ok_or(AppError::NotReady(SENSOR_DATA))?;
    Ok(Json(snapshot.into()))
}

// ---------------------------------------------------------------------------
// Conditions
// ---------------------------------------------------------------------------

/// Field condition of the latest reading.
#[utoipa::path(
    get,
    path = "/conditions/current",
    responses(
        (status = 200, description = "Current field condition", body = ConditionDto),
        (status = 503, description = "No sensor poll has completed yet"),
    ),
    tag = "conditions"
)]
pub async fn get_current_condition(
    State(cache): State<SnapshotCache>,
) -> Result<Json<ConditionDto>, AppError> {
    let snapshot = cache.sensors().await.ok_or(AppError::NotReady(SENSOR_DATA))?;
    Ok(Json(snapshot.reading.condition().into()))
}

/// Classify an arbitrary temperature / soil-moisture pair.
#[utoipa::path(
    post,
    path = "/conditions/classify",
    request_body = ClassifyRequest,
    responses(
        (status = 200, description = "Field condition", body = ConditionDto),
    ),
    tag = "conditions"
)]
pub async fn classify_condition(Json(req): Json<ClassifyRequest>) -> Json<ConditionDto> {
    Json(classify(req.temperature, req.soil_moisture).into())
}

// ---------------------------------------------------------------------------
// Irrigation
// ---------------------------------------------------------------------------

/// Irrigation advisory from the latest precipitation forecast.
#[utoipa::path(
    get,
    path = "/irrigation/advisory",
    responses(
        (status = 200, description = "Current irrigation advisory", body = AdvisoryDto),
        (status = 503, description = "No forecast poll has completed yet"),
    ),
    tag = "irrigation"
)]
pub async fn get_advisory(
    State(cache): State<SnapshotCache>,
) -> Result<Json<AdvisoryDto>, AppError> {
    let snapshot = cache
        .advisory()
        .await
        .ok_or(AppError::NotReady(IRRIGATION_ADVISORY))?;
    Ok(Json(snapshot.into()))
}

/// Evaluate the irrigation rules against a caller-supplied forecast.
#[utoipa::path(
    post,
    path = "/irrigation/evaluate",
    request_body = Forecast,
    responses(
        (status = 200, description = "Irrigation advisory", body = IrrigationAdvisory),
    ),
    tag = "irrigation"
)]
pub async fn evaluate_forecast(Json(forecast): Json<Forecast>) -> Json<IrrigationAdvisory> {
    Json(evaluate(&forecast))
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Returns `200 OK` with `{"status":"ok"}` when the server is running.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
    ),
    tag = "system"
)]
pub async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// OpenAPI spec
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    paths(
        get_latest_reading,
        get_history,
        get_current_condition,
        classify_condition,
        get_advisory,
        evaluate_forecast,
        health,
    ),
    components(schemas(
        SensorReadingDto,
        LatestReadingDto,
        HistoryDto,
        ConditionDto,
        ConditionLabel,
        ClassifyRequest,
        ReadingSource,
        AdvisoryDto,
        Forecast,
        DayForecast,
        ForecastSource,
        IrrigationAdvisory,
    )),
    tags(
        (name = "sensors",    description = "Normalised sensor readings"),
        (name = "conditions", description = "Field condition classification"),
        (name = "irrigation", description = "Irrigation advisory"),
        (name = "system",     description = "System endpoints"),
    ),
    info(
        title = "Farm Monitor API",
        version = "0.1.0",
        description = "Sensor-derived field conditions and irrigation advice"
    )
)]
pub struct ApiDoc;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use axum_test::TestServer;
    use chrono::Utc;
    use serde_json::{json, Value};

    use crate::{
        api::router,
        irrigation::{evaluate, Forecast, ForecastSource},
        sensors::normalizer::normalize,
        snapshot_cache::{AdvisorySnapshot, SensorSnapshot, SnapshotCache},
    };

    fn test_server(cache: SnapshotCache) -> TestServer {
        TestServer::new(router(cache)).unwrap()
    }

    async fn seed_sensors(cache: &SnapshotCache, payload: Value) {
        let now = Utc::now();
        cache
            .set_sensors(SensorSnapshot::new(normalize(&payload, now), now))
            .await;
    }

    fn hot_field() -> Value {
        json!({ "dev1": {
            "2024-05-01T10:00:00Z": { "soil_moisture": 300, "temperature": 29, "humidity": 50 },
            "2024-05-01T10:05:00Z": { "soilMoisture": 310, "temp": 31.5, "humid": 48 }
        }})
    }

    // -----------------------------------------------------------------------
    // GET /sensors/latest
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn latest_before_first_poll_is_503() {
        let server = test_server(SnapshotCache::new());
        let resp = server.get("/sensors/latest").await;
        resp.assert_status(axum::http::StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = resp.json();
        assert_eq!(body["error"], "sensor data not available yet");
    }

    #[tokio::test]
    async fn latest_returns_reading_and_condition() {
        let cache = SnapshotCache::new();
        seed_sensors(&cache, hot_field()).await;

        let server = test_server(cache);
        let resp = server.get("/sensors/latest").await;
        resp.assert_status_ok();

        let body: Value = resp.json();
        assert_eq!(body["device_id"], "dev1");
        assert_eq!(body["source"], "LIVE");
        assert_eq!(body["reading"]["soil_moisture"], 310.0);
        assert_eq!(body["reading"]["temperature"], 31.5);
        assert_eq!(body["reading"]["humidity"], 48.0);
        assert_eq!(body["condition"]["label"], "HOT");
        assert_eq!(body["condition"]["color"], "red");
    }

    #[tokio::test]
    async fn latest_reports_fallback_source() {
        let cache = SnapshotCache::new();
        seed_sensors(&cache, json!({})).await;

        let server = test_server(cache);
        let body: Value = server.get("/sensors/latest").await.json();
        assert_eq!(body["source"], "FALLBACK");
        assert!(body["device_id"].is_null());
    }

    // -----------------------------------------------------------------------
    // GET /sensors/history
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn history_is_ordered_oldest_first() {
        let cache = SnapshotCache::new();
        seed_sensors(&cache, hot_field()).await;

        let server = test_server(cache);
        let resp = server.get("/sensors/history").await;
        resp.assert_status_ok();

        let body: Value = resp.json();
        let readings = body["readings"].as_array().unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0]["temperature"], 29.0);
        assert_eq!(readings[1]["temperature"], 31.5);
    }

    #[tokio::test]
    async fn history_before_first_poll_is_503() {
        let server = test_server(SnapshotCache::new());
        server
            .get("/sensors/history")
            .await
            .assert_status(axum::http::StatusCode::SERVICE_UNAVAILABLE);
    }

    // -----------------------------------------------------------------------
    // Conditions
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn current_condition_follows_latest_reading() {
        let cache = SnapshotCache::new();
        seed_sensors(
            &cache,
            json!({ "dev1": { "2024-05-01T10:00:00Z": { "moisture": 600, "temperature": 35 } } }),
        )
        .await;

        let server = test_server(cache);
        let body: Value = server.get("/conditions/current").await.json();
        assert_eq!(body["label"], "HIGH_MOISTURE");
        assert_eq!(body["color"], "blue");
        assert_eq!(body["title"], "High Moisture");
    }

    #[tokio::test]
    async fn classify_endpoint_applies_rules() {
        let server = test_server(SnapshotCache::new());

        let resp = server
            .post("/conditions/classify")
            .json(&json!({ "temperature": 26.1, "soil_moisture": 100 }))
            .await;
        resp.assert_status_ok();
        let body: Value = resp.json();
        assert_eq!(body["label"], "WARM");
        assert_eq!(body["color"], "orange");

        let body: Value = server
            .post("/conditions/classify")
            .json(&json!({ "temperature": 26.0, "soil_moisture": 100 }))
            .await
            .json();
        assert_eq!(body["label"], "OPTIMAL");
    }

    // -----------------------------------------------------------------------
    // Irrigation
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn advisory_before_first_poll_is_503() {
        let server = test_server(SnapshotCache::new());
        let resp = server.get("/irrigation/advisory").await;
        resp.assert_status(axum::http::StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = resp.json();
        assert_eq!(body["error"], "irrigation advisory not available yet");
    }

    #[tokio::test]
    async fn advisory_returns_latest_snapshot() {
        let cache = SnapshotCache::new();
        cache
            .set_advisory(AdvisorySnapshot {
                forecast: Forecast::FALLBACK,
                advisory: evaluate(&Forecast::FALLBACK),
                source: ForecastSource::Fallback,
                updated_at: Utc::now(),
            })
            .await;

        let server = test_server(cache);
        let resp = server.get("/irrigation/advisory").await;
        resp.assert_status_ok();

        let body: Value = resp.json();
        assert_eq!(body["needed"], true);
        assert_eq!(body["source"], "FALLBACK");
        assert_eq!(body["forecast"]["tomorrow"]["probability"], 25);
    }

    #[tokio::test]
    async fn evaluate_endpoint_applies_rules() {
        let server = test_server(SnapshotCache::new());
        let resp = server
            .post("/irrigation/evaluate")
            .json(&json!({
                "today":     { "precipitation": 0.0, "probability": 0 },
                "tomorrow":  { "precipitation": 1.0, "probability": 20 },
                "day_after": { "precipitation": 6.0, "probability": 10 }
            }))
            .await;
        resp.assert_status_ok();

        let body: Value = resp.json();
        assert_eq!(body["needed"], true);
        assert_eq!(
            body["advice"],
            "rain expected in 2 days, light irrigation recommended today."
        );
    }

    #[tokio::test]
    async fn evaluate_rejects_out_of_range_probability() {
        let server = test_server(SnapshotCache::new());
        let resp = server
            .post("/irrigation/evaluate")
            .json(&json!({
                "today":     { "precipitation": 0.0, "probability": 0 },
                "tomorrow":  { "precipitation": 0.0, "probability": 400 },
                "day_after": { "precipitation": 0.0, "probability": 0 }
            }))
            .expect_failure()
            .await;
        assert!(resp.status_code().is_client_error());
    }

    // -----------------------------------------------------------------------
    // GET /health
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn health_returns_ok() {
        let server = test_server(SnapshotCache::new());
        let resp = server.get("/health").await;
        resp.assert_status_ok();
        let body: Value = resp.json();
        assert_eq!(body["status"], "ok");
    }

    // -----------------------------------------------------------------------
    // GET /api-docs/openapi.json
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn openapi_spec_is_served() {
        let server = test_server(SnapshotCache::new());
        let resp = server.get("/api-docs/openapi.json").await;
        resp.assert_status_ok();
        let body: Value = resp.json();
        assert_eq!(body["info"]["title"], "Farm Monitor API");
        assert!(body["paths"]["/irrigation/advisory"].is_object());
    }
}

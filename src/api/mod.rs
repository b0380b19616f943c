pub mod dto;
pub mod errors;
pub mod handlers;

use axum::{routing::{get, post}, Router};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use crate::snapshot_cache::SnapshotCache;
use handlers::ApiDoc;

pub fn router(cache: SnapshotCache) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .route("/sensors/latest", get(handlers::get_latest_reading))
        .route("/sensors/history", get(handlers::get_history))
        .route("/conditions/current", get(handlers::get_current_condition))
        .route("/conditions/classify", post(handlers::classify_condition))
        .route("/irrigation/advisory", get(handlers::get_advisory))
        .route("/irrigation/evaluate", post(handlers::evaluate_forecast))
        .with_state(cache)
        .split_for_parts();

    router
        .route("/health", get(handlers::health))
        .route(
            "/api-docs/openapi.json",
            get(move || async move { axum::Json(api) }),
        )
}

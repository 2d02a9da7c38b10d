pub mod dto;
pub mod errors;
pub mod handlers;

use axum::{routing::get, Router};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use crate::status::StatusService;
use handlers::ApiDoc;

/// Request-scoped dependencies handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub status: StatusService,
}

pub fn router(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .route(
            "/users/{user_id}/monitoring-status",
            get(handlers::get_monitoring_status),
        )
        .route(
            "/users/{user_id}/sensor-status",
            get(handlers::get_sensor_status),
        )
        .route("/users/{user_id}/devices", get(handlers::get_devices))
        .route(
            "/users/{user_id}/alarms/latest",
            get(handlers::get_latest_alarm),
        )
        .with_state(state)
        .split_for_parts();

    router
        .route("/health", get(handlers::health))
        .route(
            "/api-docs/openapi.json",
            get(move || async move { axum::Json(api) }),
        )
}

use axum::{
    extract::{Path, State},
    Json,
};
use utoipa::OpenApi;

use super::{dto::ApiResponse, errors::AppError, AppState};
use crate::status::{
    alarm::AlarmLevel,
    policy::OverallStatus,
    summary::{
        AlarmDto, DeviceList, DeviceStatusDto, LatestAlarm, MonitoringStatus, SensorReadingDto,
        SensorStatus,
    },
};

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Alarm-driven status of a monitored user. Abnormal iff an alarm was
/// raised within the last hour; device liveness is informational.
#[utoipa::path(
    get,
    path = "/users/{user_id}/monitoring-status",
    params(
        ("user_id" = String, Path, description = "Monitored user ID"),
    ),
    responses(
        (status = 200, description = "Monitoring status", body = ApiResponse<MonitoringStatus>),
        (status = 500, description = "Status could not be computed"),
    ),
    tag = "status"
)]
pub async fn get_monitoring_status(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<MonitoringStatus>>, AppError> {
    let summary = state.status.monitoring_status(&user_id).await?;
    Ok(Json(ApiResponse::ok(summary)))
}

/// Device-interval-driven status of a monitored user. Abnormal iff any
/// device's newest three readings are missing or more than 30 s apart.
#[utoipa::path(
    get,
    path = "/users/{user_id}/sensor-status",
    params(
        ("user_id" = String, Path, description = "Monitored user ID"),
    ),
    responses(
        (status = 200, description = "Sensor status", body = ApiResponse<SensorStatus>),
        (status = 500, description = "Status could not be computed"),
    ),
    tag = "status"
)]
pub async fn get_sensor_status(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<SensorStatus>>, AppError> {
    let summary = state.status.sensor_status(&user_id).await?;
    Ok(Json(ApiResponse::ok(summary)))
}

/// Online / recent-data flags for every device of a user.
#[utoipa::path(
    get,
    path = "/users/{user_id}/devices",
    params(
        ("user_id" = String, Path, description = "Monitored user ID"),
    ),
    responses(
        (status = 200, description = "Device liveness", body = ApiResponse<DeviceList>),
        (status = 500, description = "Devices could not be loaded"),
    ),
    tag = "devices"
)]
pub async fn get_devices(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<DeviceList>>, AppError> {
    let devices = state.status.device_statuses(&user_id).await?;
    Ok(Json(ApiResponse::ok(devices)))
}

/// Newest alarm of a user regardless of age, flagged relevant when it was
/// raised within the last 24 hours.
#[utoipa::path(
    get,
    path = "/users/{user_id}/alarms/latest",
    params(
        ("user_id" = String, Path, description = "Monitored user ID"),
    ),
    responses(
        (status = 200, description = "Latest alarm", body = ApiResponse<LatestAlarm>),
        (status = 500, description = "Alarm could not be loaded"),
    ),
    tag = "alarms"
)]
pub async fn get_latest_alarm(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<LatestAlarm>>, AppError> {
    let latest = state.status.latest_alarm(&user_id).await?;
    Ok(Json(ApiResponse::ok(latest)))
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
        get_monitoring_status,
        get_sensor_status,
        get_devices,
        get_latest_alarm,
        health
    ),
    components(schemas(
        MonitoringStatus,
        SensorStatus,
        LatestAlarm,
        DeviceList,
        DeviceStatusDto,
        SensorReadingDto,
        AlarmDto,
        AlarmLevel,
        OverallStatus
    )),
    tags(
        (name = "status",  description = "Caregiver status summaries"),
        (name = "devices", description = "Device liveness"),
        (name = "alarms",  description = "Alarm lookups"),
        (name = "system",  description = "System endpoints"),
    ),
    info(
        title = "Angle Caring Status API",
        version = "0.1.0",
        description = "Status summaries for monitored users"
    )
)]
pub struct ApiDoc;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

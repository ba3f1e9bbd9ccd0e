// HTTP request handlers
use crate::application::telemetry_repository::TelemetryError;
use crate::domain::compliance::Standard;
use crate::domain::dashboard::{DashboardSnapshot, GoalReport, TrendView};
use crate::domain::district::{District, DistrictSnapshot, Metric, SensorMetric};
use crate::infrastructure::sse::event_stream;
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use std::sync::Arc;

pub enum ApiError {
    BadRequest(String),
    NotFound(&'static str),
    Upstream(TelemetryError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound(what) => (StatusCode::NOT_FOUND, format!("no {} yet", what)),
            ApiError::Upstream(e) => {
                tracing::warn!("Upstream request failed: {}", e);
                (StatusCode::BAD_GATEWAY, e.to_string())
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<TelemetryError> for ApiError {
    fn from(e: TelemetryError) -> Self {
        match e {
            TelemetryError::Unconfigured { .. } => ApiError::BadRequest(e.to_string()),
            e => ApiError::Upstream(e),
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Current readings, derived AQI and insights for every district
pub async fn list_districts(State(state): State<Arc<AppState>>) -> Json<DashboardSnapshot> {
    Json(state.district_service.snapshot().await)
}

#[derive(Debug, Deserialize)]
pub struct ReadingOverride {
    pub pm25: Option<f64>,
    pub temp: Option<f64>,
}

/// Debug hook: force raw readings for one district
pub async fn override_district(
    Path(district): Path<District>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<ReadingOverride>,
) -> Result<Json<DistrictSnapshot>, ApiError> {
    let finite = |v: Option<f64>| v.is_none_or(f64::is_finite);
    if !finite(body.pm25) || !finite(body.temp) {
        return Err(ApiError::BadRequest("readings must be finite numbers".to_string()));
    }

    let snapshot = state
        .district_service
        .override_reading(district, body.pm25, body.temp)
        .await;
    Ok(Json(snapshot))
}

pub async fn get_trend(
    Path(metric): Path<SensorMetric>,
    State(state): State<Arc<AppState>>,
) -> Json<TrendView> {
    Json(state.trend_service.trend(metric).await)
}

#[derive(Debug, Deserialize)]
pub struct GoalQuery {
    pub date: Option<NaiveDate>,
    #[serde(default = "default_goal_metric")]
    pub metric: Metric,
    #[serde(default = "default_goal_standard")]
    pub standard: Standard,
    pub value: Option<f64>,
}

fn default_goal_metric() -> Metric {
    Metric::Pm25
}

fn default_goal_standard() -> Standard {
    Standard::Who
}

/// Score one district's day against a goal threshold
pub async fn evaluate_goal(
    Path(district): Path<District>,
    Query(query): Query<GoalQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<GoalReport>, ApiError> {
    let threshold = state
        .goal_service
        .presets()
        .threshold(query.metric, query.standard, query.value)
        .ok_or_else(|| {
            ApiError::BadRequest("a custom standard needs a numeric value".to_string())
        })?;
    let date = query
        .date
        .unwrap_or_else(|| Utc::now().with_timezone(&state.timezone).date_naive());

    let report = state.goal_service.evaluate(district, date, threshold).await?;
    Ok(Json(report))
}

pub async fn latest_goal(
    State(state): State<Arc<AppState>>,
) -> Result<Json<GoalReport>, ApiError> {
    state
        .goal_service
        .latest()
        .await
        .map(Json)
        .ok_or(ApiError::NotFound("goal report"))
}

pub async fn go_live(
    Path(metric): Path<SensorMetric>,
    State(state): State<Arc<AppState>>,
) -> Json<DashboardSnapshot> {
    state.scheduler.set_live(metric).await;
    Json(state.district_service.snapshot().await)
}

#[derive(Debug, Deserialize)]
pub struct HistoryRequest {
    pub date: NaiveDate,
}

pub async fn go_historical(
    Path(metric): Path<SensorMetric>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<HistoryRequest>,
) -> Result<Json<DashboardSnapshot>, ApiError> {
    let today = Utc::now().with_timezone(&state.timezone).date_naive();
    if body.date > today {
        return Err(ApiError::BadRequest(format!("{} is in the future", body.date)));
    }

    state.scheduler.set_historical(metric, body.date).await;
    Ok(Json(state.district_service.snapshot().await))
}

/// Change notifications for the render layer
pub async fn stream_events(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    event_stream(state.events.subscribe())
}

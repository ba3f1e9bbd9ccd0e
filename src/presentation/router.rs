// Route table for the dashboard API
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    evaluate_goal, get_trend, go_historical, go_live, health_check, latest_goal, list_districts,
    override_district, stream_events,
};
use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/districts", get(list_districts))
        .route("/districts/:district", put(override_district))
        .route("/trends/:metric", get(get_trend))
        .route("/goals/latest", get(latest_goal))
        .route("/goals/:district", get(evaluate_goal))
        .route("/sections/:metric/live", post(go_live))
        .route("/sections/:metric/history", post(go_historical))
        .route("/events", get(stream_events))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

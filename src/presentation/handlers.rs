// HTTP request handlers
use crate::application::stream_controller::{ControllerError, StreamSettings};
use crate::domain::aggregate::{AggregatedView, Period, aggregate};
use crate::domain::stats::BufferStats;
use crate::infrastructure::csv_export::to_csv;
use crate::infrastructure::event_stream::sse_from_receiver;
use crate::infrastructure::http_response::{
    bare_status, csv_response, failure_response, json_response,
};
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

#[derive(Deserialize)]
pub struct CountQuery {
    pub count: Option<String>,
}

#[derive(Deserialize)]
pub struct BufferQuery {
    pub last: Option<usize>,
}

#[derive(Deserialize)]
pub struct AggregateQuery {
    pub period: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConfigUpdate {
    pub update_interval_ms: Option<u64>,
    pub points_per_update: Option<usize>,
}

#[derive(Serialize)]
pub struct AggregateResponse {
    pub period: Period,
    pub total: usize,
    pub data: AggregatedView,
}

fn respond<T: Serialize>(data: &T) -> Response {
    match json_response(StatusCode::OK, data) {
        Ok(response) => response,
        Err(status) => bare_status(status),
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Bulk fetch of freshly generated points
pub async fn fetch_data(
    Query(query): Query<CountQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    match state.bulk_service.fetch(query.count.as_deref()) {
        Ok(payload) => respond(&payload),
        Err(e) => {
            tracing::error!("Bulk generation failed: {}", e);
            failure_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// Live event stream, one batch per feed interval
pub async fn stream_data(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    sse_from_receiver(state.live_feed.subscribe())
}

pub async fn stream_status(State(state): State<Arc<AppState>>) -> Response {
    respond(&state.controller.lock().await.status())
}

pub async fn start_stream(State(state): State<Arc<AppState>>) -> Response {
    let mut controller = state.controller.lock().await;
    controller.start();
    respond(&controller.status())
}

pub async fn pause_stream(State(state): State<Arc<AppState>>) -> Response {
    let mut controller = state.controller.lock().await;
    controller.pause().await;
    respond(&controller.status())
}

pub async fn clear_stream(State(state): State<Arc<AppState>>) -> Response {
    let controller = state.controller.lock().await;
    controller.clear();
    respond(&controller.status())
}

pub async fn burst_stream(
    Query(query): Query<CountQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let count = state.burst_limits.normalize(query.count.as_deref());
    let controller = state.controller.lock().await;

    match controller.burst(count) {
        Ok(_) => respond(&controller.status()),
        Err(e) => {
            tracing::error!("Burst failed: {}", e);
            failure_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// Change cadence and/or batch size; a running stream restarts at the new cadence
pub async fn update_stream_config(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ConfigUpdate>, JsonRejection>,
) -> Response {
    let Json(update) = match payload {
        Ok(update) => update,
        Err(rejection) => {
            return failure_response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    let max_points = state.burst_limits.max_count;
    let mut controller = state.controller.lock().await;

    let result = match (update.update_interval_ms, update.points_per_update) {
        (Some(ms), None) => {
            controller
                .set_update_interval(Duration::from_millis(ms))
                .await
        }
        (None, Some(n)) => controller.set_points_per_update(n.min(max_points)).await,
        (interval_ms, points) => {
            let current = controller.settings();
            let settings = StreamSettings {
                update_interval: interval_ms
                    .map(Duration::from_millis)
                    .unwrap_or(current.update_interval),
                points_per_update: points
                    .map(|n| n.min(max_points))
                    .unwrap_or(current.points_per_update),
            };
            controller.reconfigure(settings).await
        }
    };

    match result {
        Ok(()) => respond(&controller.status()),
        Err(e @ ControllerError::InvalidInterval) => {
            failure_response(StatusCode::BAD_REQUEST, e.to_string())
        }
        Err(e) => failure_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

pub async fn get_buffer(
    Query(query): Query<BufferQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let controller = state.controller.lock().await;
    let points = match query.last {
        Some(n) => controller.latest(n),
        None => controller.snapshot(),
    };
    respond(&points)
}

/// Aggregated view of the buffer, trimmed to the display window
pub async fn aggregate_buffer(
    Query(query): Query<AggregateQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let period = query
        .period
        .as_deref()
        .map(Period::parse_lenient)
        .unwrap_or_default();
    let snapshot = state.controller.lock().await.snapshot();

    let view = aggregate(snapshot, period);
    let total = view.len();
    respond(&AggregateResponse {
        period,
        total,
        data: view.tail(state.display_window),
    })
}

pub async fn buffer_stats(State(state): State<Arc<AppState>>) -> Response {
    let snapshot = state.controller.lock().await.snapshot();
    respond(&BufferStats::from_points(&snapshot))
}

pub async fn export_csv(State(state): State<Arc<AppState>>) -> Response {
    let snapshot = state.controller.lock().await.snapshot();
    match csv_response(to_csv(&snapshot), state.clock.now_ms()) {
        Ok(response) => response,
        Err(status) => bare_status(status),
    }
}

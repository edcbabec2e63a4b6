// Router construction
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    aggregate_buffer, buffer_stats, burst_stream, clear_stream, export_csv, fetch_data,
    get_buffer, health_check, pause_stream, start_stream, stream_data, stream_status,
    update_stream_config,
};
use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    // The default compression predicate skips text/event-stream
    Router::new()
        .route("/healthz", get(health_check))
        .route("/api/data", get(fetch_data))
        .route("/api/data/stream", get(stream_data))
        .route("/api/stream", get(stream_status))
        .route("/api/stream/start", post(start_stream))
        .route("/api/stream/pause", post(pause_stream))
        .route("/api/stream/clear", post(clear_stream))
        .route("/api/stream/burst", post(burst_stream))
        .route("/api/stream/config", put(update_stream_config))
        .route("/api/buffer", get(get_buffer))
        .route("/api/buffer/aggregate", get(aggregate_buffer))
        .route("/api/buffer/stats", get(buffer_stats))
        .route("/api/buffer/export.csv", get(export_csv))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

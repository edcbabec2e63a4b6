// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::EnvFilter;

use crate::application::generator::Clock;
use crate::application::point_source::{PointSource, SharedGenerator};
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::config::load_dashboard_config;
use crate::presentation::app_state::AppState;
use crate::presentation::routes::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_dashboard_config()?;

    // One generator context for the whole process
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let source: Arc<dyn PointSource> = Arc::new(SharedGenerator::from_os_rng(clock.clone()));

    // Create application state
    let state = Arc::new(AppState::new(&config, source, clock)?);

    let router = build_router(state);

    // Start server
    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!("Starting metrics dashboard on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}

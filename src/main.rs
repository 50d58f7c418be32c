// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};
use anyhow::Context;
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::chart_catalog::ChartCatalog;
use crate::application::dashboard_service::DashboardService;
use crate::application::measurement_repository::MeasurementRepository;
use crate::application::session_service::{SessionLimits, SessionService};
use crate::application::streaming_service::StreamingDashboardService;
use crate::infrastructure::config::{load_charts_config, load_dashboard_config};
use crate::infrastructure::csv_repository::{CsvRepository, LoadOptions};
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    get_chart, get_session_view, health_check, list_views, select_view, set_filters, stream_view,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let dashboard_config = load_dashboard_config().context("failed to load config/dashboard")?;
    let charts_config = load_charts_config().context("failed to load config/charts")?;
    let catalog = Arc::new(ChartCatalog::from_config(&charts_config).context("invalid chart catalog")?);

    // Load the measurement table once (infrastructure layer)
    let repository = CsvRepository::new(
        &dashboard_config.data.path,
        LoadOptions {
            region_column: dashboard_config.data.region_column.clone(),
        },
    );
    let table = Arc::new(repository.load_table().await);
    if table.is_empty() {
        tracing::warn!("No measurements loaded from {}; charts will show placeholders", dashboard_config.data.path);
    }

    // Create services (application layer)
    let state = Arc::new(AppState {
        dashboard_service: DashboardService::new(table.clone(), catalog.clone()),
        streaming_service: StreamingDashboardService::new(table, catalog.clone()),
        session_service: SessionService::new(
            catalog,
            SessionLimits {
                idle_timeout: Duration::from_secs(dashboard_config.sessions.idle_timeout_secs),
                max_sessions: dashboard_config.sessions.max_sessions,
            },
        ),
    });

    // Build router (presentation layer)
    // Compression is handled in the response builders, not by a tower layer
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/views", get(list_views))
        .route("/sessions/:id/view", get(get_session_view).put(select_view))
        .route("/sessions/:id/filters", axum::routing::put(set_filters))
        .route("/sessions/:id/view/stream", get(stream_view))
        .route("/charts/:id", get(get_chart))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = format!(
        "{}:{}",
        dashboard_config.server.bind_address, dashboard_config.server.port
    )
    .parse()
    .context("invalid server bind address")?;
    tracing::info!("Starting agrivoltaic-dashboard service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}

//! beacon-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints, the
//! metrics aggregator, and the scheduled background jobs.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use chrono::Duration;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use beacon_gateway::api;
use beacon_gateway::app_state::AppState;
use beacon_gateway::config::GatewayConfig;
use beacon_gateway::domain::{EventBus, NotificationCatalog};
use beacon_gateway::jobs;
use beacon_gateway::persistence::Store;
use beacon_gateway::persistence::postgres::PostgresStore;
use beacon_gateway::service::{MetricsAggregator, NotificationService, TrackingService};
use beacon_gateway::ws::handler::ws_handler;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = GatewayConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting beacon-gateway");

    // Connect to PostgreSQL and apply migrations
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(config.database_min_connections)
        .acquire_timeout(std::time::Duration::from_secs(
            config.database_connect_timeout_secs,
        ))
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!().run(&pool).await?;
    let store = Arc::new(PostgresStore::new(pool));

    // Build domain layer
    let event_bus = EventBus::new(config.event_bus_capacity);
    let catalog = Arc::new(NotificationCatalog::new());
    catalog.load(store.load_notifications().await?).await;

    // Build service layer
    let tracking = Arc::new(TrackingService::new(Arc::clone(&store), event_bus.clone()));
    let notifications = Arc::new(NotificationService::new(
        Arc::clone(&store),
        Arc::clone(&catalog),
    ));

    // Seed the metrics snapshot, then start folding the change feed
    let metrics = Arc::new(MetricsAggregator::new());
    metrics
        .seed(
            store.as_ref(),
            Duration::minutes(config.active_window_minutes),
        )
        .await;
    let _metrics_handle = MetricsAggregator::spawn(Arc::clone(&metrics), &event_bus);

    // Scheduled jobs
    let _jobs_handle = config
        .jobs_enabled
        .then(|| jobs::spawn(Arc::clone(&store), &config));

    // Build application state
    let app_state = AppState {
        tracking,
        notifications,
        metrics,
        event_bus,
        store,
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

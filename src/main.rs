use axum::{routing::get_service, Router};
use std::{net::SocketAddr, path::Path, time::Duration};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nfc_cards::api::{self, state::AppState};
use nfc_cards::config::Config;
use nfc_cards::db::{self, PgStore};
use nfc_cards::services::{geo_resolver::GeoResolver, CardService, ScanMode, ScanRecorder};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nfc_cards=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting NFC cards server...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    // Create database pool
    let pool = db::create_pool(&config).await?;
    tracing::info!(host = %config.db_host, database = %config.db_name, "Database pool created");

    // Run migrations
    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    let geo = GeoResolver::new(
        &config.geo_api_url,
        Duration::from_millis(config.geo_timeout_ms),
    )?;
    let mode = if config.enrich_scans {
        ScanMode::Enriched
    } else {
        ScanMode::Minimal
    };
    let service = CardService::new(
        PgStore::new(pool),
        ScanRecorder::new(geo, mode),
        config.base_url.clone(),
    );
    tracing::info!(mode = ?mode, "Scan recorder configured");

    if config.seed_demo_card {
        service.seed_demo_card().await?;
    }

    // Serve static assets from web/static
    let static_routes = Router::new().nest_service(
        "/static",
        get_service(ServeDir::new(Path::new("web").join("static"))),
    );

    // Build router
    let app = api::router()
        .merge(static_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(AppState::new(service));

    let host: std::net::IpAddr = config.host.parse()?;
    let addr = SocketAddr::from((host, config.port));
    tracing::info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install CTRL+C signal handler");
    tracing::info!("Shutdown signal received, cleaning up...");
}

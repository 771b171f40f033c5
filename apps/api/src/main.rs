use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::{self, TraceLayer};
use tracing::{Level, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use notification_cell::{DispatcherConfig, LoggingSender, NotificationDispatcher};
use shared_config::AppConfig;
use shared_database::{InMemoryEntityStore, SharedStore, SupabaseEntityStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Clinic API server");

    // Load configuration
    let config = AppConfig::from_env();

    let store: SharedStore = if config.is_supabase_configured() {
        info!("Using Supabase entity store at {}", config.supabase_url);
        Arc::new(SupabaseEntityStore::new(&config))
    } else {
        warn!("Supabase is not configured - falling back to the in-memory entity store");
        Arc::new(InMemoryEntityStore::new())
    };

    // Start the notification dispatcher
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let dispatcher = NotificationDispatcher::new(
        store.clone(),
        Arc::new(LoggingSender),
        DispatcherConfig::from_app_config(&config),
    );
    let dispatcher_handle = tokio::spawn(async move { dispatcher.run(shutdown_rx).await });

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the application router
    let app = router::create_router(store)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new()
                    .level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new()
                    .level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await
        .context("HTTP server error");

    if let Err(e) = dispatcher_handle.await {
        error!("Notification dispatcher task failed: {}", e);
    }

    info!("Clinic API server stopped");
    served
}

/// Resolves on ctrl-c and tells the dispatcher to stop.
async fn shutdown_signal(shutdown_tx: watch::Sender<bool>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }

    info!("Shutdown signal received");
    let _ = shutdown_tx.send(true);
}

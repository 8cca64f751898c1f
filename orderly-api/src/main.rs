use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use orderly_api::{app, state::AppState};
use orderly_core::OrderRepository;
use orderly_order::{InMemoryOrderRepository, NotificationDispatcher, OrderOrchestrator};
use orderly_store::{
    app_config::Config, build_http_client, DbClient, HttpNotifier, HttpPaymentGateway,
    HttpUserDirectory, SqliteOrderRepository,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "orderly_api=debug,orderly_order=debug,orderly_store=info,tower_http=debug".into()
    });
    let registry = tracing_subscriber::registry().with(filter);
    if std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Orderly API on port {}", config.server.port);

    let order_repo: Arc<dyn OrderRepository> = if config.database.is_memory() {
        tracing::warn!("Using in-memory order store, orders will not survive a restart");
        Arc::new(InMemoryOrderRepository::new())
    } else {
        let db = DbClient::connect(&config.database.url)
            .await
            .context("Failed to open order database")?;
        db.migrate().await.context("Failed to run migrations")?;
        Arc::new(SqliteOrderRepository::new(db.pool))
    };

    let client = build_http_client(Duration::from_secs(config.services.timeout_seconds))
        .context("Failed to build HTTP client")?;
    let users = Arc::new(HttpUserDirectory::new(client.clone(), &config.services.user_directory_url));
    let payments = Arc::new(HttpPaymentGateway::new(client.clone(), &config.services.payment_gateway_url));
    let notifier = Arc::new(HttpNotifier::new(client, &config.services.notifier_url));

    let (dispatcher, dispatcher_handle) = NotificationDispatcher::spawn(
        notifier,
        config.notifications.workers,
        config.notifications.queue_capacity,
    );

    let app_state = AppState {
        orchestrator: Arc::new(OrderOrchestrator::new(order_repo.clone(), users, payments, dispatcher)),
        order_repo,
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // The router (and with it every dispatcher clone) is gone; let queued notifications finish
    tracing::info!("Draining notification queue");
    if tokio::time::timeout(DRAIN_TIMEOUT, dispatcher_handle.join()).await.is_err() {
        tracing::warn!("Notification queue not drained within {:?}, exiting anyway", DRAIN_TIMEOUT);
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

use std::net::SocketAddr;

use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_payment_backend::{
    build_router,
    routes::{CREATE_INTENT_PATH, WEBHOOK_PATH},
    AppConfig, AppState, RedisPaymentStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env if available
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    if let Some(url) = &config.redis_url {
        RedisPaymentStore::open(url)?.ping().await?;
        tracing::info!("✓ Connected to Redis");
    }

    let state = AppState::from_config(&config)?;
    let app = build_router(state, config.allowed_origin_header()?);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("🚀 Server listening on {}", addr);
    tracing::info!("   - Payment intents: http://{}{}", addr, CREATE_INTENT_PATH);
    tracing::info!("   - Stripe webhook:  http://{}{}", addr, WEBHOOK_PATH);
    tracing::info!("   - Health check:    http://{}/health", addr);
    tracing::info!("   - CORS origin:     {}", config.allowed_origin);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, shutting down gracefully");
}

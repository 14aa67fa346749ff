use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use stripe_webhook_service::bootstrap::{
    build_app, spawn_purge_task, ConfiguredStore, StartupError,
};
use stripe_webhook_service::config::{AppConfig, ServerConfig};

fn init_tracing(server: &ServerConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    if server.is_production() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown() {
    let interrupt = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to listen for SIGINT: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to register SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => {},
        _ = terminate => {},
    };

    info!("Shutting down gracefully...");
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    let store = ConfiguredStore::connect(&config).await?;
    info!(backend = ?store.backend(), ttl_secs = config.idempotency.ttl_secs, "Idempotency store ready");

    let purge = store
        .needs_purge()
        .then(|| spawn_purge_task(store.clone(), config.idempotency.purge_interval()));

    let app = build_app(&config, store.shared())?;

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, environment = ?config.server.environment, "Listening for Stripe webhooks");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown())
        .await?;

    if let Some(purge) = purge {
        purge.abort();
    }

    Ok(())
}

use anyhow::Context;
use milkrun_api::{
    app,
    state::{AdminCredentials, AppState, AuthConfig},
    worker::start_paused_delivery_worker,
};
use milkrun_billing::LedgerService;
use milkrun_store::{app_config::Config, DbClient, PgRecordStore};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "milkrun_api=debug,milkrun_billing=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Milkrun API on port {}", config.server.port);

    let clock = config
        .business
        .clock()
        .with_context(|| format!("Invalid business UTC offset: {} minutes", config.business.utc_offset_minutes))?;

    let db = DbClient::new(&config.database)
        .await
        .context("Failed to connect to Postgres")?;
    db.migrate().await.context("Failed to run migrations")?;

    let store = Arc::new(PgRecordStore::new(db.pool.clone()));
    let ledger = Arc::new(LedgerService::new(store, clock));

    let worker = tokio::spawn(start_paused_delivery_worker(
        ledger.clone(),
        Duration::from_secs(config.business.paused_sweep_interval_secs.max(1)),
    ));

    let app_state = AppState {
        ledger,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
        admin: AdminCredentials {
            email: config.admin.email.clone(),
            password: config.admin.password.clone(),
        },
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app(app_state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    worker.abort();
    db.close().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}

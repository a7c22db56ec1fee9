use chrono::Duration;
use sqlx::migrate::Migrator;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pondok_core::config::Config;
use pondok_core::db::{self, PgStore};
use pondok_core::gateway::GatewayClient;
use pondok_core::services::{
    BillingJob, BillingService, InvoiceIssuer, JobScheduler, NotificationDispatcher,
    PaymentReconciler,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Setup logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database pool
    let pool = db::create_pool(&config).await?;

    // Run migrations
    let migrator = Migrator::new(Path::new("./migrations")).await?;
    migrator.run(&pool).await?;
    tracing::info!("Database migrations completed");

    let store = Arc::new(PgStore::new(pool));

    let gateway = GatewayClient::new(
        config.gateway_base_url.clone(),
        config.gateway_server_key.clone(),
    );
    let notifier = Arc::new(NotificationDispatcher::new(
        config.notify_webhook_url.clone(),
        config.country_code.clone(),
    ));
    let issuer = InvoiceIssuer::new(
        gateway,
        store.clone(),
        PathBuf::from(&config.invoice_dir),
    );

    let billing = Arc::new(BillingService::new(
        store.clone(),
        store.clone(),
        issuer,
        notifier.clone(),
        Duration::seconds(config.billing_period_secs),
        Duration::seconds(config.due_offset_secs),
    ));

    // Single owned scheduler handle, started once at startup.
    let scheduler = JobScheduler::new();
    scheduler
        .register_job(Box::new(BillingJob::new(
            billing.clone(),
            config.billing_schedule.clone(),
            config.operator_phone.clone(),
        )))
        .await?;
    scheduler.start().await?;

    let app_state = pondok_core::AppState {
        transactions: store.clone(),
        reconciler: Arc::new(PaymentReconciler::new(
            store,
            config.gateway_server_key.clone(),
        )),
        billing,
        start_time: std::time::Instant::now(),
    };

    let app = pondok_core::create_app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}

//! Courses backend server entry point.

use std::error::Error;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use courses_backend::adapters::postgres::{
    PostgresAccessGrantor, PostgresFulfillmentBacklog, PostgresOfferCatalog,
    PostgresOrderRepository,
};
use courses_backend::adapters::{
    api_router, FondyClient, FondyConfig, FulfillmentWorker, FulfillmentWorkerConfig,
    PaymentAppState, ResendConfig, ResendNotificationSender,
};
use courses_backend::application::handlers::payment::{OrderFulfiller, PaymentLinkSettings};
use courses_backend::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let orders = Arc::new(PostgresOrderRepository::new(pool.clone()));
    let offers = Arc::new(PostgresOfferCatalog::new(pool.clone()));
    let access = Arc::new(PostgresAccessGrantor::new(pool.clone()));
    let backlog = Arc::new(PostgresFulfillmentBacklog::new(pool.clone()));

    let payment_provider = Arc::new(FondyClient::new(FondyConfig::from(&config.payment))?);
    let notifier = Arc::new(ResendNotificationSender::new(ResendConfig::from(
        &config.email,
    ))?);
    let fulfiller = Arc::new(OrderFulfiller::new(offers.clone(), access, notifier));

    let state = PaymentAppState {
        orders,
        offers,
        payment_provider,
        backlog,
        fulfiller,
        link_settings: PaymentLinkSettings {
            callback_url: config.payment.callback_url.clone(),
            response_url: config.payment.response_url.clone(),
        },
        reconcile_batch_size: config.fulfillment.batch_size,
        retry_policy: config.fulfillment.retry_policy(),
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker_handle = if config.fulfillment.enabled {
        let worker = FulfillmentWorker::new(
            Arc::new(state.reconcile_handler()),
            FulfillmentWorkerConfig::from(&config.fulfillment),
        );
        Some(tokio::spawn(async move { worker.run(shutdown_rx).await }))
    } else {
        tracing::info!("Fulfillment worker disabled");
        None
    };

    let addr = config.server.socket_addr()?;
    let app = api_router(state, config.server.request_timeout());
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = shutdown_tx.send(true);
    if let Some(handle) = worker_handle {
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "Fulfillment worker panicked");
        }
    }
    pool.close().await;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if config.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

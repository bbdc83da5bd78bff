//! ActuNews - news publishing backend

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use actunews::{
    api::{self, AppState},
    config::Config,
    db,
    lifecycle::LifecyclePipeline,
    services::{notifier_from_config, Argon2CredentialHasher, CredentialHasher, MailQueue, WelcomeMessage},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "actunews=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting ActuNews...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {}", config.database.url);

    // Run migrations
    let applied = db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed ({} applied)", applied);

    // Outbound mail: queue for post-create handlers, worker for delivery
    let notifier = notifier_from_config(&config.mail)?;
    let (mail_queue, mail_worker) = MailQueue::new(config.mail.queue_capacity);
    let mail_task = tokio::spawn(mail_worker.run(notifier));

    // Lifecycle pipeline shared by every service
    let hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2CredentialHasher::new());
    let pipeline = Arc::new(LifecyclePipeline::standard(
        hasher,
        mail_queue,
        WelcomeMessage::from_config(&config.mail),
    ));

    let state = AppState::new(pool.clone(), pipeline);

    // Build router
    let app = api::build_router(state, &config.server.cors_origin);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router owned the last queue handle; the worker drains and stops.
    match mail_task.await {
        Ok(stats) => tracing::info!(
            delivered = stats.delivered,
            failed = stats.failed,
            "Mail worker finished"
        ),
        Err(e) => tracing::warn!("Mail worker task failed: {}", e),
    }

    pool.close().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

use hoshi_pipeline::bootstrap;
use hoshi_pipeline::config::Config;
use hoshi_pipeline::domain::ports::broker::Broker;
use hoshi_pipeline::domain::ports::time_service::TimeService;
use hoshi_pipeline::infrastructure::http::router::build_router;
use hoshi_pipeline::infrastructure::observability;
use hoshi_pipeline::infrastructure::runtime::tokio::TokioTimeService;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing and metrics
    let _observability = observability::init(&config)?;
    tracing::info!("Configuration loaded");

    let time_service: Arc<dyn TimeService> = Arc::new(TokioTimeService::new());

    // Connect to the store; exhausting the retries is fatal
    let db = bootstrap::connect_database(&config, time_service.as_ref()).await?;
    tracing::info!("Database connection established");

    db.run_migrations().await?;
    tracing::info!("Database migrations applied");

    // Connect to the broker and declare durable queues
    let broker = bootstrap::connect_broker(&config, &db, time_service.as_ref()).await?;
    let broker: Arc<dyn Broker> = broker;
    bootstrap::declare_queues(broker.as_ref(), &config).await?;
    tracing::info!("Broker connection established");

    let state = bootstrap::build_app_state(db.clone(), broker.clone(), &config)?;

    // Start consumers
    let shutdown = CancellationToken::new();
    let tracker = TaskTracker::new();
    bootstrap::spawn_consumers(
        &tracker,
        &state,
        db.clone(),
        broker,
        &config,
        time_service,
        shutdown.clone(),
    );
    tracker.close();

    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Shutdown signal received"),
            Err(e) => tracing::error!("Failed to listen for shutdown signal: {}", e),
        }
        signal_token.cancel();
    });

    // Start server
    let app = build_router(state);
    let addr = config.server_address();
    tracing::info!("Hashtag service listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let server_token = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { server_token.cancelled().await })
        .await?;

    // Let consumers finish their in-flight job
    shutdown.cancel();
    tracker.wait().await;
    db.close().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

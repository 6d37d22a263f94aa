use crate::application::services::*;
use crate::config::Config;
use crate::domain::ports::broker::Broker;
use crate::domain::ports::entity_validator::{AcceptAllValidator, EntityValidator};
use crate::domain::ports::hashtag_repository::HashtagRepository;
use crate::domain::ports::post_directory::PostDirectory;
use crate::domain::ports::story_repository::StoryRepository;
use crate::domain::ports::time_service::TimeService;
use crate::infrastructure::http::middleware::{ApiResult, AppState};
use crate::infrastructure::messaging::SqlBroker;
use crate::infrastructure::persistence::Database;
use crate::infrastructure::providers::HttpPostService;
use crate::infrastructure::workers::{connect_with_retry, ConnectError, JobConsumer};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Connect to the relational store with the startup retry policy.
pub async fn connect_database(
    config: &Config,
    time_service: &dyn TimeService,
) -> Result<Database, ConnectError> {
    connect_with_retry(
        "database",
        &config.connect_retry_policy(),
        time_service,
        || Database::connect(&config.database_url),
    )
    .await
}

/// Connect to the broker store. Shares `db` when both URLs are the same.
pub async fn connect_broker(
    config: &Config,
    db: &Database,
    time_service: &dyn TimeService,
) -> Result<Arc<SqlBroker>, Box<dyn std::error::Error>> {
    let broker_db = if config.broker_url == config.database_url {
        db.clone()
    } else {
        let broker_db = connect_with_retry(
            "broker",
            &config.connect_retry_policy(),
            time_service,
            || Database::connect(&config.broker_url),
        )
        .await?;
        broker_db.run_migrations().await?;
        broker_db
    };

    Ok(Arc::new(SqlBroker::new(broker_db, config.broker_lease)))
}

/// Declare every queue this process consumes from or publishes to
pub async fn declare_queues(broker: &dyn Broker, config: &Config) -> ApiResult<()> {
    futures::future::try_join(
        broker.declare_queue(&config.story_deletion_queue),
        broker.declare_queue(&config.hashtag_queue),
    )
    .await?;
    Ok(())
}

pub fn build_app_state(
    db: Database,
    broker: Arc<dyn Broker>,
    config: &Config,
) -> ApiResult<AppState> {
    let post_service = Arc::new(HttpPostService::new(
        config.post_service_url.clone(),
        config.query_timeout,
    )?);

    let validator: Arc<dyn EntityValidator> = if config.validate_posts {
        tracing::info!("Post existence is validated against {}", config.post_service_url);
        post_service.clone() as Arc<dyn EntityValidator>
    } else {
        Arc::new(AcceptAllValidator)
    };

    let hashtag_repo = Arc::new(db) as Arc<dyn HashtagRepository>;

    let hashtag_service = HashtagService::new(hashtag_repo.clone(), validator);
    let hashtag_query_service = HashtagQueryService::new(
        hashtag_repo,
        post_service as Arc<dyn PostDirectory>,
        config.query_timeout,
    );
    let job_publisher = JobPublisher::new(
        broker,
        config.story_deletion_queue.clone(),
        config.hashtag_queue.clone(),
    );

    Ok(AppState {
        hashtag_service,
        hashtag_query_service,
        job_publisher,
    })
}

/// Start one sequential consumer per queue on `tracker`.
///
/// Consumers stop when `shutdown` is cancelled; await `tracker.wait()` after
/// closing it to let in-flight jobs finish.
pub fn spawn_consumers(
    tracker: &TaskTracker,
    state: &AppState,
    db: Database,
    broker: Arc<dyn Broker>,
    config: &Config,
    time_service: Arc<dyn TimeService>,
    shutdown: CancellationToken,
) {
    let story_consumer = JobConsumer::new(
        broker.clone(),
        config.story_deletion_queue.clone(),
        StoryDeletionHandler::new(Arc::new(db) as Arc<dyn StoryRepository>),
        time_service.clone(),
        config.broker_poll_interval,
    );
    let story_shutdown = shutdown.clone();
    tracker.spawn(async move { story_consumer.run(story_shutdown).await });

    let hashtag_consumer = JobConsumer::new(
        broker,
        config.hashtag_queue.clone(),
        HashtagJobHandler::new(state.hashtag_service.clone()),
        time_service,
        config.broker_poll_interval,
    );
    tracker.spawn(async move { hashtag_consumer.run(shutdown).await });

    tracing::info!("Worker service is running. Waiting for jobs...");
}

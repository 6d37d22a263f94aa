use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::domain::entities::{Delivery, DeliveryOutcome, JobPayload};
use crate::domain::errors::HandlerError;
use crate::domain::ports::broker::Broker;
use crate::domain::ports::job_handler::JobHandler;
use crate::domain::ports::time_service::TimeService;
use crate::infrastructure::http::middleware::error::ApiResult;

/// Pulls deliveries from one durable queue and feeds them, one at a time,
/// through a [`JobHandler`].
///
/// A delivery is acknowledged only after the handler succeeds, or when it can
/// never succeed (undecodable payload, permanent handler error). Transient
/// handler failures leave the delivery unacknowledged so the broker hands it
/// out again once its lease expires; the consumer itself never retries.
pub struct JobConsumer<H: JobHandler> {
    broker: Arc<dyn Broker>,
    queue: String,
    handler: H,
    time_service: Arc<dyn TimeService>,
    poll_interval: Duration,
    error_backoff: Duration,
}

impl<H: JobHandler> JobConsumer<H> {
    pub fn new(
        broker: Arc<dyn Broker>,
        queue: impl Into<String>,
        handler: H,
        time_service: Arc<dyn TimeService>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            broker,
            queue: queue.into(),
            handler,
            time_service,
            poll_interval,
            error_backoff: poll_interval.saturating_mul(5),
        }
    }

    /// Receive loop. Returns once `shutdown` is cancelled; a message being
    /// handled when the signal arrives is finished first.
    pub async fn run(&self, shutdown: CancellationToken) {
        info!(queue = %self.queue, kind = H::Job::KIND, "Starting job consumer");
        loop {
            if shutdown.is_cancelled() {
                break;
            }

            let pause = match self.process_next().await {
                // Delivery handled, check for the next one immediately
                Ok(Some(_)) => continue,
                Ok(None) => self.poll_interval,
                Err(e) => {
                    error!(queue = %self.queue, "Error consuming from queue: {}", e);
                    self.error_backoff
                }
            };

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = self.time_service.sleep(pause) => {}
            }
        }
        info!(queue = %self.queue, "Job consumer stopped");
    }

    /// Receive and handle at most one delivery.
    pub async fn process_next(&self) -> ApiResult<Option<DeliveryOutcome>> {
        let Some(delivery) = self.broker.receive(&self.queue).await? else {
            return Ok(None);
        };

        metrics::counter!("jobs_received_total", "queue" => self.queue.clone()).increment(1);
        if delivery.is_redelivery() {
            debug!(
                queue = %self.queue,
                message_id = %delivery.id,
                delivery_count = delivery.delivery_count,
                "Redelivered message"
            );
        }

        let mut outcome = self.dispatch(&delivery).await;

        if matches!(outcome, DeliveryOutcome::Acked | DeliveryOutcome::Dropped)
            && !self.broker.ack(&delivery).await?
        {
            // Lease ran out while handling; the newer delivery owns the message now
            warn!(
                queue = %self.queue,
                message_id = %delivery.id,
                handled = %outcome,
                "Acknowledgement refused, message will be handled again"
            );
            outcome = DeliveryOutcome::Superseded;
        }

        let metric = match outcome {
            DeliveryOutcome::Acked => "jobs_acked_total",
            DeliveryOutcome::Dropped => "jobs_dropped_total",
            DeliveryOutcome::Unacked => "jobs_failed_total",
            DeliveryOutcome::Superseded => "jobs_superseded_total",
        };
        metrics::counter!(metric, "queue" => self.queue.clone()).increment(1);
        debug!(queue = %self.queue, message_id = %delivery.id, %outcome, "Delivery settled");

        Ok(Some(outcome))
    }

    async fn dispatch(&self, delivery: &Delivery) -> DeliveryOutcome {
        let job = match H::Job::decode(&delivery.body) {
            Ok(job) => job,
            Err(e) => {
                // Redelivery cannot fix a malformed body; record it and drop it
                warn!(
                    queue = %self.queue,
                    message_id = %delivery.id,
                    body = %String::from_utf8_lossy(&delivery.body),
                    "Dropping undecodable {} job: {}",
                    H::Job::KIND,
                    e
                );
                return DeliveryOutcome::Dropped;
            }
        };

        match self.handler.handle(job).await {
            Ok(()) => {
                info!(queue = %self.queue, message_id = %delivery.id, "Job completed");
                DeliveryOutcome::Acked
            }
            Err(HandlerError::Permanent(reason)) => {
                error!(
                    queue = %self.queue,
                    message_id = %delivery.id,
                    "Dropping {} job that cannot succeed: {}",
                    H::Job::KIND,
                    reason
                );
                DeliveryOutcome::Dropped
            }
            Err(HandlerError::Transient(reason)) => {
                error!(
                    queue = %self.queue,
                    message_id = %delivery.id,
                    delivery_count = delivery.delivery_count,
                    "Job failed, leaving unacknowledged for redelivery: {}",
                    reason
                );
                DeliveryOutcome::Unacked
            }
        }
    }
}

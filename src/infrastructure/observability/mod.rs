use crate::config::Config;
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{runtime, trace as sdktrace, Resource};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

const DEFAULT_FILTER: &str = "hoshi_pipeline=debug,tower_http=debug,sqlx=warn";

/// Flushes the trace exporter when dropped at the end of `main`.
pub struct ObservabilityGuard;

impl Drop for ObservabilityGuard {
    fn drop(&mut self) {
        global::shutdown_tracer_provider();
    }
}

pub fn init(config: &Config) -> Result<ObservabilityGuard, Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_thread_ids(true)
        .with_target(true);

    // `None` when no collector is configured; the layer is then a no-op
    let otel_layer = match &config.otel_exporter_endpoint {
        Some(endpoint) => {
            let tracer = opentelemetry_otlp::new_pipeline()
                .tracing()
                .with_exporter(
                    opentelemetry_otlp::new_exporter()
                        .tonic()
                        .with_endpoint(endpoint),
                )
                .with_trace_config(sdktrace::config().with_resource(Resource::new(vec![
                    KeyValue::new("service.name", config.service_name.clone()),
                ])))
                .install_batch(runtime::Tokio)?;
            Some(tracing_opentelemetry::layer().with_tracer(tracer))
        }
        None => None,
    };

    Registry::default()
        .with(env_filter)
        .with(fmt_layer)
        .with(otel_layer)
        .try_init()?;

    if let Some(port) = config.metrics_port {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(([0, 0, 0, 0], port))
            .install()?;
        describe_metrics();
        tracing::info!("Metrics exporter (Prometheus) started on port {}", port);
    }

    Ok(ObservabilityGuard)
}

fn describe_metrics() {
    metrics::describe_counter!(
        "jobs_received_total",
        "Deliveries taken from a queue, redeliveries included"
    );
    metrics::describe_counter!("jobs_acked_total", "Jobs handled and acknowledged");
    metrics::describe_counter!(
        "jobs_dropped_total",
        "Undecodable or permanently failing jobs acknowledged without effect"
    );
    metrics::describe_counter!(
        "jobs_failed_total",
        "Transient handler failures left for redelivery"
    );
    metrics::describe_counter!(
        "jobs_superseded_total",
        "Handled jobs whose ack was refused because the lease had expired"
    );
    metrics::describe_counter!(
        "hashtag_links_created_total",
        "New post to hashtag links, one counter increment each"
    );
}

use std::env;
use std::time::Duration;

use crate::domain::entities::{HASHTAG_QUEUE, STORY_DELETION_QUEUE};
use crate::infrastructure::workers::RetryPolicy;

/// Upper bound on the redelivery lease (one week)
pub const MAX_BROKER_LEASE_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub broker_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub post_service_url: String,
    pub validate_posts: bool,
    pub story_deletion_queue: String,
    pub hashtag_queue: String,
    pub broker_connect_retries: u32,
    pub broker_connect_delay: Duration,
    pub broker_lease: Duration,
    pub broker_poll_interval: Duration,
    pub query_timeout: Duration,
    pub otel_exporter_endpoint: Option<String>,
    pub service_name: String,
    pub metrics_port: Option<u16>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup; `from_env` uses the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let database_url = var_or("DATABASE_URL", "sqlite://hoshi.db?mode=rwc");

        // The SQL broker shares the database unless pointed elsewhere
        let broker_url = lookup("BROKER_URL").unwrap_or_else(|| database_url.clone());

        let server_host = var_or("SERVER_HOST", "0.0.0.0");

        let server_port = var_or("SERVER_PORT", "9007")
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let post_service_url = var_or("POST_SERVICE_URL", "http://post-service:9001");

        let validate_posts = parse_bool("VALIDATE_POSTS", &var_or("VALIDATE_POSTS", "false"))?;

        let story_deletion_queue = var_or("STORY_DELETION_QUEUE", STORY_DELETION_QUEUE);
        let hashtag_queue = var_or("HASHTAG_QUEUE", HASHTAG_QUEUE);

        let number_or = |key: &'static str, default: &str| -> Result<u64, ConfigError> {
            parse_number(key, &var_or(key, default))
        };

        let broker_connect_retries =
            parse_number("BROKER_CONNECT_RETRIES", &var_or("BROKER_CONNECT_RETRIES", "30"))?;
        let broker_connect_delay = Duration::from_secs(number_or("BROKER_CONNECT_DELAY_SECS", "2")?);
        let broker_lease_secs = number_or("BROKER_LEASE_SECS", "300")?;
        if broker_lease_secs > MAX_BROKER_LEASE_SECS {
            return Err(ConfigError::InvalidValue {
                key: "BROKER_LEASE_SECS",
                value: broker_lease_secs.to_string(),
            });
        }
        let broker_lease = Duration::from_secs(broker_lease_secs);
        let broker_poll_interval =
            Duration::from_millis(number_or("BROKER_POLL_INTERVAL_MS", "1000")?);
        let query_timeout = Duration::from_secs(number_or("QUERY_TIMEOUT_SECS", "10")?);

        if query_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "QUERY_TIMEOUT_SECS",
                value: "0".to_string(),
            });
        }

        let otel_exporter_endpoint = lookup("OTEL_EXPORTER_OTLP_ENDPOINT");

        let service_name = var_or("SERVICE_NAME", "hoshi-pipeline");

        let metrics_port = match lookup("METRICS_PORT") {
            Some(port) => Some(port.parse().map_err(|_| ConfigError::InvalidPort)?),
            None => None,
        };

        Ok(Config {
            database_url,
            broker_url,
            server_host,
            server_port,
            post_service_url,
            validate_posts,
            story_deletion_queue,
            hashtag_queue,
            broker_connect_retries,
            broker_connect_delay,
            broker_lease,
            broker_poll_interval,
            query_timeout,
            otel_exporter_endpoint,
            service_name,
            metrics_port,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn connect_retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.broker_connect_retries, self.broker_connect_delay)
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}

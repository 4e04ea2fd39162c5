use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub endpoint: String,
    pub timeout: Duration,
    pub connection_timeout: Duration,
    pub queue_capacity: usize,
    pub user_agent: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9600/v1/events".to_string(),
            timeout: Duration::from_secs(10),
            connection_timeout: Duration::from_secs(5),
            queue_capacity: 1024,
            user_agent: format!("webhook-relay/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Validates the endpoint and builds the pooled HTTP client.
///
/// The request timeout bounds every in-flight delivery, so no dispatch can
/// outlive shutdown indefinitely.
pub(crate) fn build_client(config: &DispatchConfig) -> Result<(Client, Url), DispatchError> {
    let endpoint: Url = config.endpoint.parse().map_err(|e| {
        DispatchError::InvalidConfiguration(format!(
            "Invalid endpoint URL '{}': {e}",
            config.endpoint
        ))
    })?;

    if config.queue_capacity == 0 {
        return Err(DispatchError::InvalidConfiguration(
            "Queue capacity must be greater than 0".to_string(),
        ));
    }

    let client = ClientBuilder::new()
        .timeout(config.timeout)
        .connect_timeout(config.connection_timeout)
        .user_agent(&config.user_agent)
        .build()
        .map_err(|e| {
            DispatchError::InvalidConfiguration(format!("Failed to build HTTP client: {e}"))
        })?;

    Ok((client, endpoint))
}

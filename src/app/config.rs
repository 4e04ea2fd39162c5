use crate::dispatch::DispatchConfig;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Environment error: {0}")]
    EnvError(String),
}

/// Relay configuration.
///
/// The endpoint default is a placeholder; the environment is the only
/// externalization surface (no CLI, no config files).
#[derive(Debug, Clone)]
pub struct Config {
    /// Collection endpoint URL the dispatcher posts events to.
    pub endpoint: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Connection timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Capacity of the bounded event queue; events beyond it are dropped.
    pub queue_capacity: usize,

    /// User agent sent with every delivery.
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9600/v1/events".to_string(),
            timeout_secs: 10,
            connect_timeout_secs: 5,
            queue_capacity: 1024,
            user_agent: format!("webhook-relay/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();

        load_env_string("RELAY_ENDPOINT", &mut config.endpoint);
        load_env_var("RELAY_TIMEOUT_SECS", &mut config.timeout_secs)?;
        load_env_var("RELAY_CONNECT_TIMEOUT_SECS", &mut config.connect_timeout_secs)?;
        load_env_var("RELAY_QUEUE_CAPACITY", &mut config.queue_capacity)?;
        load_env_string("RELAY_USER_AGENT", &mut config.user_agent);

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.endpoint).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid endpoint URL '{}': {e}", self.endpoint))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(format!(
                "Endpoint must be http or https, got '{}'",
                url.scheme()
            )));
        }

        if self.queue_capacity == 0 {
            return Err(ConfigError::InvalidConfig(
                "Queue capacity must be greater than 0".to_string(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidConfig(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::InvalidConfig(
                "Connection timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl From<&Config> for DispatchConfig {
    fn from(config: &Config) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            timeout: config.timeout(),
            connection_timeout: config.connect_timeout(),
            queue_capacity: config.queue_capacity,
            user_agent: config.user_agent.clone(),
        }
    }
}

/// Loads and parses an environment variable, keeping the default when the
/// variable is absent.
fn load_env_var<T>(name: &str, target: &mut T) -> Result<(), ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    if let Ok(value) = std::env::var(name) {
        *target = value
            .parse()
            .map_err(|e| ConfigError::EnvError(format!("Invalid {name}: {e}")))?;
    }
    Ok(())
}

/// Loads a string environment variable, keeping the default when absent.
fn load_env_string(name: &str, target: &mut String) {
    if let Ok(value) = std::env::var(name) {
        *target = value;
    }
}

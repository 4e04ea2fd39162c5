use thiserror::Error;

/// Top-level error type for the relay pipeline.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dispatch error: {0}")]
    Dispatch(String),

    #[error("Install error: {0}")]
    Install(String),
}

impl From<crate::app::ConfigError> for RelayError {
    fn from(err: crate::app::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<crate::dispatch::DispatchError> for RelayError {
    fn from(err: crate::dispatch::DispatchError) -> Self {
        Self::Dispatch(err.to_string())
    }
}

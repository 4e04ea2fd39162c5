use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a captured event.
///
/// Covers the four structured logging entry points plus the raw error-stream
/// channel and the two fault channels. The serialized form is the wire
/// string sent to the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventLevel {
    #[serde(rename = "info")]
    Info,
    #[serde(rename = "log")]
    Log,
    #[serde(rename = "warn")]
    Warn,
    #[serde(rename = "error")]
    Error,
    #[serde(rename = "stderr-raw")]
    StderrRaw,
    #[serde(rename = "uncaught-exception")]
    UncaughtException,
    #[serde(rename = "unhandled-rejection")]
    UnhandledRejection,
}

impl EventLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Log => "log",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::StderrRaw => "stderr-raw",
            Self::UncaughtException => "uncaught-exception",
            Self::UnhandledRejection => "unhandled-rejection",
        }
    }
}

impl fmt::Display for EventLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

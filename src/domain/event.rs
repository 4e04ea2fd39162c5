use super::level::EventLevel;
use serde::{Deserialize, Serialize};

/// One captured, leveled, timestamped log occurrence ready for forwarding.
///
/// This is the canonical representation of a captured event throughout the
/// pipeline, from encoder output through to the dispatch worker. It is
/// immutable once encoded, owned by the dispatch attempt that sends it, and
/// dropped after that attempt regardless of outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    pub level: EventLevel,
    /// ISO-8601 instant with millisecond precision, UTC `Z` suffix.
    pub timestamp: String,
    /// One finite string per raw argument, in argument order.
    pub messages: Vec<String>,
}

use super::serializer::serialize;
use super::value::CapturedValue;
use crate::domain::{EventLevel, LogEvent};
use chrono::{SecondsFormat, Utc};

/// Assembles a leveled, timestamped event from raw captured arguments.
///
/// The timestamp is taken at encode time. Per-argument rendering goes
/// through [`serialize`], so encoding is total: every argument becomes a
/// finite string and the messages sequence preserves argument order and
/// count exactly.
pub fn encode(level: EventLevel, args: &[CapturedValue]) -> LogEvent {
    LogEvent {
        level,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        messages: args.iter().map(serialize).collect(),
    }
}

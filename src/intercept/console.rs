use super::suppress;
use crate::capture::{CapturedValue, encode};
use crate::dispatch::DispatchHandle;
use crate::domain::EventLevel;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// Targets under this prefix belong to the relay itself and are never
/// forwarded, so the crate's own diagnostics cannot loop back through it.
const OWN_TARGET_PREFIX: &str = "webhook_relay";

/// Observes structured log events and forwards them.
///
/// Compose this layer *after* the host's fmt layer: the fmt layer is the
/// untouched original output path, and this layer only watches. Nothing in
/// here can fail the caller of a logging macro.
pub struct ForwardLayer {
    handle: DispatchHandle,
    forwarding: Arc<AtomicBool>,
}

impl ForwardLayer {
    pub fn new(handle: DispatchHandle, forwarding: Arc<AtomicBool>) -> Self {
        Self { handle, forwarding }
    }

    /// ERROR/WARN/INFO/DEBUG map onto the four intercepted entry points.
    /// TRACE is not one of them and produces no event.
    fn map_level(level: &Level) -> Option<EventLevel> {
        match *level {
            Level::ERROR => Some(EventLevel::Error),
            Level::WARN => Some(EventLevel::Warn),
            Level::INFO => Some(EventLevel::Info),
            Level::DEBUG => Some(EventLevel::Log),
            Level::TRACE => None,
        }
    }
}

impl<S: Subscriber> Layer<S> for ForwardLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if !self.forwarding.load(Ordering::Relaxed) || suppress::active() {
            return;
        }
        if event.metadata().target().starts_with(OWN_TARGET_PREFIX) {
            return;
        }
        let Some(level) = Self::map_level(event.metadata().level()) else {
            return;
        };

        let mut visitor = ArgVisitor::default();
        event.record(&mut visitor);
        self.handle.dispatch(encode(level, &visitor.args));
    }
}

/// Collects event fields, in declaration order, as captured arguments.
#[derive(Default)]
struct ArgVisitor {
    args: Vec<CapturedValue>,
}

impl Visit for ArgVisitor {
    fn record_debug(&mut self, _field: &Field, value: &dyn std::fmt::Debug) {
        self.args.push(CapturedValue::from(format!("{value:?}")));
    }

    fn record_str(&mut self, _field: &Field, value: &str) {
        self.args.push(CapturedValue::from(value));
    }

    fn record_i64(&mut self, _field: &Field, value: i64) {
        self.args.push(CapturedValue::from(value));
    }

    fn record_u64(&mut self, _field: &Field, value: u64) {
        self.args.push(CapturedValue::from(value));
    }

    fn record_f64(&mut self, _field: &Field, value: f64) {
        self.args.push(CapturedValue::from(value));
    }

    fn record_bool(&mut self, _field: &Field, value: bool) {
        self.args.push(CapturedValue::from(value));
    }

    fn record_error(&mut self, _field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.args.push(CapturedValue::from_dyn_error(value));
    }
}

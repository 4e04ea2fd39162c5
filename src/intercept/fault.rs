use super::suppress;
use crate::capture::{CapturedValue, encode};
use crate::dispatch::DispatchHandle;
use crate::domain::EventLevel;
use std::future::Future;
use std::panic::{self, PanicHookInfo};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::task::JoinHandle;

struct HookState {
    handle: DispatchHandle,
    forwarding: Arc<AtomicBool>,
}

static HOOK_STATE: OnceLock<HookState> = OnceLock::new();

/// Chains a panic hook that forwards uncaught faults.
///
/// Installed at most once per process. The previous hook runs first and
/// unchanged, so the original error-output report is preserved exactly; only
/// afterwards is one `uncaught-exception` event dispatched. The hook never
/// re-raises and never alters unwinding or abort behaviour.
pub(crate) fn install_panic_hook(handle: DispatchHandle, forwarding: Arc<AtomicBool>) {
    if HOOK_STATE.set(HookState { handle, forwarding }).is_err() {
        return;
    }

    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        suppress::guarded(|| previous(info));

        if let Some(state) = HOOK_STATE.get()
            && state.forwarding.load(Ordering::Relaxed)
        {
            let message = panic_message(info);
            state.handle.dispatch(encode(
                EventLevel::UncaughtException,
                &[CapturedValue::from(message)],
            ));
        }
    }));
}

fn panic_message(info: &PanicHookInfo<'_>) -> String {
    let payload = info
        .payload()
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| info.payload().downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic payload");

    match info.location() {
        Some(location) => format!("{payload} ({location})"),
        None => payload.to_string(),
    }
}

/// Spawns a detached task whose failure is observed.
///
/// An `Err` outcome is reported on the original error output, then forwarded
/// as one `unhandled-rejection` event whose single message is the error
/// rendered through the error path. Panics inside the task stay the panic
/// hook's concern, so a single fault never yields two events.
pub(crate) fn spawn_monitored<F, T, E>(
    handle: DispatchHandle,
    forwarding: Arc<AtomicBool>,
    fut: F,
) -> JoinHandle<Option<T>>
where
    F: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: std::error::Error + Send + 'static,
{
    tokio::spawn(async move {
        match fut.await {
            Ok(value) => Some(value),
            Err(err) => {
                suppress::guarded(|| {
                    eprintln!("[webhook-relay] unhandled task error: {err}");
                });
                if forwarding.load(Ordering::Relaxed) {
                    handle.dispatch(encode(
                        EventLevel::UnhandledRejection,
                        &[CapturedValue::from_error(&err)],
                    ));
                }
                None
            }
        }
    })
}

//! Structural suppression of relay-generated output.
//!
//! Every write the relay itself performs (dispatch-failure reports, fault
//! reports) runs under this thread-local flag, and every interceptor
//! consults it before forwarding. This replaces marker-substring sniffing on
//! rendered text: origin is a property of the emitting code path, not of the
//! bytes it happens to produce.

use std::cell::Cell;

thread_local! {
    static SUPPRESSED: Cell<bool> = const { Cell::new(false) };
}

/// True while the current thread is emitting relay-internal output.
pub fn active() -> bool {
    SUPPRESSED.with(Cell::get)
}

/// Runs `f` with forwarding suppressed on this thread.
pub fn guarded<R>(f: impl FnOnce() -> R) -> R {
    SUPPRESSED.with(|flag| {
        let previous = flag.replace(true);
        let result = f();
        flag.set(previous);
        result
    })
}

#![deny(warnings, rust_2024_compatibility)]
// Specific pedantic lints enforced (not blanket allow):
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
// Noisy pedantic lints suppressed with justification:
#![allow(
    clippy::missing_errors_doc,      // Internal API
    clippy::missing_panics_doc,      // Internal API
    clippy::module_name_repetitions, // e.g. DispatchError in dispatch module
    clippy::must_use_candidate,      // Annotated selectively on critical APIs
    clippy::doc_markdown             // Internal API
)]

//! Process-wide log interception and forwarding agent.
//!
//! Captures structured log events, raw error-stream writes, and uncaught
//! faults, and relays each one asynchronously, best-effort, to a remote HTTP
//! sink. The host program's own output behaviour is never altered, blocked,
//! or failed by anything in this crate.

pub mod app;
pub mod capture;
pub mod dispatch;
pub mod domain;
pub mod intercept;

// Re-export main types for easy access
pub use app::{Config, ConfigError, Relay};
pub use capture::{CapturedError, CapturedValue, encode, serialize};
pub use dispatch::{DispatchConfig, DispatchError, DispatchHandle, WorkerHandle};
pub use domain::{EventLevel, LogEvent, RelayError};
pub use intercept::{ForwardLayer, ForwardMakeWriter, ForwardWriter};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod config;

pub use config::{Config, ConfigError};

use crate::dispatch::{self, DispatchConfig, DispatchHandle};
use crate::domain::RelayError;
use crate::intercept::console::ForwardLayer;
use crate::intercept::fault;
use crate::intercept::stream::{ForwardMakeWriter, ForwardWriter};
use std::future::Future;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::task::JoinHandle;
use tracing::info;

struct InstallState {
    handle: DispatchHandle,
    forwarding: Arc<AtomicBool>,
}

static INSTALLED: OnceLock<InstallState> = OnceLock::new();

/// The process-wide interception agent.
///
/// `install` wires the dispatch pipeline and the panic hook exactly once per
/// process; the interceptors themselves are handed out by the accessors and
/// composed explicitly by the host (`layer()` into its subscriber stack,
/// `writer()`/`make_writer()` around whatever it routes to the error
/// stream). Nothing the host already does is mutated.
#[derive(Debug)]
pub struct Relay {
    handle: DispatchHandle,
    forwarding: Arc<AtomicBool>,
}

impl Relay {
    /// Installs the agent. Must be called from within a tokio runtime.
    ///
    /// Idempotent: the first call spawns the dispatch worker and chains the
    /// panic hook; every later call re-enables forwarding and shares the
    /// existing pipeline, so one logging call always yields exactly one
    /// forwarded event no matter how many times install ran.
    pub fn install(config: Config) -> Result<Self, RelayError> {
        config.validate()?;

        if let Some(state) = INSTALLED.get() {
            state.forwarding.store(true, Ordering::Relaxed);
            return Ok(Self {
                handle: state.handle.clone(),
                forwarding: state.forwarding.clone(),
            });
        }

        let (handle, _worker) = dispatch::spawn(DispatchConfig::from(&config))?;
        let forwarding = Arc::new(AtomicBool::new(true));
        fault::install_panic_hook(handle.clone(), forwarding.clone());

        let state = InstallState {
            handle: handle.clone(),
            forwarding: forwarding.clone(),
        };

        if INSTALLED.set(state).is_err() {
            // Lost an install race; share the winner's pipeline. The loser's
            // worker exits on its own once `handle` drops here.
            let Some(existing) = INSTALLED.get() else {
                return Err(RelayError::Install(
                    "install state unavailable after race".to_string(),
                ));
            };
            existing.forwarding.store(true, Ordering::Relaxed);
            return Ok(Self {
                handle: existing.handle.clone(),
                forwarding: existing.forwarding.clone(),
            });
        }

        info!(
            target: "webhook_relay",
            endpoint = %config.endpoint,
            "relay installed, intercepting log output"
        );

        Ok(Self { handle, forwarding })
    }

    /// The console interceptor. Compose it after the host's fmt layer.
    pub fn layer(&self) -> ForwardLayer {
        ForwardLayer::new(self.handle.clone(), self.forwarding.clone())
    }

    /// Wraps a raw error-output writer.
    pub fn writer<W: Write>(&self, inner: W) -> ForwardWriter<W> {
        ForwardWriter::new(inner, self.handle.clone(), self.forwarding.clone())
    }

    /// Wraps a `MakeWriter`, for subscriber-level stream interception.
    pub fn make_writer<M>(&self, inner: M) -> ForwardMakeWriter<M> {
        ForwardMakeWriter::new(inner, self.handle.clone(), self.forwarding.clone())
    }

    /// Direct handle into the dispatch pipeline.
    pub fn handle(&self) -> DispatchHandle {
        self.handle.clone()
    }

    /// Spawns a detached task whose `Err` outcome is forwarded as an
    /// `unhandled-rejection` event.
    pub fn spawn_monitored<F, T, E>(&self, fut: F) -> JoinHandle<Option<T>>
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: std::error::Error + Send + 'static,
    {
        fault::spawn_monitored(self.handle.clone(), self.forwarding.clone(), fut)
    }

    pub fn is_forwarding(&self) -> bool {
        self.forwarding.load(Ordering::Relaxed)
    }

    /// Stops forwarding. The pipeline stays warm; a later `install`
    /// re-enables it.
    pub fn teardown(self) {
        self.forwarding.store(false, Ordering::Relaxed);
    }

    /// One-shot subscriber bootstrap: env filter, fmt layer to the real
    /// error stream, then the forward layer. For hosts without their own
    /// subscriber stack; repeated calls are no-ops.
    pub fn init_tracing(&self, default_directive: &str) -> Result<(), RelayError> {
        use std::sync::Once;
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        static INIT: Once = Once::new();
        let mut result = Ok(());

        INIT.call_once(|| {
            let filter = EnvFilter::try_new(default_directive)
                .unwrap_or_else(|_| EnvFilter::new("info"));
            let subscriber = tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr).compact())
                .with(self.layer());

            if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
                result = Err(RelayError::Install(format!(
                    "failed to set global subscriber: {e}"
                )));
            }
        });

        result
    }
}

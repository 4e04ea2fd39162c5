use super::client::{DispatchConfig, DispatchError, build_client};
use crate::domain::LogEvent;
use crate::intercept::suppress;
use reqwest::Client;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;
use url::Url;

/// Receiving half of the event queue, drained by the worker.
pub type EventReceiver = mpsc::Receiver<LogEvent>;

/// Cloneable, non-blocking entry point into the dispatch pipeline.
#[derive(Debug, Clone)]
pub struct DispatchHandle {
    tx: mpsc::Sender<LogEvent>,
}

impl DispatchHandle {
    /// Enqueues an event and returns immediately.
    ///
    /// A full or closed queue drops the event: delivery is at-most-once by
    /// policy, and nothing on this path may block or fail the caller.
    pub fn dispatch(&self, event: LogEvent) {
        let _ = self.tx.try_send(event);
    }
}

/// Creates the bounded queue feeding the dispatch worker.
///
/// Exposed separately from [`spawn`] so tests and embedders can observe the
/// receiving end directly.
pub fn channel(capacity: usize) -> (DispatchHandle, EventReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (DispatchHandle { tx }, rx)
}

/// Handle on the spawned worker task.
#[derive(Debug)]
pub struct WorkerHandle {
    join: JoinHandle<()>,
}

impl WorkerHandle {
    /// Waits for the worker to drain and exit. The worker exits only once
    /// every [`DispatchHandle`] clone has been dropped.
    pub async fn join(self) {
        let _ = self.join.await;
    }
}

/// Validates the configuration, spawns the always-running worker, and
/// returns the dispatch handle plus a handle on the worker task.
///
/// Must be called from within a tokio runtime.
pub fn spawn(config: DispatchConfig) -> Result<(DispatchHandle, WorkerHandle), DispatchError> {
    let (client, endpoint) = build_client(&config)?;
    let (handle, rx) = channel(config.queue_capacity);
    let join = tokio::spawn(run_worker(client, endpoint, rx));
    Ok((handle, WorkerHandle { join }))
}

async fn run_worker(client: Client, endpoint: Url, mut rx: EventReceiver) {
    while let Some(event) = rx.recv().await {
        if let Err(err) = post_event(&client, &endpoint, &event).await {
            report_failure(&err);
        }
    }
    debug!(target: "webhook_relay::dispatch", "event queue closed, dispatch worker exiting");
}

/// Sends one event. The response status is deliberately not inspected: any
/// transported response counts as delivery.
async fn post_event(client: &Client, endpoint: &Url, event: &LogEvent) -> Result<(), DispatchError> {
    client.post(endpoint.clone()).json(event).send().await?;
    Ok(())
}

/// Reports a transport failure exactly once, on the original standard-output
/// channel. The suppression guard keeps the report out of every intercepted
/// path, so a failed dispatch can never amplify into further events.
fn report_failure(err: &DispatchError) {
    suppress::guarded(|| {
        println!("[webhook-relay] failed to forward log event: {err}");
    });
}

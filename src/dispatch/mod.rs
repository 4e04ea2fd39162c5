//! Webhook dispatch: bounded event queue plus an always-running worker that
//! performs the HTTP delivery, isolating every failure from the caller.

pub mod client;
pub mod worker;

pub use client::{DispatchConfig, DispatchError};
pub use worker::{DispatchHandle, EventReceiver, WorkerHandle, channel, spawn};

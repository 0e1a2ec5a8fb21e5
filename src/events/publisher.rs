use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use miette::Diagnostic;
use thiserror::Error;

use super::event::ExecutionEvent;

/// Failed to hand an event to the underlying transport.
#[derive(Debug, Error, Diagnostic)]
pub enum PublishError {
    /// The consuming side of the transport is gone.
    #[error("event channel closed")]
    #[diagnostic(
        code(relayflow::events::channel_closed),
        help("The subscriber channel was dropped. Check the relay consuming this run's events.")
    )]
    ChannelClosed,

    /// Writing to the output target failed.
    #[error("event write failed: {0}")]
    #[diagnostic(code(relayflow::events::io))]
    Io(#[from] io::Error),
}

/// Capability for emitting status events to a workflow-scoped channel.
///
/// `publish` is async and awaited by every caller; that await is the only
/// ordering mechanism between a node's `loading` and terminal events.
/// Delivery is best-effort and the engine persists no event history.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, event: ExecutionEvent) -> Result<(), PublishError>;
}

/// Writes one line of JSON per event to stdout. The default publisher.
#[derive(Debug, Default)]
pub struct StdOutPublisher;

#[async_trait]
impl Publisher for StdOutPublisher {
    async fn publish(&self, event: ExecutionEvent) -> Result<(), PublishError> {
        let line = serde_json::to_string(&event).map_err(io::Error::other)?;
        let mut out = io::stdout();
        out.write_all(line.as_bytes())?;
        out.write_all(b"\n")?;
        out.flush()?;
        Ok(())
    }
}

/// Captures events in memory for tests and snapshots.
#[derive(Clone, Debug, Default)]
pub struct MemoryPublisher {
    entries: Arc<Mutex<Vec<ExecutionEvent>>>,
}

impl MemoryPublisher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All events published so far, in publish order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ExecutionEvent> {
        self.entries.lock().expect("publisher poisoned").clone()
    }

    /// Drop all captured events.
    pub fn clear(&self) {
        self.entries.lock().expect("publisher poisoned").clear();
    }
}

#[async_trait]
impl Publisher for MemoryPublisher {
    async fn publish(&self, event: ExecutionEvent) -> Result<(), PublishError> {
        self.entries.lock().expect("publisher poisoned").push(event);
        Ok(())
    }
}

/// Forwards events into a flume channel for live consumers (SSE relays,
/// websocket bridges, dashboards).
#[derive(Clone, Debug)]
pub struct ChannelPublisher {
    tx: flume::Sender<ExecutionEvent>,
}

impl ChannelPublisher {
    /// Create a publisher and the receiving end a relay can drain.
    #[must_use]
    pub fn unbounded() -> (Self, flume::Receiver<ExecutionEvent>) {
        let (tx, rx) = flume::unbounded();
        (Self { tx }, rx)
    }

    /// Wrap an existing sender.
    #[must_use]
    pub fn new(tx: flume::Sender<ExecutionEvent>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Publisher for ChannelPublisher {
    async fn publish(&self, event: ExecutionEvent) -> Result<(), PublishError> {
        self.tx
            .send_async(event)
            .await
            .map_err(|_| PublishError::ChannelClosed)
    }
}

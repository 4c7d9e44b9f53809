//! Sink transport boundary
//!
//! The raw stream client behind the sink writer. Retry, backoff, ack
//! timeouts, and the health gate live in the writer; a transport only has
//! to deliver one payload and tell the truth about whether the sink
//! acknowledged it.

use async_trait::async_trait;

/// A partitioned record stream accepting keyed payloads
#[async_trait]
pub trait SinkTransport: Send {
    /// Deliver one serialized record under `key`
    ///
    /// Resolves once the sink acknowledges the write. The caller applies
    /// its own timeout around this future.
    async fn send(&mut self, key: &str, payload: &str) -> anyhow::Result<()>;

    /// Block until all previously accepted sends are durable
    async fn flush(&mut self) -> anyhow::Result<()>;

    /// Flush and release the underlying client
    ///
    /// Failures are logged by the implementation, not raised.
    async fn close(&mut self);
}

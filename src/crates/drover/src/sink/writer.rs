//! Retrying sink writer
//!
//! Drives one record at a time through the transport: wait for the
//! acknowledgment with a timeout, back off linearly between attempts,
//! and report delivered/failed per record. A record that exhausts its
//! attempt budget is a `false`, never an error; only a stop request
//! aborts the call.

use crate::health::SinkHealth;
use crate::retry::RetryPolicy;
use crate::shutdown::ShutdownCoordinator;
use drover_core::{ExportError, Record, Result, SinkTransport};
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

/// Delivery state machine over a [`SinkTransport`]
pub struct SinkWriter<T: SinkTransport> {
    transport: T,
    policy: RetryPolicy,
    health: SinkHealth,
    shutdown: ShutdownCoordinator,
}

impl<T: SinkTransport> SinkWriter<T> {
    /// Create a writer over a transport
    ///
    /// The health breaker trips after `max_retries` consecutive exhausted
    /// sends, mirroring the per-record attempt budget.
    pub fn new(transport: T, policy: RetryPolicy, shutdown: ShutdownCoordinator) -> Self {
        let health = SinkHealth::new(policy.max_retries);
        Self {
            transport,
            policy,
            health,
            shutdown,
        }
    }

    /// Send one record, retrying per the policy
    ///
    /// Returns `Ok(true)` when the sink acknowledged the record,
    /// `Ok(false)` when it could not be delivered (serialization failure
    /// or exhausted retries), and `Err(Cancelled)` when a stop request
    /// arrived while the send was in flight or backing off.
    pub async fn send_record(&mut self, record: &Record) -> Result<bool> {
        let payload = match record.to_payload() {
            Ok(payload) => payload,
            Err(e) => {
                // Not the sink's fault; counts against the batch but not
                // against sink health.
                warn!(error = %e, "Failed to serialize record, counting as failed");
                return Ok(false);
            }
        };
        let key = record.key();
        let shutdown = self.shutdown.clone();

        for attempt in 1..=self.policy.max_retries {
            if shutdown.is_stop_requested() {
                return Err(ExportError::Cancelled);
            }

            let attempt_result = tokio::select! {
                _ = shutdown.stopped() => return Err(ExportError::Cancelled),
                result = timeout(self.policy.ack_timeout, self.transport.send(&key, &payload)) => result,
            };

            match attempt_result {
                Ok(Ok(())) => {
                    self.health.record_success();
                    if attempt > 1 {
                        debug!(key = %key, attempt = attempt, "Send succeeded after retry");
                    }
                    return Ok(true);
                }
                Ok(Err(e)) => {
                    warn!(
                        key = %key,
                        attempt = attempt,
                        max_retries = self.policy.max_retries,
                        error = %e,
                        "Send attempt failed"
                    );
                }
                Err(_) => {
                    warn!(
                        key = %key,
                        attempt = attempt,
                        max_retries = self.policy.max_retries,
                        timeout_secs = self.policy.ack_timeout.as_secs(),
                        "Send acknowledgment timed out"
                    );
                }
            }

            if attempt < self.policy.max_retries {
                let delay = self.policy.delay_for(attempt);
                debug!(
                    key = %key,
                    attempt = attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Retrying send after delay"
                );
                tokio::select! {
                    _ = shutdown.stopped() => return Err(ExportError::Cancelled),
                    _ = sleep(delay) => {}
                }
            }
        }

        self.health.record_failure();
        warn!(
            key = %key,
            attempts = self.policy.max_retries,
            "Record send exhausted all retries"
        );
        Ok(false)
    }

    /// Ask the transport to make accepted sends durable
    ///
    /// Flush problems are logged, not raised; the per-record accounting
    /// already decided the batch's fate.
    pub async fn flush(&mut self) {
        match self.transport.flush().await {
            Ok(()) => debug!("Sink flushed"),
            Err(e) => warn!(error = %e, "Sink flush failed"),
        }
    }

    /// Whether the health breaker is still closed
    pub fn is_healthy(&self) -> bool {
        self.health.is_healthy()
    }

    /// Breaker introspection
    pub fn health(&self) -> &SinkHealth {
        &self.health
    }

    /// Release the transport
    pub async fn close(&mut self) {
        self.transport.close().await;
        info!("Sink writer closed");
    }
}

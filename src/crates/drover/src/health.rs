//! Sink health gate
//!
//! Circuit-breaker state over consecutive exhausted sends. The writer
//! feeds it outcomes; the controller halts the run once it trips.

use tracing::{info, warn};

/// Breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    /// Sends are being accepted, or failures have not yet reached the threshold
    Healthy,
    /// Too many consecutive sends exhausted their retries
    Tripped,
}

impl std::fmt::Display for HealthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Healthy => write!(f, "healthy"),
            Self::Tripped => write!(f, "tripped"),
        }
    }
}

/// Consecutive-failure breaker for the sink
///
/// A failure here is a record send that exhausted every retry, not an
/// individual failed attempt. Any delivered record proves the sink is
/// reachable again and resets the count.
#[derive(Debug)]
pub struct SinkHealth {
    state: HealthState,
    consecutive_failures: u32,
    threshold: u32,
}

impl SinkHealth {
    /// Create a breaker that trips after `threshold` consecutive failures
    pub fn new(threshold: u32) -> Self {
        Self {
            state: HealthState::Healthy,
            consecutive_failures: 0,
            threshold,
        }
    }

    /// Record a send that exhausted its retries
    pub fn record_failure(&mut self) {
        self.consecutive_failures += 1;

        if self.state == HealthState::Healthy && self.consecutive_failures >= self.threshold {
            self.state = HealthState::Tripped;
            warn!(
                consecutive_failures = self.consecutive_failures,
                threshold = self.threshold,
                "Sink health breaker tripped"
            );
        }
    }

    /// Record a delivered send
    pub fn record_success(&mut self) {
        if self.state == HealthState::Tripped {
            info!("Sink health breaker reset after successful send");
        }
        self.consecutive_failures = 0;
        self.state = HealthState::Healthy;
    }

    /// Whether the breaker is still closed
    pub fn is_healthy(&self) -> bool {
        self.state == HealthState::Healthy
    }

    /// Current breaker state
    pub fn state(&self) -> HealthState {
        self.state
    }

    /// Failures recorded since the last success
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}

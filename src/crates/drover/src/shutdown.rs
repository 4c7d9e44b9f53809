//! Cooperative stop handling
//!
//! A cloneable stop token shared by the controller, the sink writer, and
//! the signal listener. A stop request never interrupts work in flight
//! by force; holders poll the flag at batch and record boundaries and
//! race long waits against [`stopped`](ShutdownCoordinator::stopped).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{info, warn};

/// Stop token for cooperative shutdown
#[derive(Clone)]
pub struct ShutdownCoordinator {
    /// Flag indicating a stop has been requested
    stop_requested: Arc<AtomicBool>,
    /// Notifier waking tasks parked in [`stopped`](Self::stopped)
    stop_notify: Arc<Notify>,
}

impl std::fmt::Debug for ShutdownCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutdownCoordinator")
            .field("stop_requested", &self.stop_requested.load(Ordering::SeqCst))
            .finish()
    }
}

impl ShutdownCoordinator {
    /// Create a new stop token
    pub fn new() -> Self {
        Self {
            stop_requested: Arc::new(AtomicBool::new(false)),
            stop_notify: Arc::new(Notify::new()),
        }
    }

    /// Request a stop
    pub fn request_stop(&self) {
        if !self.stop_requested.swap(true, Ordering::SeqCst) {
            info!("Stop requested, export will halt at the next safe point");
            self.stop_notify.notify_waiters();
        }
    }

    /// Check whether a stop has been requested
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    /// Wait until a stop is requested
    ///
    /// Returns immediately if one already was, so this is safe to race
    /// against sends and backoff sleeps in `select!`.
    pub async fn stopped(&self) {
        let notified = self.stop_notify.notified();
        tokio::pin!(notified);
        // Register before checking the flag so a concurrent request_stop
        // cannot slip between the check and the await.
        notified.as_mut().enable();

        if self.is_stop_requested() {
            return;
        }
        notified.await;
    }

    /// Install signal handlers for SIGINT and SIGTERM
    ///
    /// Spawns a background task that listens for signals and calls request_stop()
    pub fn install_signal_handlers(&self) -> tokio::task::JoinHandle<()> {
        let coordinator = self.clone();

        tokio::spawn(async move {
            #[cfg(unix)]
            {
                use tokio::signal::unix::{signal, SignalKind};

                let mut sigint = signal(SignalKind::interrupt())
                    .expect("Failed to install SIGINT handler");
                let mut sigterm = signal(SignalKind::terminate())
                    .expect("Failed to install SIGTERM handler");

                tokio::select! {
                    _ = sigint.recv() => {
                        warn!("Received SIGINT, stopping after the current batch...");
                        coordinator.request_stop();
                    }
                    _ = sigterm.recv() => {
                        warn!("Received SIGTERM, stopping after the current batch...");
                        coordinator.request_stop();
                    }
                }
            }

            #[cfg(not(unix))]
            {
                use tokio::signal;

                signal::ctrl_c().await.expect("Failed to install Ctrl+C handler");
                warn!("Received Ctrl+C, stopping after the current batch...");
                coordinator.request_stop();
            }
        })
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

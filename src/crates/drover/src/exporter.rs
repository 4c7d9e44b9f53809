//! Export controller
//!
//! Owns the run loop: load the checkpoint, fetch offset windows from the
//! source, push each batch through the sink writer, and commit progress
//! after every accepted batch. Every exit path leaves a checkpoint on
//! disk and releases both collaborators.

use crate::config::ExportConfig;
use crate::shutdown::ShutdownCoordinator;
use crate::sink::SinkWriter;
use drover_checkpoint::{CheckpointState, CheckpointStore};
use drover_core::{ExportError, Record, Result, SinkTransport, SourceReader};
use tracing::{error, info, warn};

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Target record count reached and the checkpoint sealed
    Completed,
    /// The checkpoint was already marked completed; nothing was done
    AlreadyCompleted,
    /// The source ran out of records before the target count
    SourceExhausted,
    /// A stop request halted the run at a safe point
    Stopped,
    /// A batch exceeded the failure threshold
    BatchFailed,
    /// The sink health breaker tripped
    SinkUnhealthy,
}

impl std::fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::AlreadyCompleted => write!(f, "already completed"),
            Self::SourceExhausted => write!(f, "source exhausted"),
            Self::Stopped => write!(f, "stopped"),
            Self::BatchFailed => write!(f, "batch failed"),
            Self::SinkUnhealthy => write!(f, "sink unhealthy"),
        }
    }
}

/// Per-batch delivery tally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchDelivery {
    /// Records the sink acknowledged
    pub delivered: usize,
    /// Records that exhausted retries or failed to serialize
    pub failed: usize,
}

impl BatchDelivery {
    /// Records attempted in this batch
    pub fn total(&self) -> usize {
        self.delivered + self.failed
    }

    /// Whether the batch commits: at most 10% of it may have failed
    pub fn accepted(&self) -> bool {
        self.failed * 10 <= self.total()
    }
}

/// One-shot export run over a source, a sink writer, and a checkpoint store
pub struct Exporter<S, T, C>
where
    S: SourceReader,
    T: SinkTransport,
    C: CheckpointStore,
{
    source: S,
    writer: SinkWriter<T>,
    store: C,
    config: ExportConfig,
    shutdown: ShutdownCoordinator,
}

impl<S, T, C> Exporter<S, T, C>
where
    S: SourceReader,
    T: SinkTransport,
    C: CheckpointStore,
{
    /// Wire up a run from its collaborators
    pub fn new(
        source: S,
        writer: SinkWriter<T>,
        store: C,
        config: ExportConfig,
        shutdown: ShutdownCoordinator,
    ) -> Self {
        Self {
            source,
            writer,
            store,
            config,
            shutdown,
        }
    }

    /// Execute the export until the target count, source exhaustion, a
    /// failure halt, or a stop request
    ///
    /// A recorded failure state is persisted before this returns; an
    /// `Err` here means the checkpoint already carries the story.
    pub async fn run(&mut self) -> Result<RunOutcome> {
        let mut state = self.store.load().await;

        if state.is_completed() {
            info!("Previous export job already completed successfully, nothing to do");
            self.release().await;
            return Ok(RunOutcome::AlreadyCompleted);
        }

        if let Some(message) = state.error_message.clone() {
            warn!(
                error = %message,
                offset = state.last_processed_offset,
                "Previous run ended with an error, resuming from last successful offset"
            );
        } else if state.records_processed > 0 {
            info!(
                offset = state.last_processed_offset,
                records = state.records_processed,
                "Resuming export"
            );
        } else {
            info!(
                target = self.config.total_records,
                batch_size = self.config.batch_size,
                "Starting export"
            );
        }

        let outcome = match self.export_loop(&mut state).await {
            Ok(outcome) => outcome,
            Err(ExportError::Cancelled) => {
                // The in-flight batch is abandoned whole; it was never
                // committed, so the resume point is the last good batch.
                RunOutcome::Stopped
            }
            Err(e) => {
                let message = format!("Critical error: {}", e);
                error!(error = %e, "Export run aborted");
                state.fail(message);
                self.store.save(&state).await;
                self.release().await;
                return Err(e);
            }
        };

        match outcome {
            RunOutcome::Completed => {
                state.mark_completed();
                info!(
                    records = state.records_processed,
                    batches = state.batches_processed,
                    "Export completed successfully"
                );
            }
            RunOutcome::SourceExhausted => {
                warn!(
                    records = state.records_processed,
                    target = self.config.total_records,
                    "Source exhausted before reaching the target record count"
                );
            }
            RunOutcome::Stopped => {
                info!(
                    records = state.records_processed,
                    "Export stopped gracefully before completion"
                );
            }
            // Failure halts recorded their state inside the loop.
            RunOutcome::BatchFailed | RunOutcome::SinkUnhealthy | RunOutcome::AlreadyCompleted => {}
        }

        self.store.save(&state).await;
        self.release().await;
        Ok(outcome)
    }

    async fn export_loop(&mut self, state: &mut CheckpointState) -> Result<RunOutcome> {
        loop {
            // A reached target outranks a stop request: once the final
            // batch has committed the run is done, however it exits.
            if state.records_processed >= self.config.total_records {
                return Ok(RunOutcome::Completed);
            }

            if self.shutdown.is_stop_requested() {
                return Ok(RunOutcome::Stopped);
            }

            let offset = state.last_processed_offset;
            let batch = self.source.fetch_batch(offset, self.config.batch_size).await?;

            if batch.is_empty() {
                return Ok(RunOutcome::SourceExhausted);
            }

            let batch_len = batch.len();
            let delivery = self.process_batch(&batch).await?;

            if delivery.accepted() {
                state.advance(offset + batch_len as u64, batch_len as u64);
                self.store.save(state).await;

                let percent = state.records_processed * 100 / self.config.total_records;
                info!(
                    "{}/{} records processed ({}%)",
                    state.records_processed, self.config.total_records, percent
                );

                if !self.writer.is_healthy() {
                    error!(
                        consecutive_failures = self.writer.health().consecutive_failures(),
                        "Sink is unhealthy, halting export"
                    );
                    state.fail("sink failed after multiple retries");
                    self.store.save(state).await;
                    return Ok(RunOutcome::SinkUnhealthy);
                }
            } else {
                error!(
                    offset = offset,
                    failed = delivery.failed,
                    batch = batch_len,
                    "Too many records failed, halting export"
                );
                state.fail(format!("Failed to process batch starting at offset {}", offset));
                self.store.save(state).await;
                return Ok(RunOutcome::BatchFailed);
            }
        }
    }

    /// Push one batch through the writer and tally the outcome
    ///
    /// The flush runs after every attempted batch, accepted or not; only
    /// a cancellation abort skips it.
    async fn process_batch(&mut self, batch: &[Record]) -> Result<BatchDelivery> {
        let mut delivery = BatchDelivery {
            delivered: 0,
            failed: 0,
        };

        for record in batch {
            if self.shutdown.is_stop_requested() {
                return Err(ExportError::Cancelled);
            }

            if self.writer.send_record(record).await? {
                delivery.delivered += 1;
            } else {
                delivery.failed += 1;
            }
        }

        self.writer.flush().await;
        Ok(delivery)
    }

    async fn release(&mut self) {
        self.writer.close().await;
        self.source.close().await;
    }
}

//! Durable export progress state
//!
//! [`CheckpointState`] is the record a run leaves behind so the next run
//! can pick up where it stopped. The persisted field names are a stable
//! contract: any tool that reads or writes checkpoint files produced by
//! other implementations of this pipeline must keep them byte-for-byte
//! (`lastProcessedOffset`, `batchesProcessed`, `recordsProcessed`,
//! `lastProcessedTimestamp`, `completed`, `errorMessage`).
//!
//! The state is owned and mutated by the export controller only; stores
//! serialize and deserialize it on request but never change it.

use serde::{Deserialize, Serialize};

/// Timestamp format: ISO-8601-like local date-time, no zone offset
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Progress record for one export job
///
/// Constructed fresh (all zero, not completed, no error) when no usable
/// persisted state exists. Unknown fields in persisted files are ignored
/// on read so newer writers can add fields without breaking older readers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckpointState {
    /// Logical position in the source for the next read
    pub last_processed_offset: u64,

    /// Number of successfully committed batches
    pub batches_processed: u64,

    /// Cumulative count of exported records
    pub records_processed: u64,

    /// Wall-clock time of the last state change; advisory only
    pub last_processed_timestamp: String,

    /// Terminal success flag; set exactly once per job
    pub completed: bool,

    /// Failure description from the run that set it, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl CheckpointState {
    /// Create a fresh state for a job that has not exported anything yet
    pub fn new() -> Self {
        Self {
            last_processed_offset: 0,
            batches_processed: 0,
            records_processed: 0,
            last_processed_timestamp: now_timestamp(),
            completed: false,
            error_message: None,
        }
    }

    /// Commit one successful batch
    ///
    /// `new_offset` is the absolute position after the batch, not a delta.
    /// The offset never moves backwards and a completed state is never
    /// advanced.
    pub fn advance(&mut self, new_offset: u64, batch_record_count: u64) {
        debug_assert!(!self.completed, "advanced a completed checkpoint");
        debug_assert!(
            new_offset >= self.last_processed_offset,
            "offset moved backwards: {} -> {}",
            self.last_processed_offset,
            new_offset
        );

        self.last_processed_offset = new_offset;
        self.batches_processed += 1;
        self.records_processed += batch_record_count;
        self.touch();
    }

    /// Record a failure; offset and counters are left untouched
    pub fn fail(&mut self, message: impl Into<String>) {
        self.error_message = Some(message.into());
        self.touch();
    }

    /// Mark the job finished
    ///
    /// Terminal: completion clears any stale error from an earlier,
    /// since-recovered run, so a completed state never carries one.
    pub fn mark_completed(&mut self) {
        self.completed = true;
        self.error_message = None;
        self.touch();
    }

    /// True once the job has finished successfully
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// True if a prior run recorded a failure
    pub fn has_error(&self) -> bool {
        self.error_message.is_some()
    }

    fn touch(&mut self) {
        self.last_processed_timestamp = now_timestamp();
    }
}

impl Default for CheckpointState {
    fn default() -> Self {
        Self::new()
    }
}

fn now_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

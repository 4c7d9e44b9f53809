//! Checkpoint storage backends
//!
//! [`CheckpointStore`] is the seam between the export controller and
//! whatever holds the progress record. Backends implement the fallible
//! `try_load`/`try_save` pair; the controller calls the provided
//! [`load`](CheckpointStore::load) and [`save`](CheckpointStore::save)
//! wrappers, which carry the pipeline's soft-failure policy:
//!
//! - a missing or unparsable checkpoint yields a fresh state, never an
//!   error: losing a checkpoint costs re-work, not the run;
//! - a failed save is logged and swallowed: resumability degrades but
//!   the export keeps its forward progress.

use crate::error::Result;
use crate::state::CheckpointState;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Storage backend for [`CheckpointState`]
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Read the persisted state, `Ok(None)` when no checkpoint exists yet
    async fn try_load(&self) -> Result<Option<CheckpointState>>;

    /// Persist the full state, replacing any previous checkpoint
    async fn try_save(&self, state: &CheckpointState) -> Result<()>;

    /// Load with the pipeline's soft-failure semantics
    ///
    /// Never raises: missing and corrupt checkpoints both degrade to a
    /// fresh state, with the log line as the only trace.
    async fn load(&self) -> CheckpointState {
        match self.try_load().await {
            Ok(Some(state)) => {
                info!(
                    records = state.records_processed,
                    offset = state.last_processed_offset,
                    "Loaded checkpoint"
                );
                state
            }
            Ok(None) => {
                info!("No checkpoint found, starting fresh");
                CheckpointState::new()
            }
            Err(e) => {
                error!(error = %e, "Failed to read checkpoint, starting fresh");
                CheckpointState::new()
            }
        }
    }

    /// Save with the pipeline's soft-failure semantics
    ///
    /// A write failure must not kill the export loop; it is logged and
    /// dropped here.
    async fn save(&self, state: &CheckpointState) {
        match self.try_save(state).await {
            Ok(()) => debug!(
                offset = state.last_processed_offset,
                "Saved checkpoint"
            ),
            Err(e) => error!(error = %e, "Failed to save checkpoint"),
        }
    }
}

/// File-backed store writing pretty JSON at a fixed path
///
/// Writes go through a sibling temp file and a rename, so readers never
/// observe a half-written checkpoint.
#[derive(Debug, Clone)]
pub struct JsonFileCheckpointStore {
    path: PathBuf,
}

impl JsonFileCheckpointStore {
    /// Create a store for the given checkpoint file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The checkpoint file path this store reads and writes
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut os = self.path.clone().into_os_string();
        os.push(".tmp");
        PathBuf::from(os)
    }
}

#[async_trait]
impl CheckpointStore for JsonFileCheckpointStore {
    async fn try_load(&self) -> Result<Option<CheckpointState>> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let state = serde_json::from_str(&text)?;
        Ok(Some(state))
    }

    async fn try_save(&self, state: &CheckpointState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(state)?;
        let tmp = self.temp_path();
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

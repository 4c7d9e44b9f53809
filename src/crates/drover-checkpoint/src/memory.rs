//! In-memory checkpoint store
//!
//! Reference backend for tests and embedded use. State is held as the
//! serialized JSON document rather than the struct, so every load and
//! save exercises the same codec path as the file-backed store.

use crate::error::Result;
use crate::state::CheckpointState;
use crate::store::CheckpointStore;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Volatile store keeping the checkpoint document in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryCheckpointStore {
    document: Arc<RwLock<Option<String>>>,
    saves: Arc<AtomicUsize>,
}

impl InMemoryCheckpointStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with an existing state
    pub fn with_state(state: &CheckpointState) -> Result<Self> {
        let json = serde_json::to_string(state)?;
        Ok(Self {
            document: Arc::new(RwLock::new(Some(json))),
            saves: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Number of successful saves since creation
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Drop any held state, as if the checkpoint were deleted
    pub async fn clear(&self) {
        *self.document.write().await = None;
    }
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
    async fn try_load(&self) -> Result<Option<CheckpointState>> {
        let guard = self.document.read().await;
        match guard.as_deref() {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }

    async fn try_save(&self, state: &CheckpointState) -> Result<()> {
        let json = serde_json::to_string(state)?;
        *self.document.write().await = Some(json);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

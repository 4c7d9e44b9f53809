//! # drover-checkpoint - Durable Progress for Resumable Exports
//!
//! **Checkpoint state and storage abstractions** for the drover export
//! pipeline. A checkpoint is the single progress record of a bulk export:
//! how far the source scan has advanced, how much has been delivered, and
//! whether the run finished cleanly or died with an error.
//!
//! ## Core Concepts
//!
//! ### 1. CheckpointState
//!
//! [`CheckpointState`] is a plain serializable struct with three mutators:
//!
//! - **`advance()`** - commit a successfully delivered batch
//! - **`fail()`** - record a failure without touching progress counters
//! - **`mark_completed()`** - seal a finished export
//!
//! The serialized form is a stable camelCase JSON document
//! (`lastProcessedOffset`, `recordsProcessed`, ...) so checkpoints are
//! interchangeable with other implementations of the same pipeline.
//!
//! ### 2. CheckpointStore Trait
//!
//! [`CheckpointStore`] is the persistence seam. Backends implement the
//! fallible `try_load`/`try_save` pair; callers use the provided `load`/
//! `save` wrappers, which never raise: a missing or corrupt checkpoint
//! degrades to a fresh state, a failed save is logged and swallowed. The
//! export loses resumability in those cases, never forward progress.
//!
//! Two backends ship with the crate:
//!
//! - [`JsonFileCheckpointStore`] - pretty JSON at a path, written via
//!   temp-file-then-rename
//! - [`InMemoryCheckpointStore`] - volatile reference implementation with
//!   save-count introspection for tests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use drover_checkpoint::{CheckpointStore, JsonFileCheckpointStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = JsonFileCheckpointStore::new("checkpoint.json");
//!
//!     // Resume from wherever the last run got to.
//!     let mut state = store.load().await;
//!     println!("resuming at offset {}", state.last_processed_offset);
//!
//!     // ... deliver one batch of 10_000 records ...
//!     state.advance(state.last_processed_offset + 10_000, 10_000);
//!     store.save(&state).await;
//!
//!     state.mark_completed();
//!     store.save(&state).await;
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`state`] - [`CheckpointState`] and its transition rules
//! - [`store`] - [`CheckpointStore`] trait and [`JsonFileCheckpointStore`]
//! - [`memory`] - [`InMemoryCheckpointStore`] reference implementation
//! - [`error`] - [`CheckpointError`] types

pub mod error;
pub mod memory;
pub mod state;
pub mod store;

// Re-export main types
pub use error::{CheckpointError, Result};
pub use memory::InMemoryCheckpointStore;
pub use state::CheckpointState;
pub use store::{CheckpointStore, JsonFileCheckpointStore};

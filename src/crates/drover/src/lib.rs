//! # drover - Resumable Bulk Export Pipeline
//!
//! A one-shot exporter that drives records from a paginated tabular
//! source into a partitioned record stream, committing progress to a
//! durable checkpoint after every accepted batch. Kill it at any point
//! and the next run resumes from the last committed offset.
//!
//! ## Features
//!
//! - **Offset-window pagination** - fixed-size batches over a configured
//!   order column
//! - **Durable resume** - a JSON checkpoint advances only on batch commit
//! - **Bounded retry** - linear capped backoff and an ack timeout per send
//! - **Health gate** - a breaker over consecutive exhausted sends halts
//!   a run the sink can no longer absorb
//! - **Batch acceptance** - a batch commits when at most 10% of its
//!   records fail
//! - **Cooperative stop** - SIGINT/SIGTERM finish or abandon the current
//!   batch, never corrupt the checkpoint
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use drover::config::DroverConfig;
//! use drover::exporter::Exporter;
//! use drover::retry::RetryPolicy;
//! use drover::shutdown::ShutdownCoordinator;
//! use drover::sink::{FileStreamTransport, SinkWriter};
//! use drover::source::SqliteSource;
//! use drover_checkpoint::JsonFileCheckpointStore;
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = DroverConfig::load(Path::new("drover.toml"))?;
//!
//! let source = SqliteSource::connect(&config.source).await?;
//! let transport = FileStreamTransport::new(
//!     Path::new(&config.sink.directory),
//!     &config.sink.topic,
//!     &config.sink.client_id,
//!     config.sink.partitions,
//! )
//! .await?;
//! let store = JsonFileCheckpointStore::new(&config.export.checkpoint_file);
//!
//! let shutdown = ShutdownCoordinator::new();
//! let writer = SinkWriter::new(transport, RetryPolicy::from(&config.retry), shutdown.clone());
//! let mut exporter = Exporter::new(source, writer, store, config.export, shutdown);
//!
//! let outcome = exporter.run().await?;
//! println!("export {}", outcome);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The controller in [`exporter`] is the only place runs are sequenced;
//! the source, the sink transport, and the checkpoint store are trait
//! objects behind `drover-core` / `drover-checkpoint` seams, so tests
//! script them and deployments swap them.

// Core modules
pub mod config;
pub mod exporter;
pub mod health;
pub mod logging;
pub mod retry;
pub mod shutdown;
pub mod sink;
pub mod source;
pub mod version;

// Re-export key types for convenience
pub use config::DroverConfig;
pub use exporter::{BatchDelivery, Exporter, RunOutcome};
pub use health::{HealthState, SinkHealth};
pub use retry::RetryPolicy;
pub use shutdown::ShutdownCoordinator;
pub use sink::{FileStreamTransport, SinkWriter};
pub use source::SqliteSource;

// Re-export the collaborator seams alongside the engine
pub use drover_checkpoint::{CheckpointState, CheckpointStore, InMemoryCheckpointStore, JsonFileCheckpointStore};
pub use drover_core::{ExportError, FieldValue, Record, Result, SinkTransport, SourceReader};

// Re-export the build identity banner
pub use version::banner as version_banner;

//! # drover-core
//!
//! Domain types and collaborator boundaries for the drover export
//! pipeline: the open [`Record`] model with sink-key derivation, the
//! [`SourceReader`] and [`SinkTransport`] traits the control loop is
//! written against, and the shared [`ExportError`] type.
//!
//! Concrete adapters (SQL sources, stream transports) live in the `drover`
//! engine crate; this crate has no opinion about where records come from
//! or go to.

pub mod error;
pub mod record;
pub mod sink;
pub mod source;

// Re-export key types for convenience
pub use error::{ExportError, Result};
pub use record::{FieldValue, Record, NATURAL_KEY_FIELD};
pub use sink::SinkTransport;
pub use source::SourceReader;

//! Sink side of the pipeline
//!
//! [`SinkWriter`] owns the per-record delivery state machine (retry,
//! ack timeout, health accounting); [`FileStreamTransport`] is the
//! bundled transport it drives.

pub mod file;
pub mod writer;

pub use file::FileStreamTransport;
pub use writer::SinkWriter;

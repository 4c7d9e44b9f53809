//! Source side of the pipeline
//!
//! The bundled [`SqliteSource`] reads offset windows from a SQLite
//! database; anything else implements `SourceReader` the same way.

pub mod sqlite;

pub use sqlite::SqliteSource;

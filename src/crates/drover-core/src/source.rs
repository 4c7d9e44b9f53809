//! Source reader boundary
//!
//! The controller consumes the source through this trait only, so the
//! pagination strategy behind it (native `LIMIT`/`OFFSET`, cursor tokens,
//! or skip-then-take over a limit-only driver) can change without touching
//! the control loop.

use crate::error::Result;
use crate::record::Record;
use async_trait::async_trait;

/// A paginated reader over the tabular source
///
/// Offsets are logical row counts, not driver cursors: `fetch_batch(o, n)`
/// returns up to `n` records starting at row `o` of a stable ordering.
#[async_trait]
pub trait SourceReader: Send {
    /// Fetch up to `limit` records starting at logical `offset`
    ///
    /// An empty batch is the one and only exhaustion signal. Connectivity
    /// or query failures are fatal to the run and must be returned as
    /// errors, never retried here.
    async fn fetch_batch(&mut self, offset: u64, limit: usize) -> Result<Vec<Record>>;

    /// Release the underlying connection
    ///
    /// Called on every controller exit path; failures are logged by the
    /// implementation, not raised.
    async fn close(&mut self);
}

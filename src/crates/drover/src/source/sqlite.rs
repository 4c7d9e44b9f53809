//! SQLite source adapter
//!
//! Concrete [`SourceReader`] paginating a table (or a custom base query)
//! with `LIMIT ? OFFSET ?` windows over a configured order column.

use crate::config::SourceConfig;
use async_trait::async_trait;
use drover_core::{ExportError, FieldValue, Record, Result, SourceReader};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row, TypeInfo, ValueRef};
use tracing::{debug, info, warn};

/// Paginated reader over a SQLite database
pub struct SqliteSource {
    pool: SqlitePool,
    query: String,
}

impl SqliteSource {
    /// Connect to the configured database and prepare the scan query
    pub async fn connect(config: &SourceConfig) -> Result<Self> {
        if config.username.is_some() || config.password.is_some() {
            warn!("Source credentials are configured but SQLite does not authenticate; ignoring them");
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&config.database_url)
            .await
            .map_err(|e| ExportError::Source(e.into()))?;

        let base = config
            .query
            .clone()
            .unwrap_or_else(|| format!("SELECT * FROM {}", config.table));
        let query = format!("{} ORDER BY {} LIMIT ? OFFSET ?", base, config.order_column);

        info!(database_url = %config.database_url, "Connected to source database");
        Ok(Self { pool, query })
    }
}

#[async_trait]
impl SourceReader for SqliteSource {
    async fn fetch_batch(&mut self, offset: u64, limit: usize) -> Result<Vec<Record>> {
        let rows = sqlx::query(&self.query)
            .bind(limit as i64)
            .bind(offset as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ExportError::Source(e.into()))?;

        debug!(offset = offset, limit = limit, rows = rows.len(), "Fetched batch");
        rows.iter().map(row_to_record).collect()
    }

    async fn close(&mut self) {
        self.pool.close().await;
        debug!("Source connection pool closed");
    }
}

/// Convert one dynamically-typed row into a [`Record`]
///
/// SQLite values carry their storage class at runtime, so decoding keys
/// off the value's type, not the column declaration.
fn row_to_record(row: &SqliteRow) -> Result<Record> {
    let mut record = Record::new();

    for column in row.columns() {
        let index = column.ordinal();
        let raw = row
            .try_get_raw(index)
            .map_err(|e| ExportError::Source(e.into()))?;

        let value = if raw.is_null() {
            FieldValue::Null
        } else {
            let type_name = raw.type_info().name().to_string();
            match type_name.as_str() {
                "INTEGER" => FieldValue::Int(
                    row.try_get::<i64, _>(index)
                        .map_err(|e| ExportError::Source(e.into()))?,
                ),
                "REAL" => FieldValue::Float(
                    row.try_get::<f64, _>(index)
                        .map_err(|e| ExportError::Source(e.into()))?,
                ),
                "BOOLEAN" => FieldValue::Bool(
                    row.try_get::<bool, _>(index)
                        .map_err(|e| ExportError::Source(e.into()))?,
                ),
                "BLOB" => FieldValue::Bytes(
                    row.try_get::<Vec<u8>, _>(index)
                        .map_err(|e| ExportError::Source(e.into()))?,
                ),
                _ => FieldValue::Text(
                    row.try_get::<String, _>(index)
                        .map_err(|e| ExportError::Source(e.into()))?,
                ),
            }
        };

        record.insert(column.name(), value);
    }

    Ok(record)
}

//! File-backed stream transport
//!
//! Reference [`SinkTransport`] writing a directory of ndjson partition
//! files, one `{"key": ..., "value": ...}` envelope per line. It stands
//! in for a real broker client so the exporter runs end to end, and it
//! keeps the broker's observable behavior: keyed partitioning, an
//! acknowledged send, and an explicit durability flush.

use async_trait::async_trait;
use drover_core::SinkTransport;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Sink transport appending to `<topic>-<partition>.ndjson` files
pub struct FileStreamTransport {
    files: Vec<File>,
    paths: Vec<PathBuf>,
    partitions: u32,
}

impl FileStreamTransport {
    /// Open (or create) the partition files under `directory`
    ///
    /// `client_id` identifies this producer in the logs, the way a broker
    /// client would report itself. A partition count of zero is treated
    /// as one: every key must have somewhere to land.
    pub async fn new(
        directory: &Path,
        topic: &str,
        client_id: &str,
        partitions: u32,
    ) -> anyhow::Result<Self> {
        let partitions = partitions.max(1);
        tokio::fs::create_dir_all(directory).await?;

        let mut files = Vec::with_capacity(partitions as usize);
        let mut paths = Vec::with_capacity(partitions as usize);
        for partition in 0..partitions {
            let path = directory.join(format!("{}-{}.ndjson", topic, partition));
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .await?;
            files.push(file);
            paths.push(path);
        }

        debug!(
            directory = %directory.display(),
            topic = topic,
            client_id = client_id,
            partitions = partitions,
            "Opened file stream transport"
        );
        Ok(Self {
            files,
            paths,
            partitions,
        })
    }

    /// Partition a key the way the stream would
    ///
    /// The hash is deterministic within a build, so a resumed run keeps
    /// appending each key to the same partition file.
    pub fn partition_for(&self, key: &str) -> u32 {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % self.partitions as u64) as u32
    }

    /// Path of a partition file, for inspection
    pub fn partition_path(&self, partition: u32) -> &Path {
        &self.paths[partition as usize]
    }
}

#[async_trait]
impl SinkTransport for FileStreamTransport {
    async fn send(&mut self, key: &str, payload: &str) -> anyhow::Result<()> {
        let partition = self.partition_for(key);
        let line = format!("{{\"key\":{},\"value\":{}}}\n", serde_json::to_string(key)?, payload);

        self.files[partition as usize]
            .write_all(line.as_bytes())
            .await?;
        Ok(())
    }

    async fn flush(&mut self) -> anyhow::Result<()> {
        for file in &mut self.files {
            file.sync_data().await?;
        }
        Ok(())
    }

    async fn close(&mut self) {
        for (partition, file) in self.files.iter_mut().enumerate() {
            if let Err(e) = file.sync_data().await {
                warn!(partition = partition, error = %e, "Failed to sync partition file on close");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn open(dir: &Path, topic: &str, partitions: u32) -> FileStreamTransport {
        FileStreamTransport::new(dir, topic, "test-client", partitions)
            .await
            .unwrap()
    }

    async fn read_partition(transport: &FileStreamTransport, partition: u32) -> String {
        tokio::fs::read_to_string(transport.partition_path(partition))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_send_writes_envelope_line() {
        let dir = TempDir::new().unwrap();
        let mut transport = open(dir.path(), "events", 1).await;

        transport.send("user-1", r#"{"id":1,"name":"ada"}"#).await.unwrap();
        transport.flush().await.unwrap();

        let content = read_partition(&transport, 0).await;
        let line: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
        assert_eq!(line["key"], "user-1");
        assert_eq!(line["value"]["id"], 1);
        assert_eq!(line["value"]["name"], "ada");
    }

    #[tokio::test]
    async fn test_same_key_lands_in_same_partition() {
        let dir = TempDir::new().unwrap();
        let transport = open(dir.path(), "events", 8).await;

        let first = transport.partition_for("stable-key");
        for _ in 0..10 {
            assert_eq!(transport.partition_for("stable-key"), first);
        }
    }

    #[tokio::test]
    async fn test_partitions_stay_in_range() {
        let dir = TempDir::new().unwrap();
        let transport = open(dir.path(), "events", 3).await;

        for i in 0..100 {
            let partition = transport.partition_for(&format!("key-{}", i));
            assert!(partition < 3);
        }
    }

    #[tokio::test]
    async fn test_creates_one_file_per_partition() {
        let dir = TempDir::new().unwrap();
        let _transport = open(dir.path(), "orders", 4).await;

        for partition in 0..4 {
            assert!(dir.path().join(format!("orders-{}.ndjson", partition)).exists());
        }
    }

    #[tokio::test]
    async fn test_zero_partitions_is_clamped_to_one() {
        let dir = TempDir::new().unwrap();
        let mut transport = open(dir.path(), "events", 0).await;

        assert_eq!(transport.partition_for("any-key"), 0);
        transport.send("any-key", r#"{"x":1}"#).await.unwrap();
        transport.flush().await.unwrap();

        assert!(dir.path().join("events-0.ndjson").exists());
    }

    #[tokio::test]
    async fn test_key_with_quotes_is_escaped() {
        let dir = TempDir::new().unwrap();
        let mut transport = open(dir.path(), "events", 1).await;

        transport.send(r#"we"ird"#, r#"{"x":1}"#).await.unwrap();
        transport.flush().await.unwrap();

        let content = read_partition(&transport, 0).await;
        let line: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
        assert_eq!(line["key"], r#"we"ird"#);
    }

    #[tokio::test]
    async fn test_reopening_appends() {
        let dir = TempDir::new().unwrap();

        {
            let mut transport = open(dir.path(), "events", 1).await;
            transport.send("k", r#"{"n":1}"#).await.unwrap();
            transport.close().await;
        }
        {
            let mut transport = open(dir.path(), "events", 1).await;
            transport.send("k", r#"{"n":2}"#).await.unwrap();
            transport.close().await;
        }

        let transport = open(dir.path(), "events", 1).await;
        let content = read_partition(&transport, 0).await;
        assert_eq!(content.lines().count(), 2);
    }
}

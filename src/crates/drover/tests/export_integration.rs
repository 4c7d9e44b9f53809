//! End-to-end export runs over real files: a SQLite source database, the
//! file-stream sink, and a JSON checkpoint on disk.

use drover::config::{DroverConfig, ExportConfig, SinkConfig, SourceConfig};
use drover::{
    Exporter, FileStreamTransport, JsonFileCheckpointStore, RetryPolicy, RunOutcome,
    ShutdownCoordinator, SinkWriter, SqliteSource,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

async fn seed_users(db: &Path, ids: std::ops::RangeInclusive<i64>) {
    let options = SqliteConnectOptions::new()
        .filename(db)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();

    sqlx::query("CREATE TABLE IF NOT EXISTS users (id INTEGER PRIMARY KEY, name TEXT, score REAL)")
        .execute(&pool)
        .await
        .unwrap();

    for id in ids {
        sqlx::query("INSERT INTO users (id, name, score) VALUES (?, ?, ?)")
            .bind(id)
            .bind(format!("user-{}", id))
            .bind(id as f64 / 2.0)
            .execute(&pool)
            .await
            .unwrap();
    }

    pool.close().await;
}

struct Env {
    _dir: TempDir,
    db: PathBuf,
    sink_dir: PathBuf,
    checkpoint: PathBuf,
}

impl Env {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("source.db");
        let sink_dir = dir.path().join("stream");
        let checkpoint = dir.path().join("checkpoint.json");
        Self {
            _dir: dir,
            db,
            sink_dir,
            checkpoint,
        }
    }

    fn config(&self, batch_size: usize, total_records: u64) -> DroverConfig {
        let mut config = DroverConfig::default();
        config.source = SourceConfig {
            database_url: format!("sqlite://{}", self.db.display()),
            table: "users".to_string(),
            query: None,
            order_column: "id".to_string(),
            username: None,
            password: None,
        };
        config.sink = SinkConfig {
            directory: self.sink_dir.display().to_string(),
            topic: "users".to_string(),
            client_id: "integration-test".to_string(),
            partitions: 2,
        };
        config.export = ExportConfig {
            batch_size,
            total_records,
            checkpoint_file: self.checkpoint.display().to_string(),
        };
        config
    }

    async fn run(&self, config: &DroverConfig) -> RunOutcome {
        let source = SqliteSource::connect(&config.source).await.unwrap();
        let transport = FileStreamTransport::new(
            Path::new(&config.sink.directory),
            &config.sink.topic,
            &config.sink.client_id,
            config.sink.partitions,
        )
        .await
        .unwrap();
        let store = JsonFileCheckpointStore::new(&config.export.checkpoint_file);
        let shutdown = ShutdownCoordinator::new();
        let writer = SinkWriter::new(transport, RetryPolicy::from(&config.retry), shutdown.clone());
        let mut exporter = Exporter::new(source, writer, store, config.export.clone(), shutdown);

        exporter.run().await.unwrap()
    }

    /// Every envelope across all partition files, keyed by record key
    fn delivered(&self, config: &DroverConfig) -> HashMap<String, serde_json::Value> {
        let mut seen = HashMap::new();
        for partition in 0..config.sink.partitions {
            let path = Path::new(&config.sink.directory)
                .join(format!("{}-{}.ndjson", config.sink.topic, partition));
            if !path.exists() {
                continue;
            }
            for line in std::fs::read_to_string(&path).unwrap().lines() {
                let envelope: serde_json::Value = serde_json::from_str(line).unwrap();
                let key = envelope["key"].as_str().unwrap().to_string();
                let previous = seen.insert(key.clone(), envelope["value"].clone());
                assert!(previous.is_none(), "key {} delivered twice", key);
            }
        }
        seen
    }

    fn checkpoint_json(&self) -> serde_json::Value {
        serde_json::from_str(&std::fs::read_to_string(&self.checkpoint).unwrap()).unwrap()
    }
}

#[tokio::test]
async fn test_full_export_run() {
    let env = Env::new();
    seed_users(&env.db, 1..=10).await;
    let config = env.config(4, 10);

    let outcome = env.run(&config).await;
    assert_eq!(outcome, RunOutcome::Completed);

    // Checkpoint on disk carries the sealed run in its stable field names.
    let checkpoint = env.checkpoint_json();
    assert_eq!(checkpoint["lastProcessedOffset"], 10);
    assert_eq!(checkpoint["batchesProcessed"], 3);
    assert_eq!(checkpoint["recordsProcessed"], 10);
    assert_eq!(checkpoint["completed"], true);
    assert!(checkpoint.get("errorMessage").is_none());

    // Every row arrived exactly once, with its column values intact.
    let delivered = env.delivered(&config);
    assert_eq!(delivered.len(), 10);
    for id in 1..=10 {
        let value = &delivered[&id.to_string()];
        assert_eq!(value["id"], id);
        assert_eq!(value["name"], format!("user-{}", id));
    }
}

#[tokio::test]
async fn test_config_file_drives_a_run() {
    let env = Env::new();
    seed_users(&env.db, 1..=6).await;

    let toml_path = env._dir.path().join("drover.toml");
    let mut file = std::fs::File::create(&toml_path).unwrap();
    write!(
        file,
        r#"
[source]
database_url = "sqlite://{db}"
table = "users"

[sink]
directory = "{sink}"
topic = "users"
partitions = 2

[export]
batch_size = 3
total_records = 6
checkpoint_file = "{checkpoint}"
"#,
        db = env.db.display(),
        sink = env.sink_dir.display(),
        checkpoint = env.checkpoint.display(),
    )
    .unwrap();

    let config = DroverConfig::load(&toml_path).unwrap();
    let outcome = env.run(&config).await;

    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!(env.delivered(&config).len(), 6);
}

#[tokio::test]
async fn test_resume_picks_up_where_the_last_run_stopped() {
    let env = Env::new();
    seed_users(&env.db, 1..=4).await;
    let config = env.config(4, 10);

    // First run drains the 4 available rows and stops short of the target.
    let outcome = env.run(&config).await;
    assert_eq!(outcome, RunOutcome::SourceExhausted);

    let checkpoint = env.checkpoint_json();
    assert_eq!(checkpoint["recordsProcessed"], 4);
    assert_eq!(checkpoint["completed"], false);
    assert!(checkpoint.get("errorMessage").is_none());

    // More rows land, and a second run finishes the job from offset 4.
    seed_users(&env.db, 5..=10).await;
    let outcome = env.run(&config).await;
    assert_eq!(outcome, RunOutcome::Completed);

    let checkpoint = env.checkpoint_json();
    assert_eq!(checkpoint["lastProcessedOffset"], 10);
    assert_eq!(checkpoint["recordsProcessed"], 10);
    assert_eq!(checkpoint["completed"], true);

    // No row was exported twice across the two runs.
    let delivered = env.delivered(&config);
    assert_eq!(delivered.len(), 10);
}

#[tokio::test]
async fn test_completed_checkpoint_blocks_further_runs() {
    let env = Env::new();
    seed_users(&env.db, 1..=5).await;
    let config = env.config(5, 5);

    assert_eq!(env.run(&config).await, RunOutcome::Completed);
    assert_eq!(env.run(&config).await, RunOutcome::AlreadyCompleted);

    // The second run sent nothing: still exactly one envelope per row.
    assert_eq!(env.delivered(&config).len(), 5);
}

#[tokio::test]
async fn test_corrupt_checkpoint_restarts_from_scratch() {
    let env = Env::new();
    seed_users(&env.db, 1..=5).await;
    let config = env.config(5, 5);

    std::fs::write(&env.checkpoint, "{ definitely not json").unwrap();

    let outcome = env.run(&config).await;
    assert_eq!(outcome, RunOutcome::Completed);

    let checkpoint = env.checkpoint_json();
    assert_eq!(checkpoint["recordsProcessed"], 5);
    assert_eq!(checkpoint["completed"], true);
}

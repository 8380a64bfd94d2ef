//! Document-oriented backend on sled
//!
//! Each entry is stored as a JSON document whose `metadata` field is a native
//! nested object. Keys are `created_at` followed by a store-generated sequence
//! number, both big-endian, so a key range is a range predicate on the
//! timestamp and reverse iteration yields newest first.

use super::{LogBackend, NewLogEntry, StorageError, StoredLogEntry};
use crate::clock::Clock;
use crate::config::BackendKind;
use crate::window::TimeBound;
use anyhow::Context;
use async_trait::async_trait;
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ops::Bound;
use std::path::Path;
use std::sync::Arc;

const TREE_NAME: &str = "logs";
const KEY_LEN: usize = 16;

/// Stored document layout
#[derive(Debug, Serialize, Deserialize)]
struct LogDocument {
    id: u64,
    service_name: String,
    level: String,
    message: Option<String>,
    metadata: Value,
    /// Unix milliseconds
    created_at: i64,
}

/// sled-backed log store
pub struct DocumentBackend {
    db: sled::Db,
    tree: sled::Tree,
    clock: Arc<dyn Clock>,
}

impl DocumentBackend {
    /// Open (creating if missing) the store at `path`
    pub fn open(path: impl AsRef<Path>, clock: Arc<dyn Clock>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let db = sled::open(path)
            .with_context(|| format!("Failed to open document store at {}", path.display()))?;
        Self::with_db(db, clock)
    }

    /// Wrap an already opened database
    pub fn with_db(db: sled::Db, clock: Arc<dyn Clock>) -> anyhow::Result<Self> {
        let tree = db
            .open_tree(TREE_NAME)
            .context("Failed to open document store tree")?;
        Ok(Self { db, tree, clock })
    }
}

#[async_trait]
impl LogBackend for DocumentBackend {
    async fn insert(&self, entry: NewLogEntry) -> Result<(), StorageError> {
        let created_at = self.clock.now().timestamp_millis();
        let (db, tree) = (self.db.clone(), self.tree.clone());
        tokio::task::spawn_blocking(move || write_document(&db, &tree, entry, created_at)).await?
    }

    async fn query(&self, bound: TimeBound) -> Result<Vec<StoredLogEntry>, StorageError> {
        let tree = self.tree.clone();
        tokio::task::spawn_blocking(move || scan_newest_first(&tree, bound)).await?
    }

    async fn ping(&self) -> Result<(), StorageError> {
        self.db.size_on_disk()?;
        Ok(())
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Document
    }
}

fn write_document(
    db: &sled::Db,
    tree: &sled::Tree,
    entry: NewLogEntry,
    created_at: i64,
) -> Result<(), StorageError> {
    let id = db.generate_id()?;

    let document = LogDocument {
        id,
        service_name: entry.service_name,
        level: entry.level,
        message: entry.message,
        metadata: Value::Object(entry.metadata),
        created_at,
    };
    let value = serde_json::to_vec(&document)?;

    tree.insert(document_key(created_at, id), value)?;
    tree.flush()?;
    Ok(())
}

fn scan_newest_first(tree: &sled::Tree, bound: TimeBound) -> Result<Vec<StoredLogEntry>, StorageError> {
    if let (Some(lower), Some(upper)) = (bound.lower, bound.upper) {
        if lower >= upper {
            return Ok(Vec::new());
        }
    }

    // Sequence 0 is the smallest key for a given millisecond
    let start = match bound.lower {
        Some(lower) => Bound::Included(document_key(lower.timestamp_millis(), 0)),
        None => Bound::Unbounded,
    };
    let end = match bound.upper {
        Some(upper) => Bound::Excluded(document_key(upper.timestamp_millis(), 0)),
        None => Bound::Unbounded,
    };

    let mut entries = Vec::new();
    for item in tree.range::<[u8; KEY_LEN], _>((start, end)).rev() {
        let (key, value) = item?;
        entries.push(decode_document(&key, &value)?);
    }
    Ok(entries)
}

fn decode_document(key: &[u8], value: &[u8]) -> Result<StoredLogEntry, StorageError> {
    let malformed = |reason: String| StorageError::MalformedRecord {
        id: key_label(key),
        reason,
    };

    let document: LogDocument =
        serde_json::from_slice(value).map_err(|e| malformed(e.to_string()))?;

    let metadata = match document.metadata {
        Value::Object(map) => map,
        _ => return Err(malformed("metadata is not an object".to_string())),
    };

    let created_at = DateTime::from_timestamp_millis(document.created_at)
        .ok_or_else(|| malformed(format!("created_at out of range: {}", document.created_at)))?;

    Ok(StoredLogEntry {
        service_name: document.service_name,
        level: document.level,
        message: document.message.unwrap_or_default(),
        metadata,
        created_at,
    })
}

/// Order-preserving key: sign-flipped timestamp, then sequence
fn document_key(created_at_ms: i64, id: u64) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    key[..8].copy_from_slice(&((created_at_ms as u64) ^ (1 << 63)).to_be_bytes());
    key[8..].copy_from_slice(&id.to_be_bytes());
    key
}

fn key_label(key: &[u8]) -> String {
    match key.get(8..KEY_LEN).and_then(|b| <[u8; 8]>::try_from(b).ok()) {
        Some(seq) => u64::from_be_bytes(seq).to_string(),
        None => format!("{:?}", key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::codec::decode_metadata;
    use chrono::{TimeDelta, TimeZone, Utc};
    use serde_json::json;

    fn create_test_store(clock: Arc<FixedClock>) -> DocumentBackend {
        let db = sled::Config::new().temporary(true).open().unwrap();
        DocumentBackend::with_db(db, clock).unwrap()
    }

    fn start() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 2, 10, 0, 0).unwrap()
    }

    fn entry(service: &str, metadata: &str) -> NewLogEntry {
        NewLogEntry {
            service_name: service.to_string(),
            level: "WARN".to_string(),
            message: Some("disk almost full".to_string()),
            metadata: decode_metadata(metadata).unwrap(),
        }
    }

    #[test]
    fn test_keys_sort_by_time_then_sequence() {
        assert!(document_key(-1, 9) < document_key(0, 0));
        assert!(document_key(1_000, 5) < document_key(1_001, 0));
        assert!(document_key(1_000, 1) < document_key(1_000, 2));
        assert_eq!(key_label(&document_key(1_000, 42)), "42");
    }

    #[tokio::test]
    async fn test_metadata_is_stored_as_nested_document() {
        let store = create_test_store(Arc::new(FixedClock::new(start())));
        store.insert(entry("disk", r#"{"mount":{"path":"/var","free":3}}"#)).await.unwrap();

        let (_, raw) = store.tree.iter().next().unwrap().unwrap();
        let stored: Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(stored["metadata"]["mount"]["free"], json!(3));
        assert_eq!(stored["created_at"], json!(start().timestamp_millis()));
    }

    #[tokio::test]
    async fn test_range_scan_respects_bounds_and_order() {
        let clock = Arc::new(FixedClock::new(start()));
        let store = create_test_store(clock.clone());

        for i in 0..4 {
            store.insert(entry(&format!("svc-{}", i), "{}")).await.unwrap();
            clock.advance(TimeDelta::hours(1));
        }

        let all = store.query(TimeBound::unbounded()).await.unwrap();
        let names: Vec<_> = all.iter().map(|e| e.service_name.as_str()).collect();
        assert_eq!(names, ["svc-3", "svc-2", "svc-1", "svc-0"]);

        let bound = TimeBound::between(start() + TimeDelta::hours(1), start() + TimeDelta::hours(3));
        let window = store.query(bound).await.unwrap();
        let names: Vec<_> = window.iter().map(|e| e.service_name.as_str()).collect();
        assert_eq!(names, ["svc-2", "svc-1"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inserts_share_a_timestamp() {
        let store = Arc::new(create_test_store(Arc::new(FixedClock::new(start()))));

        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.insert(entry(&format!("svc-{}", i), "{}")).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let all = store.query(TimeBound::since(start())).await.unwrap();
        assert_eq!(all.len(), 16);
        assert!(all.iter().all(|e| e.created_at == start()));
    }

    #[tokio::test]
    async fn test_inverted_bound_is_empty() {
        let store = create_test_store(Arc::new(FixedClock::new(start())));
        store.insert(entry("svc", "{}")).await.unwrap();

        let bound = TimeBound::between(start() + TimeDelta::hours(1), start());
        assert!(store.query(bound).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_object_metadata_is_malformed() {
        let store = create_test_store(Arc::new(FixedClock::new(start())));
        let raw = json!({
            "id": 7,
            "service_name": "bad",
            "level": "INFO",
            "message": null,
            "metadata": [1, 2, 3],
            "created_at": start().timestamp_millis(),
        });
        store
            .tree
            .insert(document_key(start().timestamp_millis(), 7), serde_json::to_vec(&raw).unwrap())
            .unwrap();

        match store.query(TimeBound::unbounded()).await {
            Err(StorageError::MalformedRecord { id, .. }) => assert_eq!(id, "7"),
            other => panic!("expected MalformedRecord, got {:?}", other),
        }
    }
}

//! # Validator Store
//!
//! Persists, per forecast offset, the last-known HTTP cache validators (ETag
//! and Last-Modified) so future requests can ask the server "has this
//! changed?" instead of re-downloading. The table lives in memory, is loaded
//! once at startup, and is saved lazily: only when something changed since
//! the last save.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io;
use tracing::{debug, warn};

use crate::offsets::HourOffset;

/// Cache validators for one offset. A record is kept only when at least one
/// field is present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

impl ValidatorRecord {
    pub fn is_empty(&self) -> bool {
        self.etag.is_none() && self.last_modified.is_none()
    }
}

#[derive(Debug, Default)]
struct Inner {
    records: HashMap<HourOffset, ValidatorRecord>,
    dirty: bool,
}

/// Validator table persisted as one JSON document mapping string-ified
/// offsets to records.
#[derive(Debug)]
pub struct ValidatorStore {
    path: PathBuf,
    inner: Mutex<Inner>,
}

impl ValidatorStore {
    /// Load the store from `path`. A missing or unparseable document degrades
    /// to an empty table; corrupt metadata must never block startup.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let records = match fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<HashMap<String, ValidatorRecord>>(&bytes) {
                Ok(map) => map
                    .into_iter()
                    .filter_map(|(key, record)| {
                        key.parse::<HourOffset>().ok().map(|offset| (offset, record))
                    })
                    .filter(|(_, record)| !record.is_empty())
                    .collect(),
                Err(e) => {
                    warn!(path = ?path, error = %e, "Failed to parse validator metadata, starting empty");
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                warn!(path = ?path, error = %e, "Failed to read validator metadata, starting empty");
                HashMap::new()
            }
        };

        debug!(path = ?path, entries = records.len(), "Validator store loaded");
        Self {
            path,
            inner: Mutex::new(Inner {
                records,
                dirty: false,
            }),
        }
    }

    /// Validators last seen for `offset`; an empty record if unknown.
    pub fn headers_for(&self, offset: HourOffset) -> ValidatorRecord {
        self.inner
            .lock()
            .records
            .get(&offset)
            .cloned()
            .unwrap_or_default()
    }

    /// Merge non-empty fields into the record for `offset`, creating it if
    /// absent. In-memory mutation only; marks the store dirty.
    pub fn update(
        &self,
        offset: HourOffset,
        etag: Option<String>,
        last_modified: Option<String>,
    ) {
        if etag.is_none() && last_modified.is_none() {
            return;
        }
        let mut inner = self.inner.lock();
        let record = inner.records.entry(offset).or_default();
        if let Some(etag) = etag {
            record.etag = Some(etag);
        }
        if let Some(last_modified) = last_modified {
            record.last_modified = Some(last_modified);
        }
        inner.dirty = true;
    }

    /// Serialize the full table to disk if anything changed since the last
    /// save; a no-op otherwise.
    pub async fn save(&self) -> io::Result<()> {
        let json = {
            let inner = self.inner.lock();
            if !inner.dirty {
                return Ok(());
            }
            // String keys, sorted, to keep the document diff-friendly.
            let by_key: BTreeMap<String, &ValidatorRecord> = inner
                .records
                .iter()
                .map(|(offset, record)| (offset.to_string(), record))
                .collect();
            serde_json::to_vec_pretty(&by_key).map_err(|e| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("Failed to serialize validator metadata: {e}"),
                )
            })?
        };

        // Write to a temporary file then rename so a crash mid-write cannot
        // leave a truncated document behind.
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, &json).await?;
        if let Err(e) = fs::rename(&temp_path, &self.path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e);
        }

        self.inner.lock().dirty = false;
        debug!(path = ?self.path, "Validator metadata saved");
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn is_dirty(&self) -> bool {
        self.inner.lock().dirty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_document_loads_empty() {
        let dir = tempdir().unwrap();
        let store = ValidatorStore::load(dir.path().join("metadata.json")).await;
        assert!(store.headers_for(6).is_empty());
        assert!(!store.is_dirty());
    }

    #[tokio::test]
    async fn test_update_and_reload_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("metadata.json");

        let store = ValidatorStore::load(&path).await;
        store.update(90, Some("\"abc\"".to_owned()), None);
        store.update(90, None, Some("Mon, 01 Jan 2026 00:00:00 GMT".to_owned()));
        store.save().await.unwrap();

        let reloaded = ValidatorStore::load(&path).await;
        let record = reloaded.headers_for(90);
        assert_eq!(record.etag.as_deref(), Some("\"abc\""));
        assert_eq!(
            record.last_modified.as_deref(),
            Some("Mon, 01 Jan 2026 00:00:00 GMT")
        );
        assert!(reloaded.headers_for(96).is_empty());
    }

    #[tokio::test]
    async fn test_save_is_idempotent_when_clean() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("metadata.json");

        let store = ValidatorStore::load(&path).await;
        store.update(12, Some("\"tag\"".to_owned()), None);
        store.save().await.unwrap();

        // With no intervening update, a second save must not write again.
        fs::remove_file(&path).await.unwrap();
        store.save().await.unwrap();
        assert!(!fs::try_exists(&path).await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_update_is_a_no_op() {
        let dir = tempdir().unwrap();
        let store = ValidatorStore::load(dir.path().join("metadata.json")).await;
        store.update(18, None, None);
        assert!(!store.is_dirty());
        assert!(store.headers_for(18).is_empty());
    }

    #[tokio::test]
    async fn test_malformed_document_recovers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("metadata.json");
        fs::write(&path, b"{ not json").await.unwrap();

        let store = ValidatorStore::load(&path).await;
        assert!(store.headers_for(6).is_empty());
        assert!(store.headers_for(240).is_empty());

        store.update(6, Some("\"fresh\"".to_owned()), None);
        store.save().await.unwrap();

        let reloaded = ValidatorStore::load(&path).await;
        assert_eq!(reloaded.headers_for(6).etag.as_deref(), Some("\"fresh\""));
    }
}

//! File-backed release record store.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;

use crate::observability::metrics;
use crate::records::{RecordStore, ReleaseRecord, StoreError};

/// A thread-safe record store persisted as a JSON file.
///
/// Every mutation is written through to disk so records survive a
/// process restart.
#[derive(Clone)]
pub struct FileRecordStore {
    inner: Arc<DashMap<String, ReleaseRecord>>,
    path: PathBuf,
}

impl FileRecordStore {
    /// Open a store, loading existing records if the file is present.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let store = Self {
            inner: Arc::new(DashMap::new()),
            path,
        };

        if store.path.exists() {
            let file = File::open(&store.path)
                .map_err(|e| StoreError::Backend(format!("Open failed: {}", e)))?;
            let reader = BufReader::new(file);
            let map: std::collections::HashMap<String, ReleaseRecord> =
                serde_json::from_reader(reader)
                    .map_err(|e| StoreError::Backend(format!("Parse failed: {}", e)))?;

            for (k, v) in map {
                store.inner.insert(k, v);
            }
            metrics::record_store_size(store.inner.len());
            tracing::info!(
                path = %store.path.display(),
                count = store.inner.len(),
                "Loaded release records"
            );
        }

        Ok(store)
    }

    fn persist(&self) -> Result<(), StoreError> {
        let file = File::create(&self.path)
            .map_err(|e| StoreError::Backend(format!("Create failed: {}", e)))?;
        let mut writer = BufWriter::new(file);

        let map: std::collections::HashMap<_, _> = self
            .inner
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect();

        serde_json::to_writer_pretty(&mut writer, &map)
            .map_err(|e| StoreError::Backend(format!("Serialize failed: {}", e)))?;
        writer
            .flush()
            .map_err(|e| StoreError::Backend(format!("Flush failed: {}", e)))?;

        metrics::record_store_size(map.len());
        tracing::debug!(path = %self.path.display(), count = map.len(), "Saved release records");
        Ok(())
    }
}

impl RecordStore for FileRecordStore {
    fn get(&self, id: &str) -> Result<ReleaseRecord, StoreError> {
        self.inner
            .get(id)
            .map(|r| r.value().clone())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn put(&self, record: ReleaseRecord) -> Result<(), StoreError> {
        self.inner.insert(record.id.clone(), record);
        self.persist()
    }

    fn update_decrypted(&self, id: &str, url: &str) -> Result<ReleaseRecord, StoreError> {
        let updated = {
            let mut entry = self
                .inner
                .get_mut(id)
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            entry.decrypted_media_url = Some(url.to_string());
            entry.clone()
        };
        self.persist()?;
        Ok(updated)
    }

    fn list(&self) -> Vec<ReleaseRecord> {
        let mut records: Vec<_> = self.inner.iter().map(|r| r.value().clone()).collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        records
    }
}

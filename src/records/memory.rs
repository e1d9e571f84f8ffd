//! In-memory release record store.

use std::sync::Arc;

use dashmap::DashMap;

use crate::records::{RecordStore, ReleaseRecord, StoreError};

/// Volatile record store for tests and dry runs.
#[derive(Clone, Default)]
pub struct MemoryRecordStore {
    inner: Arc<DashMap<String, ReleaseRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryRecordStore {
    fn get(&self, id: &str) -> Result<ReleaseRecord, StoreError> {
        self.inner
            .get(id)
            .map(|r| r.value().clone())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn put(&self, record: ReleaseRecord) -> Result<(), StoreError> {
        self.inner.insert(record.id.clone(), record);
        Ok(())
    }

    fn update_decrypted(&self, id: &str, url: &str) -> Result<ReleaseRecord, StoreError> {
        let mut entry = self
            .inner
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        entry.decrypted_media_url = Some(url.to_string());
        Ok(entry.clone())
    }

    fn list(&self) -> Vec<ReleaseRecord> {
        let mut records: Vec<_> = self.inner.iter().map(|r| r.value().clone()).collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        records
    }
}

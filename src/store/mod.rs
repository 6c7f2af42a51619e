//! Ephemeral document store
//!
//! Keeps saved documents in memory for the lifetime of the process. A warm
//! process shares one store across every invocation it serves; a fresh
//! process starts empty, so ids issued by a retired process never resolve.
//!
//! Id allocation and insertion happen under a single mutex, which keeps ids
//! dense and unique even when saves arrive concurrently.

mod record;

pub use record::{DocumentRecord, TXT_SUFFIX};

use record::{timestamped_filename, with_txt_suffix};

use chrono::Local;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

use crate::logger;

/// Store lookup failure
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("document {0} not found")]
    NotFound(u64),
}

#[derive(Debug, Default)]
struct StoreInner {
    records: HashMap<u64, DocumentRecord>,
    next_id: u64,
}

/// Process-lifetime map from id to document
#[derive(Debug, Default)]
pub struct DocumentStore {
    inner: Mutex<StoreInner>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new document and return the stored record.
    ///
    /// An absent or empty `filename` is replaced by a timestamped one; a
    /// filename without the `.txt` suffix gets it appended. Saving the same
    /// filename twice creates two records.
    pub fn save(&self, filename: Option<&str>, content: impl Into<String>) -> DocumentRecord {
        let filename = match filename.filter(|name| !name.is_empty()) {
            Some(name) => with_txt_suffix(name),
            None => timestamped_filename(&Local::now()),
        };

        let record = {
            let mut inner = self.lock();
            let id = inner.next_id;
            inner.next_id += 1;
            let record = DocumentRecord {
                id,
                filename,
                content: content.into(),
            };
            inner.records.insert(id, record.clone());
            record
        };

        logger::log_document_saved(record.id, &record.filename, record.content.len());
        record
    }

    /// Exact lookup by id
    pub fn get(&self, id: u64) -> Result<DocumentRecord, StoreError> {
        self.lock()
            .records
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // The guarded data is consistent between statements, so a poisoned lock is safe to reuse.
    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

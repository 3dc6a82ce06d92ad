//! In-memory adapters.
//!
//! Thread-safe implementations of the adapter traits, intended for embedded
//! usage and tests.

use std::sync::RwLock;

use crate::adapter::traits::{RecordSink, RecordSource};
use crate::error::AdapterError;
use crate::record::{CanonicalRecord, RawRecord};

fn lock_err(context: &'static str) -> AdapterError {
    AdapterError::Persist {
        message: format!("poisoned lock: {context}"),
    }
}

/// A source backed by a fixed set of records.
#[derive(Debug, Default)]
pub struct MemorySource {
    records: Vec<RawRecord>,
}

impl MemorySource {
    /// Creates a source serving `records`.
    #[must_use]
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self { records }
    }

    /// Decodes a JSON array of API-style result objects.
    ///
    /// # Errors
    ///
    /// Returns `AdapterError::Decode` if `value` is not an array of objects.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, AdapterError> {
        let serde_json::Value::Array(items) = value else {
            return Err(AdapterError::Decode {
                message: "expected a JSON array of records".to_string(),
            });
        };
        let records = items
            .iter()
            .map(RawRecord::from_json)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { records })
    }

    /// Returns the number of records served.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the source holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordSource for MemorySource {
    fn fetch_all(&self) -> Result<Vec<RawRecord>, AdapterError> {
        Ok(self.records.clone())
    }
}

/// A sink collecting canonical records in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: RwLock<Vec<CanonicalRecord>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of everything persisted so far.
    ///
    /// # Errors
    ///
    /// Returns `AdapterError::Persist` if the lock is poisoned.
    pub fn records(&self) -> Result<Vec<CanonicalRecord>, AdapterError> {
        let guard = self.records.read().map_err(|_| lock_err("sink read"))?;
        Ok(guard.clone())
    }
}

impl RecordSink for MemorySink {
    fn persist(&self, record: &CanonicalRecord) -> Result<(), AdapterError> {
        let mut guard = self.records.write().map_err(|_| lock_err("sink write"))?;
        guard.push(record.clone());
        Ok(())
    }
}

//! Adapter traits.

use crate::error::AdapterError;
use crate::record::{CanonicalRecord, RawRecord};

/// Supplies the full raw record set for one batch.
pub trait RecordSource: Send + Sync {
    /// Fetches every raw record, already decoded into field maps.
    fn fetch_all(&self) -> Result<Vec<RawRecord>, AdapterError>;
}

/// Accepts canonical records for persistence or upload.
pub trait RecordSink: Send + Sync {
    /// Persists one canonical record.
    fn persist(&self, record: &CanonicalRecord) -> Result<(), AdapterError>;
}

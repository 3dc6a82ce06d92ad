//! Per-batch merge accounting.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::NormalizationError;

/// Identifier of one merge invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(Uuid);

impl BatchId {
    /// Creates a new random batch ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A record excluded from the merge because it failed normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedRecord {
    /// Position in the input batch.
    pub position: usize,

    /// Value of the identifier field, when the record had one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,

    /// Why the record was rejected.
    pub error: NormalizationError,
}

/// Summary of one merge invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    /// Identifier of the merge invocation.
    pub batch_id: BatchId,

    /// Records received, before any filtering.
    pub input_records: usize,

    /// Canonical records produced.
    pub canonical_records: usize,

    /// Records without a name or email, dropped by design.
    pub dropped_anonymous: usize,

    /// Canonical records that received at least one backfilled field.
    pub backfilled_records: usize,

    /// Total fields filled in from older records.
    pub backfilled_fields: usize,

    /// Records whose raw email did not match the extraction pattern.
    pub email_pattern_mismatches: usize,

    /// Records that failed normalization or identity derivation.
    #[serde(default)]
    pub rejected: Vec<RejectedRecord>,
}

impl MergeReport {
    /// Creates an empty report for a batch of `input_records`.
    #[must_use]
    pub fn new(input_records: usize) -> Self {
        Self {
            batch_id: BatchId::new(),
            input_records,
            canonical_records: 0,
            dropped_anonymous: 0,
            backfilled_records: 0,
            backfilled_fields: 0,
            email_pattern_mismatches: 0,
            rejected: Vec::new(),
        }
    }

    /// Number of records that failed normalization.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.rejected.len()
    }

    /// Number of input records absorbed into some canonical record.
    #[must_use]
    pub fn merged_records(&self) -> usize {
        self.input_records - self.dropped_anonymous - self.failed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_add_up() {
        let mut report = MergeReport::new(10);
        report.dropped_anonymous = 2;
        report.rejected.push(RejectedRecord {
            position: 4,
            record_id: Some("r4".to_string()),
            error: NormalizationError::MissingField {
                field: "created_at".to_string(),
            },
        });
        assert_eq!(report.failed(), 1);
        assert_eq!(report.merged_records(), 7);
    }

    #[test]
    fn test_batch_ids_are_unique() {
        assert_ne!(BatchId::new(), BatchId::new());
        assert_ne!(MergeReport::new(0).batch_id, MergeReport::new(0).batch_id);
    }

    #[test]
    fn test_report_serializes_error_kind() {
        let mut report = MergeReport::new(1);
        report.rejected.push(RejectedRecord {
            position: 0,
            record_id: None,
            error: NormalizationError::MalformedInput {
                field: "created_at".to_string(),
                value: "soon".to_string(),
                reason: "unrecognized timestamp format".to_string(),
            },
        });
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["rejected"][0]["error"]["kind"], "malformed_input");
        assert!(json["rejected"][0].get("record_id").is_none());
    }
}

//! End-to-end batch: fetch, normalize, merge, persist.

use tracing::info;

use crate::adapter::{RecordSink, RecordSource};
use crate::config::ContactConfig;
use crate::error::{ContactResult, ValidationError};
use crate::merge::{MergeEngine, MergeOutcome, MergeReport, ShardConfig, ShardedMerger};
use crate::record::RawRecord;

/// Runs one batch between a [`RecordSource`] and a [`RecordSink`].
///
/// Adapter failures abort the run. Record-level failures end up in the
/// returned [`MergeReport`].
///
/// # Examples
///
/// ```
/// use contactql::{MemorySink, MemorySource, Pipeline, RawRecord};
///
/// let source = MemorySource::new(vec![RawRecord::new()
///     .with("raw_email", "Jane <jane_doe@x.com>")
///     .with("created_at", "2024-01-01")]);
/// let sink = MemorySink::new();
///
/// let report = Pipeline::default().run(&source, &sink).unwrap();
/// assert_eq!(report.canonical_records, 1);
/// assert_eq!(sink.records().unwrap()[0].identity.as_str(), "Jane Doe");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    engine: MergeEngine,
    sharded: Option<ShardedMerger>,
}

impl Pipeline {
    /// Creates a pipeline running the sequential merge.
    #[must_use]
    pub fn new(engine: MergeEngine) -> Self {
        Self {
            engine,
            sharded: None,
        }
    }

    /// Switches the merge to identity-sharded worker threads.
    #[must_use]
    pub fn with_shards(mut self, shards: ShardConfig) -> Self {
        self.sharded = Some(ShardedMerger::new(self.engine.clone(), shards));
        self
    }

    /// Builds a pipeline from configuration.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if the configuration is invalid.
    pub fn from_config(config: &ContactConfig) -> Result<Self, ValidationError> {
        Ok(Self {
            engine: config.merge_engine()?,
            sharded: config.sharded_merger()?,
        })
    }

    /// Returns true if the merge runs on shard workers.
    #[must_use]
    pub fn is_sharded(&self) -> bool {
        self.sharded.is_some()
    }

    /// Normalizes and merges records without touching any adapter.
    ///
    /// # Errors
    ///
    /// Returns `ContactError::Internal` if the sharded merge fails.
    pub fn transform(&self, records: Vec<RawRecord>) -> ContactResult<MergeOutcome> {
        match &self.sharded {
            Some(sharded) => sharded.merge(records),
            None => Ok(self.engine.merge(records)),
        }
    }

    /// Fetches every record, merges them and persists each canonical record.
    ///
    /// # Errors
    ///
    /// Returns `ContactError::Adapter` if fetching or persisting fails, and
    /// `ContactError::Internal` if the sharded merge fails.
    pub fn run(&self, source: &dyn RecordSource, sink: &dyn RecordSink) -> ContactResult<MergeReport> {
        let records = source.fetch_all()?;
        info!(
            records = records.len(),
            sharded = self.is_sharded(),
            industry_order = self.engine.industry_order().name(),
            "fetched raw records"
        );

        let outcome = self.transform(records)?;
        for record in &outcome.records {
            sink.persist(record)?;
        }

        info!(
            batch_id = %outcome.report.batch_id,
            persisted = outcome.records.len(),
            "batch persisted"
        );
        Ok(outcome.report)
    }
}

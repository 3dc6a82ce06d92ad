//! Sequential merge engine.
//!
//! The pass is batch-only: a representative's fields cannot be final until
//! every older record for its identity has been seen.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::config::ContactConfig;
use crate::error::{NormalizationError, ValidationError};
use crate::identity::{Identity, IdentityKey, IdentityResolver};
use crate::merge::policy::{serialize_history, IndustryOrder};
use crate::merge::report::{MergeReport, RejectedRecord};
use crate::normalize::RecordNormalizer;
use crate::record::{fields, CanonicalRecord, NormalizedRecord, RawRecord};

/// Canonical records plus the report describing how they were produced.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// One record per identity, most recent representative first.
    pub records: Vec<CanonicalRecord>,
    /// Counts and rejections for the batch.
    pub report: MergeReport,
}

/// A record ready for the merge pass.
#[derive(Debug, Clone)]
pub(crate) struct Keyed {
    pub identity: IdentityKey,
    pub record: NormalizedRecord,
}

/// Records sorted most recent first, with the report filled in up to the pass.
#[derive(Debug)]
pub(crate) struct Prepared {
    pub keyed: Vec<Keyed>,
    pub report: MergeReport,
}

#[derive(Debug)]
struct Representative {
    identity: IdentityKey,
    record: NormalizedRecord,
    /// Distinct industries, newest first.
    industries: Vec<String>,
    source_records: usize,
    backfilled_fields: usize,
    /// Position of the representative in the sorted pass.
    rank: usize,
}

/// Identity → representative state for one merge pass.
///
/// Records must be absorbed most recent first.
#[derive(Debug)]
pub(crate) struct IdentityTable {
    order: IndustryOrder,
    index: HashMap<IdentityKey, usize>,
    representatives: Vec<Representative>,
}

impl IdentityTable {
    pub fn new(order: IndustryOrder) -> Self {
        Self {
            order,
            index: HashMap::new(),
            representatives: Vec::new(),
        }
    }

    pub fn absorb(&mut self, rank: usize, keyed: Keyed) {
        let Keyed { identity, record } = keyed;

        let Some(&slot) = self.index.get(&identity) else {
            let industries = record
                .get(fields::INDUSTRY)
                .map(|i| vec![i.to_string()])
                .unwrap_or_default();
            self.index.insert(identity.clone(), self.representatives.len());
            self.representatives.push(Representative {
                identity,
                record,
                industries,
                source_records: 1,
                backfilled_fields: 0,
                rank,
            });
            return;
        };

        let rep = &mut self.representatives[slot];
        rep.source_records += 1;

        for (field, value) in record.fields.iter() {
            if field == fields::INDUSTRY {
                continue;
            }
            let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
                continue;
            };
            if rep.record.fields.is_missing(field) {
                rep.record.fields.set(field, Some(value.to_string()));
                rep.backfilled_fields += 1;
            }
        }

        if let Some(industry) = record.get(fields::INDUSTRY) {
            if !rep.industries.iter().any(|i| i == industry) {
                rep.industries.push(industry.to_string());
            }
        }
    }

    /// Materializes canonical records paired with their pass rank.
    pub fn finish(self) -> Vec<(usize, CanonicalRecord)> {
        let order = self.order;
        self.representatives
            .into_iter()
            .map(|rep| {
                let Representative {
                    identity,
                    record,
                    mut industries,
                    source_records,
                    backfilled_fields,
                    rank,
                } = rep;

                order.apply(&mut industries);
                let mut merged = record.fields;
                if let Some(serialized) = serialize_history(&industries) {
                    merged.set(fields::INDUSTRY, Some(serialized));
                }

                let canonical = CanonicalRecord {
                    identity,
                    fields: merged,
                    industry_history: industries,
                    created_at: record.created_at,
                    representative_position: record.position,
                    source_records,
                    backfilled_fields,
                };
                (rank, canonical)
            })
            .collect()
    }
}

/// Groups records by identity and emits one canonical record per identity.
///
/// # Examples
///
/// ```
/// use contactql::{MergeEngine, RawRecord};
///
/// let ann = |industry: &str, at: &str| {
///     RawRecord::new()
///         .with("firstname", "Ann")
///         .with("lastname", "Lee")
///         .with("industry", industry)
///         .with("created_at", at)
/// };
///
/// let outcome = MergeEngine::default().merge(vec![
///     ann("Meat", "2024-01-01"),
///     ann("Milling", "2023-06-01"),
///     ann("Meat", "2022-01-01"),
/// ]);
///
/// assert_eq!(outcome.records.len(), 1);
/// assert_eq!(outcome.records[0].industry(), Some(";Milling;Meat"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MergeEngine {
    normalizer: RecordNormalizer,
    identities: IdentityResolver,
    industry_order: IndustryOrder,
}

impl MergeEngine {
    /// Creates an engine from its components.
    #[must_use]
    pub fn new(
        normalizer: RecordNormalizer,
        identities: IdentityResolver,
        industry_order: IndustryOrder,
    ) -> Self {
        Self {
            normalizer,
            identities,
            industry_order,
        }
    }

    /// Builds an engine from configuration.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if a pattern or lookup table is invalid.
    pub fn from_config(config: &ContactConfig) -> Result<Self, ValidationError> {
        Ok(Self::new(
            config.record_normalizer()?,
            config.identity_resolver()?,
            config.industry_order,
        ))
    }

    /// Returns the industry history order.
    #[must_use]
    pub const fn industry_order(&self) -> IndustryOrder {
        self.industry_order
    }

    /// Normalizes and merges a batch of raw records.
    ///
    /// Records that fail normalization or identity derivation are listed in
    /// the report and skipped; anonymous records are dropped and counted.
    #[must_use]
    pub fn merge(&self, records: Vec<RawRecord>) -> MergeOutcome {
        let prepared = self.prepare(records);
        let mut table = IdentityTable::new(self.industry_order);
        for (rank, keyed) in prepared.keyed.into_iter().enumerate() {
            table.absorb(rank, keyed);
        }
        finalize(table.finish(), prepared.report)
    }

    /// Normalizes, keys and sorts records for the merge pass.
    pub(crate) fn prepare(&self, records: Vec<RawRecord>) -> Prepared {
        let mut report = MergeReport::new(records.len());
        let identifier = self.normalizer.field_names().identifier.clone();
        let mut keyed = Vec::with_capacity(records.len());

        for (position, raw) in records.into_iter().enumerate() {
            let record_id = raw.get(&identifier).map(str::to_string);
            let reject = |report: &mut MergeReport, error: NormalizationError| {
                warn!(position, record_id = record_id.as_deref(), %error, "record rejected");
                report.rejected.push(RejectedRecord {
                    position,
                    record_id: record_id.clone(),
                    error,
                });
            };

            let normalized = match self.normalizer.normalize(position, raw) {
                Ok(normalized) => normalized,
                Err(error) => {
                    reject(&mut report, error);
                    continue;
                }
            };
            if normalized.email_mismatch {
                report.email_pattern_mismatches += 1;
            }

            match self.identities.resolve(&normalized.record.fields) {
                Ok(Identity::Named(identity)) => keyed.push(Keyed {
                    identity,
                    record: normalized.record,
                }),
                Ok(Identity::Anonymous) => {
                    debug!(position, "record has no identity, dropping");
                    report.dropped_anonymous += 1;
                }
                Err(error) => reject(&mut report, error),
            }
        }

        // Stable: equal instants keep input order.
        keyed.sort_by(|a, b| b.record.created_at.cmp(&a.record.created_at));

        Prepared { keyed, report }
    }
}

/// Orders ranked canonical records and completes the report.
pub(crate) fn finalize(mut ranked: Vec<(usize, CanonicalRecord)>, mut report: MergeReport) -> MergeOutcome {
    ranked.sort_by_key(|(rank, _)| *rank);
    let records: Vec<CanonicalRecord> = ranked.into_iter().map(|(_, r)| r).collect();

    report.canonical_records = records.len();
    report.backfilled_records = records.iter().filter(|r| r.backfilled_fields > 0).count();
    report.backfilled_fields = records.iter().map(|r| r.backfilled_fields).sum();

    info!(
        batch_id = %report.batch_id,
        input = report.input_records,
        canonical = report.canonical_records,
        dropped = report.dropped_anonymous,
        backfilled = report.backfilled_records,
        rejected = report.failed(),
        "merge complete"
    );

    MergeOutcome { records, report }
}

//! Merge engine.
//!
//! Records are ordered most recent first, grouped by identity, and folded
//! into one representative per identity: gaps are backfilled from older
//! records and the industry history accumulates under an explicit
//! [`IndustryOrder`].

mod engine;
mod policy;
mod report;
mod sharded;

pub use engine::{MergeEngine, MergeOutcome};
pub use policy::{serialize_history, IndustryOrder};
pub use report::{BatchId, MergeReport, RejectedRecord};
pub use sharded::{shard_for, ShardConfig, ShardedMerger};

//! Parallel merge sharded by identity.
//!
//! All records of one identity go to the same worker, so no two workers
//! touch the same representative. Records are sorted globally before
//! routing and each shard queue is FIFO, so every shard still sees its
//! records most recent first.

use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender};
use tracing::debug;

use crate::error::{ContactError, ContactResult};
use crate::identity::IdentityKey;
use crate::merge::engine::{finalize, IdentityTable, Keyed, MergeEngine, MergeOutcome};
use crate::merge::policy::IndustryOrder;
use crate::record::{CanonicalRecord, RawRecord};

/// Sharded merge configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardConfig {
    /// Number of worker threads (and shards).
    pub workers: usize,
    /// Maximum queued records per shard.
    pub queue_capacity: usize,
}

impl Default for ShardConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_capacity: 1024,
        }
    }
}

/// Stable shard assignment for an identity.
#[must_use]
// The remainder is below `shards`, which came from a usize.
#[allow(clippy::cast_possible_truncation)]
pub fn shard_for(identity: &IdentityKey, shards: usize) -> usize {
    let hash = blake3::hash(identity.as_str().as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&hash.as_bytes()[..8]);
    (u64::from_le_bytes(prefix) % shards.max(1) as u64) as usize
}

/// Runs the merge pass across identity shards on worker threads.
///
/// Produces the same canonical records, in the same order, as
/// [`MergeEngine::merge`].
#[derive(Debug, Clone)]
pub struct ShardedMerger {
    engine: MergeEngine,
    config: ShardConfig,
}

impl ShardedMerger {
    /// Creates a merger; zero workers or capacity are raised to one.
    #[must_use]
    pub fn new(engine: MergeEngine, config: ShardConfig) -> Self {
        let config = ShardConfig {
            workers: config.workers.max(1),
            queue_capacity: config.queue_capacity.max(1),
        };
        Self { engine, config }
    }

    /// Returns the effective shard configuration.
    #[must_use]
    pub const fn config(&self) -> ShardConfig {
        self.config
    }

    /// Normalizes and merges a batch of raw records in parallel.
    ///
    /// # Errors
    ///
    /// Returns `ContactError::Internal` if a worker thread cannot be spawned
    /// or panics. Record-level problems are reported, not returned.
    pub fn merge(&self, records: Vec<RawRecord>) -> ContactResult<MergeOutcome> {
        let prepared = self.engine.prepare(records);
        let order = self.engine.industry_order();
        let workers = self.config.workers;

        let ranked = thread::scope(|scope| -> ContactResult<Vec<(usize, CanonicalRecord)>> {
            let mut senders: Vec<Sender<(usize, Keyed)>> = Vec::with_capacity(workers);
            let mut handles = Vec::with_capacity(workers);

            for idx in 0..workers {
                let (tx, rx) = bounded::<(usize, Keyed)>(self.config.queue_capacity);
                let handle = thread::Builder::new()
                    .name(format!("contactql-shard-{idx}"))
                    .spawn_scoped(scope, move || run_shard(order, &rx))
                    .map_err(|e| ContactError::internal(format!("failed to spawn shard worker: {e}")))?;
                senders.push(tx);
                handles.push(handle);
            }

            let mut disconnected = None;
            for (rank, keyed) in prepared.keyed.into_iter().enumerate() {
                let shard = shard_for(&keyed.identity, workers);
                if senders[shard].send((rank, keyed)).is_err() {
                    disconnected = Some(shard);
                    break;
                }
            }

            // Close the queues: workers drain what is left, then return.
            drop(senders);

            // Join every worker before reporting so a panic is never left unobserved.
            let mut ranked = Vec::new();
            let mut panicked = None;
            for (idx, handle) in handles.into_iter().enumerate() {
                match handle.join() {
                    Ok(shard) => {
                        debug!(shard = idx, records = shard.len(), "shard finished");
                        ranked.extend(shard);
                    }
                    Err(_) => panicked = panicked.or(Some(idx)),
                }
            }

            if let Some(idx) = panicked {
                return Err(ContactError::internal(format!("shard {idx} worker panicked")));
            }
            if let Some(idx) = disconnected {
                return Err(ContactError::internal(format!("shard {idx} worker disconnected")));
            }
            Ok(ranked)
        })?;

        Ok(finalize(ranked, prepared.report))
    }
}

fn run_shard(order: IndustryOrder, rx: &Receiver<(usize, Keyed)>) -> Vec<(usize, CanonicalRecord)> {
    let mut table = IdentityTable::new(order);
    for (rank, keyed) in rx {
        table.absorb(rank, keyed);
    }
    table.finish()
}

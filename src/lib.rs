//! # contactql - Identity resolution and merge for contact snapshots
//!
//! contactql ingests snapshots of person records collected over time, which
//! may hold repeated entries for one individual under different attribute
//! values, and produces one canonical, enriched record per individual.
//!
//! ## Core Concepts
//!
//! - **Normalization**: free-text places become `(country, city)`, raw phone
//!   strings get a dialing code and fixed display format, and decorated raw
//!   emails are reduced to a bare address
//! - **Identity key**: `"<firstname> <lastname>"`, or a name inferred from a
//!   `first_last` email local part
//! - **Representative**: the most recent record of an identity; older records
//!   only fill its gaps
//! - **Industry history**: every distinct industry seen for an identity,
//!   serialized as `;A;B` in an explicit [`IndustryOrder`]
//!
//! ## Usage
//!
//! ```rust
//! use contactql::{MergeEngine, RawRecord};
//!
//! let outcome = MergeEngine::default().merge(vec![
//!     RawRecord::new()
//!         .with("firstname", "Ann")
//!         .with("lastname", "Lee")
//!         .with("country", "Dublin")
//!         .with("created_at", "2024-01-01"),
//!     RawRecord::new()
//!         .with("raw_email", "Ann <ann_lee@x.com>")
//!         .with("phone", "087 123 4567")
//!         .with("created_at", "2023-06-01"),
//! ]);
//!
//! let ann = &outcome.records[0];
//! assert_eq!(ann.get("country"), Some("Ireland"));
//! assert_eq!(ann.get("email"), Some("ann_lee@x.com"));
//! assert_eq!(outcome.report.dropped_anonymous, 0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Core types
pub mod config;
pub mod error;
pub mod identity;
pub mod record;
pub mod time;

// Normalization and merge
pub mod lookup;
pub mod merge;
pub mod normalize;

// I/O boundary
pub mod adapter;
pub mod pipeline;

// Re-export primary types at crate root for convenience
pub use adapter::{MemorySink, MemorySource, RecordSink, RecordSource};
pub use config::{ContactConfig, FieldNames};
pub use error::{AdapterError, ContactError, ContactResult, NormalizationError, ValidationError};
pub use identity::{Identity, IdentityKey, IdentityResolver};
pub use lookup::{
    CountryEntry, DialingCodeLookup, LocationLookup, StaticDialingCodes, StaticLocationTable,
};
pub use merge::{
    BatchId, IndustryOrder, MergeEngine, MergeOutcome, MergeReport, RejectedRecord, ShardConfig,
    ShardedMerger,
};
pub use normalize::{EmailExtractor, Location, LocationResolver, PhoneNormalizer, RecordNormalizer};
pub use pipeline::Pipeline;
pub use record::{CanonicalRecord, NormalizedRecord, RawRecord};

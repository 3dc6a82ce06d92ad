//! Engine configuration.
//!
//! Every field has a default, so an empty JSON object is a valid
//! configuration reproducing the built-in behavior.
//!
//! ```json
//! {
//!   "industry_order": "newest_first",
//!   "fields": { "created_at": "createdAt", "identifier": "hs_object_id" },
//!   "locations": [{ "country": "Scotland", "cities": ["Glasgow"] }],
//!   "dialing_codes": { "Great Britain": "+44" },
//!   "shards": 4
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::identity::{IdentityResolver, DEFAULT_NAME_PATTERN};
use crate::lookup::{CountryEntry, StaticDialingCodes, StaticLocationTable};
use crate::merge::{IndustryOrder, MergeEngine, ShardConfig, ShardedMerger};
use crate::normalize::{
    EmailExtractor, LocationResolver, PhoneNormalizer, RecordNormalizer, DEFAULT_EMAIL_PATTERN,
};

/// Names of the fields the engine reads beyond the fixed contact fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldNames {
    /// Creation timestamp used for recency ordering.
    pub created_at: String,

    /// Opaque record identifier, used in reports and upload mapping.
    pub identifier: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            created_at: "created_at".to_string(),
            identifier: "record_id".to_string(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    /// Pattern extracting the address from `raw_email` (first capture group).
    pub email_pattern: String,

    /// Pattern deriving `first`/`last` from an email local part (groups 1 and 2).
    pub name_pattern: String,

    /// Order of values in the serialized industry history.
    pub industry_order: IndustryOrder,

    /// Names of the timestamp and identifier fields.
    pub fields: FieldNames,

    /// Ordered country → cities table.
    pub locations: Vec<CountryEntry>,

    /// Country → dialing code table.
    pub dialing_codes: BTreeMap<String, String>,

    /// Worker count for the sharded merge. `None` or `1` merges sequentially.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shards: Option<usize>,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            email_pattern: DEFAULT_EMAIL_PATTERN.to_string(),
            name_pattern: DEFAULT_NAME_PATTERN.to_string(),
            industry_order: IndustryOrder::default(),
            fields: FieldNames::default(),
            locations: StaticLocationTable::builtin().entries().to_vec(),
            dialing_codes: StaticDialingCodes::builtin().codes().clone(),
            shards: None,
        }
    }
}

impl ContactConfig {
    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidConfig` for malformed JSON, or the
    /// error from [`ContactConfig::validate`].
    pub fn from_json_str(json: &str) -> Result<Self, ValidationError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ValidationError::InvalidConfig {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidConfig` if the file cannot be read,
    /// plus everything [`ContactConfig::from_json_str`] returns.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ValidationError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ValidationError::InvalidConfig {
            reason: format!("cannot read {}: {e}", path.display()),
        })?;
        Self::from_json_str(&json)
    }

    /// Checks that patterns compile with enough groups and tables have no blank keys.
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.record_normalizer()?;
        self.identity_resolver()?;
        if self.fields.created_at.trim().is_empty() || self.fields.identifier.trim().is_empty() {
            return Err(ValidationError::InvalidConfig {
                reason: "field names cannot be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Builds the record normalizer described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` for an invalid email pattern or lookup table.
    pub fn record_normalizer(&self) -> Result<RecordNormalizer, ValidationError> {
        let locations = StaticLocationTable::new(self.locations.clone())?;
        let codes = StaticDialingCodes::new(self.dialing_codes.clone())?;
        Ok(RecordNormalizer::new(
            LocationResolver::new(Arc::new(locations)),
            PhoneNormalizer::new(Arc::new(codes)),
            EmailExtractor::new(&self.email_pattern)?,
            self.fields.clone(),
        ))
    }

    /// Builds the identity resolver described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` for an invalid name pattern.
    pub fn identity_resolver(&self) -> Result<IdentityResolver, ValidationError> {
        IdentityResolver::new(&self.name_pattern)
    }

    /// Sharded merge settings, if more than one worker is configured.
    #[must_use]
    pub fn shard_config(&self) -> Option<ShardConfig> {
        self.shards.filter(|&n| n > 1).map(|workers| ShardConfig {
            workers,
            ..ShardConfig::default()
        })
    }

    /// Builds a merge engine.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if the configuration is invalid.
    pub fn merge_engine(&self) -> Result<MergeEngine, ValidationError> {
        MergeEngine::from_config(self)
    }

    /// Builds a sharded merger, if sharding is configured.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if the configuration is invalid.
    pub fn sharded_merger(&self) -> Result<Option<ShardedMerger>, ValidationError> {
        match self.shard_config() {
            Some(shards) => Ok(Some(ShardedMerger::new(self.merge_engine()?, shards))),
            None => Ok(None),
        }
    }
}

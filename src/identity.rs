//! Identity keys and the resolver that derives them.
//!
//! Two records with the same key are treated as the same person. Name
//! equality is the whole test: two different people who share a derived
//! name collapse into one canonical record.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{NormalizationError, ValidationError};
use crate::record::{fields, RawRecord};

/// Matches `first_last` in an email local part.
pub const DEFAULT_NAME_PATTERN: &str = "(?i)([a-z]+)_([a-z]+)";

fn default_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(DEFAULT_NAME_PATTERN).expect("default name pattern is valid"))
}

/// Display name identifying one individual.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityKey(String);

impl IdentityKey {
    /// Creates a key from an already formatted display name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the display name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of identity resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    /// Derived from explicit names or the email local part.
    Named(IdentityKey),
    /// No name and no email; the record is dropped from the merge.
    Anonymous,
}

/// Computes identity keys from names, falling back to the email local part.
///
/// # Examples
///
/// ```
/// use contactql::{Identity, IdentityKey, IdentityResolver, RawRecord};
///
/// let resolver = IdentityResolver::default();
/// let record = RawRecord::new().with("email", "jane_doe42@x.com");
/// assert_eq!(
///     resolver.resolve(&record).unwrap(),
///     Identity::Named(IdentityKey::new("Jane Doe"))
/// );
/// ```
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    name_pattern: Regex,
}

impl IdentityResolver {
    /// Creates a resolver with a custom local-part pattern.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidPattern` if the pattern does not compile,
    /// or `ValidationError::MissingCaptureGroups` if it has fewer than two groups.
    pub fn new(name_pattern: &str) -> Result<Self, ValidationError> {
        let regex = Regex::new(name_pattern).map_err(|e| ValidationError::InvalidPattern {
            pattern: name_pattern.to_string(),
            reason: e.to_string(),
        })?;

        let groups = regex.captures_len() - 1;
        if groups < 2 {
            return Err(ValidationError::MissingCaptureGroups {
                pattern: name_pattern.to_string(),
                expected: 2,
                actual: groups,
            });
        }

        Ok(Self { name_pattern: regex })
    }

    /// Resolves the identity of a record.
    ///
    /// - `firstname` and `lastname` both present → `"<firstname> <lastname>"`,
    ///   each trimmed
    /// - otherwise, an email present → name derived from its local part
    /// - otherwise → [`Identity::Anonymous`]
    ///
    /// The extracted `email` field is preferred over `raw_email`.
    ///
    /// # Errors
    ///
    /// Returns `NormalizationError::PatternMismatch` when the email fallback is
    /// taken and the local part does not encode a `first_last` name.
    pub fn resolve(&self, record: &RawRecord) -> Result<Identity, NormalizationError> {
        if let (Some(first), Some(last)) = (
            record.get(fields::FIRSTNAME),
            record.get(fields::LASTNAME),
        ) {
            let (first, last) = (first.trim(), last.trim());
            return Ok(Identity::Named(IdentityKey::new(format!("{first} {last}"))));
        }

        match record.get(fields::EMAIL).or_else(|| record.get(fields::RAW_EMAIL)) {
            Some(email) => self.name_from_email(email).map(Identity::Named),
            None => Ok(Identity::Anonymous),
        }
    }

    /// Derives a capitalized `"First Last"` name from an email address.
    ///
    /// # Errors
    ///
    /// Returns `NormalizationError::PatternMismatch` if the local part does not match.
    pub fn name_from_email(&self, email: &str) -> Result<IdentityKey, NormalizationError> {
        let local = email.rsplit_once('@').map_or(email, |(local, _)| local);

        let mismatch = || NormalizationError::PatternMismatch {
            field: fields::EMAIL.to_string(),
            value: email.to_string(),
            pattern: self.name_pattern.as_str().to_string(),
        };

        let caps = self.name_pattern.captures(local).ok_or_else(mismatch)?;
        let (Some(first), Some(last)) = (caps.get(1), caps.get(2)) else {
            return Err(mismatch());
        };

        Ok(IdentityKey::new(format!(
            "{} {}",
            capitalize(first.as_str()),
            capitalize(last.as_str())
        )))
    }
}

impl Default for IdentityResolver {
    fn default() -> Self {
        Self {
            name_pattern: default_regex().clone(),
        }
    }
}

/// Uppercases the first character and lowercases the rest.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

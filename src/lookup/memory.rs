//! Static in-memory lookup tables.
//!
//! These are small, explicit tables. They are not a geographic or telephony
//! authority; swap in another [`LocationLookup`] / [`DialingCodeLookup`]
//! implementation for broader coverage.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::lookup::traits::{DialingCodeLookup, LocationLookup};

/// One country and the cities it recognizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryEntry {
    /// Country name, also accepted verbatim as a place.
    pub country: String,

    /// Cities of the country, matched case-insensitively.
    #[serde(default)]
    pub cities: Vec<String>,
}

impl CountryEntry {
    /// Creates an entry for `country` and its cities.
    #[must_use]
    pub fn new<I, S>(country: impl Into<String>, cities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            country: country.into(),
            cities: cities.into_iter().map(Into::into).collect(),
        }
    }
}

/// Ordered country → cities table.
///
/// Iteration order is the order entries were given in, which decides the
/// winner when a city name appears under more than one country.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticLocationTable {
    entries: Vec<CountryEntry>,
}

impl StaticLocationTable {
    /// Creates a table from ordered entries.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyLookupKey` if a country or city name is blank.
    pub fn new(entries: Vec<CountryEntry>) -> Result<Self, ValidationError> {
        let blank = entries.iter().any(|e| {
            e.country.trim().is_empty() || e.cities.iter().any(|c| c.trim().is_empty())
        });
        if blank {
            return Err(ValidationError::EmptyLookupKey {
                table: "locations".to_string(),
            });
        }
        Ok(Self { entries })
    }

    /// The built-in table.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            entries: vec![
                CountryEntry::new(
                    "England",
                    ["Plymouth", "Milton Keynes", "Oxford", "London", "Winchester"],
                ),
                CountryEntry::new("Ireland", ["Waterford", "Limerick", "Dublin", "Cork"]),
            ],
        }
    }

    /// Returns the entries in lookup order.
    #[must_use]
    pub fn entries(&self) -> &[CountryEntry] {
        &self.entries
    }
}

impl Default for StaticLocationTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LocationLookup for StaticLocationTable {
    fn is_country(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.country == name)
    }

    fn country_of_city(&self, city: &str) -> Option<&str> {
        let needle = city.to_lowercase();
        self.entries
            .iter()
            .rev()
            .find(|e| e.cities.iter().any(|c| c.to_lowercase() == needle))
            .map(|e| e.country.as_str())
    }
}

/// Country → dialing code table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticDialingCodes {
    codes: BTreeMap<String, String>,
}

impl StaticDialingCodes {
    /// Creates a table from a country → code map.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyLookupKey` if a country name is blank.
    pub fn new(codes: BTreeMap<String, String>) -> Result<Self, ValidationError> {
        if codes.keys().any(|k| k.trim().is_empty()) {
            return Err(ValidationError::EmptyLookupKey {
                table: "dialing_codes".to_string(),
            });
        }
        Ok(Self { codes })
    }

    /// The built-in table.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            codes: BTreeMap::from([
                ("Great Britain".to_string(), "+44".to_string()),
                ("Ireland".to_string(), "+353".to_string()),
            ]),
        }
    }

    /// Returns the country → code map.
    #[must_use]
    pub fn codes(&self) -> &BTreeMap<String, String> {
        &self.codes
    }
}

impl Default for StaticDialingCodes {
    fn default() -> Self {
        Self::builtin()
    }
}

impl DialingCodeLookup for StaticDialingCodes {
    fn dialing_code(&self, country: &str) -> Option<&str> {
        self.codes.get(country).map(String::as_str)
    }
}

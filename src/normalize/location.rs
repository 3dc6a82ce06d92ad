//! Free-text place → (country, city) resolution.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::lookup::{LocationLookup, StaticLocationTable};

/// Sentinel for a missing place. Downstream systems reject null geography.
pub const MISSING_PLACE: &str = "Nan";

/// City value when the place named a country.
pub const UNKNOWN_CITY: &str = "Unknown";

/// Country value when the place was not recognized.
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// City value when the place was not recognized.
pub const NOT_RECOGNIZED: &str = "Not recognized";

/// A resolved (country, city) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Resolved country or sentinel.
    pub country: String,
    /// Matched city or sentinel.
    pub city: String,
}

impl Location {
    /// Creates a location.
    #[must_use]
    pub fn new(country: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            city: city.into(),
        }
    }

    /// Returns true unless the place was missing or unrecognized.
    #[must_use]
    pub fn is_recognized(&self) -> bool {
        self.country != MISSING_PLACE && self.country != UNKNOWN_COUNTRY
    }
}

/// Maps a place string to a [`Location`] using a [`LocationLookup`].
///
/// # Examples
///
/// ```
/// use contactql::normalize::{Location, LocationResolver};
///
/// let resolver = LocationResolver::default();
/// assert_eq!(resolver.resolve(Some("Dublin")), Location::new("Ireland", "Dublin"));
/// assert_eq!(resolver.resolve(Some("England")), Location::new("England", "Unknown"));
/// assert_eq!(resolver.resolve(None), Location::new("Nan", "Nan"));
/// ```
#[derive(Clone)]
pub struct LocationResolver {
    lookup: Arc<dyn LocationLookup>,
}

impl LocationResolver {
    /// Creates a resolver over `lookup`.
    #[must_use]
    pub fn new(lookup: Arc<dyn LocationLookup>) -> Self {
        Self { lookup }
    }

    /// Resolves a place.
    ///
    /// - missing → `("Nan", "Nan")`
    /// - exact country key → `(place, "Unknown")`
    /// - known city (any case) → `(country, place)`, keeping the input's casing
    /// - otherwise → `("Unknown", "Not recognized")`
    #[must_use]
    pub fn resolve(&self, place: Option<&str>) -> Location {
        let Some(place) = place.filter(|p| !p.trim().is_empty()) else {
            return Location::new(MISSING_PLACE, MISSING_PLACE);
        };

        if self.lookup.is_country(place) {
            return Location::new(place, UNKNOWN_CITY);
        }

        match self.lookup.country_of_city(place) {
            Some(country) => Location::new(country, place),
            None => Location::new(UNKNOWN_COUNTRY, NOT_RECOGNIZED),
        }
    }
}

impl Default for LocationResolver {
    fn default() -> Self {
        Self::new(Arc::new(StaticLocationTable::builtin()))
    }
}

impl std::fmt::Debug for LocationResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationResolver").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::CountryEntry;

    #[test]
    fn test_missing_place_is_sentinel() {
        let resolver = LocationResolver::default();
        assert_eq!(resolver.resolve(None), Location::new("Nan", "Nan"));
        assert_eq!(resolver.resolve(Some("")), Location::new("Nan", "Nan"));
        assert!(!resolver.resolve(None).is_recognized());
    }

    #[test]
    fn test_known_country_has_unknown_city() {
        let resolver = LocationResolver::default();
        assert_eq!(resolver.resolve(Some("Ireland")), Location::new("Ireland", "Unknown"));
    }

    #[test]
    fn test_lowercase_country_is_not_a_country() {
        let resolver = LocationResolver::default();
        assert_eq!(
            resolver.resolve(Some("ireland")),
            Location::new("Unknown", "Not recognized")
        );
    }

    #[test]
    fn test_city_keeps_input_casing() {
        let resolver = LocationResolver::default();
        let loc = resolver.resolve(Some("oxford"));
        assert_eq!(loc, Location::new("England", "oxford"));
        assert!(loc.is_recognized());
    }

    #[test]
    fn test_unrecognized_place() {
        let resolver = LocationResolver::default();
        assert_eq!(
            resolver.resolve(Some("Atlantis")),
            Location::new("Unknown", "Not recognized")
        );
    }

    #[test]
    fn test_custom_lookup_is_used() {
        let table = StaticLocationTable::new(vec![
            CountryEntry::new("Scotland", ["Glasgow", "Edinburgh"]),
        ])
        .unwrap();
        let resolver = LocationResolver::new(Arc::new(table));
        assert_eq!(resolver.resolve(Some("Glasgow")), Location::new("Scotland", "Glasgow"));
        assert_eq!(
            resolver.resolve(Some("Dublin")),
            Location::new("Unknown", "Not recognized")
        );
    }
}

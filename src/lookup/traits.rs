//! Lookup traits.
//!
//! Implementations are read-only after construction and shared across
//! threads, so every trait requires `Send + Sync`.

/// Country/city lookup.
pub trait LocationLookup: Send + Sync {
    /// Returns true if `name` is a known country key (case-sensitive).
    fn is_country(&self, name: &str) -> bool;

    /// Returns the country that lists `city`, compared case-insensitively.
    ///
    /// If several countries list the same city, the last one in the
    /// implementation's iteration order wins.
    fn country_of_city(&self, city: &str) -> Option<&str>;
}

/// Country → international dialing code lookup.
pub trait DialingCodeLookup: Send + Sync {
    /// Returns the dialing code (e.g. `+44`) for `country`, if known.
    fn dialing_code(&self, country: &str) -> Option<&str>;
}

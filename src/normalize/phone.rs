//! Raw phone string → display format with dialing code.

use std::sync::Arc;

use crate::lookup::{DialingCodeLookup, StaticDialingCodes};

/// Returned when there is no phone number.
pub const MISSING_PHONE: &str = "Nan";

/// Umbrella name the dialing-code table uses for the UK.
pub const GREAT_BRITAIN: &str = "Great Britain";

/// UK constituent countries looked up under [`GREAT_BRITAIN`].
pub const UK_CONSTITUENTS: &[&str] = &["England", "Wales", "Northern Ireland", "Scotland"];

/// Digit position where the subscriber number is split.
const SPLIT_AT: usize = 4;

/// Formats phone numbers as `(<code>) <first 4 digits> <rest>`.
///
/// The fixed split is a display convention, not E.164 formatting.
///
/// # Examples
///
/// ```
/// use contactql::normalize::PhoneNormalizer;
///
/// let phones = PhoneNormalizer::default();
/// assert_eq!(phones.normalize(Some("07911 123456"), Some("Scotland")), "(+44) 7911 123456");
/// assert_eq!(phones.normalize(Some("087-123-4567"), Some("Atlantis")), "() 8712 34567");
/// assert_eq!(phones.normalize(None, Some("Ireland")), "Nan");
/// ```
#[derive(Clone)]
pub struct PhoneNormalizer {
    codes: Arc<dyn DialingCodeLookup>,
}

impl PhoneNormalizer {
    /// Creates a normalizer over `codes`.
    #[must_use]
    pub fn new(codes: Arc<dyn DialingCodeLookup>) -> Self {
        Self { codes }
    }

    /// Normalizes `raw_phone` for `country`.
    ///
    /// Missing phone → `"Nan"`. Unknown or missing country → empty code,
    /// still formatted.
    #[must_use]
    pub fn normalize(&self, raw_phone: Option<&str>, country: Option<&str>) -> String {
        let Some(raw_phone) = raw_phone.filter(|p| !p.trim().is_empty()) else {
            return MISSING_PHONE.to_string();
        };

        let code = country
            .map(dialing_country)
            .and_then(|c| self.codes.dialing_code(c))
            .unwrap_or_default();

        let digits = extract_digits(raw_phone);
        let (head, tail) = digits.split_at(digits.len().min(SPLIT_AT));
        format!("({code}) {head} {tail}")
    }
}

impl Default for PhoneNormalizer {
    fn default() -> Self {
        Self::new(Arc::new(StaticDialingCodes::builtin()))
    }
}

impl std::fmt::Debug for PhoneNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhoneNormalizer").finish_non_exhaustive()
    }
}

/// Maps a country to the key used for dialing-code lookup.
#[must_use]
pub fn dialing_country(country: &str) -> &str {
    if UK_CONSTITUENTS.contains(&country) {
        GREAT_BRITAIN
    } else {
        country
    }
}

/// Keeps ASCII digits and strips leading zeros.
#[must_use]
pub fn extract_digits(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    digits.trim_start_matches('0').to_string()
}

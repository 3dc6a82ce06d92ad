//! Field normalization.
//!
//! Each normalizer is a pure function of its lookup table and input.
//! [`RecordNormalizer`] applies all of them to a raw record and parses its
//! creation timestamp.

mod email;
mod location;
mod phone;

pub use email::{EmailExtractor, Extraction, DEFAULT_EMAIL_PATTERN};
pub use location::{
    Location, LocationResolver, MISSING_PLACE, NOT_RECOGNIZED, UNKNOWN_CITY, UNKNOWN_COUNTRY,
};
pub use phone::{
    dialing_country, extract_digits, PhoneNormalizer, GREAT_BRITAIN, MISSING_PHONE,
    UK_CONSTITUENTS,
};

use tracing::warn;

use crate::config::FieldNames;
use crate::error::NormalizationError;
use crate::record::{fields, NormalizedRecord, RawRecord};
use crate::time::parse_timestamp;

/// A normalized record plus the soft diagnostics raised while producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    /// The normalized record.
    pub record: NormalizedRecord,

    /// The email pattern did not match; `email` holds the raw input.
    pub email_mismatch: bool,
}

/// Applies location, phone and email normalization to raw records.
#[derive(Debug, Clone, Default)]
pub struct RecordNormalizer {
    locations: LocationResolver,
    phones: PhoneNormalizer,
    emails: EmailExtractor,
    names: FieldNames,
}

impl RecordNormalizer {
    /// Creates a normalizer from its component normalizers.
    #[must_use]
    pub fn new(
        locations: LocationResolver,
        phones: PhoneNormalizer,
        emails: EmailExtractor,
        names: FieldNames,
    ) -> Self {
        Self {
            locations,
            phones,
            emails,
            names,
        }
    }

    /// Returns the configured field names.
    #[must_use]
    pub fn field_names(&self) -> &FieldNames {
        &self.names
    }

    /// Normalizes one record.
    ///
    /// `country` is replaced by the resolved country and `city` is added;
    /// `phone` is reformatted using the resolved country, or the raw place
    /// when the location table does not recognize it; `email` is added.
    /// Every other field passes through.
    ///
    /// # Errors
    ///
    /// Returns `NormalizationError::MissingField` if the creation timestamp is
    /// missing, or `NormalizationError::MalformedInput` if it does not parse.
    pub fn normalize(&self, position: usize, raw: RawRecord) -> Result<Normalized, NormalizationError> {
        let created_field = self.names.created_at.as_str();
        let created_at = match raw.get(created_field) {
            Some(value) => parse_timestamp(created_field, value)?,
            None => {
                return Err(NormalizationError::MissingField {
                    field: created_field.to_string(),
                })
            }
        };

        let place = raw.get(fields::COUNTRY);
        let location = self.locations.resolve(place);
        // Unrecognized places may still name a dialing country (e.g. "Scotland").
        let dialing = if location.is_recognized() {
            Some(location.country.as_str())
        } else {
            place
        };
        let phone = self.phones.normalize(raw.get(fields::PHONE), dialing);
        let extraction = self.emails.try_extract(raw.get(fields::RAW_EMAIL));
        let email_mismatch = extraction.is_unmatched();
        if email_mismatch {
            warn!(
                position,
                pattern = self.emails.pattern(),
                "email pattern did not match, keeping raw input"
            );
        }

        let mut record = raw;
        record.set(fields::COUNTRY, Some(location.country));
        record.set(fields::CITY, Some(location.city));
        record.set(fields::PHONE, Some(phone));
        record.set(fields::EMAIL, Some(extraction.into_value()));

        Ok(Normalized {
            record: NormalizedRecord {
                position,
                created_at,
                fields: record,
            },
            email_mismatch,
        })
    }
}

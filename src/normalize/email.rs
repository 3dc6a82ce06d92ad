//! Bare address extraction from decorated raw email strings.

use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

use crate::error::ValidationError;

/// Captures the address between angle brackets.
pub const DEFAULT_EMAIL_PATTERN: &str = "<(.*)>";

fn default_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(DEFAULT_EMAIL_PATTERN).expect("default email pattern is valid"))
}

/// Outcome of applying the extraction pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Input was missing.
    Empty,
    /// The first capture group.
    Extracted(String),
    /// The pattern did not match; carries the input unchanged.
    Unmatched(String),
}

impl Extraction {
    /// Returns true if the pattern did not match.
    #[must_use]
    pub fn is_unmatched(&self) -> bool {
        matches!(self, Self::Unmatched(_))
    }

    /// The value to store: empty, the capture, or the original input.
    #[must_use]
    pub fn into_value(self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Extracted(s) | Self::Unmatched(s) => s,
        }
    }
}

/// Pulls an address out of strings like `"Ann <ann_lee@x.com> (work)"`.
///
/// # Examples
///
/// ```
/// use contactql::normalize::EmailExtractor;
///
/// let emails = EmailExtractor::default();
/// assert_eq!(emails.extract(Some("hi <a.b@x.com> bye")), "a.b@x.com");
/// assert_eq!(emails.extract(Some("plain@x.com")), "plain@x.com");
/// assert_eq!(emails.extract(None), "");
/// ```
#[derive(Debug, Clone)]
pub struct EmailExtractor {
    pattern: Regex,
}

impl EmailExtractor {
    /// Creates an extractor from a custom pattern.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidPattern` if the pattern does not compile,
    /// or `ValidationError::MissingCaptureGroups` if it has no capture group.
    pub fn new(pattern: &str) -> Result<Self, ValidationError> {
        let pattern = Regex::new(pattern).map_err(|e| ValidationError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        let groups = pattern.captures_len() - 1;
        if groups < 1 {
            return Err(ValidationError::MissingCaptureGroups {
                pattern: pattern.as_str().to_string(),
                expected: 1,
                actual: groups,
            });
        }

        Ok(Self { pattern })
    }

    /// Returns the extraction pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Applies the pattern without logging.
    #[must_use]
    pub fn try_extract(&self, raw_email: Option<&str>) -> Extraction {
        let Some(raw) = raw_email.filter(|r| !r.trim().is_empty()) else {
            return Extraction::Empty;
        };

        match self.pattern.captures(raw).and_then(|caps| caps.get(1)) {
            Some(m) => Extraction::Extracted(m.as_str().to_string()),
            None => Extraction::Unmatched(raw.to_string()),
        }
    }

    /// Extracts the address, returning the original input when the pattern
    /// does not match.
    ///
    /// A mismatch is logged rather than raised so one odd value cannot fail
    /// the batch; callers can spot it because the result still carries the
    /// delimiters.
    #[must_use]
    pub fn extract(&self, raw_email: Option<&str>) -> String {
        let outcome = self.try_extract(raw_email);
        if outcome.is_unmatched() {
            warn!(pattern = self.pattern.as_str(), "email pattern did not match, keeping raw input");
        }
        outcome.into_value()
    }
}

impl Default for EmailExtractor {
    fn default() -> Self {
        Self {
            pattern: default_regex().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_between_brackets() {
        let emails = EmailExtractor::default();
        assert_eq!(
            emails.try_extract(Some("hi <a.b@x.com> bye")),
            Extraction::Extracted("a.b@x.com".to_string())
        );
    }

    #[test]
    fn test_capture_is_greedy() {
        let emails = EmailExtractor::default();
        assert_eq!(emails.extract(Some("<a@x.com> or <b@y.com>")), "a@x.com> or <b@y.com");
    }

    #[test]
    fn test_mismatch_returns_input() {
        let emails = EmailExtractor::default();
        let outcome = emails.try_extract(Some("no brackets here"));
        assert!(outcome.is_unmatched());
        assert_eq!(outcome.into_value(), "no brackets here");
    }

    #[test]
    fn test_missing_input_is_empty() {
        let emails = EmailExtractor::default();
        assert_eq!(emails.try_extract(None), Extraction::Empty);
        assert_eq!(emails.extract(Some("")), "");
    }

    #[test]
    fn test_custom_pattern() {
        let emails = EmailExtractor::new(r"mailto:(\S+)").unwrap();
        assert_eq!(emails.extract(Some("mailto:ann@x.com now")), "ann@x.com");
        assert_eq!(emails.pattern(), r"mailto:(\S+)");
    }

    #[test]
    fn test_pattern_without_group_rejected() {
        let err = EmailExtractor::new("<.*>").unwrap_err();
        assert!(matches!(err, ValidationError::MissingCaptureGroups { actual: 0, .. }));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let err = EmailExtractor::new("<(.*").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidPattern { .. }));
    }
}

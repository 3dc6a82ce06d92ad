//! Industry history ordering and serialization.

use serde::{Deserialize, Serialize};

/// Order of values in a serialized industry history.
///
/// The merge pass visits records newest-first and records each distinct
/// industry the first time it is seen. The policy decides how that
/// encounter order is emitted; it never depends on insertion mechanics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndustryOrder {
    /// Oldest value first, the representative's own value last.
    #[default]
    OldestFirst,

    /// The representative's own value first, oldest value last.
    NewestFirst,
}

impl IndustryOrder {
    /// Reorders a newest-first encounter list in place.
    pub fn apply(self, encountered: &mut [String]) {
        if self == Self::OldestFirst {
            encountered.reverse();
        }
    }

    /// Returns a short stable identifier suitable for logging/debugging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::OldestFirst => "oldest_first",
            Self::NewestFirst => "newest_first",
        }
    }
}

/// Serializes an industry history.
///
/// More than one value gives `;A;B;C`, a single value is returned bare, and
/// an empty history gives `None`.
#[must_use]
pub fn serialize_history(history: &[String]) -> Option<String> {
    match history {
        [] => None,
        [single] => Some(single.clone()),
        many => Some(format!(";{}", many.join(";"))),
    }
}

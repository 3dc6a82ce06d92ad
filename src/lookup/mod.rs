//! Lookup services used by normalization.
//!
//! Geography and telephony data sit behind traits so a richer provider can
//! replace the static tables without touching the merge algorithm.

mod memory;
mod traits;

pub use memory::{CountryEntry, StaticDialingCodes, StaticLocationTable};
pub use traits::{DialingCodeLookup, LocationLookup};

//! I/O boundary.
//!
//! Fetching raw records and persisting canonical ones are the job of
//! adapters with no business logic of their own. The engine only sees
//! these traits.

mod memory;
mod traits;

pub use memory::{MemorySink, MemorySource};
pub use traits::{RecordSink, RecordSource};

//! Content-addressed cache for expensive intermediate work.
//!
//! Document extraction, search results, and completed analyses are cached by
//! content fingerprint (see [`crate::hashing`]) so repeated evaluations never
//! redo work whose inputs have not changed. Each category carries its own
//! time-to-live; expired entries behave exactly like absent ones.

pub mod error;
pub mod store;
pub mod types;


pub use error::{CacheError, CacheResult};
pub use store::ContentCache;
pub use types::{CacheCategory, CacheEnvelope, CacheStats};

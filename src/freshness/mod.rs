//! Change tracking: content-hash (blake3) caches keyed by path.
//!
//! Two independent `ChangeCache` instances live for the whole process,
//! one for transpilation inputs and one for the injection target. They are
//! handed to the stages explicitly and are never persisted.

mod cache;
mod hash;

pub use cache::Caches;
pub use hash::{ContentHash, hash_bytes, hash_parts};

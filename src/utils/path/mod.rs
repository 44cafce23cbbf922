//! Path utilities.
//!
//! Pure functions for path manipulation. No side effects beyond
//! `canonicalize` lookups.
//!
//! - [`fs`]: filesystem path normalization and mirroring

pub mod fs;

pub use fs::{mirror_path, normalize_path, relative_path, to_slash};

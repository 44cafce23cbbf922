//! Small shared helpers.
//!
//! - [`glob`]: glob patterns (`docs/**/*.{md,apib}`) compiled to regex
//! - [`html`]: entity escaping
//! - [`mime`]: Content-Type guessing for the static server
//! - [`path`]: path normalization and slash-separated display

pub mod glob;
pub mod html;
pub mod mime;
pub mod path;

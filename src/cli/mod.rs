//! Command-line interface module.

mod args;
pub mod serve;
pub mod tasks;

pub use args::{Cli, Commands, ServeArgs};

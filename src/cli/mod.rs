//! CLI layer: clap types, command handlers, and output helpers.

pub mod commands;
pub mod output;
pub mod types;

pub use output::handle_error;
pub use types::{Cli, Commands};

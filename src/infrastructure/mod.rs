//! Infrastructure: configuration, logging, process execution, and wiring.

pub mod config;
pub mod logging;
pub mod process;
pub mod setup;

pub use config::{ConfigError, ConfigLoader};
pub use process::{CommandOutput, CommandRunner};
pub use setup::Pipeline;

//! Logging utilities.
//!
//! Everything in the engine logs through the `log` facade. This module only
//! owns the one-time `env_logger` setup used by binaries and demos.

mod init;

pub use init::{init_logging, LoggingConfig};

//! Logging utilities.
//!
//! The engine logs through the `log` facade. Hosts that have no logger of
//! their own can install the `env_logger` backend with [`init_logging`].

mod init;

pub use init::{init_logging, LoggingConfig};

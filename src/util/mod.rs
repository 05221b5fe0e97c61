//! Utility modules for bundlerpack

pub mod logging;

pub use logging::{init_from_env, init_logging, LoggingConfig};

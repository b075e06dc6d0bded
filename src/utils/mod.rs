//! Configuration and logging utilities

pub mod config;
pub mod logging;

pub use config::{Bounds, ConfigError, ConfigurationManager, EngineConfig};
pub use logging::init_logging;

//! Parsing and validation of `loom.toml` driver configuration.
//!
//! The file is optional. When present it selects the output format, tunes
//! which verification lints are reported, and sets the default log filter.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{discover_config, load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;

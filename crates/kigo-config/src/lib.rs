//! Configuration system for the Kigo poem server.
//!
//! Provides TOML-based configuration with:
//! - `[server]`: listen address
//! - `[session]`: session provider, cookie name, and max lifetime
//!
//! Every field has a default, so an empty or missing file is valid.

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{CONFIG_FILE, load_config, load_config_file};
pub use error::{ConfigError, Result};
pub use types::*;

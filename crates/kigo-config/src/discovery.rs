//! Config file loading.

use std::path::Path;

use crate::error::{ConfigError, Result};
use crate::types::KigoConfig;

/// Config file looked up in the working directory.
pub const CONFIG_FILE: &str = "kigo.toml";

/// Load configuration.
///
/// With an explicit `path`, the file must exist. Without one, `./kigo.toml`
/// is used if present and defaults otherwise.
pub fn load_config(path: Option<&Path>) -> Result<KigoConfig> {
    match path {
        Some(path) => load_config_file(path),
        None => {
            let local = Path::new(CONFIG_FILE);
            if local.exists() {
                load_config_file(local)
            } else {
                Ok(KigoConfig::default())
            }
        }
    }
}

/// Load config from a specific file path (no discovery).
pub fn load_config_file(path: &Path) -> Result<KigoConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    KigoConfig::from_toml(&contents)
}

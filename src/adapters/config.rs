use std::path::Path;

use crate::adapters::limited_io::read_to_string_with_limit;
use crate::core::config::Config;
use crate::error::IplistError;

const CONFIG_READ_LIMIT: usize = 64 * 1024;

/// Load the optional config file; no path means built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config, IplistError> {
    match path {
        Some(path) => load_config_from_file(path),
        None => Ok(Config::default()),
    }
}

pub fn load_config_from_file(path: &Path) -> Result<Config, IplistError> {
    if !path.exists() {
        return Err(IplistError::MissingConfigFile {
            path: path.to_path_buf(),
        });
    }

    let contents = read_to_string_with_limit(path, CONFIG_READ_LIMIT).map_err(|err| {
        IplistError::ConfigRead {
            path: path.to_path_buf(),
            reason: err.to_string(),
        }
    })?;

    Config::from_toml_str(&contents).map_err(IplistError::from)
}

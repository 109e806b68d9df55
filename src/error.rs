use std::path::PathBuf;

use thiserror::Error;

use crate::core::config::ConfigError;
use crate::core::network::NetworkError;

#[derive(Debug, Error)]
pub enum IplistError {
    #[error("failed to initialize logger: {reason}")]
    LoggerInit { reason: String },

    #[error("failed to install SIGINT handler: {reason}")]
    SignalHandlerInstall { reason: String },

    #[error("operation interrupted by SIGINT")]
    Interrupted,

    #[error("config file does not exist: {path}")]
    MissingConfigFile { path: PathBuf },

    #[error("failed to read config file {path}: {reason}")]
    ConfigRead { path: PathBuf, reason: String },

    #[error("config error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("failed to read list {path}: {reason}")]
    ListRead { path: PathBuf, reason: String },

    #[error("failed to write list {path}: {reason}")]
    ListWrite { path: PathBuf, reason: String },

    #[error("{path}:{line}: {source}")]
    MalformedEntry {
        path: PathBuf,
        line: usize,
        source: NetworkError,
    },

    #[error(transparent)]
    Network(#[from] NetworkError),
}

impl IplistError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Interrupted => 130,
            _ => 1,
        }
    }
}

use std::path::PathBuf;
use thiserror::Error;

use crate::cache::CacheError;
use crate::engine::EngineError;

/// Problems with how the runner was configured, as opposed to problems in
/// the file being run
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No package.json found in {}", .dir.display())]
    ManifestNotFound { dir: PathBuf },

    #[error("Invalid package.json at {}: {source}", .path.display())]
    InvalidManifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid transpilation option {0}")]
    InvalidMode(String),

    #[error("Invalid config file {}: {source}", .path.display())]
    InvalidConfigFile {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Error)]
pub enum TranspileError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not determine host runtime version from `{binary}`: {reason}")]
    RuntimeUnavailable { binary: String, reason: String },
}

impl TranspileError {
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, TranspileError::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, TranspileError>;

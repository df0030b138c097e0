//! Error kinds shared by the generator, loaders and persistence layer

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RacerError {
    /// A caller passed an argument outside the accepted domain
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A configuration file does not exist
    #[error("config file not found: {}", .0.display())]
    ConfigMissing(PathBuf),
    /// A configuration file exists but could not be parsed
    #[error("malformed config file {}: {source}", path.display())]
    ConfigMalformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// Reading or writing a file failed
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A required asset could not be located
    #[error("asset not found: {}", .0.display())]
    AssetMissing(PathBuf),
}

impl RacerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RacerError::Io {
            path: path.into(),
            source,
        }
    }
}

//! Error taxonomy for asset loading.

use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    /// File missing or unreadable. Fatal for startup loads.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Malformed record in an OBJ/MTL source.
    #[error("{source_name}:{line}: {message}")]
    Parse {
        source_name: String,
        line: usize,
        message: String,
    },

    /// Image could not be decoded. Callers may continue without the texture.
    #[error("failed to decode image {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl AssetError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(source_name: &str, line_no: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            source_name: source_name.to_owned(),
            line: line_no + 1,
            message: message.into(),
        }
    }

    /// Recoverable errors leave the caller in a usable (degraded) state.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

pub type Result<T> = std::result::Result<T, AssetError>;
